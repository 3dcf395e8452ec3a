//! Root Isolation for Univariate Polynomials.
//!
//! Real roots are isolated with Descartes' rule of signs on the Möbius
//! transform of each candidate interval, starting from a power-of-two Cauchy
//! bound and bisecting at dyadic points. Rational roots that appear as linear
//! factors are reported exactly; every other root is returned as an open
//! interval with rational endpoints that are not roots of the polynomial.
//!
//! ## References
//!
//! - Collins and Akritas, "Polynomial Real Root Isolation Using Descartes'
//!   Rule of Signs" (1976)
//! - Z3's `math/polynomial/upolynomial.cpp` (`isolate_roots`)

use crate::polynomial::factorization::factor;
use crate::polynomial::{Polynomial, Var};
use crate::{MathError, MathResult};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::cmp::Ordering;

/// An isolated real root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IsolatedRoot {
    /// A rational root, known exactly.
    Exact(BigRational),
    /// The unique root in the open interval `(lo, hi)`. Neither endpoint is a
    /// root.
    Interval {
        /// Lower endpoint.
        lo: BigRational,
        /// Upper endpoint.
        hi: BigRational,
    },
}

impl IsolatedRoot {
    /// Lower end of the enclosure.
    pub fn lower(&self) -> &BigRational {
        match self {
            IsolatedRoot::Exact(r) => r,
            IsolatedRoot::Interval { lo, .. } => lo,
        }
    }

    /// Upper end of the enclosure.
    pub fn upper(&self) -> &BigRational {
        match self {
            IsolatedRoot::Exact(r) => r,
            IsolatedRoot::Interval { hi, .. } => hi,
        }
    }
}

/// Isolate the distinct real roots of a polynomial in `var` alone.
///
/// Roots are returned in increasing order with pairwise disjoint
/// enclosures. Fails if another variable occurs or `p` is zero.
pub fn isolate_real_roots(p: &Polynomial, var: Var) -> MathResult<Vec<IsolatedRoot>> {
    if p.is_zero() {
        return Err(MathError::InvalidArgument(
            "cannot isolate roots of the zero polynomial".to_string(),
        ));
    }
    if p.univariate_coeffs(var).is_none() {
        return Err(MathError::InvalidArgument(format!(
            "{} is not univariate in x{}",
            p, var
        )));
    }
    let mut exact = Vec::new();
    let mut rest = Polynomial::one();
    for (f, _) in factor(p)?.factors {
        let coeffs = f.univariate_coeffs(var).unwrap_or_default();
        if coeffs.len() == 2 {
            exact.push(-&coeffs[0] / &coeffs[1]);
        } else {
            rest = Polynomial::mul(&rest, &f);
        }
    }
    let coeffs = rest.univariate_coeffs(var).unwrap_or_default();
    let mut intervals = isolate_square_free(&coeffs);
    for r in &exact {
        for iv in intervals.iter_mut() {
            while iv.0 <= *r && *r <= iv.1 {
                *iv = bisect(&coeffs, &iv.0, &iv.1);
            }
        }
    }
    let mut roots: Vec<IsolatedRoot> = exact.into_iter().map(IsolatedRoot::Exact).collect();
    roots.extend(
        intervals
            .into_iter()
            .map(|(lo, hi)| IsolatedRoot::Interval { lo, hi }),
    );
    roots.sort_by(|a, b| a.lower().cmp(b.lower()));
    Ok(roots)
}

/// Isolating intervals for a square-free polynomial given by its
/// coefficients (`coeffs[i]` multiplies `x^i`).
///
/// Interval endpoints are never roots.
pub fn isolate_square_free(coeffs: &[BigRational]) -> Vec<(BigRational, BigRational)> {
    let coeffs = trim(coeffs);
    if coeffs.len() < 2 {
        return Vec::new();
    }
    let b = root_bound(coeffs);
    let mut out = Vec::new();
    isolate_in(coeffs, -b.clone(), b, &mut out);
    out
}

fn isolate_in(
    coeffs: &[BigRational],
    lo: BigRational,
    hi: BigRational,
    out: &mut Vec<(BigRational, BigRational)>,
) {
    match descartes_bound(coeffs, &lo, &hi) {
        0 => {}
        1 => out.push((lo, hi)),
        _ => {
            let m = split_point(coeffs, &lo, &hi);
            isolate_in(coeffs, lo, m.clone(), out);
            isolate_in(coeffs, m, hi, out);
        }
    }
}

/// Halve an isolating interval, keeping the half that holds the root.
///
/// Requires `sign(p(lo)) != sign(p(hi))`, both non-zero.
pub fn bisect(
    coeffs: &[BigRational],
    lo: &BigRational,
    hi: &BigRational,
) -> (BigRational, BigRational) {
    let m = split_point(coeffs, lo, hi);
    if sign_at(coeffs, lo) == sign_at(coeffs, &m) {
        (m, hi.clone())
    } else {
        (lo.clone(), m)
    }
}

/// A point strictly inside `(lo, hi)` that is not a root, preferring the
/// midpoint.
pub fn split_point(coeffs: &[BigRational], lo: &BigRational, hi: &BigRational) -> BigRational {
    let two = BigRational::from_integer(BigInt::from(2));
    let mid = (lo + hi) / &two;
    if sign_at(coeffs, &mid) != Ordering::Equal {
        return mid;
    }
    let mut step = (hi - lo) / &two;
    loop {
        step /= &two;
        let cand = &mid + &step;
        if sign_at(coeffs, &cand) != Ordering::Equal {
            return cand;
        }
    }
}

/// Sign of the polynomial at `x`.
pub fn sign_at(coeffs: &[BigRational], x: &BigRational) -> Ordering {
    Polynomial::eval_univariate(coeffs, x).cmp(&BigRational::zero())
}

/// A power of two strictly larger than the absolute value of every root
/// (Cauchy's bound).
pub fn root_bound(coeffs: &[BigRational]) -> BigRational {
    let coeffs = trim(coeffs);
    let Some(lead) = coeffs.last() else {
        return BigRational::one();
    };
    let mut max = BigRational::zero();
    for c in &coeffs[..coeffs.len() - 1] {
        let r = (c / lead).abs();
        if r > max {
            max = r;
        }
    }
    let bound = (max + BigRational::one()).ceil().to_integer();
    BigRational::from_integer(BigInt::one() << bound.bits())
}

/// Descartes' bound on the number of roots in the open interval `(lo, hi)`.
///
/// Counts sign variations of `(1 + t)^n p((lo + hi t) / (1 + t))`. The count
/// is exact when it is zero or one.
pub fn descartes_bound(coeffs: &[BigRational], lo: &BigRational, hi: &BigRational) -> usize {
    let coeffs = trim(coeffs);
    let n = coeffs.len().saturating_sub(1);
    let mut acc = vec![BigRational::zero(); n + 1];
    let lin = [lo.clone(), hi.clone()];
    let one_plus_t = [BigRational::one(), BigRational::one()];
    let mut lin_pows = vec![vec![BigRational::one()]];
    let mut shift_pows = vec![vec![BigRational::one()]];
    for _ in 0..n {
        let next = mul_dense(&lin_pows[lin_pows.len() - 1], &lin);
        lin_pows.push(next);
        let next = mul_dense(&shift_pows[shift_pows.len() - 1], &one_plus_t);
        shift_pows.push(next);
    }
    for (i, c) in coeffs.iter().enumerate() {
        if c.is_zero() {
            continue;
        }
        let term = mul_dense(&lin_pows[i], &shift_pows[n - i]);
        for (k, t) in term.iter().enumerate() {
            acc[k] += c * t;
        }
    }
    sign_variations(&acc)
}

fn mul_dense(a: &[BigRational], b: &[BigRational]) -> Vec<BigRational> {
    let mut out = vec![BigRational::zero(); a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        if x.is_zero() {
            continue;
        }
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

fn sign_variations(coeffs: &[BigRational]) -> usize {
    let mut count = 0;
    let mut last: Option<bool> = None;
    for c in coeffs.iter().filter(|c| !c.is_zero()) {
        let pos = c.is_positive();
        if last.is_some_and(|l| l != pos) {
            count += 1;
        }
        last = Some(pos);
    }
    count
}

fn trim(coeffs: &[BigRational]) -> &[BigRational] {
    let len = coeffs
        .iter()
        .rposition(|c| !c.is_zero())
        .map_or(0, |i| i + 1);
    &coeffs[..len]
}
