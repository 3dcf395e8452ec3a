//! Polynomial Factorization.
//!
//! Square-free factorization over `Q[x0, ..., xn]` and coprime basis
//! refinement:
//!
//! - Content is split off recursively with respect to the main variable.
//! - Primitive parts are decomposed with Yun's algorithm.
//! - Univariate square-free factors additionally shed their rational linear
//!   factors (rational root theorem), so rational roots are exact.
//!
//! Factors are square-free and pairwise coprime but not necessarily
//! irreducible.
//!
//! ## References
//!
//! - Yun, "On Square-free Decomposition Algorithms" (1976)
//! - Z3's `math/polynomial/polynomial.cpp` (`square_free`)

use crate::polynomial::gcd::{content_wrt, gcd, primitive_part_wrt};
use crate::polynomial::{Polynomial, Var};
use crate::{MathError, MathResult};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

/// Largest magnitude whose divisors are enumerated by the rational root test.
const DIVISOR_LIMIT: u64 = 1 << 40;

/// A factorization `constant * prod factor^multiplicity`.
#[derive(Debug, Clone, PartialEq)]
pub struct Factorization {
    /// Rational constant (carries the sign).
    pub constant: BigRational,
    /// Canonical square-free factors with multiplicities.
    pub factors: Vec<(Polynomial, u32)>,
}

impl Factorization {
    /// Multiply the factorization back out.
    pub fn expand(&self) -> Polynomial {
        let mut acc = Polynomial::constant(self.constant.clone());
        for (f, m) in &self.factors {
            acc = Polynomial::mul(&acc, &f.pow(*m));
        }
        acc
    }
}

/// Factor `p` into a constant times canonical square-free coprime factors.
pub fn factor(p: &Polynomial) -> MathResult<Factorization> {
    if p.is_zero() {
        return Ok(Factorization {
            constant: BigRational::zero(),
            factors: Vec::new(),
        });
    }
    let constant = p.canonical_factor();
    let mut factors = Vec::new();
    factor_canonical(&p.canonical(), &mut factors)?;
    Ok(Factorization { constant, factors })
}

fn factor_canonical(p: &Polynomial, out: &mut Vec<(Polynomial, u32)>) -> MathResult<()> {
    if p.is_number() {
        return Ok(());
    }
    let v = p.max_var();
    let cont = content_wrt(p, v)?;
    factor_canonical(&cont, out)?;
    let prim = primitive_part_wrt(p, v)?;
    for (f, m) in square_free_decomposition(&prim, v)? {
        for g in split_linear_factors(&f)? {
            push_factor(out, g, m);
        }
    }
    Ok(())
}

fn push_factor(out: &mut Vec<(Polynomial, u32)>, f: Polynomial, m: u32) {
    if f.is_number() {
        return;
    }
    match out.iter_mut().find(|(g, _)| *g == f) {
        Some(entry) => entry.1 += m,
        None => out.push((f, m)),
    }
}

/// Yun's square-free decomposition of a primitive polynomial in `var`.
///
/// Returns canonical factors `a_i` with `p = c * prod a_i^i`.
pub fn square_free_decomposition(p: &Polynomial, var: Var) -> MathResult<Vec<(Polynomial, u32)>> {
    if !p.contains_var(var) {
        return Ok(Vec::new());
    }
    let dp = p.derivative(var);
    let g = gcd(p, &dp)?;
    if g.is_number() {
        return Ok(vec![(p.canonical(), 1)]);
    }
    let mut b = exact(p, &g)?;
    let c = exact(&dp, &g)?;
    let mut d = Polynomial::sub(&c, &b.derivative(var));
    let mut i = 1;
    let mut out = Vec::new();
    while b.contains_var(var) {
        let a = gcd(&b, &d)?;
        if a.contains_var(var) {
            out.push((a.canonical(), i));
        }
        b = exact(&b, &a)?;
        let c = exact(&d, &a)?;
        d = Polynomial::sub(&c, &b.derivative(var));
        i += 1;
    }
    Ok(out)
}

/// Square-free part of `p` in canonical form.
pub fn square_free_part(p: &Polynomial) -> MathResult<Polynomial> {
    let f = factor(p)?;
    Ok(f
        .factors
        .iter()
        .fold(Polynomial::one(), |acc, (g, _)| Polynomial::mul(&acc, g))
        .canonical())
}

/// Split rational linear factors off a univariate polynomial.
///
/// Multivariate input is returned unchanged.
pub fn split_linear_factors(p: &Polynomial) -> MathResult<Vec<Polynomial>> {
    let var = p.max_var();
    let Some(coeffs) = p.univariate_coeffs(var) else {
        return Ok(vec![p.clone()]);
    };
    if coeffs.len() <= 2 {
        return Ok(vec![p.canonical()]);
    }
    let mut out = Vec::new();
    let mut rest = p.canonical();
    if coeffs[0].is_zero() {
        let x = Polynomial::from_var(var);
        out.push(x.clone());
        rest = exact(&rest, &x)?;
    }
    for root in rational_roots(&rest, var) {
        // numer/denom in lowest terms; linear factor denom*x - numer
        let lin = Polynomial::univariate(
            var,
            &[
                BigRational::from_integer(-root.numer().clone()),
                BigRational::from_integer(root.denom().clone()),
            ],
        );
        rest = exact(&rest, &lin)?;
        out.push(lin.canonical());
    }
    if rest.contains_var(var) {
        out.push(rest.canonical());
    }
    Ok(out)
}

/// Rational roots of a univariate integer polynomial, if its extreme
/// coefficients are small enough to enumerate divisors.
fn rational_roots(p: &Polynomial, var: Var) -> Vec<BigRational> {
    let Some(coeffs) = p.univariate_coeffs(var) else {
        return Vec::new();
    };
    let (Some(a0), Some(an)) = (coeffs.first(), coeffs.last()) else {
        return Vec::new();
    };
    if a0.is_zero() || coeffs.len() < 2 {
        return Vec::new();
    }
    let (Some(num_divs), Some(den_divs)) = (divisors(a0.numer()), divisors(an.numer())) else {
        return Vec::new();
    };
    let mut roots: Vec<BigRational> = Vec::new();
    for r in &num_divs {
        for s in &den_divs {
            for sign in [1i64, -1] {
                let cand = BigRational::new(BigInt::from(*r) * sign, BigInt::from(*s));
                if roots.contains(&cand) {
                    continue;
                }
                if Polynomial::eval_univariate(&coeffs, &cand).is_zero() {
                    roots.push(cand);
                }
            }
        }
    }
    roots
}

fn divisors(n: &BigInt) -> Option<Vec<u64>> {
    let n = n.abs().to_u64()?;
    if n == 0 || n > DIVISOR_LIMIT {
        return None;
    }
    let mut small = Vec::new();
    let mut large = Vec::new();
    let mut d = 1u64;
    while d * d <= n {
        if n % d == 0 {
            small.push(d);
            if d * d != n {
                large.push(n / d);
            }
        }
        d += 1;
    }
    small.extend(large.into_iter().rev());
    Some(small)
}

/// Refine square-free polynomials into a gcd-free basis.
///
/// Every input divides a product of basis elements, basis elements are
/// canonical, non-constant and pairwise coprime.
pub fn coprime_basis(polys: &[Polynomial]) -> MathResult<Vec<Polynomial>> {
    let mut basis: Vec<Polynomial> = Vec::new();
    let mut pending: Vec<Polynomial> = polys
        .iter()
        .filter(|p| !p.is_number())
        .map(|p| p.canonical())
        .rev()
        .collect();
    while let Some(mut f) = pending.pop() {
        let mut i = 0;
        while i < basis.len() {
            if basis[i] == f {
                f = Polynomial::one();
                break;
            }
            let g = gcd(&f, &basis[i])?;
            if g.is_number() {
                i += 1;
                continue;
            }
            let b = basis.remove(i);
            let b_rest = exact(&b, &g)?;
            f = exact(&f, &g)?;
            if !b_rest.is_number() {
                pending.push(b_rest.canonical());
            }
            pending.push(g);
            if f.is_number() {
                break;
            }
        }
        if !f.is_number() {
            basis.push(f.canonical());
        }
    }
    Ok(basis)
}

/// Multiplicity of each basis element in `p`, and the leftover constant.
///
/// Fails when `p` is not a constant times a product of basis elements.
pub fn express_over_basis(
    p: &Polynomial,
    basis: &[Polynomial],
) -> MathResult<(BigRational, Vec<(usize, u32)>)> {
    let mut rest = p.clone();
    let mut mults = Vec::new();
    for (i, b) in basis.iter().enumerate() {
        let mut m = 0;
        while !rest.is_number() {
            match rest.div_exact(b) {
                Some(q) => {
                    rest = q;
                    m += 1;
                }
                None => break,
            }
        }
        if m > 0 {
            mults.push((i, m));
        }
    }
    if !rest.is_number() {
        return Err(MathError::NotExact(format!("{} over basis", p)));
    }
    Ok((rest.constant_value(), mults))
}

fn exact(p: &Polynomial, d: &Polynomial) -> MathResult<Polynomial> {
    p.div_exact(d)
        .ok_or_else(|| MathError::NotExact(format!("{} / {}", p, d)))
}
