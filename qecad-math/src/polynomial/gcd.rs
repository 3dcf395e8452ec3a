//! Multivariate polynomial GCD.
//!
//! Computes greatest common divisors in `Q[x0, ..., xn]` by recursion on the
//! main variable: contents are split off with respect to the largest variable
//! present, and the primitive parts are combined with a primitive polynomial
//! remainder sequence. Results are returned in canonical form (primitive,
//! positive leading coefficient), so the GCD is unique.
//!
//! ## References
//!
//! - Knuth, "The Art of Computer Programming", Vol. 2, Section 4.6.1
//! - Z3's `math/polynomial/polynomial.cpp` (`gcd_prs`)

use crate::polynomial::{Polynomial, Var};
use crate::{MathError, MathResult};

/// Greatest common divisor of two polynomials, in canonical form.
///
/// `gcd(0, 0)` is zero; the GCD with a non-zero constant is one.
pub fn gcd(a: &Polynomial, b: &Polynomial) -> MathResult<Polynomial> {
    if a.is_zero() {
        return Ok(b.canonical());
    }
    if b.is_zero() {
        return Ok(a.canonical());
    }
    if a.is_constant() || b.is_constant() {
        return Ok(Polynomial::one());
    }

    let v = a.max_var().max(b.max_var());
    if !a.contains_var(v) {
        return gcd(a, &content_wrt(b, v)?);
    }
    if !b.contains_var(v) {
        return gcd(&content_wrt(a, v)?, b);
    }

    let ca = content_wrt(a, v)?;
    let cb = content_wrt(b, v)?;
    let pa = exact(a, &ca)?;
    let pb = exact(b, &cb)?;
    let c = gcd(&ca, &cb)?;

    let (mut f, mut g) = if pa.degree(v) >= pb.degree(v) {
        (pa, pb)
    } else {
        (pb, pa)
    };
    while !g.is_zero() {
        let r = f.pseudo_remainder(&g, v)?;
        f = g;
        if r.is_zero() {
            break;
        }
        if !r.contains_var(v) {
            f = Polynomial::one();
            break;
        }
        g = primitive_part_wrt(&r, v)?;
    }

    let f = primitive_part_wrt(&f, v)?;
    Ok(Polynomial::mul(&c, &f).canonical())
}

/// GCD of a list of polynomials.
pub fn gcd_all<'a>(polys: impl IntoIterator<Item = &'a Polynomial>) -> MathResult<Polynomial> {
    let mut acc = Polynomial::zero();
    for p in polys {
        acc = gcd(&acc, p)?;
        if acc.is_one() {
            break;
        }
    }
    Ok(acc)
}

/// Content of `p` with respect to `var`: the GCD of its coefficients.
pub fn content_wrt(p: &Polynomial, var: Var) -> MathResult<Polynomial> {
    if !p.contains_var(var) {
        return Ok(p.canonical());
    }
    gcd_all(p.coefficients(var).iter().filter(|c| !c.is_zero()))
}

/// Primitive part of `p` with respect to `var`, in canonical form.
pub fn primitive_part_wrt(p: &Polynomial, var: Var) -> MathResult<Polynomial> {
    if p.is_zero() {
        return Ok(Polynomial::zero());
    }
    let c = content_wrt(p, var)?;
    Ok(exact(p, &c)?.canonical())
}

/// Least common multiple, in canonical form.
pub fn lcm(a: &Polynomial, b: &Polynomial) -> MathResult<Polynomial> {
    if a.is_zero() || b.is_zero() {
        return Ok(Polynomial::zero());
    }
    let g = gcd(a, b)?;
    Ok(Polynomial::mul(&exact(a, &g)?, b).canonical())
}

fn exact(p: &Polynomial, d: &Polynomial) -> MathResult<Polynomial> {
    p.div_exact(d)
        .ok_or_else(|| MathError::NotExact(format!("{} / {}", p, d)))
}
