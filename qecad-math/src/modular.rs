//! Modular Arithmetic
//!
//! Arithmetic in prime fields `F_p` and dense recursive polynomials over
//! them. This is the scalar layer under the modular extension towers used by
//! the algebraic zero-test:
//!
//! - [`primes`]: a fixed table of word-sized primes, generated once.
//! - [`Moder`]: field operations for one prime, with reduction of rationals
//!   that reports a vanishing denominator.
//! - [`ModPoly`]: recursive dense polynomials, `sum c_i v^i` with each `c_i`
//!   a polynomial in variables smaller than `v`.
//!
//! ## References
//!
//! - Monagan, "In-place Arithmetic for Polynomials over Z_n" (1992)
//! - Z3's `math/polynomial/polynomial.cpp` (modular GCD)

use crate::polynomial::{Monomial, Polynomial, Var};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::ToPrimitive;
use std::sync::OnceLock;

/// Number of primes in the table.
pub const PRIME_TABLE_SIZE: usize = 256;

/// Exclusive upper bound for table primes.
const PRIME_CEILING: u64 = 1 << 31;

static PRIMES: OnceLock<Vec<u64>> = OnceLock::new();

/// The prime table: the largest primes below `2^31`, in descending order.
pub fn primes() -> &'static [u64] {
    PRIMES.get_or_init(|| {
        let mut out = Vec::with_capacity(PRIME_TABLE_SIZE);
        let mut n = PRIME_CEILING - 1;
        while out.len() < PRIME_TABLE_SIZE {
            if is_prime(n) {
                out.push(n);
            }
            n -= 2;
        }
        out
    })
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// Arithmetic modulo a prime `p < 2^31`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moder {
    p: u64,
}

impl Moder {
    /// Create a moder for the prime `p`.
    pub fn new(p: u64) -> Self {
        debug_assert!(p < PRIME_CEILING && is_prime(p));
        Self { p }
    }

    /// The modulus.
    #[inline]
    pub fn prime(&self) -> u64 {
        self.p
    }

    /// `a + b`.
    #[inline]
    pub fn add(&self, a: u64, b: u64) -> u64 {
        (a + b) % self.p
    }

    /// `a - b`.
    #[inline]
    pub fn sub(&self, a: u64, b: u64) -> u64 {
        (a + self.p - b) % self.p
    }

    /// `-a`.
    #[inline]
    pub fn neg(&self, a: u64) -> u64 {
        (self.p - a) % self.p
    }

    /// `a * b`.
    #[inline]
    pub fn mul(&self, a: u64, b: u64) -> u64 {
        (a * b) % self.p
    }

    /// Multiplicative inverse, `None` for zero.
    pub fn inv(&self, a: u64) -> Option<u64> {
        if a == 0 {
            return None;
        }
        let (mut r0, mut r1) = (self.p as i64, a as i64);
        let (mut t0, mut t1) = (0i64, 1i64);
        while r1 != 0 {
            let q = r0 / r1;
            (r0, r1) = (r1, r0 - q * r1);
            (t0, t1) = (t1, t0 - q * t1);
        }
        Some(t0.rem_euclid(self.p as i64) as u64)
    }

    /// Reduce an integer.
    pub fn reduce(&self, n: &BigInt) -> u64 {
        n.mod_floor(&BigInt::from(self.p)).to_u64().unwrap_or(0)
    }

    /// Reduce a rational, `None` when `p` divides the denominator.
    pub fn reduce_rational(&self, r: &num_rational::BigRational) -> Option<u64> {
        let den = self.inv(self.reduce(r.denom()))?;
        Some(self.mul(self.reduce(r.numer()), den))
    }

    /// Symmetric representative in `(-p/2, p/2]`.
    pub fn symmetric(&self, a: u64) -> i64 {
        if a > self.p / 2 {
            a as i64 - self.p as i64
        } else {
            a as i64
        }
    }
}

/// A dense recursive polynomial over `F_p`.
///
/// Invariant: a `Rec` node has at least two coefficients, a non-zero last
/// coefficient, and coefficients whose variables are all below `var`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModPoly {
    /// A field element.
    Num(u64),
    /// `sum coeffs[i] * var^i`.
    Rec {
        /// Main variable.
        var: Var,
        /// Coefficients indexed by degree.
        coeffs: Vec<ModPoly>,
    },
}

impl ModPoly {
    /// The zero polynomial.
    pub fn zero() -> Self {
        ModPoly::Num(0)
    }

    /// The one polynomial.
    pub fn one() -> Self {
        ModPoly::Num(1)
    }

    /// The variable `var`.
    pub fn var(var: Var) -> Self {
        ModPoly::Rec {
            var,
            coeffs: vec![ModPoly::zero(), ModPoly::one()],
        }
    }

    /// Reduce a rational polynomial, `None` when a denominator vanishes.
    pub fn from_polynomial(p: &Polynomial, m: &Moder) -> Option<Self> {
        if p.is_number() {
            return Some(ModPoly::Num(m.reduce_rational(&p.constant_value())?));
        }
        let v = p.max_var();
        let coeffs = p
            .coefficients(v)
            .iter()
            .map(|c| ModPoly::from_polynomial(c, m))
            .collect::<Option<Vec<_>>>()?;
        Some(ModPoly::from_coeffs(v, coeffs))
    }

    /// Build `sum coeffs[i] * var^i`, restoring the representation invariant.
    pub fn from_coeffs(var: Var, mut coeffs: Vec<ModPoly>) -> Self {
        while coeffs.last().is_some_and(ModPoly::is_zero) {
            coeffs.pop();
        }
        match coeffs.len() {
            0 => ModPoly::zero(),
            1 => coeffs.pop().unwrap_or_else(ModPoly::zero),
            _ => ModPoly::Rec { var, coeffs },
        }
    }

    /// Whether this is zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, ModPoly::Num(0))
    }

    /// Main variable, `None` for constants.
    pub fn main_var(&self) -> Option<Var> {
        match self {
            ModPoly::Num(_) => None,
            ModPoly::Rec { var, .. } => Some(*var),
        }
    }

    /// Degree in `var`, which must not be below the main variable.
    pub fn degree_in(&self, var: Var) -> usize {
        match self {
            ModPoly::Rec { var: v, coeffs } if *v == var => coeffs.len() - 1,
            _ => 0,
        }
    }

    /// Coefficients in `var`, which must not be below the main variable.
    pub fn coeffs_in(&self, var: Var) -> Vec<ModPoly> {
        match self {
            ModPoly::Rec { var: v, coeffs } if *v == var => coeffs.clone(),
            _ => vec![self.clone()],
        }
    }

    /// Leading coefficient in `var`.
    pub fn lc_in(&self, var: Var) -> ModPoly {
        match self {
            ModPoly::Rec { var: v, coeffs } if *v == var => {
                coeffs.last().cloned().unwrap_or_else(ModPoly::zero)
            }
            _ => self.clone(),
        }
    }

    fn join_var(&self, other: &ModPoly) -> Option<Var> {
        self.main_var().max(other.main_var())
    }

    /// `self + other`.
    pub fn add(&self, other: &ModPoly, m: &Moder) -> ModPoly {
        match (self, other) {
            (ModPoly::Num(a), ModPoly::Num(b)) => ModPoly::Num(m.add(*a, *b)),
            _ => {
                let Some(v) = self.join_var(other) else {
                    return ModPoly::zero();
                };
                let a = self.coeffs_in(v);
                let b = other.coeffs_in(v);
                let n = a.len().max(b.len());
                let coeffs = (0..n)
                    .map(|i| match (a.get(i), b.get(i)) {
                        (Some(x), Some(y)) => x.add(y, m),
                        (Some(x), None) | (None, Some(x)) => x.clone(),
                        (None, None) => ModPoly::zero(),
                    })
                    .collect();
                ModPoly::from_coeffs(v, coeffs)
            }
        }
    }

    /// `-self`.
    pub fn neg(&self, m: &Moder) -> ModPoly {
        match self {
            ModPoly::Num(a) => ModPoly::Num(m.neg(*a)),
            ModPoly::Rec { var, coeffs } => ModPoly::Rec {
                var: *var,
                coeffs: coeffs.iter().map(|c| c.neg(m)).collect(),
            },
        }
    }

    /// `self - other`.
    pub fn sub(&self, other: &ModPoly, m: &Moder) -> ModPoly {
        self.add(&other.neg(m), m)
    }

    /// `c * self` for a field element `c`.
    pub fn scale(&self, c: u64, m: &Moder) -> ModPoly {
        if c == 0 {
            return ModPoly::zero();
        }
        match self {
            ModPoly::Num(a) => ModPoly::Num(m.mul(*a, c)),
            ModPoly::Rec { var, coeffs } => ModPoly::Rec {
                var: *var,
                coeffs: coeffs.iter().map(|x| x.scale(c, m)).collect(),
            },
        }
    }

    /// `self * other`.
    pub fn mul(&self, other: &ModPoly, m: &Moder) -> ModPoly {
        match (self, other) {
            (ModPoly::Num(a), _) => other.scale(*a, m),
            (_, ModPoly::Num(b)) => self.scale(*b, m),
            _ => {
                let Some(v) = self.join_var(other) else {
                    return ModPoly::zero();
                };
                let a = self.coeffs_in(v);
                let b = other.coeffs_in(v);
                let mut out = vec![ModPoly::zero(); a.len() + b.len() - 1];
                for (i, x) in a.iter().enumerate() {
                    if x.is_zero() {
                        continue;
                    }
                    for (j, y) in b.iter().enumerate() {
                        out[i + j] = out[i + j].add(&x.mul(y, m), m);
                    }
                }
                ModPoly::from_coeffs(v, out)
            }
        }
    }

    /// `self * var^k`.
    pub fn shift(&self, var: Var, k: usize) -> ModPoly {
        if k == 0 || self.is_zero() {
            return self.clone();
        }
        let mut coeffs = vec![ModPoly::zero(); k];
        coeffs.extend(self.coeffs_in(var));
        ModPoly::from_coeffs(var, coeffs)
    }

    /// Derivative with respect to the main variable `var`.
    pub fn derivative(&self, var: Var, m: &Moder) -> ModPoly {
        let coeffs = self.coeffs_in(var);
        if coeffs.len() < 2 || self.main_var() != Some(var) {
            return ModPoly::zero();
        }
        let out = coeffs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, c)| c.scale(i as u64 % m.prime(), m))
            .collect();
        ModPoly::from_coeffs(var, out)
    }

    /// Sparse image: every non-zero coefficient with its monomial.
    pub fn to_image(&self) -> Vec<(Monomial, u64)> {
        let mut out = Vec::new();
        self.collect_image(&mut Vec::new(), &mut out);
        out
    }

    fn collect_image(&self, powers: &mut Vec<(Var, u32)>, out: &mut Vec<(Monomial, u64)>) {
        match self {
            ModPoly::Num(0) => {}
            ModPoly::Num(a) => out.push((Monomial::from_powers(powers.iter().copied()), *a)),
            ModPoly::Rec { var, coeffs } => {
                for (i, c) in coeffs.iter().enumerate() {
                    if i > 0 {
                        powers.push((*var, i as u32));
                    }
                    c.collect_image(powers, out);
                    if i > 0 {
                        powers.pop();
                    }
                }
            }
        }
    }

    /// Lift to a rational polynomial using symmetric representatives.
    pub fn to_polynomial(&self, m: &Moder) -> Polynomial {
        let terms = self.to_image().into_iter().map(|(mono, c)| {
            crate::polynomial::Term::new(
                num_rational::BigRational::from_integer(BigInt::from(m.symmetric(c))),
                mono,
            )
        });
        Polynomial::from_terms(terms, crate::polynomial::MonomialOrder::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_rational::BigRational;

    #[test]
    fn test_prime_table() {
        let ps = primes();
        assert_eq!(ps.len(), PRIME_TABLE_SIZE);
        assert_eq!(ps[0], 2_147_483_647);
        assert!(ps.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_moder_field_ops() {
        let m = Moder::new(7);
        assert_eq!(m.add(5, 4), 2);
        assert_eq!(m.sub(2, 5), 4);
        assert_eq!(m.mul(3, 5), 1);
        assert_eq!(m.inv(3), Some(5));
        assert_eq!(m.inv(0), None);
        assert_eq!(m.reduce(&BigInt::from(-1)), 6);
        let half = BigRational::new(BigInt::from(1), BigInt::from(2));
        assert_eq!(m.reduce_rational(&half), Some(4));
        let seventh = BigRational::new(BigInt::from(1), BigInt::from(7));
        assert_eq!(m.reduce_rational(&seventh), None);
        assert_eq!(m.symmetric(6), -1);
    }

    #[test]
    fn test_modpoly_arithmetic() {
        let m = Moder::new(101);
        // (x1 + x0)(x1 - x0) = x1^2 - x0^2
        let a = Polynomial::from_coeffs_int(&[(1, &[(1, 1)]), (1, &[(0, 1)])]);
        let b = Polynomial::from_coeffs_int(&[(1, &[(1, 1)]), (-1, &[(0, 1)])]);
        let pa = ModPoly::from_polynomial(&a, &m).unwrap();
        let pb = ModPoly::from_polynomial(&b, &m).unwrap();
        let prod = pa.mul(&pb, &m);
        assert_eq!(prod.to_polynomial(&m), &a * &b);
        assert!(prod.sub(&prod, &m).is_zero());
        assert_eq!(prod.degree_in(1), 2);
        assert_eq!(prod.lc_in(1), ModPoly::one());
    }

    #[test]
    fn test_modpoly_unlucky_denominator() {
        let m = Moder::new(3);
        let p = Polynomial::univariate(0, &[BigRational::new(BigInt::from(1), BigInt::from(3)), BigRational::from_integer(BigInt::from(1))]);
        assert!(ModPoly::from_polynomial(&p, &m).is_none());
    }
}
