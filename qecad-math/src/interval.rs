//! Rational Interval Arithmetic
//!
//! Closed intervals `[lo, hi]` with rational endpoints. Operations are exact;
//! [`Interval::round_outward`] snaps endpoints outward onto the dyadic grid
//! `2^-prec`, which keeps endpoint sizes bounded during long evaluations while
//! preserving containment.
//!
//! ## Theory
//!
//! For intervals `[a, b]` and `[c, d]`:
//! `[a, b] * [c, d] = [min(ac, ad, bc, bd), max(ac, ad, bc, bd)]`.
//! Even powers of an interval straddling zero have lower bound zero.
//!
//! If every endpoint computation contains the true value, the result of a
//! polynomial evaluation contains the polynomial's value at every point of
//! the input box. A result that excludes zero therefore decides the sign.

use crate::polynomial::{Polynomial, Var};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// A closed rational interval `[lo, hi]`.
///
/// Invariant: `lo <= hi`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interval {
    /// Lower bound (inclusive).
    pub lo: BigRational,
    /// Upper bound (inclusive).
    pub hi: BigRational,
}

impl Interval {
    /// Create an interval from ordered bounds.
    pub fn new(lo: BigRational, hi: BigRational) -> Self {
        debug_assert!(lo <= hi, "interval bounds out of order");
        Self { lo, hi }
    }

    /// The degenerate interval `[r, r]`.
    pub fn point(r: BigRational) -> Self {
        Self {
            lo: r.clone(),
            hi: r,
        }
    }

    /// `[0, 0]`.
    pub fn zero() -> Self {
        Self::point(BigRational::zero())
    }

    /// Whether `r` lies in the interval.
    pub fn contains(&self, r: &BigRational) -> bool {
        self.lo <= *r && *r <= self.hi
    }

    /// Whether zero lies in the interval.
    pub fn contains_zero(&self) -> bool {
        !self.lo.is_positive() && !self.hi.is_negative()
    }

    /// Width `hi - lo`.
    pub fn width(&self) -> BigRational {
        &self.hi - &self.lo
    }

    /// The sign every point of the interval shares, if any.
    pub fn sign(&self) -> Option<Ordering> {
        if self.lo.is_positive() {
            Some(Ordering::Greater)
        } else if self.hi.is_negative() {
            Some(Ordering::Less)
        } else if self.lo.is_zero() && self.hi.is_zero() {
            Some(Ordering::Equal)
        } else {
            None
        }
    }

    /// Multiply by a rational scalar.
    pub fn scale(&self, c: &BigRational) -> Interval {
        let a = &self.lo * c;
        let b = &self.hi * c;
        if c.is_negative() {
            Interval { lo: b, hi: a }
        } else {
            Interval { lo: a, hi: b }
        }
    }

    /// Raise to a non-negative power.
    pub fn pow(&self, k: u32) -> Interval {
        if k == 0 {
            return Interval::point(BigRational::one());
        }
        let e = k as i32;
        let a = self.lo.pow(e);
        let b = self.hi.pow(e);
        if k % 2 == 1 {
            Interval { lo: a, hi: b }
        } else if self.lo.is_negative() && self.hi.is_positive() {
            Interval {
                lo: BigRational::zero(),
                hi: a.max(b),
            }
        } else if a <= b {
            Interval { lo: a, hi: b }
        } else {
            Interval { lo: b, hi: a }
        }
    }

    /// Widen onto the dyadic grid with spacing `2^-prec`.
    pub fn round_outward(&self, prec: u32) -> Interval {
        let scale = BigRational::from_integer(BigInt::one() << prec);
        let lo = (&self.lo * &scale).floor() / &scale;
        let hi = (&self.hi * &scale).ceil() / &scale;
        Interval { lo, hi }
    }

    /// Enclose the values of `p` over a box of variable intervals.
    ///
    /// Each intermediate product is rounded outward to `prec` bits. Returns
    /// `None` when a variable of `p` has no interval.
    pub fn eval_poly(
        p: &Polynomial,
        bounds: &FxHashMap<Var, Interval>,
        prec: u32,
    ) -> Option<Interval> {
        let mut acc = Interval::zero();
        for term in p.terms() {
            let mut t = Interval::point(term.coeff.clone());
            for vp in term.monomial.vars() {
                let x = bounds.get(&vp.var)?;
                t = (&t * &x.pow(vp.power)).round_outward(prec);
            }
            acc = &acc + &t;
        }
        Some(acc.round_outward(prec))
    }
}

/// The simplest rational strictly between `lo` and `hi`.
///
/// Prefers the integer closest to zero, then dyadic fractions with the
/// smallest denominator.
pub fn simplest_between(lo: &BigRational, hi: &BigRational) -> BigRational {
    debug_assert!(lo < hi, "empty open interval");
    let zero = BigRational::zero();
    if lo.is_negative() && hi.is_positive() {
        return zero;
    }
    if !lo.is_negative() {
        let cand = lo.floor() + BigRational::one();
        if cand < *hi {
            return cand;
        }
    } else {
        let cand = hi.ceil() - BigRational::one();
        if cand > *lo {
            return cand;
        }
    }
    let mut scale = BigInt::one();
    loop {
        scale <<= 1;
        let s = BigRational::from_integer(scale.clone());
        let cand = ((lo * &s).floor() + BigRational::one()) / &s;
        if cand < *hi {
            return cand;
        }
    }
}

impl Add for &Interval {
    type Output = Interval;

    fn add(self, rhs: &Interval) -> Interval {
        Interval {
            lo: &self.lo + &rhs.lo,
            hi: &self.hi + &rhs.hi,
        }
    }
}

impl Sub for &Interval {
    type Output = Interval;

    fn sub(self, rhs: &Interval) -> Interval {
        Interval {
            lo: &self.lo - &rhs.hi,
            hi: &self.hi - &rhs.lo,
        }
    }
}

impl Neg for &Interval {
    type Output = Interval;

    fn neg(self) -> Interval {
        Interval {
            lo: -self.hi.clone(),
            hi: -self.lo.clone(),
        }
    }
}

impl Mul for &Interval {
    type Output = Interval;

    fn mul(self, rhs: &Interval) -> Interval {
        let products = [
            &self.lo * &rhs.lo,
            &self.lo * &rhs.hi,
            &self.hi * &rhs.lo,
            &self.hi * &rhs.hi,
        ];
        let mut lo = products[0].clone();
        let mut hi = products[0].clone();
        for p in &products[1..] {
            if *p < lo {
                lo = p.clone();
            }
            if *p > hi {
                hi = p.clone();
            }
        }
        Interval { lo, hi }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}
