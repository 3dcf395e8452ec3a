//! Sample points of cells.
//!
//! A coordinate is either a rational number or a real algebraic number
//! given by a defining polynomial and an isolating interval. The interval is
//! maintained against a univariate rational *isolator* whose only root in
//! `(lo, hi)` is the coordinate; the defining polynomial may later be
//! replaced by a proper factor over the lower coordinates, while the
//! isolator never changes.

use super::Sign;
use qecad_math::polynomial::root_isolation::{sign_at, split_point};
use qecad_math::{Interval, Polynomial, Var};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;
use rustc_hash::FxHashMap;
use std::fmt;

/// An irrational (or not yet recognised rational) real algebraic number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgebraicCoord {
    /// Defining polynomial, monic in the coordinate's own variable. Lower
    /// variables may occur after a replacement by the zero test.
    pub defpoly: Polynomial,
    /// Coefficients (ascending) of a square-free univariate polynomial with
    /// exactly one root in `(lo, hi)`.
    pub isolator: Vec<BigRational>,
    /// Lower end of the isolating interval.
    pub lo: BigRational,
    /// Upper end of the isolating interval.
    pub hi: BigRational,
    /// Sign of the isolator at `lo`.
    pub sgn_of_left: Sign,
}

impl AlgebraicCoord {
    /// Coordinate for the root of `isolator` in `(lo, hi)`, defined by
    /// `defpoly`.
    pub fn new(defpoly: Polynomial, isolator: Vec<BigRational>, lo: BigRational, hi: BigRational) -> Self {
        let sgn_of_left = Sign::from(sign_at(&isolator, &lo));
        Self {
            defpoly,
            isolator,
            lo,
            hi,
            sgn_of_left,
        }
    }

    /// Halve the isolating interval.
    pub fn refine(&mut self) {
        let m = split_point(&self.isolator, &self.lo, &self.hi);
        if Sign::from(sign_at(&self.isolator, &m)) == self.sgn_of_left {
            self.lo = m;
        } else {
            self.hi = m;
        }
    }

    /// Refine until the interval is no wider than `2^-bits`.
    pub fn refine_to(&mut self, bits: u32) {
        let target = BigRational::new(BigInt::one(), BigInt::one() << bits);
        while &self.hi - &self.lo > target {
            self.refine();
        }
    }

    /// The isolator as a polynomial in `var`.
    pub fn isolator_poly(&self, var: Var) -> Polynomial {
        Polynomial::univariate(var, &self.isolator)
    }

    /// Whether `r` is the coordinate. Requires `r` in `(lo, hi)` or outside
    /// `[lo, hi]`.
    pub fn is_root(&self, r: &BigRational) -> bool {
        self.lo < *r && *r < self.hi && sign_at(&self.isolator, r).is_eq()
    }
}

/// One coordinate of a sample point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coordinate {
    /// An exact rational.
    Rational(BigRational),
    /// A real algebraic number.
    Algebraic(AlgebraicCoord),
}

impl Coordinate {
    /// A rational coordinate from an integer.
    pub fn from_int(n: i64) -> Self {
        Coordinate::Rational(BigRational::from_integer(BigInt::from(n)))
    }

    /// Lower end of the enclosure.
    pub fn lower(&self) -> &BigRational {
        match self {
            Coordinate::Rational(r) => r,
            Coordinate::Algebraic(a) => &a.lo,
        }
    }

    /// Upper end of the enclosure.
    pub fn upper(&self) -> &BigRational {
        match self {
            Coordinate::Rational(r) => r,
            Coordinate::Algebraic(a) => &a.hi,
        }
    }

    /// Enclosing interval.
    pub fn interval(&self) -> Interval {
        Interval::new(self.lower().clone(), self.upper().clone())
    }

    /// Whether the coordinate is rational.
    pub fn is_rational(&self) -> bool {
        matches!(self, Coordinate::Rational(_))
    }

    /// Narrow an algebraic enclosure; rationals are already exact.
    pub fn refine(&mut self) {
        if let Coordinate::Algebraic(a) = self {
            a.refine();
        }
    }

    /// Refine to width at most `2^-bits`.
    pub fn refine_to(&mut self, bits: u32) {
        if let Coordinate::Algebraic(a) = self {
            a.refine_to(bits);
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coordinate::Rational(r) => write!(f, "{}", r),
            Coordinate::Algebraic(a) => {
                write!(f, "root of {} in ({}, {})", a.defpoly, a.lo, a.hi)
            }
        }
    }
}

/// Coordinates of a point, `coords[v]` for variable `v`.
///
/// Tracks which coordinates were refined or replaced since construction so
/// that the owner can write them back.
#[derive(Debug, Clone, Default)]
pub struct SamplePoint {
    coords: Vec<Coordinate>,
    touched: Vec<bool>,
}

impl SamplePoint {
    /// A point with the given coordinates.
    pub fn new(coords: Vec<Coordinate>) -> Self {
        let touched = vec![false; coords.len()];
        Self { coords, touched }
    }

    /// Number of coordinates.
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Whether the point has no coordinates.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// The coordinate of `var`.
    pub fn coord(&self, var: Var) -> Option<&Coordinate> {
        self.coords.get(var as usize)
    }

    /// All coordinates.
    pub fn coords(&self) -> &[Coordinate] {
        &self.coords
    }

    /// Append the coordinate of the next variable.
    pub fn push(&mut self, c: Coordinate) {
        self.coords.push(c);
        self.touched.push(false);
    }

    /// Drop the last coordinate.
    pub fn pop(&mut self) -> Option<Coordinate> {
        self.touched.pop();
        self.coords.pop()
    }

    /// Replace the coordinate of `var`.
    pub fn set(&mut self, var: Var, c: Coordinate) {
        let i = var as usize;
        self.coords[i] = c;
        self.touched[i] = true;
    }

    /// Halve the enclosure of `var`.
    pub fn refine(&mut self, var: Var) {
        let i = var as usize;
        if let Some(c @ Coordinate::Algebraic(_)) = self.coords.get_mut(i) {
            c.refine();
            self.touched[i] = true;
        }
    }

    /// Refine the coordinate of `var` to width at most `2^-bits`.
    pub fn refine_to(&mut self, var: Var, bits: u32) {
        let i = var as usize;
        if let Some(Coordinate::Algebraic(a)) = self.coords.get_mut(i) {
            let before = &a.hi - &a.lo;
            a.refine_to(bits);
            if &a.hi - &a.lo != before {
                self.touched[i] = true;
            }
        }
    }

    /// Refine every algebraic coordinate to width at most `2^-bits`.
    pub fn refine_all_to(&mut self, bits: u32) {
        for v in 0..self.coords.len() {
            self.refine_to(v as Var, bits);
        }
    }

    /// Coordinates changed since construction, by variable.
    pub fn changes(&self) -> Vec<(usize, Coordinate)> {
        self.touched
            .iter()
            .enumerate()
            .filter(|(_, t)| **t)
            .map(|(i, _)| (i, self.coords[i].clone()))
            .collect()
    }

    /// Adopt the changed coordinates of a working copy.
    pub fn apply(&mut self, changes: &[(usize, Coordinate)]) {
        for (i, c) in changes {
            if *i < self.coords.len() {
                self.set(*i as Var, c.clone());
            }
        }
    }

    /// Interval box for interval evaluation.
    pub fn bounds(&self) -> FxHashMap<Var, Interval> {
        self.coords
            .iter()
            .enumerate()
            .map(|(i, c)| (i as Var, c.interval()))
            .collect()
    }

    /// Substitute every rational coordinate and every algebraic coordinate
    /// whose defining polynomial is linear with a constant leading
    /// coefficient. Variables are eliminated from the top down, so a
    /// substituted linear relation only introduces lower variables.
    pub fn substitute_known(&self, p: &Polynomial) -> Polynomial {
        let mut q = p.clone();
        for (i, c) in self.coords.iter().enumerate().rev() {
            let v = i as Var;
            if !q.contains_var(v) {
                continue;
            }
            match c {
                Coordinate::Rational(r) => q = q.eval_at(v, r),
                Coordinate::Algebraic(a) => {
                    if a.defpoly.degree(v) != 1 {
                        continue;
                    }
                    let c1 = a.defpoly.coeff(v, 1);
                    if !c1.is_constant() {
                        continue;
                    }
                    let c0 = a.defpoly.coeff(v, 0);
                    let value = c0.scale(&(-c1.constant_value().recip()));
                    q = q.substitute(v, &value);
                }
            }
        }
        q
    }

    /// Whether every coordinate is rational.
    pub fn is_rational(&self) -> bool {
        self.coords.iter().all(Coordinate::is_rational)
    }
}

impl fmt::Display for SamplePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}
