//! Multivariate polynomials over the rationals.
//!
//! Polynomials are sparse sums of [`Term`]s kept in decreasing monomial order.
//! Variables are plain indices; in the CAD engine a variable index doubles as
//! its lifting level, so the main variable of a polynomial is its
//! [`Polynomial::max_var`].
//!
//! Recursive views (coefficients with respect to a chosen variable) are
//! computed on demand rather than stored, which keeps structural equality and
//! hashing cheap for the deduplication done by projection.
//!
//! Reference: Z3's `math/polynomial/` directory.

pub mod factorization;
pub mod gcd;
pub mod resultant;
pub mod root_isolation;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Sub};

/// Variable identifier for polynomials.
pub type Var = u32;

/// Null variable constant (indicates no variable).
pub const NULL_VAR: Var = u32::MAX;

/// Power of a variable (variable, exponent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarPower {
    /// The variable identifier.
    pub var: Var,
    /// The exponent (power) of the variable.
    pub power: u32,
}

impl VarPower {
    /// Create a new variable power.
    #[inline]
    pub fn new(var: Var, power: u32) -> Self {
        Self { var, power }
    }
}

/// A monomial is a product of variables with exponents.
/// Represented as a sorted list of (variable, power) pairs.
/// The unit monomial (1) is represented as an empty list.
#[derive(Clone, PartialEq, Eq)]
pub struct Monomial {
    /// Variables with their exponents, sorted by variable index.
    vars: SmallVec<[VarPower; 4]>,
    /// Cached total degree.
    total_degree: u32,
}

impl Monomial {
    /// Create the unit monomial (1).
    #[inline]
    pub fn unit() -> Self {
        Self {
            vars: SmallVec::new(),
            total_degree: 0,
        }
    }

    /// Create a monomial from a single variable with power 1.
    #[inline]
    pub fn from_var(var: Var) -> Self {
        Self::from_var_power(var, 1)
    }

    /// Create a monomial from a single variable with a given power.
    pub fn from_var_power(var: Var, power: u32) -> Self {
        if power == 0 {
            return Self::unit();
        }
        let mut vars = SmallVec::new();
        vars.push(VarPower::new(var, power));
        Self {
            total_degree: power,
            vars,
        }
    }

    /// Create a monomial from a list of (variable, power) pairs.
    /// The input doesn't need to be sorted or normalized.
    pub fn from_powers(powers: impl IntoIterator<Item = (Var, u32)>) -> Self {
        let mut vars: SmallVec<[VarPower; 4]> = SmallVec::new();
        for (var, power) in powers {
            if power == 0 {
                continue;
            }
            match vars.iter_mut().find(|vp| vp.var == var) {
                Some(vp) => vp.power += power,
                None => vars.push(VarPower::new(var, power)),
            }
        }
        vars.sort_by_key(|vp| vp.var);
        let total_degree = vars.iter().map(|vp| vp.power).sum();
        Self { vars, total_degree }
    }

    /// Returns true if this is the unit monomial.
    #[inline]
    pub fn is_unit(&self) -> bool {
        self.vars.is_empty()
    }

    /// Returns the total degree of the monomial.
    #[inline]
    pub fn total_degree(&self) -> u32 {
        self.total_degree
    }

    /// Returns the variable-power pairs.
    #[inline]
    pub fn vars(&self) -> &[VarPower] {
        &self.vars
    }

    /// Returns the degree of a specific variable in this monomial.
    pub fn degree(&self, var: Var) -> u32 {
        self.vars
            .iter()
            .find(|vp| vp.var == var)
            .map(|vp| vp.power)
            .unwrap_or(0)
    }

    /// Returns the maximum variable in this monomial, or NULL_VAR if unit.
    pub fn max_var(&self) -> Var {
        self.vars.last().map(|vp| vp.var).unwrap_or(NULL_VAR)
    }

    /// Remove `var` from the monomial, returning the rest.
    pub fn without(&self, var: Var) -> Monomial {
        let vars: SmallVec<[VarPower; 4]> =
            self.vars.iter().copied().filter(|vp| vp.var != var).collect();
        let total_degree = vars.iter().map(|vp| vp.power).sum();
        Monomial { vars, total_degree }
    }

    /// Multiply two monomials.
    pub fn mul(&self, other: &Monomial) -> Monomial {
        if self.is_unit() {
            return other.clone();
        }
        if other.is_unit() {
            return self.clone();
        }

        let mut vars: SmallVec<[VarPower; 4]> = SmallVec::new();
        let mut i = 0;
        let mut j = 0;

        while i < self.vars.len() && j < other.vars.len() {
            match self.vars[i].var.cmp(&other.vars[j].var) {
                Ordering::Less => {
                    vars.push(self.vars[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    vars.push(other.vars[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    vars.push(VarPower::new(
                        self.vars[i].var,
                        self.vars[i].power + other.vars[j].power,
                    ));
                    i += 1;
                    j += 1;
                }
            }
        }
        vars.extend_from_slice(&self.vars[i..]);
        vars.extend_from_slice(&other.vars[j..]);

        Monomial {
            vars,
            total_degree: self.total_degree + other.total_degree,
        }
    }

    /// Check if other divides self. Returns the quotient if it does.
    pub fn div(&self, other: &Monomial) -> Option<Monomial> {
        if other.is_unit() {
            return Some(self.clone());
        }

        let mut vars: SmallVec<[VarPower; 4]> = SmallVec::new();
        let mut j = 0;

        for vp in &self.vars {
            if j < other.vars.len() && other.vars[j].var == vp.var {
                if vp.power < other.vars[j].power {
                    return None;
                }
                let new_power = vp.power - other.vars[j].power;
                if new_power > 0 {
                    vars.push(VarPower::new(vp.var, new_power));
                }
                j += 1;
            } else if j < other.vars.len() && other.vars[j].var < vp.var {
                return None;
            } else {
                vars.push(*vp);
            }
        }

        if j < other.vars.len() {
            return None;
        }

        let total_degree = vars.iter().map(|vp| vp.power).sum();
        Some(Monomial { vars, total_degree })
    }

    /// Least common multiple of two monomials.
    pub fn lcm(&self, other: &Monomial) -> Monomial {
        let mut vars: SmallVec<[VarPower; 4]> = SmallVec::new();
        let mut i = 0;
        let mut j = 0;
        while i < self.vars.len() && j < other.vars.len() {
            match self.vars[i].var.cmp(&other.vars[j].var) {
                Ordering::Less => {
                    vars.push(self.vars[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    vars.push(other.vars[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    vars.push(VarPower::new(
                        self.vars[i].var,
                        self.vars[i].power.max(other.vars[j].power),
                    ));
                    i += 1;
                    j += 1;
                }
            }
        }
        vars.extend_from_slice(&self.vars[i..]);
        vars.extend_from_slice(&other.vars[j..]);
        let total_degree = vars.iter().map(|vp| vp.power).sum();
        Monomial { vars, total_degree }
    }

    /// True when the two monomials share no variable.
    pub fn is_coprime(&self, other: &Monomial) -> bool {
        self.vars
            .iter()
            .all(|vp| other.vars.iter().all(|wp| wp.var != vp.var))
    }

    /// Lexicographic comparison of monomials.
    ///
    /// Higher-indexed variables are more significant, matching the level
    /// convention where the main variable is the largest index.
    pub fn lex_cmp(&self, other: &Monomial) -> Ordering {
        let mut i = self.vars.len();
        let mut j = other.vars.len();

        while i > 0 && j > 0 {
            let a = self.vars[i - 1];
            let b = other.vars[j - 1];
            match a.var.cmp(&b.var) {
                Ordering::Greater => return Ordering::Greater,
                Ordering::Less => return Ordering::Less,
                Ordering::Equal => match a.power.cmp(&b.power) {
                    Ordering::Equal => {
                        i -= 1;
                        j -= 1;
                    }
                    ord => return ord,
                },
            }
        }

        if i > 0 {
            Ordering::Greater
        } else if j > 0 {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    }

    /// Graded lexicographic comparison (total degree first, then lex).
    pub fn grlex_cmp(&self, other: &Monomial) -> Ordering {
        match self.total_degree.cmp(&other.total_degree) {
            Ordering::Equal => self.lex_cmp(other),
            ord => ord,
        }
    }

    /// Graded reverse lexicographic comparison.
    pub fn grevlex_cmp(&self, other: &Monomial) -> Ordering {
        match self.total_degree.cmp(&other.total_degree) {
            Ordering::Equal => {
                // The monomial with the smaller power of the least significant
                // variable wins.
                let mut i = 0;
                let mut j = 0;
                while i < self.vars.len() && j < other.vars.len() {
                    let a = self.vars[i];
                    let b = other.vars[j];
                    match a.var.cmp(&b.var) {
                        Ordering::Less => return Ordering::Less,
                        Ordering::Greater => return Ordering::Greater,
                        Ordering::Equal => match a.power.cmp(&b.power) {
                            Ordering::Equal => {
                                i += 1;
                                j += 1;
                            }
                            Ordering::Less => return Ordering::Greater,
                            Ordering::Greater => return Ordering::Less,
                        },
                    }
                }
                Ordering::Equal
            }
            ord => ord,
        }
    }
}

impl Hash for Monomial {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.vars.hash(state);
    }
}

impl fmt::Debug for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unit() {
            write!(f, "1")
        } else {
            for (i, vp) in self.vars.iter().enumerate() {
                if i > 0 {
                    write!(f, "*")?;
                }
                if vp.power == 1 {
                    write!(f, "x{}", vp.var)?;
                } else {
                    write!(f, "x{}^{}", vp.var, vp.power)?;
                }
            }
            Ok(())
        }
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A term is a coefficient multiplied by a monomial.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Term {
    /// The coefficient of the term.
    pub coeff: BigRational,
    /// The monomial part of the term.
    pub monomial: Monomial,
}

impl Term {
    /// Create a new term.
    #[inline]
    pub fn new(coeff: BigRational, monomial: Monomial) -> Self {
        Self { coeff, monomial }
    }

    /// Create a constant term.
    #[inline]
    pub fn constant(c: BigRational) -> Self {
        Self::new(c, Monomial::unit())
    }

    /// Create a term from a single variable.
    #[inline]
    pub fn from_var(var: Var) -> Self {
        Self::new(BigRational::one(), Monomial::from_var(var))
    }

    /// Check if this term is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.coeff.is_zero()
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.monomial.is_unit() {
            write!(f, "{}", self.coeff)
        } else if self.coeff.is_one() {
            write!(f, "{:?}", self.monomial)
        } else if self.coeff == -BigRational::one() {
            write!(f, "-{:?}", self.monomial)
        } else {
            write!(f, "{}*{:?}", self.coeff, self.monomial)
        }
    }
}

/// Monomial ordering for polynomial canonicalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MonomialOrder {
    /// Lexicographic order.
    Lex,
    /// Graded lexicographic order.
    #[default]
    GrLex,
    /// Graded reverse lexicographic order.
    GRevLex,
}

impl MonomialOrder {
    /// Compare two monomials using this ordering.
    pub fn compare(&self, a: &Monomial, b: &Monomial) -> Ordering {
        match self {
            MonomialOrder::Lex => a.lex_cmp(b),
            MonomialOrder::GrLex => a.grlex_cmp(b),
            MonomialOrder::GRevLex => a.grevlex_cmp(b),
        }
    }
}

/// A multivariate polynomial over rationals.
/// Represented as a sum of terms, sorted by monomial order.
#[derive(Clone)]
pub struct Polynomial {
    /// Terms in decreasing order (according to monomial order).
    terms: Vec<Term>,
    /// The monomial ordering used.
    order: MonomialOrder,
}

impl Polynomial {
    /// Create the zero polynomial.
    #[inline]
    pub fn zero() -> Self {
        Self {
            terms: Vec::new(),
            order: MonomialOrder::default(),
        }
    }

    /// Create the one polynomial.
    #[inline]
    pub fn one() -> Self {
        Self::constant(BigRational::one())
    }

    /// Create a constant polynomial.
    pub fn constant(c: BigRational) -> Self {
        if c.is_zero() {
            Self::zero()
        } else {
            Self {
                terms: vec![Term::constant(c)],
                order: MonomialOrder::default(),
            }
        }
    }

    /// Create an integer constant polynomial.
    pub fn from_int(c: i64) -> Self {
        Self::constant(BigRational::from_integer(BigInt::from(c)))
    }

    /// Create a polynomial from a single variable.
    pub fn from_var(var: Var) -> Self {
        Self {
            terms: vec![Term::from_var(var)],
            order: MonomialOrder::default(),
        }
    }

    /// Create a polynomial x^k.
    pub fn from_var_power(var: Var, power: u32) -> Self {
        if power == 0 {
            Self::one()
        } else {
            Self {
                terms: vec![Term::new(
                    BigRational::one(),
                    Monomial::from_var_power(var, power),
                )],
                order: MonomialOrder::default(),
            }
        }
    }

    /// Create a polynomial from terms. Normalizes and combines like terms.
    pub fn from_terms(terms: impl IntoIterator<Item = Term>, order: MonomialOrder) -> Self {
        let mut poly = Self {
            terms: terms.into_iter().filter(|t| !t.is_zero()).collect(),
            order,
        };
        poly.normalize();
        poly
    }

    /// Create a polynomial from integer coefficients.
    pub fn from_coeffs_int(coeffs: &[(i64, &[(Var, u32)])]) -> Self {
        let terms: Vec<Term> = coeffs
            .iter()
            .map(|(c, powers)| {
                Term::new(
                    BigRational::from_integer(BigInt::from(*c)),
                    Monomial::from_powers(powers.iter().copied()),
                )
            })
            .collect();
        Self::from_terms(terms, MonomialOrder::default())
    }

    /// Create a univariate polynomial from coefficients.
    /// `coeffs\[i\]` is the coefficient of x^i.
    pub fn univariate(var: Var, coeffs: &[BigRational]) -> Self {
        let terms: Vec<Term> = coeffs
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_zero())
            .map(|(i, c)| Term::new(c.clone(), Monomial::from_var_power(var, i as u32)))
            .collect();
        Self::from_terms(terms, MonomialOrder::default())
    }

    /// Build `sum coeffs[i] * var^i` from polynomial coefficients.
    pub fn from_coefficients(var: Var, coeffs: &[Polynomial]) -> Self {
        let mut terms = Vec::new();
        for (i, c) in coeffs.iter().enumerate() {
            let m = Monomial::from_var_power(var, i as u32);
            terms.extend(
                c.terms
                    .iter()
                    .map(|t| Term::new(t.coeff.clone(), t.monomial.mul(&m))),
            );
        }
        Self::from_terms(terms, MonomialOrder::default())
    }

    /// Re-sort the polynomial under another monomial order.
    pub fn with_order(&self, order: MonomialOrder) -> Self {
        Self::from_terms(self.terms.iter().cloned(), order)
    }

    /// The monomial order of this polynomial.
    #[inline]
    pub fn order(&self) -> MonomialOrder {
        self.order
    }

    /// Check if the polynomial is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Check if the polynomial is a non-zero constant.
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.terms.len() == 1 && self.terms[0].monomial.is_unit()
    }

    /// Check if the polynomial is a number (zero or a constant).
    #[inline]
    pub fn is_number(&self) -> bool {
        self.is_zero() || self.is_constant()
    }

    /// Get the constant value of the polynomial.
    ///
    /// Returns the constant coefficient if the polynomial is constant,
    /// or zero if the polynomial is zero.
    pub fn constant_value(&self) -> BigRational {
        if self.is_constant() {
            self.terms[0].coeff.clone()
        } else {
            BigRational::zero()
        }
    }

    /// Check if the polynomial is one.
    pub fn is_one(&self) -> bool {
        self.is_constant() && self.terms[0].coeff.is_one()
    }

    /// Get the terms.
    #[inline]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Get the total degree of the polynomial.
    pub fn total_degree(&self) -> u32 {
        self.terms
            .iter()
            .map(|t| t.monomial.total_degree())
            .max()
            .unwrap_or(0)
    }

    /// Get the degree with respect to a specific variable.
    pub fn degree(&self, var: Var) -> u32 {
        self.terms
            .iter()
            .map(|t| t.monomial.degree(var))
            .max()
            .unwrap_or(0)
    }

    /// Get the maximum variable in the polynomial, or NULL_VAR if constant.
    pub fn max_var(&self) -> Var {
        self.terms
            .iter()
            .map(|t| t.monomial.max_var())
            .filter(|&v| v != NULL_VAR)
            .max()
            .unwrap_or(NULL_VAR)
    }

    /// Check whether `var` occurs in the polynomial.
    pub fn contains_var(&self, var: Var) -> bool {
        self.terms.iter().any(|t| t.monomial.degree(var) > 0)
    }

    /// Get all variables in the polynomial.
    pub fn vars(&self) -> Vec<Var> {
        let mut vars: Vec<Var> = self
            .terms
            .iter()
            .flat_map(|t| t.monomial.vars().iter().map(|vp| vp.var))
            .collect();
        vars.sort_unstable();
        vars.dedup();
        vars
    }

    /// Get the leading term (with respect to monomial order).
    #[inline]
    pub fn leading_term(&self) -> Option<&Term> {
        self.terms.first()
    }

    /// Get the leading coefficient.
    pub fn leading_coeff(&self) -> BigRational {
        self.terms
            .first()
            .map(|t| t.coeff.clone())
            .unwrap_or_else(BigRational::zero)
    }

    /// Get the leading monomial.
    pub fn leading_monomial(&self) -> Option<&Monomial> {
        self.terms.first().map(|t| &t.monomial)
    }

    /// Get the constant term.
    pub fn constant_term(&self) -> BigRational {
        self.terms
            .iter()
            .find(|t| t.monomial.is_unit())
            .map(|t| t.coeff.clone())
            .unwrap_or_else(BigRational::zero)
    }

    /// Get the coefficient polynomial for x^k.
    /// For polynomial p(y_1, ..., y_n, x), returns coefficient of x^k.
    pub fn coeff(&self, var: Var, k: u32) -> Polynomial {
        let terms: Vec<Term> = self
            .terms
            .iter()
            .filter(|t| t.monomial.degree(var) == k)
            .map(|t| Term::new(t.coeff.clone(), t.monomial.without(var)))
            .collect();
        Polynomial::from_terms(terms, self.order)
    }

    /// All coefficients with respect to `var`, indexed by degree.
    pub fn coefficients(&self, var: Var) -> Vec<Polynomial> {
        let d = self.degree(var) as usize;
        let mut buckets: Vec<Vec<Term>> = vec![Vec::new(); d + 1];
        for t in &self.terms {
            let k = t.monomial.degree(var) as usize;
            buckets[k].push(Term::new(t.coeff.clone(), t.monomial.without(var)));
        }
        buckets
            .into_iter()
            .map(|ts| Polynomial::from_terms(ts, self.order))
            .collect()
    }

    /// Get the leading coefficient with respect to variable x.
    pub fn leading_coeff_wrt(&self, var: Var) -> Polynomial {
        let d = self.degree(var);
        self.coeff(var, d)
    }

    /// The polynomial without its leading part in `var`.
    pub fn reductum(&self, var: Var) -> Polynomial {
        let d = self.degree(var);
        let terms: Vec<Term> = self
            .terms
            .iter()
            .filter(|t| t.monomial.degree(var) < d)
            .cloned()
            .collect();
        Polynomial {
            terms,
            order: self.order,
        }
    }

    /// Coefficients of a polynomial in `var` alone, or `None` if any other
    /// variable occurs.
    pub fn univariate_coeffs(&self, var: Var) -> Option<Vec<BigRational>> {
        let d = self.degree(var) as usize;
        let mut coeffs = vec![BigRational::zero(); d + 1];
        for t in &self.terms {
            if t.monomial.vars().iter().any(|vp| vp.var != var) {
                return None;
            }
            coeffs[t.monomial.degree(var) as usize] = t.coeff.clone();
        }
        Some(coeffs)
    }

    /// Normalize the polynomial (sort terms and combine like terms).
    fn normalize(&mut self) {
        if self.terms.is_empty() {
            return;
        }

        let order = self.order;
        self.terms
            .sort_by(|a, b| order.compare(&b.monomial, &a.monomial));

        let mut merged: Vec<Term> = Vec::with_capacity(self.terms.len());
        for term in self.terms.drain(..) {
            match merged.last_mut() {
                Some(last) if last.monomial == term.monomial => last.coeff += term.coeff,
                _ => merged.push(term),
            }
        }
        merged.retain(|t| !t.coeff.is_zero());
        self.terms = merged;
    }

    /// Negate the polynomial.
    pub fn neg(&self) -> Polynomial {
        Polynomial {
            terms: self
                .terms
                .iter()
                .map(|t| Term::new(-t.coeff.clone(), t.monomial.clone()))
                .collect(),
            order: self.order,
        }
    }

    /// Add two polynomials.
    pub fn add(&self, other: &Polynomial) -> Polynomial {
        let mut terms: Vec<Term> = self.terms.clone();
        terms.extend(other.terms.iter().cloned());
        Polynomial::from_terms(terms, self.order)
    }

    /// Subtract two polynomials.
    pub fn sub(&self, other: &Polynomial) -> Polynomial {
        let mut terms: Vec<Term> = self.terms.clone();
        terms.extend(
            other
                .terms
                .iter()
                .map(|t| Term::new(-t.coeff.clone(), t.monomial.clone())),
        );
        Polynomial::from_terms(terms, self.order)
    }

    /// Multiply by a scalar.
    pub fn scale(&self, c: &BigRational) -> Polynomial {
        if c.is_zero() {
            return Polynomial::zero();
        }
        if c.is_one() {
            return self.clone();
        }
        Polynomial {
            terms: self
                .terms
                .iter()
                .map(|t| Term::new(&t.coeff * c, t.monomial.clone()))
                .collect(),
            order: self.order,
        }
    }

    /// Multiply two polynomials.
    pub fn mul(&self, other: &Polynomial) -> Polynomial {
        if self.is_zero() || other.is_zero() {
            return Polynomial::zero();
        }
        let mut terms = Vec::with_capacity(self.terms.len() * other.terms.len());
        for a in &self.terms {
            for b in &other.terms {
                terms.push(Term::new(&a.coeff * &b.coeff, a.monomial.mul(&b.monomial)));
            }
        }
        Polynomial::from_terms(terms, self.order)
    }

    /// Multiply by a monomial.
    pub fn mul_monomial(&self, m: &Monomial) -> Polynomial {
        if m.is_unit() {
            return self.clone();
        }
        Polynomial {
            terms: self
                .terms
                .iter()
                .map(|t| Term::new(t.coeff.clone(), t.monomial.mul(m)))
                .collect(),
            order: self.order,
        }
    }

    /// Compute p^k.
    pub fn pow(&self, k: u32) -> Polynomial {
        if k == 0 {
            return Polynomial::one();
        }
        if k == 1 {
            return self.clone();
        }
        if self.is_zero() {
            return Polynomial::zero();
        }

        // Binary exponentiation
        let mut result = Polynomial::one();
        let mut base = self.clone();
        let mut exp = k;

        while exp > 0 {
            if exp & 1 == 1 {
                result = Polynomial::mul(&result, &base);
            }
            exp >>= 1;
            if exp > 0 {
                base = Polynomial::mul(&base, &base);
            }
        }

        result
    }

    /// Compute the derivative with respect to a variable.
    pub fn derivative(&self, var: Var) -> Polynomial {
        let terms: Vec<Term> = self
            .terms
            .iter()
            .filter_map(|t| {
                let d = t.monomial.degree(var);
                if d == 0 {
                    return None;
                }
                let coeff = &t.coeff * BigRational::from_integer(BigInt::from(d));
                let mono = t
                    .monomial
                    .div(&Monomial::from_var(var))
                    .unwrap_or_else(Monomial::unit);
                Some(Term::new(coeff, mono))
            })
            .collect();
        Polynomial::from_terms(terms, self.order)
    }

    /// Evaluate the polynomial at a point (substituting a value for a variable).
    pub fn eval_at(&self, var: Var, value: &BigRational) -> Polynomial {
        if !self.contains_var(var) {
            return self.clone();
        }
        let terms: Vec<Term> = self
            .terms
            .iter()
            .map(|t| {
                let d = t.monomial.degree(var);
                if d == 0 {
                    t.clone()
                } else {
                    Term::new(&t.coeff * value.pow(d as i32), t.monomial.without(var))
                }
            })
            .collect();
        Polynomial::from_terms(terms, self.order)
    }

    /// Evaluate the polynomial completely.
    ///
    /// Returns `None` when a variable of the polynomial is unassigned.
    pub fn eval(&self, assignment: &FxHashMap<Var, BigRational>) -> Option<BigRational> {
        let mut result = BigRational::zero();
        for term in &self.terms {
            let mut val = term.coeff.clone();
            for vp in term.monomial.vars() {
                val *= assignment.get(&vp.var)?.pow(vp.power as i32);
            }
            result += val;
        }
        Some(result)
    }

    /// Evaluate a polynomial in `var` alone by Horner's rule.
    ///
    /// Other variables are treated as absent; callers use this only after
    /// checking [`Polynomial::univariate_coeffs`].
    pub fn eval_univariate(coeffs: &[BigRational], value: &BigRational) -> BigRational {
        let mut acc = BigRational::zero();
        for c in coeffs.iter().rev() {
            acc = acc * value + c;
        }
        acc
    }

    /// Substitute a polynomial for a variable.
    pub fn substitute(&self, var: Var, replacement: &Polynomial) -> Polynomial {
        if !self.contains_var(var) {
            return self.clone();
        }
        let coeffs = self.coefficients(var);
        // Horner in the substituted variable.
        let mut result = Polynomial::zero();
        for c in coeffs.iter().rev() {
            result = Polynomial::add(&Polynomial::mul(&result, replacement), c);
        }
        result
    }

    /// Rename every variable through `map`.
    pub fn map_vars(&self, map: impl Fn(Var) -> Var) -> Polynomial {
        let terms: Vec<Term> = self
            .terms
            .iter()
            .map(|t| {
                Term::new(
                    t.coeff.clone(),
                    Monomial::from_powers(t.monomial.vars().iter().map(|vp| (map(vp.var), vp.power))),
                )
            })
            .collect();
        Polynomial::from_terms(terms, self.order)
    }

    /// Content of a polynomial: gcd of numerators over lcm of denominators.
    ///
    /// The result is positive, and `self / content` has coprime integer
    /// coefficients.
    pub fn content(&self) -> BigRational {
        if self.terms.is_empty() {
            return BigRational::one();
        }
        let mut num = BigInt::zero();
        let mut den = BigInt::one();
        for term in &self.terms {
            num = num.gcd(term.coeff.numer());
            den = den.lcm(term.coeff.denom());
        }
        BigRational::new(num, den)
    }

    /// Divide by the rational content, producing coprime integer coefficients.
    pub fn primitive(&self) -> Polynomial {
        if self.is_zero() {
            return self.clone();
        }
        let c = self.content();
        if c.is_one() {
            return self.clone();
        }
        self.scale(&c.recip())
    }

    /// Primitive part with a positive leading coefficient.
    ///
    /// Two polynomials that differ by a non-zero rational factor have the same
    /// canonical form.
    pub fn canonical(&self) -> Polynomial {
        let p = self.primitive();
        if p.leading_coeff().is_negative() {
            p.neg()
        } else {
            p
        }
    }

    /// The rational `c` with `self == c * self.canonical()`.
    pub fn canonical_factor(&self) -> BigRational {
        let c = self.content();
        if self.leading_coeff().is_negative() { -c } else { c }
    }

    /// Make the polynomial monic (leading coefficient = 1).
    pub fn make_monic(&self) -> Polynomial {
        if self.is_zero() {
            return self.clone();
        }
        let lc = self.leading_coeff();
        if lc.is_one() {
            return self.clone();
        }
        self.scale(&lc.recip())
    }

    /// Multivariate pseudo-remainder with respect to `var`.
    ///
    /// Returns `r` with `lc(b)^(deg a - deg b + 1) * a = q * b + r` and
    /// `deg_var r < deg_var b`, where leading coefficients are polynomials in
    /// the remaining variables.
    pub fn pseudo_remainder(&self, divisor: &Polynomial, var: Var) -> crate::MathResult<Polynomial> {
        if divisor.is_zero() {
            return Err(crate::MathError::DivisionByZero);
        }
        let deg_b = divisor.degree(var);
        let deg_a = self.degree(var);
        if self.is_zero() || deg_a < deg_b {
            return Ok(self.clone());
        }
        let lc_b = divisor.leading_coeff_wrt(var);
        let mut r = self.clone();
        let mut steps = deg_a - deg_b + 1;
        while !r.is_zero() && r.degree(var) >= deg_b {
            let deg_r = r.degree(var);
            let lc_r = r.leading_coeff_wrt(var);
            let shift = Monomial::from_var_power(var, deg_r - deg_b);
            r = Polynomial::sub(
                &Polynomial::mul(&r, &lc_b),
                &Polynomial::mul(&lc_r, divisor).mul_monomial(&shift),
            );
            steps -= 1;
        }
        // Complete the multiplier so the identity holds with the full power.
        if steps > 0 {
            r = Polynomial::mul(&r, &lc_b.pow(steps));
        }
        Ok(r)
    }

    /// Exact multivariate division.
    ///
    /// Returns `Some(q)` with `self == q * divisor`, or `None` when the
    /// division is not exact.
    pub fn div_exact(&self, divisor: &Polynomial) -> Option<Polynomial> {
        if divisor.is_zero() {
            return None;
        }
        if self.is_zero() {
            return Some(Polynomial::zero());
        }
        let divisor = if divisor.order == self.order {
            divisor.clone()
        } else {
            divisor.with_order(self.order)
        };
        if divisor.is_constant() {
            return Some(self.scale(&divisor.constant_value().recip()));
        }
        let lead = divisor.terms[0].clone();
        let mut rem = self.clone();
        let mut quotient: Vec<Term> = Vec::new();
        while let Some(lt) = rem.terms.first() {
            let mono = lt.monomial.div(&lead.monomial)?;
            let coeff = &lt.coeff / &lead.coeff;
            let step = Polynomial {
                terms: divisor
                    .terms
                    .iter()
                    .map(|t| Term::new(&t.coeff * &coeff, t.monomial.mul(&mono)))
                    .collect(),
                order: self.order,
            };
            quotient.push(Term::new(coeff, mono));
            rem = Polynomial::sub(&rem, &step);
        }
        Some(Polynomial::from_terms(quotient, self.order))
    }

    /// Check if the polynomial is positive for every real assignment.
    ///
    /// Sufficient test: every monomial is a square with a positive
    /// coefficient and the constant term is positive.
    pub fn is_definitely_positive(&self) -> bool {
        self.constant_term().is_positive()
            && self.terms.iter().all(|t| {
                t.coeff.is_positive() && t.monomial.vars().iter().all(|vp| vp.power % 2 == 0)
            })
    }

    /// Check if the polynomial is negative for every real assignment.
    pub fn is_definitely_negative(&self) -> bool {
        self.neg().is_definitely_positive()
    }

    /// True when the polynomial provably never vanishes.
    pub fn is_definitely_nonzero(&self) -> bool {
        self.is_constant() || self.is_definitely_positive() || self.is_definitely_negative()
    }
}

impl PartialEq for Polynomial {
    fn eq(&self, other: &Self) -> bool {
        self.terms == other.terms
    }
}

impl Eq for Polynomial {}

impl Hash for Polynomial {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.terms.hash(state);
    }
}

impl Default for Polynomial {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Debug for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            write!(f, "0")
        } else {
            for (i, term) in self.terms.iter().enumerate() {
                if i == 0 {
                    write!(f, "{:?}", term)?;
                } else if term.coeff.is_negative() {
                    write!(
                        f,
                        " - {:?}",
                        Term::new(-term.coeff.clone(), term.monomial.clone())
                    )?;
                } else {
                    write!(f, " + {:?}", term)?;
                }
            }
            Ok(())
        }
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Neg for Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Self::Output {
        Polynomial::neg(&self)
    }
}

impl Neg for &Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Self::Output {
        Polynomial::neg(self)
    }
}

impl Add for Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: Self) -> Self::Output {
        Polynomial::add(&self, &rhs)
    }
}

impl Add<&Polynomial> for &Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: &Polynomial) -> Self::Output {
        Polynomial::add(self, rhs)
    }
}

impl Sub for Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: Self) -> Self::Output {
        Polynomial::sub(&self, &rhs)
    }
}

impl Sub<&Polynomial> for &Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: &Polynomial) -> Self::Output {
        Polynomial::sub(self, rhs)
    }
}

impl Mul for Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: Self) -> Self::Output {
        Polynomial::mul(&self, &rhs)
    }
}

impl Mul<&Polynomial> for &Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: &Polynomial) -> Self::Output {
        Polynomial::mul(self, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn x(v: Var) -> Polynomial {
        Polynomial::from_var(v)
    }

    #[test]
    fn test_monomial_unit() {
        let m = Monomial::unit();
        assert!(m.is_unit());
        assert_eq!(m.total_degree(), 0);
        assert_eq!(m.max_var(), NULL_VAR);
    }

    #[test]
    fn test_lex_main_variable_is_most_significant() {
        let a = Monomial::from_var(1);
        let b = Monomial::from_var_power(0, 5);
        assert_eq!(a.lex_cmp(&b), Ordering::Greater);
    }

    #[test]
    fn test_arithmetic() {
        // (x0 + 1)(x0 - 1) = x0^2 - 1
        let p = &x(0) + &Polynomial::one();
        let q = &x(0) - &Polynomial::one();
        let r = &p * &q;
        assert_eq!(r, Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (-1, &[])]));
        assert_eq!(&r - &r, Polynomial::zero());
    }

    #[test]
    fn test_coefficients_roundtrip() {
        // x1^2*x0 + 3*x1 - x0
        let p = Polynomial::from_coeffs_int(&[(1, &[(1, 2), (0, 1)]), (3, &[(1, 1)]), (-1, &[(0, 1)])]);
        let cs = p.coefficients(1);
        assert_eq!(cs.len(), 3);
        assert_eq!(cs[2], x(0));
        assert_eq!(cs[1], Polynomial::from_int(3));
        assert_eq!(cs[0], -x(0));
        assert_eq!(Polynomial::from_coefficients(1, &cs), p);
        assert_eq!(p.reductum(1), Polynomial::from_coeffs_int(&[(3, &[(1, 1)]), (-1, &[(0, 1)])]));
    }

    #[test]
    fn test_eval_and_substitute() {
        // x1 - x0^2 at x0 = 3 gives x1 - 9
        let p = Polynomial::from_coeffs_int(&[(1, &[(1, 1)]), (-1, &[(0, 2)])]);
        assert_eq!(p.eval_at(0, &rat(3)), Polynomial::from_coeffs_int(&[(1, &[(1, 1)]), (-9, &[])]));
        // substitute x1 := x0^2 gives zero
        assert!(p.substitute(1, &Polynomial::from_var_power(0, 2)).is_zero());
        let mut env = FxHashMap::default();
        env.insert(0, rat(2));
        assert_eq!(p.eval(&env), None);
        env.insert(1, rat(5));
        assert_eq!(p.eval(&env), Some(rat(1)));
    }

    #[test]
    fn test_derivative() {
        let p = Polynomial::from_coeffs_int(&[(1, &[(0, 3)]), (2, &[(0, 1), (1, 1)])]);
        let d = p.derivative(0);
        assert_eq!(d, Polynomial::from_coeffs_int(&[(3, &[(0, 2)]), (2, &[(1, 1)])]));
    }

    #[test]
    fn test_canonical() {
        let p = Polynomial::from_coeffs_int(&[(-4, &[(0, 2)]), (6, &[])]);
        let c = p.canonical();
        assert_eq!(c, Polynomial::from_coeffs_int(&[(2, &[(0, 2)]), (-3, &[])]));
        assert_eq!(c.scale(&p.canonical_factor()), p);
        let half = Polynomial::univariate(0, &[BigRational::new(1.into(), 2.into()), rat(1)]);
        assert_eq!(half.canonical(), Polynomial::from_coeffs_int(&[(2, &[(0, 1)]), (1, &[])]));
    }

    #[test]
    fn test_pseudo_remainder_multivariate() {
        // a = x1^2 - x0, b = x0*x1 - 1; prem(a, b) = lc(b)^2 a mod b = 1 - x0^3
        let a = Polynomial::from_coeffs_int(&[(1, &[(1, 2)]), (-1, &[(0, 1)])]);
        let b = Polynomial::from_coeffs_int(&[(1, &[(0, 1), (1, 1)]), (-1, &[])]);
        let r = a.pseudo_remainder(&b, 1).unwrap();
        assert_eq!(r, Polynomial::from_coeffs_int(&[(1, &[]), (-1, &[(0, 3)])]));
    }

    #[test]
    fn test_div_exact() {
        let p = &x(0) - &x(1);
        let q = &x(0) + &x(1);
        let prod = &p * &q;
        assert_eq!(prod.div_exact(&p), Some(q.clone()));
        assert_eq!(prod.div_exact(&q), Some(p));
        assert_eq!(prod.div_exact(&x(0)), None);
        assert!(Polynomial::zero().div_exact(&q).unwrap().is_zero());
    }

    #[test]
    fn test_definitely_nonzero() {
        let sq = Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (1, &[])]);
        assert!(sq.is_definitely_positive());
        assert!(sq.neg().is_definitely_negative());
        let bare = Polynomial::from_var_power(0, 2);
        assert!(!bare.is_definitely_positive());
        assert!(Polynomial::from_int(-3).is_definitely_nonzero());
    }

    #[test]
    fn test_map_vars() {
        let p = Polynomial::from_coeffs_int(&[(1, &[(0, 2), (1, 1)])]);
        let q = p.map_vars(|v| 1 - v);
        assert_eq!(q, Polynomial::from_coeffs_int(&[(1, &[(1, 2), (0, 1)])]));
    }
}
