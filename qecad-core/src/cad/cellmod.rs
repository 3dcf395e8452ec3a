//! Modular images of an algebraic tower.
//!
//! A [`Cellmod`] is the reduction modulo one prime of the defining
//! polynomials `D_0, ..., D_k` of an algebraic sample point, each monic in
//! its own variable. Arithmetic happens in
//! `R_j = F_p[v_0, ..., v_j] / (D_0, ..., D_j)`, which is a product of
//! fields rather than a field when some `D_i` factors modulo the prime. An
//! attempt to invert a zero divisor therefore exposes a proper monic factor
//! of some `D_i`; it is reported as a [`ZeroDivisor`] and recorded as a
//! split of that level.
//!
//! The view is disposable: it lives for one zero test and is rebuilt for the
//! next prime.
//!
//! ## References
//!
//! - Moreno Maza and Rioboo, "Polynomial GCD computations over towers of
//!   algebraic extensions" (1995)
//! - Dahan, Moreno Maza, Schost, Wu and Xie, "Lifting techniques for
//!   triangular decompositions" (2005)

use qecad_math::modular::{ModPoly, Moder};
use qecad_math::{Polynomial, Var};

/// One level of the tower.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellmodLevel {
    /// Variable of the level.
    pub var: Var,
    /// Reduced defining polynomial, monic in `var`.
    pub defpoly: ModPoly,
    /// Monic factor and cofactor, when the defining polynomial visibly
    /// factored under this prime.
    pub split: Option<(ModPoly, ModPoly)>,
}

/// A proper monic factor of the defining polynomial of `level`, found while
/// inverting a zero divisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZeroDivisor {
    /// Index of the level in the tower.
    pub level: usize,
    /// The factor, monic in the level's variable.
    pub factor: ModPoly,
}

/// The tower reduced modulo a prime.
#[derive(Debug, Clone)]
pub struct Cellmod {
    moder: Moder,
    levels: Vec<CellmodLevel>,
}

impl Cellmod {
    /// Reduce a tower given as `(var, defpoly)` pairs with increasing
    /// variables.
    ///
    /// Returns `None` when the prime is unlucky for the tower: a denominator
    /// vanishes or a defining polynomial loses degree.
    pub fn new(moder: Moder, tower: &[(Var, Polynomial)]) -> Option<Self> {
        let mut levels = Vec::with_capacity(tower.len());
        for (var, d) in tower {
            let md = ModPoly::from_polynomial(d, &moder)?;
            if md.main_var() != Some(*var)
                || md.degree_in(*var) != d.degree(*var) as usize
                || md.lc_in(*var) != ModPoly::one()
            {
                return None;
            }
            levels.push(CellmodLevel {
                var: *var,
                defpoly: md,
                split: None,
            });
        }
        Some(Self { moder, levels })
    }

    /// The field arithmetic.
    pub fn moder(&self) -> &Moder {
        &self.moder
    }

    /// The levels, by increasing variable.
    pub fn levels(&self) -> &[CellmodLevel] {
        &self.levels
    }

    /// Index of the level of `var`.
    pub fn level_of(&self, var: Var) -> Option<usize> {
        self.levels.iter().position(|l| l.var == var)
    }

    /// Number of levels whose variable is below `var`.
    fn levels_below(&self, var: Var) -> usize {
        self.levels.iter().take_while(|l| l.var < var).count()
    }

    /// Image of a rational polynomial, fully reduced. `None` when a
    /// denominator vanishes or a variable outside the tower occurs.
    pub fn reduce_poly(&self, p: &Polynomial) -> Option<ModPoly> {
        if p.vars().iter().any(|v| self.level_of(*v).is_none()) {
            return None;
        }
        let m = ModPoly::from_polynomial(p, &self.moder)?;
        Some(self.reduce(&m))
    }

    /// Reduce modulo every level.
    pub fn reduce(&self, a: &ModPoly) -> ModPoly {
        self.reduce_with(a, self.levels.len())
    }

    /// Reduce modulo the levels with index below `limit`.
    pub fn reduce_with(&self, a: &ModPoly, limit: usize) -> ModPoly {
        let ModPoly::Rec { var, coeffs } = a else {
            return a.clone();
        };
        let coeffs = coeffs.iter().map(|c| self.reduce_with(c, limit)).collect();
        let p = ModPoly::from_coeffs(*var, coeffs);
        match self.level_of(*var) {
            Some(j) if j < limit => {
                let (_, r) = self.divrem_monic(&p, &self.levels[j].defpoly, *var, j);
                r
            }
            _ => p,
        }
    }

    fn reduce_coeffs(&self, a: &ModPoly, var: Var, limit: usize) -> ModPoly {
        match a {
            ModPoly::Rec { var: v, coeffs } if *v == var => ModPoly::from_coeffs(
                var,
                coeffs.iter().map(|c| self.reduce_with(c, limit)).collect(),
            ),
            _ => self.reduce_with(a, limit),
        }
    }

    /// Division by `d`, monic in `var`, with coefficients reduced modulo the
    /// levels below `limit`.
    pub fn divrem_monic(&self, a: &ModPoly, d: &ModPoly, var: Var, limit: usize) -> (ModPoly, ModPoly) {
        let m = &self.moder;
        let dd = d.degree_in(var);
        let mut q = ModPoly::zero();
        let mut r = self.reduce_coeffs(a, var, limit);
        while r.main_var() == Some(var) && r.degree_in(var) >= dd {
            let k = r.degree_in(var) - dd;
            let lc = r.lc_in(var);
            q = q.add(&lc.shift(var, k), m);
            r = r.sub(&lc.mul(d, m).shift(var, k), m);
            r = self.reduce_coeffs(&r, var, limit);
        }
        if dd == 0 {
            // a unit divisor: d is the constant one
            q = q.add(&r, m);
            r = ModPoly::zero();
        }
        (self.reduce_coeffs(&q, var, limit), r)
    }

    fn monic(&self, a: &ModPoly, var: Var, limit: usize) -> Result<ModPoly, ZeroDivisor> {
        let lc = a.lc_in(var);
        if lc == ModPoly::one() {
            return Ok(a.clone());
        }
        let inv = self.inverse(&lc)?;
        Ok(self.reduce_coeffs(&a.mul(&inv, &self.moder), var, limit))
    }

    /// Inverse of a reduced non-zero element.
    ///
    /// Fails with the exposed factor when the element is a zero divisor.
    /// Zero is returned for zero.
    pub fn inverse(&self, c: &ModPoly) -> Result<ModPoly, ZeroDivisor> {
        let m = &self.moder;
        let v = match c {
            ModPoly::Num(a) => {
                return Ok(m.inv(*a).map(ModPoly::Num).unwrap_or_else(ModPoly::zero));
            }
            ModPoly::Rec { var, .. } => *var,
        };
        let Some(j) = self.level_of(v) else {
            // variables outside the tower never reach the modular layer
            return Ok(ModPoly::zero());
        };
        let (mut r0, mut s0) = (self.levels[j].defpoly.clone(), ModPoly::zero());
        let (mut r1, mut s1) = (c.clone(), ModPoly::one());
        loop {
            if r1.main_var() != Some(v) {
                if r1.is_zero() {
                    return Err(ZeroDivisor {
                        level: j,
                        factor: r0,
                    });
                }
                let inv = self.inverse(&r1)?;
                return Ok(self.reduce_with(&s1.mul(&inv, m), j + 1));
            }
            let inv_lc = self.inverse(&r1.lc_in(v))?;
            r1 = self.reduce_coeffs(&r1.mul(&inv_lc, m), v, j);
            s1 = self.reduce_with(&s1.mul(&inv_lc, m), j + 1);
            let (q, r) = self.divrem_monic(&r0, &r1, v, j);
            let s = self.reduce_with(&s0.sub(&q.mul(&s1, m), m), j + 1);
            r0 = std::mem::replace(&mut r1, r);
            s0 = std::mem::replace(&mut s1, s);
        }
    }

    /// Monic gcd of `a` and `b` as polynomials in `var` over the levels
    /// below `var`.
    pub fn gcd(&self, var: Var, a: &ModPoly, b: &ModPoly) -> Result<ModPoly, ZeroDivisor> {
        let limit = self.levels_below(var);
        let mut r0 = self.reduce_coeffs(a, var, limit);
        let mut r1 = self.reduce_coeffs(b, var, limit);
        if degree(&r0, var) < degree(&r1, var) {
            std::mem::swap(&mut r0, &mut r1);
        }
        loop {
            if r1.is_zero() {
                if r0.is_zero() {
                    return Ok(r0);
                }
                return self.monic(&r0, var, limit);
            }
            if r1.main_var() != Some(var) {
                self.inverse(&r1)?;
                return Ok(ModPoly::one());
            }
            r1 = self.monic(&r1, var, limit)?;
            let (_, r) = self.divrem_monic(&r0, &r1, var, limit);
            r0 = std::mem::replace(&mut r1, r);
        }
    }

    /// Record the split exposed by `zd`, computing the cofactor.
    pub fn record_split(&mut self, zd: &ZeroDivisor) {
        let Some(level) = self.levels.get(zd.level) else {
            return;
        };
        let (cofactor, _) = self.divrem_monic(&level.defpoly, &zd.factor, level.var, zd.level);
        self.levels[zd.level].split = Some((zd.factor.clone(), cofactor));
    }
}

fn degree(a: &ModPoly, var: Var) -> usize {
    if a.main_var() == Some(var) {
        a.degree_in(var)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qecad_math::modular::primes;

    fn x(v: Var) -> Polynomial {
        Polynomial::from_var(v)
    }

    fn poly(terms: &[(i64, &[(Var, u32)])]) -> Polynomial {
        Polynomial::from_coeffs_int(terms)
    }

    fn tower_sqrt2() -> Cellmod {
        let d = poly(&[(1, &[(0, 2)]), (-2, &[])]);
        Cellmod::new(Moder::new(primes()[0]), &[(0, d)]).expect("lucky")
    }

    #[test]
    fn test_reduce_and_inverse() {
        let cm = tower_sqrt2();
        let m = *cm.moder();
        // x0^3 reduces to 2 x0
        let cube = cm.reduce_poly(&x(0).pow(3)).expect("image");
        let two_x = ModPoly::from_polynomial(&x(0).scale(&num_rational::BigRational::from_integer(2.into())), &m).expect("image");
        assert_eq!(cube, two_x);
        // x0 * x0^-1 = 1
        let a = cm.reduce_poly(&x(0)).expect("image");
        let inv = cm.inverse(&a).expect("invertible");
        assert_eq!(cm.reduce(&a.mul(&inv, &m)), ModPoly::one());
    }

    #[test]
    fn test_zero_divisor_exposes_factor() {
        // x0^2 - 1 = (x0 - 1)(x0 + 1)
        let d = poly(&[(1, &[(0, 2)]), (-1, &[])]);
        let mut cm = Cellmod::new(Moder::new(primes()[1]), &[(0, d)]).expect("lucky");
        let a = cm.reduce_poly(&poly(&[(1, &[(0, 1)]), (-1, &[])])).expect("image");
        let zd = cm.inverse(&a).expect_err("zero divisor");
        assert_eq!(zd.level, 0);
        let expected = cm.reduce_poly(&poly(&[(1, &[(0, 1)]), (-1, &[])])).expect("image");
        assert_eq!(zd.factor, expected);
        cm.record_split(&zd);
        let (f, g) = cm.levels()[0].split.clone().expect("split");
        assert_eq!(f.mul(&g, cm.moder()), cm.levels()[0].defpoly);
    }

    #[test]
    fn test_gcd_over_extension() {
        let cm = tower_sqrt2();
        // over Q(sqrt 2), x1^2 - 2 = (x1 - x0)(x1 + x0)
        let a = ModPoly::from_polynomial(&poly(&[(1, &[(1, 2)]), (-2, &[])]), cm.moder()).expect("image");
        let b = ModPoly::from_polynomial(&Polynomial::sub(&x(1), &x(0)), cm.moder()).expect("image");
        assert_eq!(cm.gcd(1, &a, &b).expect("gcd"), b);
        let c = ModPoly::from_polynomial(&poly(&[(1, &[(1, 1)]), (-1, &[])]), cm.moder()).expect("image");
        assert_eq!(cm.gcd(1, &a, &c).expect("gcd"), ModPoly::one());
    }

    #[test]
    fn test_unlucky_prime_rejected() {
        // the denominator 1/3 vanishes modulo 3
        let d = Polynomial::sub(&x(0).pow(2), &Polynomial::constant(num_rational::BigRational::new(1.into(), 3.into())));
        assert!(Cellmod::new(Moder::new(3), &[(0, d)]).is_none());
    }
}
