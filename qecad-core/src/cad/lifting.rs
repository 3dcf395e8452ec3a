//! Lifting: the stack over one cell.
//!
//! Given the sample point of a cell of `R^d` and the projection factors of
//! level `d`, lifting finds the real roots of every factor above the point,
//! merges them into one sorted list of sections, places a sector sample
//! below, between and above them, and assigns every new cell the sign of
//! every factor.
//!
//! Over a rational point a factor becomes a univariate rational polynomial
//! whose roots are isolated directly. Over an algebraic point the factor is
//! replaced by its norm (iterated resultants against the defining
//! polynomials); the norm's roots are candidates, and each one is confirmed
//! by the exact zero test at the extended point. A norm that vanishes
//! identically means the factor is nullified over some conjugate of the
//! point; zero testing its coefficients then splits a defining polynomial
//! and the norm is formed again over the smaller tower.
//!
//! Sorting roots of different factors only needs interval refinement unless
//! the factors may share a root over the cell. Then an exact test on the
//! isolators decides whether two roots coincide, in which case their
//! multiplicities are merged into one section.

use super::cell_decomposition::ChildCell;
use super::projection::{ProjFactor, ProjectionOperator};
use super::proj_link::{LinkId, Sign};
use super::sample::{AlgebraicCoord, Coordinate, SamplePoint};
use super::zero_test::ZeroTester;
use crate::backend::CasBackend;
use crate::error::{CadError, Result};
use qecad_math::interval::simplest_between;
use qecad_math::polynomial::root_isolation::{isolate_square_free, sign_at};
use qecad_math::{MathError, Polynomial, Var};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, trace};

/// Configuration for lifting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiftingConfig {
    /// Bisections spent separating two overlapping roots before testing
    /// whether they coincide.
    pub refine_budget: u32,
    /// Bisections after which separating two roots is given up.
    pub max_refinements: u32,
}

impl Default for LiftingConfig {
    fn default() -> Self {
        Self {
            refine_budget: 16,
            max_refinements: 4096,
        }
    }
}

/// Statistics for lifting.
#[derive(Debug, Clone, Default)]
pub struct LiftingStats {
    /// Stacks built.
    pub stacks: u64,
    /// Stacks over a point with an irrational coordinate.
    pub algebraic_stacks: u64,
    /// Roots found.
    pub roots: u64,
    /// Norm roots rejected by the zero test.
    pub rejected_candidates: u64,
    /// Roots shared by two factors and merged.
    pub merged_roots: u64,
    /// Interval bisections.
    pub refinements: u64,
    /// Exact coincidence tests between roots.
    pub exact_comparisons: u64,
    /// Factors whose sign was read off the projection without roots.
    pub shortcut_signs: u64,
    /// Factors vanishing identically over the cell.
    pub nullified: u64,
    /// Vanishing norms resolved by splitting a defining polynomial.
    pub tower_splits: u64,
}

/// What to lift.
#[derive(Debug, Clone, Copy)]
pub struct LiftInput<'a> {
    /// Sample point of the cell.
    pub point: &'a SamplePoint,
    /// Projection factors of the next level.
    pub factors: &'a [ProjFactor],
    /// Projection operator the factors came from.
    pub operator: ProjectionOperator,
    /// Dimension of the cell.
    pub dimension: usize,
}

/// Result of lifting one cell.
#[derive(Debug, Clone)]
pub struct LiftedStack {
    /// Children from left to right, sectors at even positions.
    pub children: Vec<ChildCell>,
    /// Coordinates of the sample point refined or replaced on the way.
    pub refined: Vec<(usize, Coordinate)>,
}

/// Lifting engine.
#[derive(Debug, Default)]
pub struct LiftingEngine {
    config: LiftingConfig,
    stats: LiftingStats,
}

impl LiftingEngine {
    /// Create a new engine.
    pub fn new(config: LiftingConfig) -> Self {
        Self {
            config,
            stats: LiftingStats::default(),
        }
    }

    /// Create with default configuration.
    pub fn default_config() -> Self {
        Self::new(LiftingConfig::default())
    }

    /// The configuration.
    pub fn config(&self) -> &LiftingConfig {
        &self.config
    }

    /// Get statistics.
    pub fn stats(&self) -> &LiftingStats {
        &self.stats
    }

    /// Reset statistics.
    pub fn reset_stats(&mut self) {
        self.stats = LiftingStats::default();
    }

    /// Build the stack over `input.point`.
    ///
    /// `link_sign` evaluates projection links over the cell; `None` means the
    /// sign is not known and is then computed at the sample point.
    pub fn lift<B, F>(
        &mut self,
        input: LiftInput<'_>,
        link_sign: &mut F,
        zero: &mut ZeroTester,
        cas: &mut B,
    ) -> Result<LiftedStack>
    where
        B: CasBackend,
        F: FnMut(LinkId) -> Option<Sign>,
    {
        self.stats.stacks += 1;
        if !input.point.is_rational() {
            self.stats.algebraic_stacks += 1;
        }
        let mut stack = Stack {
            config: &self.config,
            stats: &mut self.stats,
            operator: input.operator,
            dimension: input.dimension,
            var: input.point.len() as Var,
            point: SamplePoint::new(input.point.coords().to_vec()),
            link_sign,
            zero,
            cas,
        };

        let n = input.factors.len();
        let mut shapes = Vec::with_capacity(n);
        let mut sections: Vec<Section> = Vec::new();
        for (i, f) in input.factors.iter().enumerate() {
            let shape = stack.shape(f)?;
            if let Shape::Roots { degree, .. } = shape {
                for root in stack.roots(i, f, degree)? {
                    stack.stats.roots += 1;
                    stack.insert(&mut sections, root, n, input.factors)?;
                }
            }
            shapes.push(shape);
        }

        let children = stack.assemble(sections, &shapes)?;
        debug!(
            level = stack.var,
            factors = n,
            children = children.len(),
            "stack lifted"
        );
        Ok(LiftedStack {
            children,
            refined: stack.point.changes(),
        })
    }
}

/// Behaviour of one factor above the cell.
#[derive(Debug, Clone, Copy)]
enum Shape {
    /// Constant sign over the whole cylinder.
    Constant(Sign),
    /// Has roots to isolate; `lc` is the sign of the leading coefficient of
    /// degree `degree`.
    Roots { degree: u32, lc: Sign },
}

#[derive(Debug, Clone)]
struct Root {
    coord: Coordinate,
    factor: usize,
    multiplicity: u32,
}

#[derive(Debug, Clone)]
struct Section {
    coord: Coordinate,
    multiplicity: Vec<u32>,
    factors: Vec<usize>,
}

struct Stack<'a, B, F> {
    config: &'a LiftingConfig,
    stats: &'a mut LiftingStats,
    operator: ProjectionOperator,
    dimension: usize,
    var: Var,
    point: SamplePoint,
    link_sign: &'a mut F,
    zero: &'a mut ZeroTester,
    cas: &'a mut B,
}

impl<B, F> Stack<'_, B, F>
where
    B: CasBackend,
    F: FnMut(LinkId) -> Option<Sign>,
{
    fn oracle(&mut self, p: &Polynomial) -> Result<Sign> {
        self.zero.sign_at_point(p, &mut self.point, &mut *self.cas)
    }

    /// Effective degree and leading sign of `f` over the cell.
    fn shape(&mut self, f: &ProjFactor) -> Result<Shape> {
        let v = self.var;
        let mut next = f.degree() as i64;
        let mut leading = None;
        for &(k, link) in &f.coeff_links {
            next = k as i64 - 1;
            let Some(id) = link else {
                continue;
            };
            let s = match (self.link_sign)(id) {
                Some(s) => s,
                None => self.oracle(&f.poly.coeff(v, k))?,
            };
            if !s.is_zero() {
                leading = Some((k, s));
                break;
            }
        }
        if leading.is_none() {
            // every scanned coefficient vanishes; look below the scan
            for k in (0..=next).rev() {
                let c = f.poly.coeff(v, k as u32);
                if c.is_zero() {
                    continue;
                }
                let s = self.oracle(&c)?;
                if !s.is_zero() {
                    leading = Some((k as u32, s));
                    break;
                }
            }
        }
        let Some((degree, lc)) = leading else {
            self.stats.nullified += 1;
            if self.operator == ProjectionOperator::McCallum && self.dimension > 0 {
                return Err(CadError::NotWellOriented {
                    level: f.level,
                    factor: f.poly.to_string(),
                });
            }
            return Ok(Shape::Constant(Sign::Zero));
        };
        if degree == 0 {
            return Ok(Shape::Constant(lc));
        }
        if let Some(s) = self.operator.eval_sign(f, degree, lc, &mut *self.link_sign) {
            self.stats.shortcut_signs += 1;
            return Ok(Shape::Constant(s));
        }
        Ok(Shape::Roots { degree, lc })
    }

    /// Roots of factor `i` above the point.
    fn roots(&mut self, i: usize, f: &ProjFactor, degree: u32) -> Result<Vec<Root>> {
        let v = self.var;
        let coeffs = f.poly.coefficients(v);
        let truncated = Polynomial::from_coefficients(v, &coeffs[..=degree as usize]);
        let mut out = Vec::new();

        let (g, norm) = loop {
            let g = self.point.substitute_known(&truncated);
            if g.vars().iter().all(|u| *u == v) {
                let fac = self.cas.factor(&g)?;
                for (h, m) in &fac.factors {
                    for coord in self.isolate(h)? {
                        out.push(Root {
                            coord,
                            factor: i,
                            multiplicity: *m,
                        });
                    }
                }
                return Ok(out);
            }
            let norm = self.norm(&g)?;
            if !norm.is_zero() && norm.vars().iter().all(|u| *u == v) {
                break (g, norm);
            }
            if !self.split_tower(&g)? {
                return Err(CadError::Inconclusive(format!(
                    "norm of {} vanishes over the sample point",
                    f.poly
                )));
            }
        };
        let fac = self.cas.factor(&norm)?;
        for (h, _) in &fac.factors {
            for candidate in self.isolate(h)? {
                self.point.push(candidate);
                if !self.zero.vanishes_at(&g, &mut self.point, &mut *self.cas)? {
                    self.point.pop();
                    self.stats.rejected_candidates += 1;
                    continue;
                }
                let mut multiplicity = 1;
                if self.operator.has_multiple_root(f, degree, &mut *self.link_sign) {
                    let mut deriv = g.derivative(v);
                    while multiplicity < degree
                        && self.zero.vanishes_at(&deriv, &mut self.point, &mut *self.cas)?
                    {
                        multiplicity += 1;
                        deriv = deriv.derivative(v);
                    }
                }
                let Some(coord) = self.point.pop() else {
                    continue;
                };
                out.push(Root {
                    coord,
                    factor: i,
                    multiplicity,
                });
            }
        }
        Ok(out)
    }

    /// Product of `g` over all conjugates of the point, as a polynomial in
    /// the lifting variable.
    fn norm(&mut self, g: &Polynomial) -> Result<Polynomial> {
        let mut norm = g.clone();
        for u in (0..self.var).rev() {
            if !norm.contains_var(u) {
                continue;
            }
            let Some(Coordinate::Algebraic(a)) = self.point.coord(u) else {
                continue;
            };
            let d = self.point.substitute_known(&a.defpoly);
            norm = self.cas.resultant(&norm, &d, u)?;
        }
        Ok(norm)
    }

    /// `g` vanishes identically over a conjugate of the point but not over
    /// the point itself, so some coefficient shares a factor with a defining
    /// polynomial. Zero testing the coefficients replaces that defining
    /// polynomial by the factor holding the point. Returns whether a
    /// replacement happened.
    fn split_tower(&mut self, g: &Polynomial) -> Result<bool> {
        let before = self.zero.stats().replacements;
        for c in g.coefficients(self.var).iter().rev() {
            if c.is_zero() || c.is_number() {
                continue;
            }
            self.zero.vanishes_at(c, &mut self.point, &mut *self.cas)?;
            if self.zero.stats().replacements > before {
                self.stats.tower_splits += 1;
                trace!(level = self.var, "tower split by a vanishing norm");
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Real roots of a square-free univariate polynomial in the lifting
    /// variable.
    fn isolate(&mut self, h: &Polynomial) -> Result<Vec<Coordinate>> {
        let v = self.var;
        let coeffs = h
            .univariate_coeffs(v)
            .ok_or_else(|| MathError::InvalidArgument(format!("{} is not univariate", h)))?;
        if coeffs.len() == 2 {
            return Ok(vec![Coordinate::Rational(-&coeffs[0] / &coeffs[1])]);
        }
        let defpoly = h.make_monic();
        Ok(isolate_square_free(&coeffs)
            .into_iter()
            .map(|(lo, hi)| {
                if lo == hi {
                    Coordinate::Rational(lo)
                } else {
                    Coordinate::Algebraic(AlgebraicCoord::new(defpoly.clone(), coeffs.clone(), lo, hi))
                }
            })
            .collect())
    }

    /// Insert a root into the sorted sections, merging with an equal one.
    fn insert(&mut self, sections: &mut Vec<Section>, mut root: Root, n: usize, factors: &[ProjFactor]) -> Result<()> {
        let mut pos = sections.len();
        for (idx, s) in sections.iter_mut().enumerate() {
            let may_equal = !s.factors.contains(&root.factor)
                && s.factors.iter().any(|&j| {
                    let (hi, lo) = if root.factor > j { (root.factor, j) } else { (j, root.factor) };
                    self.operator.has_common_root(&factors[hi], lo, &mut *self.link_sign)
                });
            match self.compare(&mut root.coord, &mut s.coord, may_equal)? {
                Ordering::Less => {
                    pos = idx;
                    break;
                }
                Ordering::Equal if s.factors.contains(&root.factor) => return Ok(()),
                Ordering::Equal => {
                    trace!(factor = root.factor, "common root merged");
                    self.stats.merged_roots += 1;
                    s.multiplicity[root.factor] += root.multiplicity;
                    s.factors.push(root.factor);
                    if !s.coord.is_rational() && root.coord.is_rational() {
                        s.coord = root.coord;
                    }
                    return Ok(());
                }
                Ordering::Greater => {}
            }
        }
        let mut multiplicity = vec![0; n];
        multiplicity[root.factor] = root.multiplicity;
        sections.insert(
            pos,
            Section {
                coord: root.coord,
                multiplicity,
                factors: vec![root.factor],
            },
        );
        Ok(())
    }

    fn compare(&mut self, a: &mut Coordinate, b: &mut Coordinate, may_equal: bool) -> Result<Ordering> {
        match (a, b) {
            (Coordinate::Rational(x), Coordinate::Rational(y)) => Ok(Ord::cmp(&*x, &*y)),
            (Coordinate::Rational(x), Coordinate::Algebraic(b)) => Ok(self.compare_rational(x, b)),
            (Coordinate::Algebraic(a), Coordinate::Rational(y)) => Ok(self.compare_rational(y, a).reverse()),
            (Coordinate::Algebraic(a), Coordinate::Algebraic(b)) => self.compare_algebraic(a, b, may_equal),
        }
    }

    /// Compare a rational with an algebraic number.
    fn compare_rational(&mut self, r: &BigRational, b: &mut AlgebraicCoord) -> Ordering {
        loop {
            if *r <= b.lo {
                return Ordering::Less;
            }
            if *r >= b.hi {
                return Ordering::Greater;
            }
            if b.is_root(r) {
                return Ordering::Equal;
            }
            b.refine();
            self.stats.refinements += 1;
        }
    }

    fn compare_algebraic(&mut self, a: &mut AlgebraicCoord, b: &mut AlgebraicCoord, may_equal: bool) -> Result<Ordering> {
        let mut steps = 0;
        loop {
            if a.hi <= b.lo {
                return Ok(Ordering::Less);
            }
            if b.hi <= a.lo {
                return Ok(Ordering::Greater);
            }
            if a.isolator == b.isolator {
                // each interval holds one simple root of the isolator, so the
                // overlap holds a root exactly when both are that root
                let lo = if a.lo > b.lo { &a.lo } else { &b.lo };
                let hi = if a.hi < b.hi { &a.hi } else { &b.hi };
                if sign_at(&a.isolator, lo) != sign_at(&a.isolator, hi) {
                    return Ok(Ordering::Equal);
                }
            }
            if may_equal && steps == self.config.refine_budget {
                self.stats.exact_comparisons += 1;
                if self.same_root(a, b)? {
                    return Ok(Ordering::Equal);
                }
            }
            if steps >= self.config.max_refinements {
                return Err(CadError::Inconclusive(format!(
                    "roots not separated after {} bisections",
                    steps
                )));
            }
            if &a.hi - &a.lo >= &b.hi - &b.lo {
                a.refine();
            } else {
                b.refine();
            }
            steps += 1;
            self.stats.refinements += 1;
        }
    }

    /// Whether two algebraic numbers coincide: both must be roots of the gcd
    /// of their isolators and lie in the same isolating interval of it.
    fn same_root(&mut self, a: &mut AlgebraicCoord, b: &mut AlgebraicCoord) -> Result<bool> {
        let pa = Polynomial::univariate(0, &a.isolator);
        let pb = Polynomial::univariate(0, &b.isolator);
        let g = self.cas.gcd(&pa, &pb)?;
        if g.is_number() {
            return Ok(false);
        }
        let gc = g
            .univariate_coeffs(0)
            .ok_or_else(|| MathError::InvalidArgument(format!("{} is not univariate", g)))?;
        let intervals = isolate_square_free(&gc);
        let Some(ja) = self.locate(a, &gc, &intervals)? else {
            return Ok(false);
        };
        let Some(jb) = self.locate(b, &gc, &intervals)? else {
            return Ok(false);
        };
        Ok(ja == jb)
    }

    /// Index of the root of `g` equal to `a`, if any.
    fn locate(
        &mut self,
        a: &mut AlgebraicCoord,
        g: &[BigRational],
        intervals: &[(BigRational, BigRational)],
    ) -> Result<Option<usize>> {
        if sign_at(g, &a.lo) == sign_at(g, &a.hi) {
            return Ok(None);
        }
        for _ in 0..self.config.max_refinements {
            if let Some(j) = intervals.iter().position(|(lo, hi)| *lo <= a.lo && a.hi <= *hi) {
                return Ok(Some(j));
            }
            a.refine();
            self.stats.refinements += 1;
        }
        Err(CadError::Inconclusive("root not located among gcd roots".to_string()))
    }

    /// A rational strictly between two distinct adjacent sections.
    fn between(&mut self, left: &mut Coordinate, right: &mut Coordinate) -> Result<BigRational> {
        for _ in 0..self.config.max_refinements {
            if left.upper() < right.lower() {
                return Ok(simplest_between(left.upper(), right.lower()));
            }
            if !left.is_rational() && !right.is_rational() && left.upper() == right.lower() {
                return Ok(left.upper().clone());
            }
            left.refine();
            right.refine();
            self.stats.refinements += 1;
        }
        Err(CadError::Inconclusive("adjacent sections not separated".to_string()))
    }

    /// Interleave sectors and compute signatures.
    fn assemble(&mut self, mut sections: Vec<Section>, shapes: &[Shape]) -> Result<Vec<ChildCell>> {
        let n = shapes.len();
        let m = sections.len();
        let one = BigRational::one();
        let mut samples = Vec::with_capacity(m + 1);
        if m == 0 {
            samples.push(BigRational::zero());
        } else {
            samples.push(sections[0].coord.lower().floor() - &one);
            for i in 0..m - 1 {
                let (l, r) = sections.split_at_mut(i + 1);
                samples.push(self.between(&mut l[i].coord, &mut r[0].coord)?);
            }
            samples.push(sections[m - 1].coord.upper().ceil() + &one);
        }

        let mut cells: Vec<ChildCell> = Vec::with_capacity(2 * m + 1);
        let mut samples = samples.into_iter();
        let mut sections = sections.into_iter();
        for k in 0..2 * m + 1 {
            let child = if k % 2 == 0 {
                ChildCell {
                    coord: Coordinate::Rational(samples.next().unwrap_or_else(|| BigRational::from_integer(BigInt::zero()))),
                    signature: vec![None; n],
                    multiplicity: vec![0; n],
                }
            } else {
                let Some(s) = sections.next() else {
                    break;
                };
                ChildCell {
                    coord: s.coord,
                    signature: vec![None; n],
                    multiplicity: s.multiplicity,
                }
            };
            cells.push(child);
        }

        for (i, shape) in shapes.iter().enumerate() {
            match *shape {
                Shape::Constant(s) => {
                    for c in &mut cells {
                        c.signature[i] = Some(s);
                    }
                }
                Shape::Roots { lc, .. } => {
                    let mut cur = lc;
                    for (k, c) in cells.iter_mut().enumerate().rev() {
                        let mult = if k % 2 == 1 { c.multiplicity[i] } else { 0 };
                        if mult > 0 {
                            c.signature[i] = Some(Sign::Zero);
                            if mult % 2 == 1 {
                                cur = cur.negate();
                            }
                        } else {
                            c.signature[i] = Some(cur);
                        }
                    }
                }
            }
        }
        Ok(cells)
    }
}
