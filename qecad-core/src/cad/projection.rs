//! Projection factor sets.
//!
//! Projection runs from the highest level down to level 0. At each level the
//! pending polynomials are refined into a coprime basis of projection
//! factors, and every derived polynomial the lifting phase will need the
//! sign of (coefficients, discriminants, resultants, principal subresultant
//! coefficients) is requested from the CAS. Its irreducible parts become
//! pending polynomials of lower levels, and once all levels are known the
//! request is recorded as a [`ProjLink`] over the lower factors.
//!
//! Two operators are provided:
//!
//! - **McCallum**: leading coefficients up to the first one that is
//!   provably non-zero, discriminants and pairwise resultants.
//! - **Hong**: coefficients reduced modulo a Gröbner basis of the higher
//!   ones, and principal subresultant coefficients of every reductum with
//!   its derivative and against the reducta of lower-indexed factors. It
//!   stays valid where McCallum's well-orientedness fails.
//!
//! ## References
//!
//! - McCallum, "An improved projection operation for cylindrical algebraic
//!   decomposition" (1988)
//! - Hong, "An improvement of the projection operator in cylindrical
//!   algebraic decomposition" (1990)
//! - Brown, "Improved projection for cylindrical algebraic decomposition"
//!   (2001)

use super::proj_link::{FactorRef, LinkId, LinkTable, ProjLink, Sign};
use crate::backend::CasBackend;
use crate::error::{CadError, Result};
use crate::formula::VariableTable;
use qecad_math::polynomial::factorization::{coprime_basis, express_over_basis};
use qecad_math::grobner::is_unit_ideal;
use qecad_math::{Polynomial, Var};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use tracing::{debug, trace};

/// Choice of projection operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectionOperator {
    /// McCallum's operator. Cheaper, requires a well-oriented input.
    #[default]
    McCallum,
    /// Hong's operator.
    Hong,
}

impl ProjectionOperator {
    /// Sign of the factor over a whole cell without isolating roots, when
    /// the factor provably has no real root there.
    ///
    /// Applies to factors whose effective degree equals their formal degree
    /// of two: a negative discriminant leaves the factor with the sign of its
    /// leading coefficient.
    pub fn eval_sign(
        self,
        factor: &ProjFactor,
        effective_degree: u32,
        lc_sign: Sign,
        link_sign: &mut impl FnMut(LinkId) -> Option<Sign>,
    ) -> Option<Sign> {
        if effective_degree != 2 || factor.degree() != 2 || lc_sign.is_zero() {
            return None;
        }
        let no_real_root = match self {
            ProjectionOperator::McCallum => {
                let d = factor.discrim?;
                link_sign(d)? == Sign::Negative
            }
            ProjectionOperator::Hong => {
                // res(f, f') = -lc(f) disc(f) for quadratics
                let r = *factor.psc_self.first()?;
                link_sign(r)? == lc_sign
            }
        };
        no_real_root.then_some(lc_sign)
    }

    /// Whether the factor may have a multiple root over the cell.
    pub fn has_multiple_root(
        self,
        factor: &ProjFactor,
        effective_degree: u32,
        link_sign: &mut impl FnMut(LinkId) -> Option<Sign>,
    ) -> bool {
        if effective_degree < 2 {
            return false;
        }
        if effective_degree != factor.degree() {
            return true;
        }
        let link = match self {
            ProjectionOperator::McCallum => factor.discrim,
            ProjectionOperator::Hong => factor.psc_self.first().copied(),
        };
        !link.and_then(&mut *link_sign).is_some_and(|s| !s.is_zero())
    }

    /// Whether the factor and the lower-indexed factor `other` may share a
    /// root over the cell.
    pub fn has_common_root(
        self,
        factor: &ProjFactor,
        other: usize,
        link_sign: &mut impl FnMut(LinkId) -> Option<Sign>,
    ) -> bool {
        let link = factor
            .pairs
            .iter()
            .find(|(j, _)| *j == other)
            .and_then(|(_, links)| links.first().copied());
        !link.and_then(&mut *link_sign).is_some_and(|s| !s.is_zero())
    }
}

impl fmt::Display for ProjectionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionOperator::McCallum => write!(f, "McCallum"),
            ProjectionOperator::Hong => write!(f, "Hong"),
        }
    }
}

/// Where a projection factor came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactorOrigin {
    /// Divides a polynomial of the input formula.
    Input,
    /// Introduced by projection only.
    Projection,
}

/// A projection factor and the links that decide its behaviour over the
/// cells of the level below.
#[derive(Debug, Clone)]
pub struct ProjFactor {
    /// The factor: canonical, with main variable `level`.
    pub poly: Polynomial,
    /// Level of the factor.
    pub level: usize,
    /// Input or projection factor.
    pub origin: FactorOrigin,
    /// `(degree, link)` for the coefficients scanned from the leading one
    /// down. A `None` link marks a coefficient that vanishes whenever all
    /// higher ones do.
    pub coeff_links: Vec<(u32, Option<LinkId>)>,
    /// Discriminant (McCallum).
    pub discrim: Option<LinkId>,
    /// `psc_j(f, f')` for `j = 0, 1, ...` (Hong).
    pub psc_self: Vec<LinkId>,
    /// Links against lower-indexed factors of the same level: the resultant
    /// (McCallum) or `psc_0, psc_1, ...` (Hong).
    pub pairs: Vec<(usize, Vec<LinkId>)>,
}

impl ProjFactor {
    /// Variable of the factor.
    pub fn var(&self) -> Var {
        self.level as Var
    }

    /// Formal degree in the main variable.
    pub fn degree(&self) -> u32 {
        self.poly.degree(self.var())
    }

    fn links_mut(&mut self) -> impl Iterator<Item = &mut LinkId> {
        self.coeff_links
            .iter_mut()
            .filter_map(|(_, l)| l.as_mut())
            .chain(self.discrim.iter_mut())
            .chain(self.psc_self.iter_mut())
            .chain(self.pairs.iter_mut().flat_map(|(_, ls)| ls.iter_mut()))
    }
}

/// The projection factors of one level.
#[derive(Debug, Clone, Default)]
pub struct ProjFactorSet {
    /// Level of the set.
    pub level: usize,
    /// Factors in index order.
    pub factors: Vec<ProjFactor>,
}

impl ProjFactorSet {
    /// Number of factors.
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Whether the level has no factor.
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Render with variable names.
    pub fn fmt_with(&self, table: &VariableTable) -> String {
        let mut out = format!("level {}:", self.level);
        for (i, f) in self.factors.iter().enumerate() {
            let tag = match f.origin {
                FactorOrigin::Input => "i",
                FactorOrigin::Projection => "p",
            };
            out.push_str(&format!("\n  P[{},{}]{} = {}", self.level, i, tag, table.fmt_poly(&f.poly)));
        }
        out
    }
}

impl fmt::Display for ProjFactorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level {}:", self.level)?;
        for (i, pf) in self.factors.iter().enumerate() {
            write!(f, "\n  P[{},{}] = {}", self.level, i, pf.poly)?;
        }
        Ok(())
    }
}

/// The projection of a formula.
#[derive(Debug, Clone)]
pub struct Projection {
    /// Operator used.
    pub operator: ProjectionOperator,
    /// Factor sets, indexed by level.
    pub levels: Vec<ProjFactorSet>,
    /// Links referenced by the factors and the formula atoms.
    pub links: LinkTable,
}

impl Projection {
    /// An empty projection of `n` levels.
    pub fn empty(operator: ProjectionOperator, n: usize) -> Self {
        Self {
            operator,
            levels: (0..n)
                .map(|level| ProjFactorSet {
                    level,
                    factors: Vec::new(),
                })
                .collect(),
            links: LinkTable::new(),
        }
    }

    /// The factor at `r`.
    pub fn factor(&self, r: FactorRef) -> Option<&ProjFactor> {
        self.levels.get(r.level)?.factors.get(r.index)
    }

    /// Total number of factors.
    pub fn num_factors(&self) -> usize {
        self.levels.iter().map(ProjFactorSet::len).sum()
    }

    /// The link at `id`.
    pub fn link(&self, id: LinkId) -> &ProjLink {
        self.links.get(id)
    }

    /// Render every level with variable names, highest level first.
    pub fn fmt_with(&self, table: &VariableTable) -> String {
        let mut out = format!("{} projection", self.operator);
        for set in self.levels.iter().rev() {
            out.push('\n');
            out.push_str(&set.fmt_with(table));
        }
        out
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} projection", self.operator)?;
        for set in self.levels.iter().rev() {
            write!(f, "\n{}", set)?;
        }
        Ok(())
    }
}

/// Configuration for projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Operator to apply.
    pub operator: ProjectionOperator,
    /// Stop the coefficient scan at the first coefficient that is provably
    /// non-zero.
    pub truncate_coefficients: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            operator: ProjectionOperator::McCallum,
            truncate_coefficients: true,
        }
    }
}

/// Statistics for projection.
#[derive(Debug, Clone, Default)]
pub struct ProjectionStats {
    /// Projections computed.
    pub projections: u64,
    /// Projection factors created.
    pub factors: u64,
    /// Derived polynomials requested.
    pub requests: u64,
    /// Coefficient scans cut short.
    pub truncated_scans: u64,
    /// Gröbner reductions of coefficients (Hong).
    pub coefficient_reductions: u64,
}

/// A derived polynomial, factored, awaiting its link.
struct LinkRequest {
    sign: Sign,
    factors: Vec<(Polynomial, u32)>,
}

/// Projection engine.
#[derive(Debug, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
    stats: ProjectionStats,
}

impl ProjectionEngine {
    /// Create a new engine.
    pub fn new(config: ProjectionConfig) -> Self {
        Self {
            config,
            stats: ProjectionStats::default(),
        }
    }

    /// Create with default configuration.
    pub fn default_config() -> Self {
        Self::new(ProjectionConfig::default())
    }

    /// The configuration.
    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Change the operator for later projections.
    pub fn set_operator(&mut self, operator: ProjectionOperator) {
        self.config.operator = operator;
    }

    /// Get statistics.
    pub fn stats(&self) -> &ProjectionStats {
        &self.stats
    }

    /// Reset statistics.
    pub fn reset_stats(&mut self) {
        self.stats = ProjectionStats::default();
    }

    /// Project the atoms of a formula over `n` levels.
    ///
    /// Returns the projection and, for each atom, the link deciding its
    /// sign.
    pub fn project<B: CasBackend>(
        &mut self,
        atoms: &[Polynomial],
        n: usize,
        cas: &mut B,
    ) -> Result<(Projection, Vec<LinkId>)> {
        self.stats.projections += 1;
        let mut run = Run {
            operator: self.config.operator,
            truncate: self.config.truncate_coefficients,
            n,
            pending: vec![Vec::new(); n],
            inputs: vec![Vec::new(); n],
            requests: Vec::new(),
            stats: &mut self.stats,
        };

        let atom_requests = atoms
            .iter()
            .map(|a| run.request(a, false, cas))
            .collect::<Result<Vec<_>>>()?;
        for level in 0..n {
            run.inputs[level] = run.pending[level].clone();
        }

        let mut levels: Vec<ProjFactorSet> = Vec::with_capacity(n);
        for level in (0..n).rev() {
            let set = run.project_level(level, cas)?;
            debug!(level, factors = set.len(), "projection level complete");
            levels.push(set);
        }
        levels.reverse();

        let mut projection = Projection {
            operator: self.config.operator,
            levels,
            links: LinkTable::new(),
        };
        let resolved = run
            .requests
            .iter()
            .map(|r| resolve(r, &projection.levels, &mut projection.links))
            .collect::<Result<Vec<LinkId>>>()?;
        for set in &mut projection.levels {
            for f in &mut set.factors {
                for l in f.links_mut() {
                    *l = resolved[*l];
                }
            }
        }
        let atom_links = atom_requests.into_iter().map(|r| resolved[r]).collect();
        debug!(
            operator = %projection.operator,
            factors = projection.num_factors(),
            links = projection.links.len(),
            "projection complete"
        );
        Ok((projection, atom_links))
    }
}

/// State of one projection. Link fields of the factors hold request
/// indices until [`resolve`] runs.
struct Run<'a> {
    operator: ProjectionOperator,
    truncate: bool,
    n: usize,
    pending: Vec<Vec<Polynomial>>,
    inputs: Vec<Vec<Polynomial>>,
    requests: Vec<LinkRequest>,
    stats: &'a mut ProjectionStats,
}

impl Run<'_> {
    /// Factor `p` (negated if asked), queue its factors for their levels and
    /// record a link request.
    fn request<B: CasBackend>(&mut self, p: &Polynomial, negate: bool, cas: &mut B) -> Result<usize> {
        self.stats.requests += 1;
        let request = if p.is_number() {
            LinkRequest {
                sign: Sign::of(&p.constant_value()),
                factors: Vec::new(),
            }
        } else {
            let fac = cas.factor(p)?;
            for (g, _) in &fac.factors {
                let level = g.max_var() as usize;
                if level >= self.n {
                    return Err(CadError::UnknownVariable(g.max_var()));
                }
                if !self.pending[level].contains(g) {
                    self.pending[level].push(g.clone());
                }
            }
            LinkRequest {
                sign: Sign::of(&fac.constant),
                factors: fac.factors,
            }
        };
        let sign = if negate { request.sign.negate() } else { request.sign };
        self.requests.push(LinkRequest { sign, ..request });
        Ok(self.requests.len() - 1)
    }

    fn constant(&mut self, s: Sign) -> usize {
        self.requests.push(LinkRequest {
            sign: s,
            factors: Vec::new(),
        });
        self.requests.len() - 1
    }

    fn project_level<B: CasBackend>(&mut self, level: usize, cas: &mut B) -> Result<ProjFactorSet> {
        let polys = std::mem::take(&mut self.pending[level]);
        let basis = coprime_basis(&polys)?;
        let mut factors: Vec<ProjFactor> = Vec::with_capacity(basis.len());
        for poly in basis {
            let origin = if self.inputs[level].iter().any(|p| p.div_exact(&poly).is_some()) {
                FactorOrigin::Input
            } else {
                FactorOrigin::Projection
            };
            let mut factor = ProjFactor {
                poly,
                level,
                origin,
                coeff_links: Vec::new(),
                discrim: None,
                psc_self: Vec::new(),
                pairs: Vec::new(),
            };
            match self.operator {
                ProjectionOperator::McCallum => self.mccallum(&mut factor, &factors, cas)?,
                ProjectionOperator::Hong => self.hong(&mut factor, &factors, cas)?,
            }
            trace!(level, index = factors.len(), poly = %factor.poly, "projection factor");
            self.stats.factors += 1;
            factors.push(factor);
        }
        Ok(ProjFactorSet { level, factors })
    }

    fn mccallum<B: CasBackend>(&mut self, f: &mut ProjFactor, lower: &[ProjFactor], cas: &mut B) -> Result<()> {
        let v = f.var();
        let coeffs = f.poly.coefficients(v);
        for k in (0..coeffs.len()).rev() {
            let c = &coeffs[k];
            if c.is_zero() {
                let id = self.constant(Sign::Zero);
                f.coeff_links.push((k as u32, Some(id)));
                continue;
            }
            let id = self.request(c, false, cas)?;
            f.coeff_links.push((k as u32, Some(id)));
            if self.truncate && c.is_definitely_nonzero() {
                if k > 0 {
                    self.stats.truncated_scans += 1;
                }
                break;
            }
        }
        if f.degree() >= 2 {
            let d = cas.discrim(&f.poly, v)?;
            f.discrim = Some(self.request(&d, false, cas)?);
        }
        for (j, q) in lower.iter().enumerate() {
            let r = cas.resultant(&f.poly, &q.poly, v)?;
            let id = self.request(&r, false, cas)?;
            f.pairs.push((j, vec![id]));
        }
        Ok(())
    }

    fn hong<B: CasBackend>(&mut self, f: &mut ProjFactor, lower: &[ProjFactor], cas: &mut B) -> Result<()> {
        let v = f.var();
        let coeffs = f.poly.coefficients(v);
        let vars: Vec<Var> = (0..f.level as Var).rev().collect();
        let mut seen: Vec<Polynomial> = Vec::new();
        for k in (0..coeffs.len()).rev() {
            let c = &coeffs[k];
            if c.is_zero() {
                let id = self.constant(Sign::Zero);
                f.coeff_links.push((k as u32, Some(id)));
                continue;
            }
            let (nf, negated) = if seen.is_empty() {
                (c.clone(), false)
            } else {
                let basis = cas.gb(&seen, &vars, 0)?;
                if is_unit_ideal(&basis) {
                    // the higher coefficients never vanish together
                    self.stats.truncated_scans += 1;
                    break;
                }
                self.stats.coefficient_reductions += 1;
                cas.reduce(c, &basis, &vars, 0)?
            };
            if nf.is_zero() {
                f.coeff_links.push((k as u32, None));
            } else {
                let id = self.request(&nf, negated, cas)?;
                f.coeff_links.push((k as u32, Some(id)));
            }
            seen.push(c.clone());
            if self.truncate && nf.is_definitely_nonzero() {
                if k > 0 {
                    self.stats.truncated_scans += 1;
                }
                break;
            }
        }

        let reducta = scan_reducta(&f.poly, v, f.coeff_links.len());
        for (r, red) in reducta.iter().enumerate() {
            let d = red.degree(v);
            if d < 2 {
                continue;
            }
            let deriv = red.derivative(v);
            for j in 0..d - 1 {
                let p = cas.psc(red, &deriv, v, j)?;
                let id = self.request(&p, false, cas)?;
                if r == 0 {
                    f.psc_self.push(id);
                }
            }
        }
        for (qi, q) in lower.iter().enumerate() {
            let q_reducta = scan_reducta(&q.poly, v, q.coeff_links.len());
            let mut links = Vec::new();
            for (r, red) in q_reducta.iter().enumerate() {
                let m = f.degree().min(red.degree(v));
                for j in 0..m {
                    let p = cas.psc(&f.poly, red, v, j)?;
                    let id = self.request(&p, false, cas)?;
                    if r == 0 {
                        links.push(id);
                    }
                }
            }
            f.pairs.push((qi, links));
        }
        Ok(())
    }
}

/// The reducta of `p` in `v` reached by a coefficient scan of `scanned`
/// coefficients, starting with `p` itself.
fn scan_reducta(p: &Polynomial, v: Var, scanned: usize) -> Vec<Polynomial> {
    let mut out = Vec::new();
    let mut red = p.clone();
    for _ in 0..scanned.max(1) {
        if red.is_zero() || red.degree(v) == 0 {
            break;
        }
        let next = red.reductum(v);
        out.push(red);
        red = next;
    }
    out
}

/// Express a request over the factor sets and intern it.
fn resolve(request: &LinkRequest, levels: &[ProjFactorSet], links: &mut LinkTable) -> Result<LinkId> {
    if request.sign.is_zero() {
        return Ok(LinkTable::constant(Sign::Zero));
    }
    let mut sign = request.sign;
    let mut factors: SmallVec<[(FactorRef, u32); 4]> = SmallVec::new();
    for (g, m) in &request.factors {
        let level = g.max_var() as usize;
        let basis: Vec<Polynomial> = levels[level].factors.iter().map(|f| f.poly.clone()).collect();
        let (c, mults) = express_over_basis(g, &basis)?;
        sign = sign.mul(Sign::of(&c).pow(*m));
        for (index, k) in mults {
            factors.push((FactorRef { level, index }, k * m));
        }
    }
    merge_duplicates(&mut factors);
    Ok(links.intern(ProjLink { sign, factors }))
}

fn merge_duplicates(factors: &mut SmallVec<[(FactorRef, u32); 4]>) {
    factors.sort_unstable_by_key(|(r, _)| *r);
    let mut merged: SmallVec<[(FactorRef, u32); 4]> = SmallVec::new();
    for (r, m) in factors.drain(..) {
        match merged.last_mut() {
            Some((last, lm)) if *last == r => *lm += m,
            _ => merged.push((r, m)),
        }
    }
    *factors = merged;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalCas;

    fn poly(terms: &[(i64, &[(Var, u32)])]) -> Polynomial {
        Polynomial::from_coeffs_int(terms)
    }

    fn circle() -> Polynomial {
        // x0^2 + x1^2 - 9
        poly(&[(1, &[(0, 2)]), (1, &[(1, 2)]), (-9, &[])])
    }

    #[test]
    fn test_mccallum_circle() {
        let mut engine = ProjectionEngine::default_config();
        let mut cas = LocalCas::new();
        let (proj, atoms) = engine.project(&[circle()], 2, &mut cas).expect("failed");
        assert_eq!(proj.levels[1].len(), 1);
        let top = &proj.levels[1].factors[0];
        assert_eq!(top.origin, FactorOrigin::Input);
        // leading coefficient 1 stops the scan
        assert_eq!(top.coeff_links.len(), 1);
        assert_eq!(top.coeff_links[0], (2, Some(LinkTable::constant(Sign::Positive))));
        // disc = -4 (x0^2 - 9) = -4 (x0 - 3)(x0 + 3)
        assert_eq!(proj.levels[0].len(), 2);
        let disc = proj.link(top.discrim.expect("discriminant"));
        assert_eq!(disc.factors.len(), 2);
        assert!(proj.levels[0].factors.iter().all(|f| f.origin == FactorOrigin::Projection));
        assert_eq!(proj.link(atoms[0]).factors.len(), 1);
    }

    #[test]
    fn test_pairs_and_origin() {
        let mut engine = ProjectionEngine::default_config();
        let mut cas = LocalCas::new();
        // x1 - x0 and x1 + x0 share the level; their resultant is -2 x0
        let a = Polynomial::sub(&Polynomial::from_var(1), &Polynomial::from_var(0));
        let b = Polynomial::add(&Polynomial::from_var(1), &Polynomial::from_var(0));
        let (proj, atoms) = engine.project(&[a, b], 2, &mut cas).expect("failed");
        assert_eq!(atoms.len(), 2);
        assert_eq!(proj.levels[1].len(), 2);
        let second = &proj.levels[1].factors[1];
        assert_eq!(second.pairs.len(), 1);
        let res = proj.link(second.pairs[0].1[0]);
        assert_eq!(res.factors.len(), 1);
        assert_eq!(res.factors[0].0.level, 0);
        assert_eq!(proj.levels[0].len(), 1);
        assert_eq!(engine.stats().projections, 1);
    }

    #[test]
    fn test_hong_self_psc() {
        let mut engine = ProjectionEngine::new(ProjectionConfig {
            operator: ProjectionOperator::Hong,
            ..ProjectionConfig::default()
        });
        let mut cas = LocalCas::new();
        let (proj, _) = engine.project(&[circle()], 2, &mut cas).expect("failed");
        let top = &proj.levels[1].factors[0];
        // degree 2: only psc_0(f, f') is recorded
        assert_eq!(top.psc_self.len(), 1);
        assert!(top.discrim.is_none());
        assert_eq!(proj.levels[0].len(), 2);
    }

    #[test]
    fn test_hong_gb_reduction() {
        let mut engine = ProjectionEngine::new(ProjectionConfig {
            operator: ProjectionOperator::Hong,
            ..ProjectionConfig::default()
        });
        let mut cas = LocalCas::new();
        // x0 x1^2 + x0 x1 + 1: the second coefficient vanishes with the first
        let p = poly(&[(1, &[(0, 1), (1, 2)]), (1, &[(0, 1), (1, 1)]), (1, &[])]);
        let (proj, _) = engine.project(&[p], 2, &mut cas).expect("failed");
        let top = &proj.levels[1].factors[0];
        assert_eq!(top.coeff_links[1], (1, None));
        assert_eq!(top.coeff_links[2], (0, Some(LinkTable::constant(Sign::Positive))));
        assert!(engine.stats().coefficient_reductions >= 1);
    }

    #[test]
    fn test_capabilities() {
        let mut engine = ProjectionEngine::default_config();
        let mut cas = LocalCas::new();
        // x1^2 + x0^2 + 1 has no real root over any x0
        let p = poly(&[(1, &[(1, 2)]), (1, &[(0, 2)]), (1, &[])]);
        let (proj, _) = engine.project(&[p], 2, &mut cas).expect("failed");
        let f = &proj.levels[1].factors[0];
        let mut link_sign = |id: LinkId| proj.link(id).eval(|_| Some(Sign::Positive));
        let op = ProjectionOperator::McCallum;
        assert_eq!(op.eval_sign(f, 2, Sign::Positive, &mut link_sign), Some(Sign::Positive));
        assert!(!op.has_multiple_root(f, 2, &mut link_sign));
        assert!(!op.has_multiple_root(f, 1, &mut |_| None));
        assert!(!proj.to_string().is_empty());
    }
}
