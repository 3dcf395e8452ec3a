//! Computer algebra backend.
//!
//! The decomposition needs a handful of exact operations on multivariate
//! rational polynomials: factoring, gcds, resultants and discriminants,
//! subresultants, and Gröbner bases with normal-form reduction. They are
//! collected in [`CasBackend`] so that an external system can be plugged in;
//! [`LocalCas`] implements them on top of `qecad-math`.
//!
//! All calls are synchronous and take `&mut self`, so a backend may cache or
//! count freely.

use qecad_math::grobner::{GrobnerConfig, GrobnerEngine, is_unit_ideal};
use qecad_math::polynomial::factorization::{Factorization, factor};
use qecad_math::polynomial::gcd::gcd;
use qecad_math::polynomial::resultant::{discriminant, psc, resultant, sres};
use qecad_math::{MathError, MonomialOrder, Polynomial, Var};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::trace;

/// Errors reported by a backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CasError {
    /// The operation ran but did not produce a result.
    #[error("{op} failed: {message}")]
    Failed {
        /// Backend operation name.
        op: &'static str,
        /// Backend message.
        message: String,
    },
    /// The backend does not offer the operation.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

impl From<MathError> for CasError {
    fn from(e: MathError) -> Self {
        CasError::Failed {
            op: "arithmetic",
            message: e.to_string(),
        }
    }
}

/// Result type for backend calls.
pub type CasResult<T> = std::result::Result<T, CasError>;

/// Exact polynomial algebra required by projection, lifting and the
/// algebraic zero test.
pub trait CasBackend {
    /// Factor into a rational constant times canonical square-free factors
    /// with multiplicities.
    fn factor(&mut self, p: &Polynomial) -> CasResult<Factorization>;

    /// Canonical gcd.
    fn gcd(&mut self, p: &Polynomial, q: &Polynomial) -> CasResult<Polynomial>;

    /// Resultant with respect to `var`.
    fn resultant(&mut self, p: &Polynomial, q: &Polynomial, var: Var) -> CasResult<Polynomial>;

    /// Discriminant with respect to `var`.
    fn discrim(&mut self, p: &Polynomial, var: Var) -> CasResult<Polynomial>;

    /// The `j`-th principal subresultant coefficient with respect to `var`.
    fn psc(&mut self, p: &Polynomial, q: &Polynomial, var: Var, j: u32) -> CasResult<Polynomial>;

    /// The `k`-th subresultant polynomial with respect to `var`.
    fn sres(&mut self, p: &Polynomial, q: &Polynomial, var: Var, k: u32) -> CasResult<Polynomial>;

    /// Reduced Gröbner basis of `polys`.
    ///
    /// `vars` lists the variables from most to least significant. When
    /// `0 < block_size < vars.len()` the first `block_size` variables form
    /// an elimination block; otherwise a single degree-compatible order is
    /// used.
    fn gb(&mut self, polys: &[Polynomial], vars: &[Var], block_size: usize) -> CasResult<Vec<Polynomial>>;

    /// Normal form of `p` modulo a basis computed by [`CasBackend::gb`] with
    /// the same `vars` and `block_size`, primitive with a positive leading
    /// coefficient. The flag reports a sign flip.
    fn reduce(
        &mut self,
        p: &Polynomial,
        basis: &[Polynomial],
        vars: &[Var],
        block_size: usize,
    ) -> CasResult<(Polynomial, bool)>;
}

/// Call counters for [`LocalCas`].
#[derive(Debug, Clone, Default)]
pub struct LocalCasStats {
    /// Factorizations.
    pub factor_calls: u64,
    /// Gcds.
    pub gcd_calls: u64,
    /// Resultants and discriminants.
    pub resultant_calls: u64,
    /// Subresultant coefficients and polynomials.
    pub subresultant_calls: u64,
    /// Gröbner bases.
    pub gb_calls: u64,
    /// Normal-form reductions.
    pub reduce_calls: u64,
}

/// Backend implemented with `qecad-math`.
#[derive(Debug, Default)]
pub struct LocalCas {
    grobner: GrobnerEngine,
    stats: LocalCasStats,
}

impl LocalCas {
    /// A backend with default Gröbner settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend with the given Gröbner settings.
    pub fn with_grobner_config(config: GrobnerConfig) -> Self {
        Self {
            grobner: GrobnerEngine::new(config),
            stats: LocalCasStats::default(),
        }
    }

    /// Call counters.
    pub fn stats(&self) -> &LocalCasStats {
        &self.stats
    }

    /// Clear the counters.
    pub fn reset_stats(&mut self) {
        self.stats = LocalCasStats::default();
        self.grobner.reset_stats();
    }
}

/// Renaming that makes `vars[0]` the most significant variable under the
/// local lex convention (larger index wins). Variables outside `vars` are
/// placed below all of them, in their original relative order.
struct VarOrdering {
    forward: FxHashMap<Var, Var>,
    backward: FxHashMap<Var, Var>,
}

impl VarOrdering {
    fn new(polys: &[&Polynomial], vars: &[Var]) -> Self {
        let mut rest: Vec<Var> = polys
            .iter()
            .flat_map(|p| p.vars())
            .filter(|v| !vars.contains(v))
            .collect();
        rest.sort_unstable();
        rest.dedup();
        let mut forward = FxHashMap::default();
        for (i, &v) in rest.iter().enumerate() {
            forward.insert(v, i as Var);
        }
        let base = rest.len();
        for (i, &v) in vars.iter().enumerate() {
            forward.insert(v, (base + vars.len() - 1 - i) as Var);
        }
        let backward = forward.iter().map(|(&a, &b)| (b, a)).collect();
        Self { forward, backward }
    }

    fn apply(&self, p: &Polynomial, order: MonomialOrder) -> Polynomial {
        p.map_vars(|v| self.forward.get(&v).copied().unwrap_or(v))
            .with_order(order)
    }

    fn undo(&self, p: &Polynomial) -> Polynomial {
        p.map_vars(|v| self.backward.get(&v).copied().unwrap_or(v))
            .with_order(MonomialOrder::default())
    }
}

fn order_for(vars: &[Var], block_size: usize) -> MonomialOrder {
    if block_size > 0 && block_size < vars.len() {
        MonomialOrder::Lex
    } else {
        MonomialOrder::GRevLex
    }
}

impl CasBackend for LocalCas {
    fn factor(&mut self, p: &Polynomial) -> CasResult<Factorization> {
        self.stats.factor_calls += 1;
        trace!(poly = %p, "factor");
        Ok(factor(p)?)
    }

    fn gcd(&mut self, p: &Polynomial, q: &Polynomial) -> CasResult<Polynomial> {
        self.stats.gcd_calls += 1;
        Ok(gcd(p, q)?)
    }

    fn resultant(&mut self, p: &Polynomial, q: &Polynomial, var: Var) -> CasResult<Polynomial> {
        self.stats.resultant_calls += 1;
        Ok(resultant(p, q, var)?)
    }

    fn discrim(&mut self, p: &Polynomial, var: Var) -> CasResult<Polynomial> {
        self.stats.resultant_calls += 1;
        Ok(discriminant(p, var)?)
    }

    fn psc(&mut self, p: &Polynomial, q: &Polynomial, var: Var, j: u32) -> CasResult<Polynomial> {
        self.stats.subresultant_calls += 1;
        Ok(psc(p, q, var, j)?)
    }

    fn sres(&mut self, p: &Polynomial, q: &Polynomial, var: Var, k: u32) -> CasResult<Polynomial> {
        self.stats.subresultant_calls += 1;
        Ok(sres(p, q, var, k)?)
    }

    fn gb(&mut self, polys: &[Polynomial], vars: &[Var], block_size: usize) -> CasResult<Vec<Polynomial>> {
        self.stats.gb_calls += 1;
        let order = order_for(vars, block_size);
        let refs: Vec<&Polynomial> = polys.iter().collect();
        let renaming = VarOrdering::new(&refs, vars);
        let gens: Vec<Polynomial> = polys.iter().map(|p| renaming.apply(p, order)).collect();
        let basis = self.grobner.compute(&gens, order)?;
        if is_unit_ideal(&basis) {
            return Ok(vec![Polynomial::one()]);
        }
        Ok(basis.iter().map(|g| renaming.undo(g)).collect())
    }

    fn reduce(
        &mut self,
        p: &Polynomial,
        basis: &[Polynomial],
        vars: &[Var],
        block_size: usize,
    ) -> CasResult<(Polynomial, bool)> {
        self.stats.reduce_calls += 1;
        let order = order_for(vars, block_size);
        let mut refs: Vec<&Polynomial> = basis.iter().collect();
        refs.push(p);
        let renaming = VarOrdering::new(&refs, vars);
        let mapped: Vec<Polynomial> = basis.iter().map(|g| renaming.apply(g, order)).collect();
        let (nf, negated) = qecad_math::grobner::reduce(&renaming.apply(p, order), &mapped);
        Ok((renaming.undo(&nf), negated))
    }
}
