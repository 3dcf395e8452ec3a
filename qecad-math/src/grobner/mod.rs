//! Gröbner Basis Computation
//!
//! Buchberger's algorithm with the product criterion, producing reduced
//! bases, plus normal-form reduction. The CAD engine uses these to decide
//! whether the leading coefficients of a projection factor can vanish
//! simultaneously, which bounds how many coefficients the Hong operator has
//! to project.
//!
//! ## References
//!
//! - Buchberger, "Ein Algorithmus zum Auffinden der Basiselemente des
//!   Restklassenringes nach einem nulldimensionalen Polynomideal" (1965)
//! - Cox, Little and O'Shea, "Ideals, Varieties, and Algorithms", Chapter 2

use crate::polynomial::{MonomialOrder, Polynomial, Term};
use crate::{MathError, MathResult};
use num_traits::Signed;
use tracing::{debug, trace};

/// Configuration for Buchberger's algorithm.
#[derive(Debug, Clone)]
pub struct GrobnerConfig {
    /// Skip pairs whose leading monomials are coprime.
    pub product_criterion: bool,
    /// Give up once the intermediate basis grows beyond this size.
    pub max_basis_size: usize,
}

impl Default for GrobnerConfig {
    fn default() -> Self {
        Self {
            product_criterion: true,
            max_basis_size: 512,
        }
    }
}

/// Statistics for Buchberger's algorithm.
#[derive(Debug, Clone, Default)]
pub struct GrobnerStats {
    /// S-polynomials formed.
    pub s_polynomials: u64,
    /// S-polynomials that reduced to zero.
    pub zero_reductions: u64,
    /// Pairs discarded by the product criterion.
    pub pairs_eliminated_product: u64,
    /// Polynomials added to the basis.
    pub polynomials_added: u64,
}

/// Buchberger engine.
#[derive(Debug, Default)]
pub struct GrobnerEngine {
    config: GrobnerConfig,
    stats: GrobnerStats,
}

impl GrobnerEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: GrobnerConfig) -> Self {
        Self {
            config,
            stats: GrobnerStats::default(),
        }
    }

    /// Statistics of all computations so far.
    pub fn stats(&self) -> &GrobnerStats {
        &self.stats
    }

    /// Clear the statistics.
    pub fn reset_stats(&mut self) {
        self.stats = GrobnerStats::default();
    }

    /// Reduced Gröbner basis of the ideal generated by `gens` under `order`.
    ///
    /// Basis elements are monic. The unit ideal yields `[1]`, the zero ideal
    /// an empty basis.
    pub fn compute(
        &mut self,
        gens: &[Polynomial],
        order: MonomialOrder,
    ) -> MathResult<Vec<Polynomial>> {
        let mut basis: Vec<Polynomial> = gens
            .iter()
            .filter(|g| !g.is_zero())
            .map(|g| g.with_order(order).make_monic())
            .collect();
        if basis.iter().any(Polynomial::is_constant) {
            return Ok(vec![Polynomial::one()]);
        }
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        for j in 0..basis.len() {
            for i in 0..j {
                pairs.push((i, j));
            }
        }
        while let Some((i, j)) = pairs.pop() {
            if self.config.product_criterion && lm_coprime(&basis[i], &basis[j]) {
                self.stats.pairs_eliminated_product += 1;
                continue;
            }
            self.stats.s_polynomials += 1;
            let s = s_polynomial(&basis[i], &basis[j]);
            let r = normal_form(&s, &basis);
            if r.is_zero() {
                self.stats.zero_reductions += 1;
                continue;
            }
            if r.is_constant() {
                trace!(s_polynomials = self.stats.s_polynomials, "unit ideal");
                return Ok(vec![Polynomial::one()]);
            }
            if basis.len() >= self.config.max_basis_size {
                return Err(MathError::InvalidArgument(format!(
                    "Gröbner basis exceeded {} elements",
                    self.config.max_basis_size
                )));
            }
            let k = basis.len();
            basis.push(r.make_monic());
            self.stats.polynomials_added += 1;
            for i in 0..k {
                pairs.push((i, k));
            }
        }
        let reduced = inter_reduce(basis);
        debug!(
            generators = gens.len(),
            basis = reduced.len(),
            s_polynomials = self.stats.s_polynomials,
            "Gröbner basis computed"
        );
        Ok(reduced)
    }
}

fn lm_coprime(f: &Polynomial, g: &Polynomial) -> bool {
    match (f.leading_monomial(), g.leading_monomial()) {
        (Some(a), Some(b)) => a.is_coprime(b),
        _ => true,
    }
}

/// Reduced Gröbner basis with the default configuration.
pub fn grobner_basis(gens: &[Polynomial], order: MonomialOrder) -> MathResult<Vec<Polynomial>> {
    GrobnerEngine::default().compute(gens, order)
}

/// `S(f, g) = (L / lt f) f - (L / lt g) g` with `L = lcm(lm f, lm g)`.
pub fn s_polynomial(f: &Polynomial, g: &Polynomial) -> Polynomial {
    let (Some(tf), Some(tg)) = (f.leading_term(), g.leading_term()) else {
        return Polynomial::zero();
    };
    let l = tf.monomial.lcm(&tg.monomial);
    let (Some(mf), Some(mg)) = (l.div(&tf.monomial), l.div(&tg.monomial)) else {
        return Polynomial::zero();
    };
    let a = f.mul_monomial(&mf).scale(&tf.coeff.recip());
    let b = g.mul_monomial(&mg).scale(&tg.coeff.recip());
    Polynomial::sub(&a, &b)
}

/// Fully reduce `p` modulo `basis`, in the monomial order of the basis.
pub fn normal_form(p: &Polynomial, basis: &[Polynomial]) -> Polynomial {
    let order = basis
        .first()
        .map(Polynomial::order)
        .unwrap_or_else(|| p.order());
    let mut rest = p.with_order(order);
    let mut done: Vec<Term> = Vec::new();
    while let Some(lt) = rest.leading_term().cloned() {
        let divisor = basis.iter().find_map(|g| {
            let gt = g.leading_term()?;
            let q = lt.monomial.div(&gt.monomial)?;
            Some((g, q, &lt.coeff / &gt.coeff))
        });
        match divisor {
            Some((g, q, c)) => {
                rest = Polynomial::sub(&rest, &g.mul_monomial(&q).scale(&c));
            }
            None => {
                rest = Polynomial::from_terms(rest.terms()[1..].to_vec(), order);
                done.push(lt);
            }
        }
    }
    Polynomial::from_terms(done, order)
}

/// Normal form of `p` modulo a Gröbner basis, made primitive with a
/// positive leading coefficient. The flag reports whether the sign was
/// flipped to achieve that.
pub fn reduce(p: &Polynomial, basis: &[Polynomial]) -> (Polynomial, bool) {
    let nf = normal_form(p, basis).primitive();
    if nf.leading_coeff().is_negative() {
        (nf.neg(), true)
    } else {
        (nf, false)
    }
}

/// Whether the basis generates the whole ring.
pub fn is_unit_ideal(basis: &[Polynomial]) -> bool {
    basis.iter().any(Polynomial::is_constant)
}

fn inter_reduce(basis: Vec<Polynomial>) -> Vec<Polynomial> {
    // drop elements whose leading monomial is a multiple of another's
    let mut minimal: Vec<Polynomial> = Vec::new();
    for (i, g) in basis.iter().enumerate() {
        let Some(lm) = g.leading_monomial() else {
            continue;
        };
        let redundant = basis.iter().enumerate().any(|(j, h)| {
            h.leading_monomial().is_some_and(|hm| {
                j != i && lm.div(hm).is_some() && (hm != lm || j < i)
            })
        });
        if !redundant {
            minimal.push(g.clone());
        }
    }
    let mut reduced = Vec::with_capacity(minimal.len());
    for i in 0..minimal.len() {
        let others: Vec<Polynomial> = minimal
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, g)| g.clone())
            .collect();
        reduced.push(normal_form(&minimal[i], &others).make_monic());
    }
    reduced
}
