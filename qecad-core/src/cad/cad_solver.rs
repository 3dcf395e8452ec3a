//! The CAD driver.
//!
//! [`Cad`] owns a prenex formula in level order, its projection, and the
//! cell tree. Projection runs once per operator choice; lifting then drains
//! a LIFO worklist of undetermined cells, evaluating the matrix on every new
//! cell and pushing truth values up through the quantifier blocks.
//!
//! Levels are assigned as follows: free variables first (in table order),
//! then the quantified blocks from the outermost to the innermost. A cell of
//! depth `d` has its first `d` coordinates fixed; its children fix level `d`.
//!
//! ## References
//!
//! - Collins, "Quantifier elimination for real closed fields by cylindrical
//!   algebraic decomposition" (1975)
//! - Collins & Hong, "Partial cylindrical algebraic decomposition for
//!   quantifier elimination" (1991)

use super::cell_decomposition::{Cell, CellDecomposition, CellId};
use super::lifting::{LiftInput, LiftingConfig, LiftingEngine, LiftingStats};
use super::proj_link::{LinkId, Sign};
use super::projection::{Projection, ProjectionEngine, ProjectionOperator, ProjectionStats};
use super::zero_test::{ZeroTestConfig, ZeroTestStats, ZeroTester};
use crate::backend::{CasBackend, LocalCas};
use crate::error::{CadError, Result};
use crate::formula::{Formula, Quantifier, RelOp, VariableTable};
use qecad_math::{Polynomial, Var};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace, warn};

/// Configuration for a CAD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadConfig {
    /// Projection operator used by [`Cad::solve`] and lazy projection.
    pub projection: ProjectionOperator,
    /// Rebuild with Hong projection when a McCallum factor is nullified.
    pub hong_fallback: bool,
    /// Settle a quantified cell as soon as one child reaches the
    /// quantifier's target value.
    pub short_circuit: bool,
    /// Zero-test configuration.
    pub zero_test: ZeroTestConfig,
    /// Lifting configuration.
    pub lifting: LiftingConfig,
    /// Upper bound on the number of cells.
    pub max_cells: usize,
}

impl Default for CadConfig {
    fn default() -> Self {
        Self {
            projection: ProjectionOperator::McCallum,
            hong_fallback: true,
            short_circuit: true,
            zero_test: ZeroTestConfig::default(),
            lifting: LiftingConfig::default(),
            max_cells: 1 << 20,
        }
    }
}

/// Statistics for a CAD.
#[derive(Debug, Clone, Default)]
pub struct CadStats {
    /// Projections computed.
    pub projections: u64,
    /// Rebuilds with Hong projection after nullification.
    pub hong_fallbacks: u64,
    /// Cells created by lifting.
    pub cells_created: u64,
    /// Cells lifted.
    pub cells_lifted: u64,
    /// Worklist cells skipped because an ancestor was settled.
    pub cells_pruned: u64,
    /// Truth values propagated to a parent.
    pub truth_propagations: u64,
}

/// The matrix with atoms replaced by their index into the atom list.
#[derive(Debug, Clone)]
enum Matrix {
    Atom { op: RelOp, atom: usize },
    And(Vec<Matrix>),
    Or(Vec<Matrix>),
}

impl Matrix {
    fn build(f: &Formula, atoms: &mut Vec<Polynomial>) -> Result<Matrix> {
        match f {
            Formula::Atom { poly, op } => {
                atoms.push(poly.clone());
                Ok(Matrix::Atom {
                    op: *op,
                    atom: atoms.len() - 1,
                })
            }
            Formula::And(args) => Ok(Matrix::And(
                args.iter()
                    .map(|a| Matrix::build(a, atoms))
                    .collect::<Result<_>>()?,
            )),
            Formula::Or(args) => Ok(Matrix::Or(
                args.iter()
                    .map(|a| Matrix::build(a, atoms))
                    .collect::<Result<_>>()?,
            )),
            Formula::ForAll(..) | Formula::Exists(..) => Err(CadError::NonPrenex(
                "quantifier below a connective".to_string(),
            )),
        }
    }

    /// Three-valued truth given the sign of each atom's link.
    fn eval(&self, atom_sign: &mut impl FnMut(usize) -> Option<Sign>) -> Option<bool> {
        match self {
            Matrix::Atom { op, atom } => atom_sign(*atom).map(|s| op.holds(s)),
            Matrix::And(args) => {
                let mut all = true;
                for a in args {
                    match a.eval(atom_sign) {
                        Some(false) => return Some(false),
                        Some(true) => {}
                        None => all = false,
                    }
                }
                all.then_some(true)
            }
            Matrix::Or(args) => {
                let mut all = true;
                for a in args {
                    match a.eval(atom_sign) {
                        Some(true) => return Some(true),
                        Some(false) => {}
                        None => all = false,
                    }
                }
                all.then_some(false)
            }
        }
    }
}

/// A cylindrical algebraic decomposition of a prenex formula.
///
/// # Examples
///
/// ```
/// use qecad_core::{Cad, CadConfig, Formula, LocalCas, RelOp, VariableTable};
/// use qecad_math::Polynomial;
///
/// let table = VariableTable::from_names(&["x"]);
/// let x = Polynomial::from_var(0);
/// let f = Formula::exists(
///     vec![0],
///     Formula::atom(&x * &x - Polynomial::from_int(2), RelOp::Eq),
/// );
/// let mut cad = Cad::new(&f, &table, LocalCas::new(), CadConfig::default()).unwrap();
/// assert_eq!(cad.solve().unwrap(), Some(true));
/// ```
#[derive(Debug)]
pub struct Cad<B: CasBackend = LocalCas> {
    config: CadConfig,
    stats: CadStats,
    cas: B,
    table: VariableTable,
    quantifiers: Vec<Option<Quantifier>>,
    matrix: Matrix,
    atoms: Vec<Polynomial>,
    atom_links: Vec<LinkId>,
    projection: Option<Projection>,
    decomposition: CellDecomposition,
    worklist: Vec<CellId>,
    projector: ProjectionEngine,
    lifting: LiftingEngine,
    zero: ZeroTester,
}

impl<B: CasBackend> Cad<B> {
    /// Build a CAD for `formula`, whose variables are indices into `table`.
    ///
    /// The quantifier prefix is validated and the variables are renamed into
    /// level order; nothing is projected yet.
    pub fn new(formula: &Formula, table: &VariableTable, cas: B, config: CadConfig) -> Result<Self> {
        let mut blocks: Vec<(Quantifier, &[Var])> = Vec::new();
        let mut matrix = formula;
        loop {
            match matrix {
                Formula::Exists(vars, body) => {
                    blocks.push((Quantifier::Exists, vars.as_slice()));
                    matrix = &**body;
                }
                Formula::ForAll(vars, body) => {
                    blocks.push((Quantifier::ForAll, vars.as_slice()));
                    matrix = &**body;
                }
                _ => break,
            }
        }
        if !matrix.is_quantifier_free() {
            return Err(CadError::NonPrenex(table.fmt_formula(matrix)));
        }

        let mut bound: Vec<(Var, Quantifier)> = Vec::new();
        for (q, vars) in &blocks {
            if vars.is_empty() {
                return Err(CadError::MalformedPrefix("empty quantifier block".to_string()));
            }
            for &v in *vars {
                if !table.contains(v) {
                    return Err(CadError::UnknownVariable(v));
                }
                if bound.iter().any(|(b, _)| *b == v) {
                    return Err(CadError::MalformedPrefix(format!(
                        "{} is bound twice",
                        table.name(v).unwrap_or("?")
                    )));
                }
                bound.push((v, *q));
            }
        }
        let occurring = matrix.atom_vars();
        if let Some(&v) = occurring.iter().find(|v| !table.contains(**v)) {
            return Err(CadError::UnknownVariable(v));
        }

        // free variables in table order, then the blocks outermost first
        let mut order: Vec<Var> = occurring
            .iter()
            .copied()
            .filter(|v| !bound.iter().any(|(b, _)| b == v))
            .collect();
        let free = order.len();
        order.extend(bound.iter().map(|(v, _)| *v));
        let mut level_of = vec![None; table.len()];
        for (level, &v) in order.iter().enumerate() {
            level_of[v as usize] = Some(level as Var);
        }
        let rename = |v: Var| level_of[v as usize].unwrap_or(v);
        let level_matrix = matrix.map_vars(&rename);

        let mut quantifiers = vec![None; free];
        quantifiers.extend(bound.iter().map(|(_, q)| Some(*q)));
        let names: Vec<&str> = order.iter().map(|&v| table.name(v).unwrap_or("?")).collect();
        let level_table = VariableTable::from_names(&names);

        let mut atoms = Vec::new();
        let matrix = Matrix::build(&level_matrix, &mut atoms)?;
        debug!(
            levels = order.len(),
            free,
            atoms = atoms.len(),
            "CAD created"
        );

        Ok(Self {
            decomposition: CellDecomposition::new(order.len(), config.max_cells),
            projector: ProjectionEngine::default_config(),
            lifting: LiftingEngine::new(config.lifting.clone()),
            zero: ZeroTester::new(config.zero_test.clone()),
            config,
            stats: CadStats::default(),
            cas,
            table: level_table,
            quantifiers,
            matrix,
            atoms,
            atom_links: Vec::new(),
            projection: None,
            worklist: Vec::new(),
        })
    }

    /// The configuration.
    pub fn config(&self) -> &CadConfig {
        &self.config
    }

    /// Get statistics.
    pub fn stats(&self) -> &CadStats {
        &self.stats
    }

    /// Projection statistics.
    pub fn projection_stats(&self) -> &ProjectionStats {
        self.projector.stats()
    }

    /// Lifting statistics.
    pub fn lifting_stats(&self) -> &LiftingStats {
        self.lifting.stats()
    }

    /// Zero-test statistics.
    pub fn zero_test_stats(&self) -> &ZeroTestStats {
        self.zero.stats()
    }

    /// Reset statistics, including those of the engines.
    pub fn reset_stats(&mut self) {
        self.stats = CadStats::default();
        self.projector.reset_stats();
        self.lifting.reset_stats();
        self.zero.reset_stats();
    }

    /// The backend.
    pub fn cas(&self) -> &B {
        &self.cas
    }

    /// Variables in level order.
    pub fn variables(&self) -> &VariableTable {
        &self.table
    }

    /// Number of levels.
    pub fn num_levels(&self) -> usize {
        self.quantifiers.len()
    }

    /// Quantifier of `level`, `None` for a free variable.
    pub fn quantifier(&self, level: usize) -> Option<Quantifier> {
        self.quantifiers.get(level).copied().flatten()
    }

    /// Atoms of the matrix, renamed into level order.
    pub fn atoms(&self) -> &[Polynomial] {
        &self.atoms
    }

    /// The projection, if computed.
    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    /// The cell tree.
    pub fn decomposition(&self) -> &CellDecomposition {
        &self.decomposition
    }

    /// The root cell.
    pub fn root(&self) -> &Cell {
        self.decomposition.cell(self.decomposition.root())
    }

    /// The cell reached by following child indices from the root.
    pub fn cell(&self, path: &[usize]) -> Result<&Cell> {
        let id = self.decomposition.follow(path)?;
        Ok(self.decomposition.cell(id))
    }

    /// Truth value of the root cell.
    pub fn truth(&self) -> Option<bool> {
        self.root().truth
    }

    /// Compute the projection with `operator`, discarding any cell tree.
    pub fn project(&mut self, operator: ProjectionOperator) -> Result<()> {
        let n = self.num_levels();
        self.projector.set_operator(operator);
        let (projection, links) = self.projector.project(&self.atoms, n, &mut self.cas)?;
        self.stats.projections += 1;
        debug!(
            operator = %operator,
            factors = projection.num_factors(),
            "projection computed"
        );
        self.projection = Some(projection);
        self.atom_links = links;
        self.decomposition = CellDecomposition::new(n, self.config.max_cells);
        self.worklist.clear();

        let root = self.decomposition.root();
        let truth = self.evaluate(root)?;
        self.decomposition.cell_mut(root).truth = truth;
        if truth.is_none() {
            self.worklist.push(root);
        }
        Ok(())
    }

    /// Lift every cell on the worklist until none is left.
    pub fn lift(&mut self) -> Result<()> {
        if self.projection.is_none() {
            self.project(self.config.projection)?;
        }
        while let Some(id) = self.worklist.pop() {
            if self.decomposition.is_settled(id) || self.decomposition.cell(id).is_lifted() {
                self.stats.cells_pruned += 1;
                continue;
            }
            match self.lift_cell(id) {
                Ok(()) => {}
                Err(e) if self.should_fall_back(&e) => self.fall_back(&e)?,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Lift the cell addressed by child indices from the root, lifting the
    /// cells on the way first where needed.
    pub fn lift_path(&mut self, path: &[usize]) -> Result<()> {
        if self.projection.is_none() {
            self.project(self.config.projection)?;
        }
        if path.len() >= self.num_levels() {
            return Err(CadError::InvalidIndex(format!(
                "{:?} addresses a cell of full dimension {}",
                path,
                self.num_levels()
            )));
        }
        loop {
            match self.lift_along(path) {
                Err(e) if self.should_fall_back(&e) => self.fall_back(&e)?,
                other => return other,
            }
        }
    }

    /// Project if needed, lift everything, and return the root's truth.
    ///
    /// `None` means the root is not settled, which happens when the formula
    /// has free variables taking different values on different cells.
    pub fn solve(&mut self) -> Result<Option<bool>> {
        self.lift()?;
        Ok(self.truth())
    }

    /// Indented dump of the cell tree.
    pub fn dump_tree(&self) -> String {
        self.decomposition.dump(&|v| {
            self.table
                .name(v)
                .map(str::to_string)
                .unwrap_or_else(|| format!("x{}", v))
        })
    }

    fn should_fall_back(&self, e: &CadError) -> bool {
        matches!(e, CadError::NotWellOriented { .. })
            && self.config.hong_fallback
            && self
                .projection
                .as_ref()
                .is_some_and(|p| p.operator == ProjectionOperator::McCallum)
    }

    fn fall_back(&mut self, e: &CadError) -> Result<()> {
        warn!(error = %e, "falling back to Hong projection");
        self.stats.hong_fallbacks += 1;
        self.project(ProjectionOperator::Hong)
    }

    fn lift_along(&mut self, path: &[usize]) -> Result<()> {
        for k in 0..=path.len() {
            let id = self.decomposition.follow(&path[..k])?;
            if !self.decomposition.cell(id).is_lifted() {
                self.lift_cell(id)?;
            }
        }
        Ok(())
    }

    fn lift_cell(&mut self, id: CellId) -> Result<()> {
        let n = self.num_levels();
        let depth = self.decomposition.cell(id).depth;
        let Some(projection) = self.projection.as_ref() else {
            return Err(CadError::InvalidIndex("no projection computed".to_string()));
        };
        if depth >= n {
            return Err(CadError::InvalidIndex(format!(
                "cell {:?} has full dimension",
                self.decomposition.path(id)
            )));
        }

        let point = self.decomposition.sample(id);
        let decomposition = &self.decomposition;
        let mut link_sign =
            |l: LinkId| projection.link(l).eval(|f| decomposition.factor_sign(id, f));
        let input = LiftInput {
            point: &point,
            factors: &projection.levels[depth].factors,
            operator: projection.operator,
            dimension: decomposition.dimension(id),
        };
        let stack = self
            .lifting
            .lift(input, &mut link_sign, &mut self.zero, &mut self.cas)?;

        self.decomposition.replace_coords(id, &stack.refined);
        let children = self.decomposition.add_children(id, stack.children)?;
        self.stats.cells_lifted += 1;
        self.stats.cells_created += children.len() as u64;
        for &c in &children {
            let truth = self.evaluate(c)?;
            self.decomposition.cell_mut(c).truth = truth;
        }
        debug!(
            cell = id,
            depth,
            children = children.len(),
            "cell lifted"
        );

        self.propagate(id);
        if depth + 1 < n && !self.decomposition.is_settled(id) {
            // LIFO: sections come off the worklist before sectors
            for parity in [0, 1] {
                for &c in children.iter().filter(|&&c| self.decomposition.cell(c).index % 2 == parity) {
                    if self.decomposition.cell(c).truth.is_none() {
                        self.worklist.push(c);
                    }
                }
            }
        }
        Ok(())
    }

    /// Truth of the matrix on cell `id`, `None` if undetermined there.
    fn evaluate(&self, id: CellId) -> Result<Option<bool>> {
        let Some(projection) = self.projection.as_ref() else {
            return Ok(None);
        };
        let decomposition = &self.decomposition;
        let links = &self.atom_links;
        let truth = self.matrix.eval(&mut |atom| {
            let link = links.get(atom)?;
            projection.link(*link).eval(|f| decomposition.factor_sign(id, f))
        });
        let cell = decomposition.cell(id);
        if truth.is_none() && cell.depth == self.num_levels() {
            return Err(CadError::Inconclusive(format!(
                "matrix undetermined on full-dimensional cell {:?}",
                decomposition.path(id)
            )));
        }
        Ok(truth)
    }

    /// Push truth values from the children of `id` up the tree.
    fn propagate(&mut self, id: CellId) {
        let mut cur = id;
        loop {
            let cell = self.decomposition.cell(cur);
            if cell.truth.is_some() {
                return;
            }
            let Some(children) = cell.children.as_ref() else {
                return;
            };
            let truths: Vec<Option<bool>> = children
                .iter()
                .map(|&c| self.decomposition.cell(c).truth)
                .collect();
            let decided = match self.quantifiers.get(cell.depth).copied().flatten() {
                Some(q) => {
                    let target = q.target();
                    if self.config.short_circuit && truths.contains(&Some(target)) {
                        Some(target)
                    } else if truths.iter().all(Option::is_some) {
                        Some(if truths.contains(&Some(target)) { target } else { !target })
                    } else {
                        None
                    }
                }
                None => match truths.first().copied().flatten() {
                    Some(t) if truths.iter().all(|&u| u == Some(t)) => Some(t),
                    _ => None,
                },
            };
            let Some(truth) = decided else {
                return;
            };
            trace!(cell = cur, truth, "truth propagated");
            self.stats.truth_propagations += 1;
            let parent = cell.parent;
            self.decomposition.cell_mut(cur).truth = Some(truth);
            match parent {
                Some(p) => cur = p,
                None => return,
            }
        }
    }
}

impl<B: CasBackend> fmt::Display for Cad<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.projection {
            writeln!(f, "{}", p.fmt_with(&self.table))?;
        }
        write!(f, "{}", self.dump_tree())
    }
}
