//! Cell Decomposition for CAD.
//!
//! The decomposition tree is stored as an arena. A cell refers to its parent
//! and children by [`CellId`]; parents are never owned by their children, so
//! the tree has no reference cycles and is dropped as a whole.
//!
//! ## Cell Structure
//!
//! - **Depth**: the root has depth 0; a cell at depth `d` fixes the first
//!   `d` variables, its children fix variable `d`.
//! - **Index**: children are numbered from the left; even indices are
//!   sectors, odd indices are sections.
//! - **Signature**: one sign per projection factor of the level the cell
//!   fixes.
//! - **Truth**: three-valued; a determined truth prunes the subtree.
//!
//! ## References
//!
//! - Collins: "Quantifier Elimination for Real Closed Fields by CAD" (1975)
//! - Z3's `nlsat/nlsat_explain.cpp` (cell construction)

use super::proj_link::{FactorRef, Sign};
use super::sample::{Coordinate, SamplePoint};
use crate::error::{CadError, Result};
use qecad_math::Var;
use std::fmt::Write as _;

/// Cell identifier.
pub type CellId = usize;

/// A cell of the decomposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Unique identifier, the slot in the arena.
    pub id: CellId,
    /// Parent, `None` for the root.
    pub parent: Option<CellId>,
    /// Children, `None` until the cell is lifted.
    pub children: Option<Vec<CellId>>,
    /// Number of fixed variables.
    pub depth: usize,
    /// Position among the siblings; odd for sections.
    pub index: usize,
    /// Coordinate of variable `depth - 1`; `None` for the root.
    pub coord: Option<Coordinate>,
    /// Sign of each projection factor of level `depth - 1`.
    pub signature: Vec<Option<Sign>>,
    /// Multiplicity of the section's root in each factor; zero for sectors.
    pub multiplicity: Vec<u32>,
    /// Truth of the formula over the cell.
    pub truth: Option<bool>,
}

impl Cell {
    /// Whether the cell is a section.
    pub fn is_section(&self) -> bool {
        self.index % 2 == 1
    }

    /// Whether the cell is a sector (the root counts as one).
    pub fn is_sector(&self) -> bool {
        !self.is_section()
    }

    /// Whether the cell has been lifted.
    pub fn is_lifted(&self) -> bool {
        self.children.is_some()
    }
}

/// A child produced by lifting, before it receives an id.
#[derive(Debug, Clone)]
pub struct ChildCell {
    /// Coordinate of the new variable.
    pub coord: Coordinate,
    /// Signs of the level's factors.
    pub signature: Vec<Option<Sign>>,
    /// Multiplicities of the level's factors.
    pub multiplicity: Vec<u32>,
}

/// Statistics for the decomposition.
#[derive(Debug, Clone, Default)]
pub struct DecompositionStats {
    /// Cells created, root included.
    pub cells_created: u64,
    /// Coordinates replaced after refinement or defining polynomial
    /// replacement.
    pub coords_replaced: u64,
}

/// Arena of cells.
#[derive(Debug, Clone)]
pub struct CellDecomposition {
    cells: Vec<Cell>,
    cells_by_depth: Vec<Vec<CellId>>,
    max_cells: usize,
    stats: DecompositionStats,
}

impl CellDecomposition {
    /// A decomposition holding only the root cell of `R^0`.
    pub fn new(dimension: usize, max_cells: usize) -> Self {
        let root = Cell {
            id: 0,
            parent: None,
            children: None,
            depth: 0,
            index: 0,
            coord: None,
            signature: Vec::new(),
            multiplicity: Vec::new(),
            truth: None,
        };
        let mut cells_by_depth = vec![Vec::new(); dimension + 1];
        cells_by_depth[0].push(0);
        Self {
            cells: vec![root],
            cells_by_depth,
            max_cells,
            stats: DecompositionStats {
                cells_created: 1,
                coords_replaced: 0,
            },
        }
    }

    /// The root cell id.
    pub fn root(&self) -> CellId {
        0
    }

    /// The cell `id`.
    pub fn get_cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id)
    }

    pub(crate) fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id]
    }

    pub(crate) fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id]
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether only the root exists.
    pub fn is_empty(&self) -> bool {
        self.cells.len() <= 1
    }

    /// Cells at `depth`.
    pub fn cells_at_depth(&self, depth: usize) -> &[CellId] {
        self.cells_by_depth
            .get(depth)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Statistics.
    pub fn stats(&self) -> &DecompositionStats {
        &self.stats
    }

    /// Attach lifted children to `parent`, returning their ids from left to
    /// right.
    pub fn add_children(&mut self, parent: CellId, children: Vec<ChildCell>) -> Result<Vec<CellId>> {
        if self.cells.len() + children.len() > self.max_cells {
            return Err(CadError::Inconclusive(format!(
                "cell limit of {} reached",
                self.max_cells
            )));
        }
        let depth = self.cells[parent].depth + 1;
        if depth >= self.cells_by_depth.len() {
            return Err(CadError::InvalidIndex(format!(
                "cell {} is already at full depth",
                parent
            )));
        }
        let mut ids = Vec::with_capacity(children.len());
        for (index, child) in children.into_iter().enumerate() {
            let id = self.cells.len();
            self.cells.push(Cell {
                id,
                parent: Some(parent),
                children: None,
                depth,
                index,
                coord: Some(child.coord),
                signature: child.signature,
                multiplicity: child.multiplicity,
                truth: None,
            });
            self.cells_by_depth[depth].push(id);
            ids.push(id);
        }
        self.stats.cells_created += ids.len() as u64;
        self.cells[parent].children = Some(ids.clone());
        Ok(ids)
    }

    /// The ancestor of `id` at `depth` (the cell itself at its own depth).
    pub fn ancestor_at_depth(&self, id: CellId, depth: usize) -> Option<CellId> {
        let mut cur = id;
        loop {
            let c = &self.cells[cur];
            if c.depth == depth {
                return Some(cur);
            }
            if c.depth < depth {
                return None;
            }
            cur = c.parent?;
        }
    }

    /// Sample point of `id`: the coordinates of the cell and its ancestors.
    pub fn sample(&self, id: CellId) -> SamplePoint {
        let mut coords = Vec::with_capacity(self.cells[id].depth);
        let mut cur = Some(id);
        while let Some(c) = cur {
            let cell = &self.cells[c];
            if let Some(coord) = &cell.coord {
                coords.push(coord.clone());
            }
            cur = cell.parent;
        }
        coords.reverse();
        SamplePoint::new(coords)
    }

    /// Sign of a projection factor over `id`, read from the ancestor that
    /// fixes the factor's level.
    pub fn factor_sign(&self, id: CellId, f: FactorRef) -> Option<Sign> {
        let owner = self.ancestor_at_depth(id, f.level + 1)?;
        self.cells[owner].signature.get(f.index).copied().flatten()
    }

    /// Number of sectors among the non-root cells on the path to `id`.
    pub fn dimension(&self, id: CellId) -> usize {
        let mut dim = 0;
        let mut cur = Some(id);
        while let Some(c) = cur {
            let cell = &self.cells[c];
            if cell.parent.is_some() && cell.is_sector() {
                dim += 1;
            }
            cur = cell.parent;
        }
        dim
    }

    /// Child indices from the root to `id`.
    pub fn path(&self, id: CellId) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cur = id;
        while let Some(p) = self.cells[cur].parent {
            out.push(self.cells[cur].index);
            cur = p;
        }
        out.reverse();
        out
    }

    /// Follow child indices from the root.
    pub fn follow(&self, path: &[usize]) -> Result<CellId> {
        let mut cur = self.root();
        for (step, &i) in path.iter().enumerate() {
            let children = self.cells[cur].children.as_ref().ok_or_else(|| {
                CadError::InvalidIndex(format!("cell at step {} of {:?} is not lifted", step, path))
            })?;
            cur = *children.get(i).ok_or_else(|| {
                CadError::InvalidIndex(format!(
                    "child {} out of range at step {} of {:?} ({} children)",
                    i,
                    step,
                    path,
                    children.len()
                ))
            })?;
        }
        Ok(cur)
    }

    /// Write refined coordinates of a sample point of `id` back to the
    /// cells that own them.
    ///
    /// The slot of each affected cell is replaced by an updated copy; no
    /// other field changes.
    pub fn replace_coords(&mut self, id: CellId, changes: &[(usize, Coordinate)]) {
        for (var, coord) in changes {
            let Some(owner) = self.ancestor_at_depth(id, var + 1) else {
                continue;
            };
            let updated = Cell {
                coord: Some(coord.clone()),
                ..self.cells[owner].clone()
            };
            self.cells[owner] = updated;
            self.stats.coords_replaced += 1;
        }
    }

    /// Whether `id` or an ancestor has a determined truth value.
    pub fn is_settled(&self, id: CellId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if self.cells[c].truth.is_some() {
                return true;
            }
            cur = self.cells[c].parent;
        }
        false
    }

    /// Indented dump of the tree, one cell per line. `name` renders
    /// variables.
    pub fn dump(&self, name: &dyn Fn(Var) -> String) -> String {
        let mut out = String::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            let c = &self.cells[id];
            let indent = "  ".repeat(c.depth);
            let truth = match c.truth {
                Some(true) => "T",
                Some(false) => "F",
                None => "?",
            };
            match &c.coord {
                None => {
                    let _ = writeln!(out, "root [{}]", truth);
                }
                Some(coord) => {
                    let sig: String = c
                        .signature
                        .iter()
                        .map(|s| s.map(|s| s.to_string()).unwrap_or_else(|| "?".to_string()))
                        .collect();
                    let kind = if c.is_section() { "section" } else { "sector" };
                    let _ = writeln!(
                        out,
                        "{}{} {} {} = {} <{}> [{}]",
                        indent,
                        c.index,
                        kind,
                        name((c.depth - 1) as Var),
                        coord,
                        sig,
                        truth
                    );
                }
            }
            if let Some(children) = &c.children {
                stack.extend(children.iter().rev());
            }
        }
        out
    }
}
