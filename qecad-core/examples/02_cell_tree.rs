//! # Cell Tree Example
//!
//! This example lifts a decomposition step by step and prints it.
//! It covers:
//! - Projection factor sets per level
//! - Lifting single cells by child index path
//! - Dumping the decorated cell tree
//!
//! ## See Also
//! - [`Cad::lift_path`](qecad_core::Cad::lift_path)
//! - [`Cad::dump_tree`](qecad_core::Cad::dump_tree)

use qecad_core::{Cad, CadConfig, Formula, LocalCas, ProjectionOperator, RelOp, VariableTable};
use qecad_math::Polynomial;

fn main() -> qecad_core::Result<()> {
    println!("=== QeCAD Core: Cell Tree ===\n");

    // y = x^2 and y = 2 meet at x = +-sqrt 2
    let table = VariableTable::from_names(&["x", "y"]);
    let parabola = Polynomial::from_coeffs_int(&[(1, &[(1, 1)]), (-1, &[(0, 2)])]);
    let level = Polynomial::from_coeffs_int(&[(1, &[(1, 1)]), (-2, &[])]);
    let f = Formula::exists(
        vec![0, 1],
        Formula::and(vec![Formula::atom(parabola, RelOp::Eq), Formula::atom(level, RelOp::Eq)]),
    );

    let mut cad = Cad::new(&f, &table, LocalCas::new(), CadConfig::default())?;
    cad.project(ProjectionOperator::McCallum)?;
    if let Some(projection) = cad.projection() {
        println!("{}\n", projection.fmt_with(cad.variables()));
    }

    // lift the root, then the section at x = sqrt 2
    cad.lift_path(&[])?;
    let sections = cad.root().children.as_ref().map_or(0, Vec::len);
    println!("root has {} children", sections);
    cad.lift_path(&[sections - 2])?;
    println!("{}", cad.dump_tree());
    println!("truth after two lifts: {:?}", cad.truth());
    Ok(())
}
