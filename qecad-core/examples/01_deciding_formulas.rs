//! # Deciding Formulas Example
//!
//! This example decides a few prenex formulas over the reals.
//! It covers:
//! - Building formulas over a variable table
//! - Choosing the projection operator
//! - Reading the decision and the engine statistics
//!
//! ## See Also
//! - [`Cad`](qecad_core::Cad)
//! - [`CadConfig`](qecad_core::CadConfig)

use qecad_core::{Cad, CadConfig, Formula, LocalCas, ProjectionOperator, RelOp, VariableTable};
use qecad_math::Polynomial;

fn decide(label: &str, f: &Formula, table: &VariableTable, config: CadConfig) {
    let mut cad = match Cad::new(f, table, LocalCas::new(), config) {
        Ok(cad) => cad,
        Err(e) => {
            println!("{}: rejected ({})", label, e);
            return;
        }
    };
    match cad.solve() {
        Ok(truth) => {
            let stats = cad.stats();
            println!(
                "{}: {:?} ({} cells lifted, {} created, {} pruned)",
                label, truth, stats.cells_lifted, stats.cells_created, stats.cells_pruned
            );
        }
        Err(e) => println!("{}: failed ({:?}: {})", label, e.kind(), e),
    }
}

fn main() {
    println!("=== QeCAD Core: Deciding Formulas ===\n");

    let table = VariableTable::from_names(&["x", "y"]);
    let x = Polynomial::from_var(0);
    let y = Polynomial::from_var(1);

    // forall y exists x. x = y
    let f = Formula::forall(vec![1], Formula::exists(vec![0], Formula::compare(&x, RelOp::Eq, &y)));
    println!("{}", table.fmt_formula(&f));
    decide("forall-exists", &f, &table, CadConfig::default());

    // exists y forall x. x = y
    let g = Formula::exists(vec![1], Formula::forall(vec![0], Formula::compare(&x, RelOp::Eq, &y)));
    println!("{}", table.fmt_formula(&g));
    decide("exists-forall", &g, &table, CadConfig::default());

    // exists x, y. x^2 + y^2 <= 9 and x^2 - 5 > 0
    let disk = Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (1, &[(1, 2)]), (-9, &[])]);
    let band = Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (-5, &[])]);
    let h = Formula::exists(
        vec![0, 1],
        Formula::and(vec![Formula::atom(disk, RelOp::Le), Formula::atom(band, RelOp::Gt)]),
    );
    println!("{}", table.fmt_formula(&h));
    for projection in [ProjectionOperator::McCallum, ProjectionOperator::Hong] {
        for short_circuit in [true, false] {
            let config = CadConfig {
                projection,
                short_circuit,
                ..CadConfig::default()
            };
            decide(
                &format!("disk-band {} short-circuit={}", projection, short_circuit),
                &h,
                &table,
                config,
            );
        }
    }
}
