//! Structural checks on fully lifted decompositions

use qecad_core::cad::CellId;
use qecad_core::{Cad, CadConfig, Formula, LocalCas, ProjectionOperator, RelOp, VariableTable, ZeroTester};
use qecad_math::Polynomial;

fn poly(terms: &[(i64, &[(u32, u32)])]) -> Polynomial {
    Polynomial::from_coeffs_int(terms)
}

fn disk_band() -> Formula {
    Formula::exists(
        vec![0, 1],
        Formula::and(vec![
            Formula::atom(poly(&[(1, &[(0, 2)]), (1, &[(1, 2)]), (-9, &[])]), RelOp::Le),
            Formula::atom(poly(&[(1, &[(0, 2)]), (-5, &[])]), RelOp::Gt),
        ]),
    )
}

fn parabola_line() -> Formula {
    Formula::exists(
        vec![0, 1],
        Formula::and(vec![
            Formula::atom(poly(&[(1, &[(1, 1)]), (-1, &[(0, 2)])]), RelOp::Ge),
            Formula::atom(poly(&[(1, &[(1, 1)]), (-1, &[(0, 1)]), (-2, &[])]), RelOp::Le),
        ]),
    )
}

fn full_cad(f: &Formula, op: ProjectionOperator) -> Cad {
    let table = VariableTable::from_names(&["x", "y"]);
    let config = CadConfig {
        projection: op,
        short_circuit: false,
        ..CadConfig::default()
    };
    let mut cad = Cad::new(f, &table, LocalCas::new(), config).expect("invalid formula");
    cad.solve().expect("solve failed");
    cad
}

fn lifted_cells(cad: &Cad) -> Vec<CellId> {
    let d = cad.decomposition();
    (0..d.len())
        .filter(|&id| d.get_cell(id).is_some_and(|c| c.children.is_some()))
        .collect()
}

#[test]
fn test_signatures_match_sample_points() {
    for f in [disk_band(), parabola_line()] {
        for op in [ProjectionOperator::McCallum, ProjectionOperator::Hong] {
            let cad = full_cad(&f, op);
            let d = cad.decomposition();
            let proj = cad.projection().expect("projected");
            let mut zero = ZeroTester::default_config();
            let mut cas = LocalCas::new();
            for id in 1..d.len() {
                let cell = d.get_cell(id).expect("cell");
                let level = cell.depth - 1;
                let point = d.sample(id);
                for (i, factor) in proj.levels[level].factors.iter().enumerate() {
                    let sign = zero.sign(&factor.poly, &point, &mut cas).expect("sign failed").sign;
                    assert_eq!(
                        cell.signature[i],
                        Some(sign),
                        "factor {} at cell {:?}",
                        factor.poly,
                        d.path(id)
                    );
                }
            }
        }
    }
}

#[test]
fn test_coefficient_links_match_sample_points() {
    let cad = full_cad(&disk_band(), ProjectionOperator::McCallum);
    let d = cad.decomposition();
    let proj = cad.projection().expect("projected");
    let mut zero = ZeroTester::default_config();
    let mut cas = LocalCas::new();
    for id in 1..d.len() {
        let cell = d.get_cell(id).expect("cell");
        if cell.depth >= proj.levels.len() {
            continue;
        }
        let point = d.sample(id);
        for factor in &proj.levels[cell.depth].factors {
            for &(k, link) in &factor.coeff_links {
                let Some(link) = link else {
                    continue;
                };
                let Some(expected) = proj.link(link).eval(|f| d.factor_sign(id, f)) else {
                    continue;
                };
                let c = factor.poly.coeff(factor.var(), k);
                let sign = zero.sign(&c, &point, &mut cas).expect("sign failed").sign;
                assert_eq!(sign, expected, "coefficient {} of {}", k, factor.poly);
            }
        }
    }
}

#[test]
fn test_siblings_are_disjoint_and_sorted() {
    for f in [disk_band(), parabola_line()] {
        let cad = full_cad(&f, ProjectionOperator::McCallum);
        let d = cad.decomposition();
        for id in lifted_cells(&cad) {
            let children = d.get_cell(id).and_then(|c| c.children.clone()).expect("children");
            assert_eq!(children.len() % 2, 1);
            let coords: Vec<_> = children
                .iter()
                .map(|&c| d.get_cell(c).and_then(|c| c.coord.clone()).expect("coord"))
                .collect();
            for w in coords.windows(2) {
                assert!(w[0].lower() <= w[1].lower());
                assert!(w[0].upper() <= w[1].upper());
            }
            let sections: Vec<_> = coords.iter().skip(1).step_by(2).collect();
            for w in sections.windows(2) {
                assert!(w[0].upper() <= w[1].lower(), "{} overlaps {}", w[0], w[1]);
            }
        }
    }
}

#[test]
fn test_short_circuit_preserves_truth() {
    let table = VariableTable::from_names(&["x", "y"]);
    let formulas = vec![
        disk_band(),
        parabola_line(),
        Formula::forall(
            vec![0],
            Formula::exists(
                vec![1],
                Formula::atom(poly(&[(1, &[(1, 2)]), (-1, &[(0, 1)])]), RelOp::Eq),
            ),
        ),
        Formula::exists(
            vec![0],
            Formula::forall(
                vec![1],
                Formula::atom(poly(&[(1, &[(1, 2)]), (-1, &[(0, 1)])]), RelOp::Ge),
            ),
        ),
    ];
    for f in &formulas {
        let mut truths = Vec::new();
        for short_circuit in [true, false] {
            let config = CadConfig {
                short_circuit,
                ..CadConfig::default()
            };
            let mut cad = Cad::new(f, &table, LocalCas::new(), config).expect("invalid formula");
            truths.push(cad.solve().expect("solve failed"));
        }
        assert_eq!(truths[0], truths[1]);
        assert!(truths[0].is_some());
    }
}

#[test]
fn test_dump_and_display() {
    let cad = full_cad(&disk_band(), ProjectionOperator::McCallum);
    let dump = cad.dump_tree();
    assert_eq!(dump.lines().count(), cad.decomposition().len());
    let shown = cad.to_string();
    assert!(shown.contains("root"));
}
