//! Property-based tests for decisions of the decomposition

use proptest::prelude::*;
use qecad_core::{Cad, CadConfig, Formula, LocalCas, ProjectionOperator, RelOp, VariableTable};
use qecad_math::Polynomial;

fn op_strategy() -> impl Strategy<Value = RelOp> {
    prop_oneof![
        Just(RelOp::Lt),
        Just(RelOp::Le),
        Just(RelOp::Gt),
        Just(RelOp::Ge),
        Just(RelOp::Eq),
        Just(RelOp::Ne),
    ]
}

fn quantify(exists: bool, var: u32, body: Formula) -> Formula {
    if exists {
        Formula::exists(vec![var], body)
    } else {
        Formula::forall(vec![var], body)
    }
}

fn decide(f: &Formula, names: &[&str], config: CadConfig) -> Option<bool> {
    let table = VariableTable::from_names(names);
    let mut cad = Cad::new(f, &table, LocalCas::new(), config).expect("invalid formula");
    cad.solve().expect("solve failed")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// exists x. a x^2 + b x + c = 0 matches the discriminant criterion
    #[test]
    fn quadratic_has_root(a in -3i64..3, b in -3i64..3, c in -3i64..3) {
        prop_assume!(a != 0 || b != 0 || c != 0);
        let p = Polynomial::from_coeffs_int(&[(a, &[(0, 2)]), (b, &[(0, 1)]), (c, &[])]);
        let f = Formula::exists(vec![0], Formula::atom(p, RelOp::Eq));
        let expected = if a != 0 { b * b - 4 * a * c >= 0 } else { b != 0 };
        prop_assert_eq!(decide(&f, &["x"], CadConfig::default()), Some(expected));
    }

    /// forall x. a x^2 + b x + c > 0 matches positive definiteness
    #[test]
    fn quadratic_positive(a in -3i64..3, b in -3i64..3, c in -3i64..3) {
        let p = Polynomial::from_coeffs_int(&[(a, &[(0, 2)]), (b, &[(0, 1)]), (c, &[])]);
        let f = Formula::forall(vec![0], Formula::atom(p, RelOp::Gt));
        let expected = if a != 0 {
            a > 0 && b * b - 4 * a * c < 0
        } else {
            b == 0 && c > 0
        };
        prop_assert_eq!(decide(&f, &["x"], CadConfig::default()), Some(expected));
    }

    /// Disabling the quantifier short-circuit never changes the decision
    #[test]
    fn short_circuit_is_transparent(
        outer in any::<bool>(),
        inner in any::<bool>(),
        a in -2i64..3,
        b in -2i64..3,
        c in -2i64..3,
        op in op_strategy(),
    ) {
        // Q x Q' y. y^2 + a x y + b x + c op 0
        let p = Polynomial::from_coeffs_int(&[
            (1, &[(1, 2)]),
            (a, &[(0, 1), (1, 1)]),
            (b, &[(0, 1)]),
            (c, &[]),
        ]);
        let f = quantify(outer, 0, quantify(inner, 1, Formula::atom(p, op)));
        let on = decide(&f, &["x", "y"], CadConfig::default());
        let off = decide(
            &f,
            &["x", "y"],
            CadConfig {
                short_circuit: false,
                ..CadConfig::default()
            },
        );
        prop_assert!(on.is_some());
        prop_assert_eq!(on, off);
    }

    /// McCallum and Hong projection reach the same decision
    #[test]
    fn operators_agree(
        outer in any::<bool>(),
        a in -2i64..3,
        b in -2i64..3,
        op in op_strategy(),
    ) {
        // Q x exists y. x y^2 + a y + b op 0
        let p = Polynomial::from_coeffs_int(&[(1, &[(0, 1), (1, 2)]), (a, &[(1, 1)]), (b, &[])]);
        let f = quantify(outer, 0, Formula::exists(vec![1], Formula::atom(p, op)));
        let mut truths = Vec::new();
        for projection in [ProjectionOperator::McCallum, ProjectionOperator::Hong] {
            let config = CadConfig {
                projection,
                ..CadConfig::default()
            };
            truths.push(decide(&f, &["x", "y"], config));
        }
        prop_assert!(truths[0].is_some());
        prop_assert_eq!(truths[0], truths[1]);
    }
}
