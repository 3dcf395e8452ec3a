//! Property-based tests for polynomial arithmetic

use num_bigint::BigInt;
use num_rational::BigRational;
use proptest::prelude::*;
use qecad_math::polynomial::*;
use rustc_hash::FxHashMap;

/// Strategy for small coefficients
fn coeff_strategy() -> impl Strategy<Value = i64> {
    -6i64..6i64
}

/// Strategy for a polynomial in x0 and x1 of degree at most 2 in each
fn poly_strategy() -> impl Strategy<Value = Polynomial> {
    prop::collection::vec((coeff_strategy(), 0u32..3, 0u32..3), 1..5).prop_map(|terms| {
        let mut p = Polynomial::zero();
        for (c, d0, d1) in terms {
            let t = Polynomial::from_coeffs_int(&[(c, &[(0, d0), (1, d1)])]);
            p = &p + &t;
        }
        p
    })
}

fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

fn at(x0: i64, x1: i64) -> FxHashMap<Var, BigRational> {
    let mut a = FxHashMap::default();
    a.insert(0, rat(x0));
    a.insert(1, rat(x1));
    a
}

proptest! {
    /// Evaluation is a ring homomorphism
    #[test]
    fn eval_respects_arithmetic(p in poly_strategy(), q in poly_strategy(), x0 in -4i64..4, x1 in -4i64..4) {
        let a = at(x0, x1);
        let pv = p.eval(&a).expect("total assignment");
        let qv = q.eval(&a).expect("total assignment");
        prop_assert_eq!((&p + &q).eval(&a), Some(&pv + &qv));
        prop_assert_eq!((&p * &q).eval(&a), Some(&pv * &qv));
        prop_assert_eq!((&p - &q).eval(&a), Some(&pv - &qv));
    }

    /// Multiplication distributes over addition
    #[test]
    fn mul_distributes(p in poly_strategy(), q in poly_strategy(), r in poly_strategy()) {
        let lhs = &p * &(&q + &r);
        let rhs = &(&p * &q) + &(&p * &r);
        prop_assert_eq!(lhs, rhs);
    }

    /// Substituting a value for a variable commutes with evaluation
    #[test]
    fn eval_at_then_eval(p in poly_strategy(), x0 in -4i64..4, x1 in -4i64..4) {
        let partial = p.eval_at(0, &rat(x0));
        prop_assert!(!partial.contains_var(0));
        prop_assert_eq!(partial.eval(&at(x0, x1)), p.eval(&at(x0, x1)));
    }

    /// Derivative of a product follows the Leibniz rule
    #[test]
    fn derivative_leibniz(p in poly_strategy(), q in poly_strategy()) {
        let lhs = (&p * &q).derivative(0);
        let rhs = &(&p.derivative(0) * &q) + &(&p * &q.derivative(0));
        prop_assert_eq!(lhs, rhs);
    }

    /// Coefficients in a variable reassemble the polynomial
    #[test]
    fn coefficients_reassemble(p in poly_strategy()) {
        let coeffs = p.coefficients(1);
        let back = Polynomial::from_coefficients(1, &coeffs);
        prop_assert_eq!(back, p);
    }
}
