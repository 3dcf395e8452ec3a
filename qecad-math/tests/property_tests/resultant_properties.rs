//! Property-based tests for subresultants, resultants and discriminants

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Signed;
use proptest::prelude::*;
use qecad_math::polynomial::Polynomial;
use qecad_math::polynomial::gcd::gcd;
use qecad_math::polynomial::resultant::{discriminant, psc, resultant};

fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// x0 - a
fn linear(a: i64) -> Polynomial {
    Polynomial::from_coeffs_int(&[(1, &[(0, 1)]), (-a, &[])])
}

fn univariate_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(-5i64..5, 1..5)
}

fn from_ints(coeffs: &[i64]) -> Polynomial {
    let rats: Vec<BigRational> = coeffs.iter().map(|&c| rat(c)).collect();
    Polynomial::univariate(0, &rats)
}

proptest! {
    /// Res(x - a, q) = +-q(a)
    #[test]
    fn resultant_with_linear_evaluates(a in -4i64..4, q in univariate_strategy()) {
        let q = from_ints(&q);
        prop_assume!(q.degree(0) >= 1);
        let r = resultant(&linear(a), &q, 0).expect("resultant failed");
        prop_assert!(r.is_zero() || r.is_constant());
        let value = r.constant_value();
        let expected = q.eval_at(0, &rat(a)).constant_value();
        prop_assert_eq!(value.abs(), expected.abs());
    }

    /// The first non-vanishing principal subresultant coefficient sits at
    /// the degree of the gcd
    #[test]
    fn psc_detects_gcd_degree(p in univariate_strategy(), q in univariate_strategy()) {
        let p = from_ints(&p);
        let q = from_ints(&q);
        prop_assume!(p.degree(0) >= 1 && q.degree(0) >= 1);
        let g = gcd(&p, &q).expect("gcd failed");
        let k = p.degree(0).min(q.degree(0));
        let first = (0..=k)
            .find(|&j| !psc(&p, &q, 0, j).expect("psc failed").is_zero())
            .expect("top coefficient is non-zero");
        prop_assert_eq!(first, g.degree(0));
    }

    /// Swapping the arguments changes the sign by (-1)^(deg p deg q)
    #[test]
    fn resultant_antisymmetry(p in univariate_strategy(), q in univariate_strategy()) {
        let p = from_ints(&p);
        let q = from_ints(&q);
        prop_assume!(p.degree(0) >= 1 && q.degree(0) >= 1);
        let pq = resultant(&p, &q, 0).expect("resultant failed");
        let qp = resultant(&q, &p, 0).expect("resultant failed");
        if (p.degree(0) * q.degree(0)) % 2 == 0 {
            prop_assert_eq!(pq, qp);
        } else {
            prop_assert_eq!(pq, qp.neg());
        }
    }

    /// Polynomials with a shared root have a vanishing resultant
    #[test]
    fn shared_root_kills_resultant(a in -4i64..4, b in -4i64..4, c in -4i64..4) {
        let p = &linear(a) * &linear(b);
        let q = &linear(a) * &linear(c);
        prop_assert!(resultant(&p, &q, 0).expect("resultant failed").is_zero());
    }

    /// A product of two linear factors has a vanishing discriminant exactly
    /// when the roots coincide
    #[test]
    fn discriminant_detects_double_root(a in -4i64..4, b in -4i64..4) {
        let p = &linear(a) * &linear(b);
        let d = discriminant(&p, 0).expect("discriminant failed");
        prop_assert_eq!(d.is_zero(), a == b);
    }

    /// Resultants in x1 eliminate x1
    #[test]
    fn resultant_eliminates(a in -3i64..3, b in 1i64..4) {
        // x1 - a x0 and x1^2 - b
        let p = Polynomial::from_coeffs_int(&[(1, &[(1, 1)]), (-a, &[(0, 1)])]);
        let q = Polynomial::from_coeffs_int(&[(1, &[(1, 2)]), (-b, &[])]);
        let r = resultant(&p, &q, 1).expect("resultant failed");
        prop_assert!(!r.contains_var(1));
    }
}
