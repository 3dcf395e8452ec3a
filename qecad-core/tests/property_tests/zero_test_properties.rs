//! Property-based tests for the zero test on small towers

use num_bigint::BigInt;
use num_rational::BigRational;
use proptest::prelude::*;
use qecad_core::cad::{AlgebraicCoord, Coordinate, SamplePoint, Sign, ZeroTester};
use qecad_core::LocalCas;
use qecad_math::Polynomial;
use std::cmp::Ordering;

fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// The positive root of x^2 - k in variable `var`, isolated in (lo, hi)
fn root(var: u32, k: i64, lo: i64, hi: i64) -> Coordinate {
    let coeffs = vec![rat(-k), rat(0), rat(1)];
    Coordinate::Algebraic(AlgebraicCoord::new(
        Polynomial::univariate(var, &coeffs),
        coeffs,
        rat(lo),
        rat(hi),
    ))
}

/// Exact sign of r + b sqrt(k)
fn sign_with_surd(r: i64, b: i64, k: i64) -> Sign {
    let s = |n: i64| Sign::from(n.cmp(&0));
    if b == 0 {
        return s(r);
    }
    if r == 0 || r.signum() == b.signum() {
        return s(if r == 0 { b } else { r });
    }
    match (r * r).cmp(&(k * b * b)) {
        Ordering::Greater => s(r),
        _ => s(b),
    }
}

proptest! {
    /// a + b x0 + c x0^2 vanishes at sqrt 2 iff a + 2c = 0 and b = 0
    #[test]
    fn zero_test_sqrt2(a in -6i64..6, b in -3i64..3, c in -3i64..3) {
        let p = Polynomial::from_coeffs_int(&[(a, &[]), (b, &[(0, 1)]), (c, &[(0, 2)])]);
        let point = SamplePoint::new(vec![root(0, 2, 1, 2)]);
        let mut zero = ZeroTester::default_config();
        let result = zero.is_zero(&p, &point, &mut LocalCas::new()).expect("zero test failed");
        prop_assert_eq!(result.vanishes, a + 2 * c == 0 && b == 0);
    }

    /// The sign oracle agrees with exact arithmetic in Q(sqrt 2)
    #[test]
    fn sign_sqrt2(a in -6i64..6, b in -3i64..3, c in -3i64..3) {
        let p = Polynomial::from_coeffs_int(&[(a, &[]), (b, &[(0, 1)]), (c, &[(0, 2)])]);
        let point = SamplePoint::new(vec![root(0, 2, 1, 2)]);
        let mut zero = ZeroTester::default_config();
        let result = zero.sign(&p, &point, &mut LocalCas::new()).expect("sign failed");
        prop_assert_eq!(result.sign, sign_with_surd(a + 2 * c, b, 2));
    }

    /// a + b x0 x1 + c x1^2 at (sqrt 2, sqrt 3) is a + 3c + b sqrt 6
    #[test]
    fn zero_test_two_levels(a in -9i64..9, b in -2i64..2, c in -3i64..3) {
        let p = Polynomial::from_coeffs_int(&[(a, &[]), (b, &[(0, 1), (1, 1)]), (c, &[(1, 2)])]);
        let point = SamplePoint::new(vec![root(0, 2, 1, 2), root(1, 3, 1, 2)]);
        let mut zero = ZeroTester::default_config();
        let mut cas = LocalCas::new();
        let result = zero.is_zero(&p, &point, &mut cas).expect("zero test failed");
        prop_assert_eq!(result.vanishes, a + 3 * c == 0 && b == 0);
        let sign = zero.sign(&p, &point, &mut cas).expect("sign failed");
        prop_assert_eq!(sign.sign, sign_with_surd(a + 3 * c, b, 6));
    }

    /// A dependent tower: x1 - x0 vanishes at (sqrt 2, sqrt 2) but x1 + x0 does not
    #[test]
    fn zero_test_dependent_tower(k in 1i64..4) {
        let x0 = Polynomial::from_var(0);
        let x1 = Polynomial::from_var(1);
        let point = SamplePoint::new(vec![root(0, 2, 1, 2), root(1, 2, 1, 2)]);
        let mut zero = ZeroTester::default_config();
        let mut cas = LocalCas::new();
        let diff = (&x1 - &x0).scale(&rat(k));
        let sum = (&x1 + &x0).scale(&rat(k));
        prop_assert!(zero.is_zero(&diff, &point, &mut cas).expect("zero test failed").vanishes);
        prop_assert!(!zero.is_zero(&sum, &point, &mut cas).expect("zero test failed").vanishes);
    }
}
