//! Property-based tests for interval enclosures

use num_bigint::BigInt;
use num_rational::BigRational;
use proptest::prelude::*;
use qecad_math::interval::{Interval, simplest_between};
use qecad_math::polynomial::Polynomial;
use rustc_hash::FxHashMap;

fn ratio(n: i64, d: i64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(d))
}

fn poly_strategy() -> impl Strategy<Value = Polynomial> {
    prop::collection::vec((-5i64..5, 0u32..4, 0u32..3), 1..5).prop_map(|terms| {
        let mut p = Polynomial::zero();
        for (c, d0, d1) in terms {
            p = &p + &Polynomial::from_coeffs_int(&[(c, &[(0, d0), (1, d1)])]);
        }
        p
    })
}

proptest! {
    /// The enclosure of p over a box contains p at every point of the box
    #[test]
    fn eval_poly_encloses(
        p in poly_strategy(),
        lo0 in -8i64..8, w0 in 0i64..6, t0 in 0i64..=4,
        lo1 in -8i64..8, w1 in 0i64..6, t1 in 0i64..=4,
        prec in 4u32..40,
    ) {
        let (a0, b0) = (ratio(lo0, 2), ratio(lo0 + w0, 2));
        let (a1, b1) = (ratio(lo1, 3), ratio(lo1 + w1, 3));
        let x0 = &a0 + (&b0 - &a0) * ratio(t0, 4);
        let x1 = &a1 + (&b1 - &a1) * ratio(t1, 4);
        let mut bounds = FxHashMap::default();
        bounds.insert(0, Interval::new(a0, b0));
        bounds.insert(1, Interval::new(a1, b1));
        let enclosure = Interval::eval_poly(&p, &bounds, prec).expect("bounded");
        let mut point = FxHashMap::default();
        point.insert(0, x0);
        point.insert(1, x1);
        let value = p.eval(&point).expect("total assignment");
        prop_assert!(enclosure.contains(&value));
    }

    /// Outward rounding only widens
    #[test]
    fn round_outward_contains(n in -1000i64..1000, d in 1i64..97, prec in 1u32..20) {
        let x = ratio(n, d);
        let rounded = Interval::point(x.clone()).round_outward(prec);
        prop_assert!(rounded.contains(&x));
    }

    /// The simplest rational lies strictly inside
    #[test]
    fn simplest_between_is_inside(n in -500i64..500, w in 1i64..50, d in 1i64..40) {
        let lo = ratio(n, d);
        let hi = ratio(n + w, d);
        let s = simplest_between(&lo, &hi);
        prop_assert!(lo < s && s < hi);
    }
}
