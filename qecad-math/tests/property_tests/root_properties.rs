//! Property-based tests for real root isolation

use num_bigint::BigInt;
use num_rational::BigRational;
use proptest::prelude::*;
use qecad_math::polynomial::Polynomial;
use qecad_math::polynomial::root_isolation::{IsolatedRoot, bisect, isolate_real_roots, isolate_square_free, sign_at};
use std::collections::BTreeSet;

fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// Product of (x0 - r) over distinct roots, times x0^2 - 2
fn with_roots(roots: &BTreeSet<i64>) -> Polynomial {
    let mut p = Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (-2, &[])]);
    for &r in roots {
        p = &p * &Polynomial::from_coeffs_int(&[(1, &[(0, 1)]), (-r, &[])]);
    }
    p
}

fn roots_strategy() -> impl Strategy<Value = BTreeSet<i64>> {
    prop::collection::btree_set(-6i64..6, 0..4)
}

proptest! {
    /// Every root is found, once
    #[test]
    fn isolation_counts_roots(roots in roots_strategy()) {
        let p = with_roots(&roots);
        let coeffs = p.univariate_coeffs(0).expect("univariate");
        let intervals = isolate_square_free(&coeffs);
        prop_assert_eq!(intervals.len(), roots.len() + 2);
    }

    /// Isolating intervals are sorted, disjoint, and bracket a sign change
    #[test]
    fn isolation_intervals_disjoint(roots in roots_strategy()) {
        let p = with_roots(&roots);
        let coeffs = p.univariate_coeffs(0).expect("univariate");
        let intervals = isolate_square_free(&coeffs);
        for (lo, hi) in &intervals {
            prop_assert!(lo < hi);
            prop_assert_ne!(sign_at(&coeffs, lo), sign_at(&coeffs, hi));
        }
        for w in intervals.windows(2) {
            prop_assert!(w[0].1 <= w[1].0);
        }
    }

    /// Bisection keeps the root
    #[test]
    fn bisection_keeps_sign_change(roots in roots_strategy(), steps in 1usize..6) {
        let p = with_roots(&roots);
        let coeffs = p.univariate_coeffs(0).expect("univariate");
        for (mut lo, mut hi) in isolate_square_free(&coeffs) {
            let width = &hi - &lo;
            for _ in 0..steps {
                let (l, h) = bisect(&coeffs, &lo, &hi);
                lo = l;
                hi = h;
            }
            prop_assert!(&hi - &lo < width);
            prop_assert_ne!(sign_at(&coeffs, &lo), sign_at(&coeffs, &hi));
        }
    }

    /// Rational roots are reported exactly, in increasing order
    #[test]
    fn exact_roots_reported(roots in roots_strategy()) {
        let p = with_roots(&roots);
        let isolated = isolate_real_roots(&p, 0).expect("isolation failed");
        let exact: Vec<BigRational> = isolated
            .iter()
            .filter(|r| matches!(r, IsolatedRoot::Exact(_)))
            .map(|r| r.lower().clone())
            .collect();
        let expected: Vec<BigRational> = roots.iter().map(|&r| rat(r)).collect();
        prop_assert_eq!(exact, expected);
        for w in isolated.windows(2) {
            prop_assert!(w[0].upper() <= w[1].lower());
        }
    }
}
