//! Property-based tests for Chinese remaindering

use num_bigint::BigInt;
use num_rational::BigRational;
use proptest::prelude::*;
use qecad_math::crt::{CrtAccumulator, reduces_to};
use qecad_math::modular::{ModPoly, Moder, primes};
use qecad_math::polynomial::{Monomial, MonomialOrder, Polynomial, Term};

/// Polynomials in x0, x1 with small rational coefficients
fn poly_strategy() -> impl Strategy<Value = Polynomial> {
    prop::collection::vec((-1000i64..1000, 1i64..12, 0u32..3, 0u32..3), 1..6).prop_map(|terms| {
        let terms = terms.into_iter().map(|(n, d, d0, d1)| {
            Term::new(
                BigRational::new(BigInt::from(n), BigInt::from(d)),
                Monomial::from_powers([(0, d0), (1, d1)]),
            )
        });
        Polynomial::from_terms(terms, MonomialOrder::default())
    })
}

fn image(p: &Polynomial, prime: u64) -> Vec<(Monomial, u64)> {
    ModPoly::from_polynomial(p, &Moder::new(prime))
        .expect("denominators are below every table prime")
        .to_image()
}

proptest! {
    /// Reconstruction from lucky images returns the polynomial, and the
    /// result reduces to every image it was built from
    #[test]
    fn crt_round_trip(p in poly_strategy()) {
        let mut acc = CrtAccumulator::new();
        let mut used = Vec::new();
        let mut result = None;
        for &prime in primes().iter().take(16) {
            let img = image(&p, prime);
            used.push((prime, img.clone()));
            if let Some(rec) = acc.add_image(prime, &img) {
                result = Some(rec);
                break;
            }
        }
        let rec = result.expect("reconstruction did not stabilise");
        prop_assert_eq!(&rec, &p);
        for (prime, img) in &used {
            prop_assert!(reduces_to(&rec, *prime, img));
        }
        prop_assert_eq!(acc.primes_used() as usize, used.len());
    }

    /// A different polynomial does not reduce to the same image
    #[test]
    fn reduces_to_rejects_other(p in poly_strategy(), shift in 1i64..50) {
        let prime = primes()[0];
        let q = &p + &Polynomial::from_int(shift);
        prop_assert!(!reduces_to(&q, prime, &image(&p, prime)));
    }
}
