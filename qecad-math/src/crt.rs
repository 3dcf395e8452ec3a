//! Chinese Remaindering and Rational Reconstruction
//!
//! [`CrtAccumulator`] combines sparse images of one polynomial modulo
//! distinct primes into residues modulo the product of those primes, and
//! reconstructs rational coefficients with Wang's algorithm. A
//! reconstruction that a further prime reproduces unchanged is reported as
//! stable.
//!
//! ## References
//!
//! - Wang, Guy and Davenport, "p-adic Reconstruction of Rational Numbers"
//!   (1982)
//! - Monagan, "Maximal Quotient Rational Reconstruction" (2004)

use crate::polynomial::{Monomial, MonomialOrder, Polynomial, Term};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use rustc_hash::FxHashMap;
use tracing::trace;

/// Incremental CRT state for one polynomial.
#[derive(Debug, Clone)]
pub struct CrtAccumulator {
    modulus: BigInt,
    residues: FxHashMap<Monomial, BigInt>,
    last: Option<Polynomial>,
    agreements: u32,
    primes_used: u32,
}

impl Default for CrtAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl CrtAccumulator {
    /// An empty accumulator.
    pub fn new() -> Self {
        Self {
            modulus: BigInt::one(),
            residues: FxHashMap::default(),
            last: None,
            agreements: 0,
            primes_used: 0,
        }
    }

    /// Number of images combined so far.
    pub fn primes_used(&self) -> u32 {
        self.primes_used
    }

    /// Product of the primes combined so far.
    pub fn modulus(&self) -> &BigInt {
        &self.modulus
    }

    /// Combine the image of the polynomial modulo `prime`.
    ///
    /// Returns the reconstruction when it is stable: the previous
    /// reconstruction already agreed with this image.
    pub fn add_image(&mut self, prime: u64, image: &[(Monomial, u64)]) -> Option<Polynomial> {
        let agrees = self
            .last
            .as_ref()
            .is_some_and(|prev| reduces_to(prev, prime, image));
        if agrees {
            self.agreements += 1;
        } else {
            self.agreements = 0;
        }

        let p = BigInt::from(prime);
        let m_inv = mod_inverse(&self.modulus.mod_floor(&p), &p);
        let mut keys: Vec<Monomial> = self.residues.keys().cloned().collect();
        for (mono, _) in image {
            if !self.residues.contains_key(mono) {
                keys.push(mono.clone());
            }
        }
        let image_map: FxHashMap<&Monomial, u64> = image.iter().map(|(m, c)| (m, *c)).collect();
        let mut next = FxHashMap::default();
        for mono in keys {
            let a = self.residues.get(&mono).cloned().unwrap_or_else(BigInt::zero);
            let b = BigInt::from(image_map.get(&mono).copied().unwrap_or(0));
            // x = a + M * ((b - a) * M^-1 mod p)
            let t = ((&b - &a) * &m_inv).mod_floor(&p);
            let x = &a + &self.modulus * t;
            if !x.is_zero() {
                next.insert(mono, x);
            }
        }
        self.modulus *= &p;
        self.residues = next;
        self.primes_used += 1;

        let rec = self.reconstruct();
        if self.agreements > 0 && rec.is_some() && rec == self.last {
            trace!(primes = self.primes_used, "CRT reconstruction stable");
            return rec;
        }
        self.last = rec;
        None
    }

    /// Rational reconstruction of every residue.
    pub fn reconstruct(&self) -> Option<Polynomial> {
        let mut terms = Vec::with_capacity(self.residues.len());
        for (mono, r) in &self.residues {
            let c = rational_reconstruction(r, &self.modulus)?;
            terms.push(Term::new(c, mono.clone()));
        }
        Some(Polynomial::from_terms(terms, MonomialOrder::default()))
    }
}

/// Whether `poly` reduces modulo `prime` to exactly `image`.
pub fn reduces_to(poly: &Polynomial, prime: u64, image: &[(Monomial, u64)]) -> bool {
    let p = BigInt::from(prime);
    let mut expected: FxHashMap<&Monomial, u64> = FxHashMap::default();
    for (m, c) in image {
        if *c != 0 {
            expected.insert(m, *c);
        }
    }
    let mut seen = 0;
    for t in poly.terms() {
        let den = t.coeff.denom().mod_floor(&p);
        if den.is_zero() {
            return false;
        }
        let num = t.coeff.numer().mod_floor(&p);
        let c = (num * mod_inverse(&den, &p)).mod_floor(&p);
        let Some(c) = num_traits::ToPrimitive::to_u64(&c) else {
            return false;
        };
        if c == 0 {
            continue;
        }
        if expected.get(&t.monomial) != Some(&c) {
            return false;
        }
        seen += 1;
    }
    seen == expected.len()
}

/// Wang's rational reconstruction of `u` modulo `m`.
///
/// Finds `n / d` with `n = d u (mod m)` and `|n|, d <= sqrt(m / 2)`.
pub fn rational_reconstruction(u: &BigInt, m: &BigInt) -> Option<BigRational> {
    let bound = (m / BigInt::from(2)).sqrt();
    let (mut r0, mut r1) = (m.clone(), u.mod_floor(m));
    let (mut t0, mut t1) = (BigInt::zero(), BigInt::one());
    while r1 > bound {
        let q = &r0 / &r1;
        let r2 = &r0 - &q * &r1;
        let t2 = &t0 - &q * &t1;
        r0 = std::mem::replace(&mut r1, r2);
        t0 = std::mem::replace(&mut t1, t2);
    }
    if t1.is_zero() || t1.abs() > bound || !r1.gcd(&t1).is_one() {
        return None;
    }
    Some(BigRational::new(r1, t1))
}

fn mod_inverse(a: &BigInt, p: &BigInt) -> BigInt {
    let e = a.extended_gcd(p);
    e.x.mod_floor(p)
}
