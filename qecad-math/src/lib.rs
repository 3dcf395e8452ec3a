//! QeCAD Math - exact arithmetic substrate for cylindrical algebraic decomposition.
//!
//! This crate provides the algebraic building blocks consumed by the CAD
//! engine in `qecad-core`:
//! - Sparse multivariate polynomials over the rationals ([`polynomial`])
//! - Subresultants, resultants and discriminants
//! - Square-free and coprime factorisation, multivariate GCD
//! - Real root isolation by Descartes' rule of signs
//! - Rational interval arithmetic with binary outward rounding ([`interval`])
//! - Finite field arithmetic over towers of extensions ([`modular`])
//! - Chinese remaindering with rational reconstruction ([`crt`])
//! - Gröbner bases ([`grobner`])
//!
//! # Examples
//!
//! ```
//! use qecad_math::polynomial::Polynomial;
//!
//! // p = x0^2 - 2
//! let p = Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (-2, &[])]);
//! let roots = qecad_math::polynomial::root_isolation::isolate_real_roots(&p, 0)
//!     .expect("univariate");
//! assert_eq!(roots.len(), 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod crt;
pub mod error;
pub mod grobner;
pub mod interval;
pub mod modular;
pub mod polynomial;

pub use error::{MathError, MathResult};
pub use interval::Interval;
pub use polynomial::{Monomial, MonomialOrder, NULL_VAR, Polynomial, Term, Var, VarPower};
