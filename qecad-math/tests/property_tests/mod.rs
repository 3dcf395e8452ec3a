//! Property-based tests for qecad-math
//!
//! This module contains property tests for:
//! - Polynomial arithmetic
//! - Subresultants, resultants and discriminants
//! - Real root isolation
//! - Interval enclosures
//! - Chinese remaindering

mod crt_properties;
mod interval_properties;
mod polynomial_properties;
mod resultant_properties;
mod root_properties;
