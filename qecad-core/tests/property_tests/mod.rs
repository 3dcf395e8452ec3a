//! Property-based tests for qecad-core
//!
//! This module contains property-based tests using proptest to verify the
//! exact zero test and sign oracle at algebraic points, and the
//! decomposition's decisions.

mod cad_properties;
mod zero_test_properties;
