//! Error type for the arithmetic substrate.

use thiserror::Error;

/// Errors raised by polynomial and modular arithmetic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    /// Division by a zero polynomial or zero scalar.
    #[error("division by zero")]
    DivisionByZero,
    /// An exact division left a non-zero remainder.
    #[error("inexact division: {0}")]
    NotExact(String),
    /// An argument violated a documented precondition.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for arithmetic operations.
pub type MathResult<T> = Result<T, MathError>;
