//! Error types for CAD construction.

use crate::backend::CasError;
use qecad_math::{MathError, Var};
use thiserror::Error;

/// Errors raised while building or lifting a decomposition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CadError {
    /// The quantifier prefix cannot be turned into contiguous level blocks.
    #[error("malformed quantifier prefix: {0}")]
    MalformedPrefix(String),
    /// A quantifier occurs below a connective.
    #[error("formula is not in prenex form: {0}")]
    NonPrenex(String),
    /// A polynomial mentions a variable the table does not define.
    #[error("unknown variable x{0}")]
    UnknownVariable(Var),
    /// A lift path or level does not address an existing cell.
    #[error("invalid cell index: {0}")]
    InvalidIndex(String),
    /// The prime table or the precision budget ran out before a decision.
    #[error("inconclusive: {0}")]
    Inconclusive(String),
    /// A McCallum projection factor vanished identically over a cell of
    /// positive dimension.
    #[error("projection factor {factor} at level {level} is nullified; McCallum projection is not well oriented")]
    NotWellOriented {
        /// Level of the nullified factor.
        level: usize,
        /// The factor, printed.
        factor: String,
    },
    /// The computer algebra backend failed.
    #[error("CAS backend error: {0}")]
    Backend(#[from] CasError),
    /// Local polynomial arithmetic failed.
    #[error(transparent)]
    Math(#[from] MathError),
}

/// Coarse classification of [`CadError`] for callers deciding on a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input; retrying cannot help.
    Input,
    /// Resource exhaustion in the algebraic number machinery.
    Inconclusive,
    /// The backend failed.
    Backend,
    /// Internal signal or arithmetic failure.
    Internal,
}

impl CadError {
    /// The error's class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CadError::MalformedPrefix(_)
            | CadError::NonPrenex(_)
            | CadError::UnknownVariable(_)
            | CadError::InvalidIndex(_) => ErrorKind::Input,
            CadError::Inconclusive(_) => ErrorKind::Inconclusive,
            CadError::Backend(_) => ErrorKind::Backend,
            CadError::NotWellOriented { .. } | CadError::Math(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for CAD operations.
pub type Result<T> = std::result::Result<T, CadError>;
