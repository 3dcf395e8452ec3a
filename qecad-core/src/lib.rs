//! QeCAD Core - cylindrical algebraic decomposition for real quantifier
//! elimination.
//!
//! This crate decides prenex first-order formulas over the reals:
//! - Formulas over polynomial sign conditions and a variable table ([`formula`])
//! - The computer algebra capability the engine consumes ([`backend`])
//! - McCallum and Hong projection, lifting, and the exact zero test at
//!   algebraic sample points ([`cad`])
//!
//! # Examples
//!
//! ```
//! use qecad_core::{Cad, CadConfig, Formula, LocalCas, RelOp, VariableTable};
//! use qecad_math::Polynomial;
//!
//! // forall y exists x. x = y
//! let table = VariableTable::from_names(&["x", "y"]);
//! let eq = Formula::compare(&Polynomial::from_var(0), RelOp::Eq, &Polynomial::from_var(1));
//! let f = Formula::forall(vec![1], Formula::exists(vec![0], eq));
//!
//! let mut cad = Cad::new(&f, &table, LocalCas::new(), CadConfig::default()).unwrap();
//! assert_eq!(cad.solve().unwrap(), Some(true));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod cad;
pub mod error;
pub mod formula;

pub use backend::{CasBackend, CasError, CasResult, LocalCas, LocalCasStats};
pub use cad::{
    Cad, CadConfig, CadStats, Cell, CellDecomposition, CellId, Coordinate, LiftingConfig,
    ProjFactor, Projection, ProjectionOperator, SamplePoint, Sign, ZeroTestConfig, ZeroTester,
};
pub use error::{CadError, ErrorKind, Result};
pub use formula::{Formula, Quantifier, RelOp, VariableTable};
