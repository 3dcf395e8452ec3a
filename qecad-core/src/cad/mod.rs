//! Cylindrical algebraic decomposition.
//!
//! - Projection factors and the sign links between them ([`projection`],
//!   [`proj_link`])
//! - Sample points over real algebraic numbers ([`sample`])
//! - The cell arena ([`cell_decomposition`])
//! - Modular arithmetic over a tower of extensions ([`cellmod`])
//! - The exact zero test at algebraic points ([`zero_test`])
//! - Lifting one cell into a stack ([`lifting`])
//! - The driver tying them together ([`cad_solver`])

pub mod cad_solver;
pub mod cell_decomposition;
pub mod cellmod;
pub mod lifting;
pub mod proj_link;
pub mod projection;
pub mod sample;

pub use cad_solver::{Cad, CadConfig, CadStats};
pub use cell_decomposition::{Cell, CellDecomposition, CellId, ChildCell, DecompositionStats};
pub use cellmod::{Cellmod, ZeroDivisor};
pub use lifting::{LiftInput, LiftedStack, LiftingConfig, LiftingEngine, LiftingStats};
pub use proj_link::{
    FactorRef, LINK_NEGATIVE, LINK_POSITIVE, LINK_ZERO, LinkId, LinkTable, ProjLink, Sign,
};
pub use projection::{
    FactorOrigin, ProjFactor, ProjFactorSet, Projection, ProjectionConfig, ProjectionEngine,
    ProjectionOperator, ProjectionStats,
};
pub use sample::{AlgebraicCoord, Coordinate, SamplePoint};
pub use zero_test::{SignTest, ZeroTest, ZeroTestConfig, ZeroTestStats, ZeroTester};
