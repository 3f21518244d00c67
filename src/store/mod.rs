//! Shared data for one solve: constraints, networks and the indices between them.
pub mod registry;
pub mod types;

pub use registry::Registry;
pub use types::{ConsId, Constraint, ConstraintCoef, ConstraintCoefs, VarId};
