//! The seams between the pricing engine and the master-problem solver.
//!
//! The engine never talks to a concrete LP solver. It asks for dual
//! information and pushes new columns through `MasterProblem`, and it reads
//! and prunes the initial model through `MasterModel`. Handles are opaque
//! `ConsId`/`VarId` values chosen by the implementor.

use crate::error::MasterError;
use crate::store::{ConsId, VarId};

/// Operations needed during a pricing round.
///
/// The read operations take `&self` and are called from worker threads while
/// the master is shared immutably, hence the `Sync` bound at the call sites.
/// The mutating operations are serialized by the caller, one call at a time.
pub trait MasterProblem {
    /// Current dual value of a constraint in the feasible LP relaxation.
    fn dual_value(&self, constraint: ConsId) -> Result<f64, MasterError>;

    /// Current Farkas multiplier of a constraint in the infeasible LP relaxation.
    fn farkas_value(&self, constraint: ConsId) -> Result<f64, MasterError>;

    /// Handle of the solver's transformed copy of an original constraint.
    fn transformed_constraint(&self, constraint: ConsId) -> Result<ConsId, MasterError>;

    /// Creates a continuous priced variable. It is not part of the LP until committed.
    fn add_priced_variable(&mut self, name: &str, lower: f64, upper: f64, objective: f64) -> Result<VarId, MasterError>;

    /// Adds `variable` with `coefficient` to a constraint open to new columns.
    fn add_coefficient(&mut self, constraint: ConsId, variable: VarId, coefficient: f64) -> Result<(), MasterError>;

    fn commit_variable(&mut self, variable: VarId) -> Result<(), MasterError>;
}

/// Read and prune access to the original model, used once before solving.
pub trait MasterModel: MasterProblem {
    fn constraints(&self) -> Vec<ConsId>;

    fn constraint_name(&self, constraint: ConsId) -> Result<String, MasterError>;

    /// Variables with a nonzero coefficient in `constraint`, in model order.
    fn constraint_terms(&self, constraint: ConsId) -> Result<Vec<(VarId, f64)>, MasterError>;

    fn variable_name(&self, variable: VarId) -> Result<String, MasterError>;

    fn delete_constraint(&mut self, constraint: ConsId) -> Result<(), MasterError>;

    fn remove_coefficient(&mut self, constraint: ConsId, variable: VarId) -> Result<(), MasterError>;

    /// Marks a constraint as accepting columns created during pricing.
    fn set_modifiable(&mut self, constraint: ConsId) -> Result<(), MasterError>;
}
