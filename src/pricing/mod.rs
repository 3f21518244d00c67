//! Column generation over the registered networks.
pub mod master;
pub mod pricer;
pub mod strategy;

#[cfg(test)]
pub(crate) mod mock;

pub use master::{MasterModel, MasterProblem};
pub use pricer::{column_name, Pricer, PricerState, PricingKind, PricingStatus, RoundOutcome};
pub use strategy::{select_paths, SelectionStrategy};
