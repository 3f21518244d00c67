// Crate root: the column-generation pricing engine.
// A driver builds the networks and the constraint index once (`initialize`),
// then calls a `Pricer` each time the master LP has been re-solved.

pub mod codec;
pub mod config;
pub mod error;
pub mod graph;
pub mod initialize;
pub mod pricing;
pub mod report;
pub mod store;

pub use config::PricingConfig;
pub use error::PricingError;
pub use graph::{Arc, Network, NetworkDescription, Node, Path};
pub use pricing::{MasterModel, MasterProblem, Pricer, PricingKind, RoundOutcome, SelectionStrategy};
pub use store::Registry;

/// The version of the compiled core.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
