//! Error types for every layer of the pricing engine.
//!
//! All of these are fatal for the solve: the driver is expected to abort when
//! one reaches it. Expected absences (an arc in no constraint, a name that is
//! not a generated column) are modelled as `Option::None`, never as errors.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Malformed pricing variable '{name}': {reason}")]
    Malformed { name: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    #[error("Cannot derive a network group from identifier '{identifier}'")]
    MalformedIdentifier { identifier: String },
    #[error("Network '{identifier}' declares vertex id {id} more than once")]
    DuplicateVertex { identifier: String, id: i64 },
    #[error("Network '{identifier}' has no source vertex")]
    MissingSource { identifier: String },
    #[error("Network '{identifier}' has no sink vertex")]
    MissingSink { identifier: String },
    #[error("Network '{identifier}' contains more than one source vertex (vertex id {id})")]
    DuplicateSource { identifier: String, id: i64 },
    #[error("Network '{identifier}' contains more than one sink vertex (vertex id {id})")]
    DuplicateSink { identifier: String, id: i64 },
    #[error("Network '{identifier}' has an edge referencing undeclared vertex id {id}")]
    UnknownVertex { identifier: String, id: i64 },
    #[error("Network '{identifier}' contains arc {arc} more than once")]
    DuplicateArc { identifier: String, arc: String },
    #[error("Network '{identifier}' is not acyclic")]
    Cycle { identifier: String },
    #[error("Arc {arc} has no edge in network group {group}")]
    UnknownArc { group: i32, arc: String },
    #[error("Node {node} is not a vertex of network group {group}")]
    UnknownNode { group: i32, node: String },
    #[error("Predecessor chain of network group {group} does not lead back to the source")]
    BrokenPredecessorChain { group: i32 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("No network registered for group {group}")]
    UnknownGroup { group: i32 },
    #[error("No network registered for arc {arc}")]
    UnknownNetworkForArc { arc: String },
    #[error("Network group {group} registered twice")]
    DuplicateGroup { group: i32 },
    #[error("Network field {field} already belongs to group {existing}, cannot map it to group {group}")]
    ConflictingNetworkField { field: i32, existing: i32, group: i32 },
}

/// A failure reported by the master-problem collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Master problem failed during {operation}: {message}")]
pub struct MasterError {
    pub operation: &'static str,
    pub message: String,
}

impl MasterError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self { operation, message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io { path: String, source: std::io::Error },
    #[error("Could not parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
    #[error("Could not build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Error, Debug)]
pub enum PricingError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Master(#[from] MasterError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Cannot {operation} while the pricer is {state}")]
    InvalidState { operation: &'static str, state: String },
    #[error("No network descriptions were supplied")]
    NoNetworks,
    #[error("Could not read network input '{path}': {source}")]
    Input { path: String, source: std::io::Error },
    #[error("Could not parse network description '{path}': {source}")]
    Description { path: String, source: serde_json::Error },
    #[error("Could not write report: {0}")]
    Report(#[from] std::io::Error),
}
