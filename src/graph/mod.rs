//! Defines the flow networks that make up the pricing subproblem.
pub mod arc;
pub mod network;
pub mod node;
pub mod path;

// Re-export key types for convenient access
pub use arc::{Arc, VARIABLE_PREFIX};
pub use network::{group_from_identifier, EdgeRecord, Network, NetworkDescription, VertexRecord};
pub use node::Node;
pub use path::Path;
