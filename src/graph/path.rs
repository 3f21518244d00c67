//! Defines the `Path`, the result of a shortest-path query on one network.

use super::arc::Arc;
use serde::{Deserialize, Serialize};

/// A source-to-sink path of one network.
///
/// `arcs` is stored in reconstruction order: the arc entering the sink comes
/// first and the arc leaving the source comes last. An unreachable sink is
/// reported as an empty arc list with `length == f64::INFINITY`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub arcs: Vec<Arc>,
    pub length: f64,
    pub network_group: i32,
}

impl Path {
    pub fn unreachable(network_group: i32) -> Self {
        Self { arcs: Vec::new(), length: f64::INFINITY, network_group }
    }

    pub fn is_reachable(&self) -> bool {
        self.length.is_finite()
    }

    /// Whether the path has strictly negative length beyond `tolerance`,
    /// i.e. whether it prices out as an improving column.
    pub fn is_negative(&self, tolerance: f64) -> bool {
        self.length < -tolerance
    }
}
