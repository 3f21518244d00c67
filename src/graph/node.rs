//! Defines the `Node`, the attribute key identifying a vertex of a flow network.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A vertex identity made of seven scalar attributes.
///
/// Equality, hashing and ordering are lexicographic over the fields in
/// declaration order, so a `Node` can key both hash maps and ordered maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Node {
    pub career_group: i32,
    pub career: i32,
    /// May be negative; rendered with a `neg` prefix in variable names.
    pub rank: i32,
    /// May be negative; rendered with a `neg` prefix in variable names.
    pub time_slice: i32,
    pub status: i32,
    pub in_training: bool,
    /// The network field. Every arc is routed to its owning network through
    /// the network field of its source node.
    pub network: i32,
}

/// Rank value shared by all source vertices.
pub const SOURCE_RANK: i32 = -2;
/// Rank value shared by all sink vertices.
pub const SINK_RANK: i32 = 35;

impl Node {
    pub const fn new(
        career_group: i32,
        career: i32,
        rank: i32,
        time_slice: i32,
        status: i32,
        in_training: bool,
        network: i32,
    ) -> Self {
        Self { career_group, career, rank, time_slice, status, in_training, network }
    }

    /// Attributes common to both terminal patterns. The rank decides which one.
    fn is_terminal_shaped(&self) -> bool {
        self.career_group == 0
            && self.career == 0
            && self.time_slice == -1
            && self.status == 0
            && !self.in_training
    }

    pub fn is_source(&self) -> bool {
        self.is_terminal_shaped() && self.rank == SOURCE_RANK
    }

    pub fn is_sink(&self) -> bool {
        self.is_terminal_shaped() && self.rank == SINK_RANK
    }
}

/// Renders the node as the seven `|`-separated fields used inside variable names.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}|{}|{}",
            self.career_group,
            self.career,
            SignedField(self.rank),
            SignedField(self.time_slice),
            self.status,
            self.in_training,
            self.network
        )
    }
}

/// A field whose negative values are written as `neg<abs>`.
struct SignedField(i32);

impl fmt::Display for SignedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "neg{}", self.0.unsigned_abs())
        } else {
            write!(f, "{}", self.0)
        }
    }
}
