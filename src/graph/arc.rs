//! Defines the `Arc`, the identity of a network edge and of a pricing variable.

use super::node::Node;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix shared by every pricing-relevant master variable.
pub const VARIABLE_PREFIX: &str = "y(";

/// A directed edge between two nodes, ordered by `(source, target)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Arc {
    pub source: Node,
    pub target: Node,
}

impl Arc {
    pub const fn new(source: Node, target: Node) -> Self {
        Self { source, target }
    }
}

/// Renders the arc as its master variable name, e.g.
/// `y(1|1|neg2|neg1|3|false|10,1|1|35|neg1|0|false|10)`.
///
/// `codec::parse_variable_name` is the inverse of this rendering.
impl fmt::Display for Arc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{},{})", VARIABLE_PREFIX, self.source, self.target)
    }
}
