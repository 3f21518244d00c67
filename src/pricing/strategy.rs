use crate::graph::Path;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;

/// How many of a round's improving paths become columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionStrategy {
    /// Every network with a negative shortest path contributes one column.
    #[default]
    Full,
    /// Only the `k` most negative paths across all networks become columns.
    KShortest(NonZeroUsize),
}

impl SelectionStrategy {
    /// `0` selects `Full`; any other value is the `k` of `KShortest`.
    pub fn from_count(k: usize) -> Self {
        match NonZeroUsize::new(k) {
            Some(k) => SelectionStrategy::KShortest(k),
            None => SelectionStrategy::Full,
        }
    }
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionStrategy::Full => write!(f, "full"),
            SelectionStrategy::KShortest(k) => write!(f, "{}-shortest", k),
        }
    }
}

/// Filters one round's shortest paths (one per network, in ascending group
/// order) down to the paths that become columns.
///
/// Only paths strictly shorter than `-tolerance` survive. `Full` keeps them in
/// group order. `KShortest(k)` orders them by length, ties by ascending group,
/// and keeps the first `k`.
pub fn select_paths(paths: Vec<Path>, strategy: SelectionStrategy, tolerance: f64) -> Vec<Path> {
    let mut negative: Vec<Path> = paths.into_iter().filter(|p| p.is_negative(tolerance)).collect();

    match strategy {
        SelectionStrategy::Full => negative,
        SelectionStrategy::KShortest(k) => {
            negative.sort_by(|a, b| {
                a.length
                    .total_cmp(&b.length)
                    .then(a.network_group.cmp(&b.network_group))
            });
            negative.truncate(k.get());
            negative
        }
    }
}
