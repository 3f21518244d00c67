//! Pricing configuration.
//!
//! [`PricingConfig`] is read from JSON; every key is optional.
//!
//! ```json
//! { "threads": 8, "pricing_strategy": 5, "tolerance": 1e-9,
//!   "unneeded_constraint_substrings": ["fixCurrent"] }
//! ```

use crate::error::ConfigError;
use crate::pricing::SelectionStrategy;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::thread;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PricingConfig {
    /// Size of the worker pool. `0` uses the available hardware concurrency.
    pub threads: usize,

    /// `0` generates a column for every improving network, `k > 0` only for
    /// the `k` most negative paths of a round.
    pub pricing_strategy: usize,

    /// Lengths and prices within this distance of zero count as zero.
    pub tolerance: f64,

    /// Constraints whose name contains any of these substrings are deleted
    /// from the master before pricing starts.
    pub unneeded_constraint_substrings: Vec<String>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            pricing_strategy: 0,
            tolerance: 1e-9,
            unneeded_constraint_substrings: Vec::new(),
        }
    }
}

impl PricingConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        if self.unneeded_constraint_substrings.iter().any(String::is_empty) {
            return Err(ConfigError::Invalid(
                "an empty unneeded-constraint substring would delete every constraint".into(),
            ));
        }
        Ok(())
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_pricing_strategy(mut self, k: usize) -> Self {
        self.pricing_strategy = k;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn strategy(&self) -> SelectionStrategy {
        SelectionStrategy::from_count(self.pricing_strategy)
    }

    pub fn worker_count(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        }
    }

    /// Builds the worker pool shared by initialization and every pricing round.
    pub fn build_thread_pool(&self) -> Result<ThreadPool, ConfigError> {
        let threads = self.worker_count();
        log::debug!("Building worker pool with {} threads", threads);
        Ok(ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("pricing-worker-{}", i))
            .build()?)
    }
}
