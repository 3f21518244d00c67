//! The pricing round: reweight every network with the master's dual
//! information, find improving source-sink paths and turn them into columns.
//!
//! A round runs as four barrier-separated phases on the shared worker pool:
//! zero, reweight, select and generate. Each phase is a single
//! `pool.install` call, so every task of a phase has finished before the next
//! phase starts, and the first failing task aborts the round.

use super::master::MasterProblem;
use super::strategy::{select_paths, SelectionStrategy};
use crate::config::PricingConfig;
use crate::error::{MasterError, PricingError};
use crate::graph::{Arc, Network, Path};
use crate::store::{Constraint, Registry};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{self, Mutex, MutexGuard, PoisonError};

/// Which multiplier of the master drives the reweighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingKind {
    /// The LP relaxation is feasible; price with dual values.
    ReducedCost,
    /// The LP relaxation is infeasible; price with Farkas multipliers.
    Farkas,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricerState {
    Uninitialized,
    Ready,
    Terminated,
}

impl fmt::Display for PricerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricerState::Uninitialized => write!(f, "uninitialized"),
            PricerState::Ready => write!(f, "ready"),
            PricerState::Terminated => write!(f, "terminated"),
        }
    }
}

/// Reported back to the solver after each round. A round either adds columns
/// or proves that none price out, so it always succeeds when it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingStatus {
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundOutcome {
    pub columns: usize,
    pub status: PricingStatus,
}

pub fn column_name(index: usize) -> String {
    format!("p_{}", index)
}

/// Drives pricing rounds for one solve.
///
/// Counters are only touched by the thread calling `price`, after the last
/// barrier of a round.
pub struct Pricer {
    registry: sync::Arc<Registry>,
    pool: sync::Arc<ThreadPool>,
    strategy: SelectionStrategy,
    tolerance: f64,
    state: PricerState,
    rounds: usize,
    generated: usize,
    next_column_index: usize,
}

impl Pricer {
    pub fn new(registry: sync::Arc<Registry>, pool: sync::Arc<ThreadPool>, strategy: SelectionStrategy, tolerance: f64) -> Self {
        Self {
            registry,
            pool,
            strategy,
            tolerance,
            state: PricerState::Uninitialized,
            rounds: 0,
            generated: 0,
            next_column_index: 0,
        }
    }

    pub fn from_config(registry: sync::Arc<Registry>, pool: sync::Arc<ThreadPool>, config: &PricingConfig) -> Self {
        Self::new(registry, pool, config.strategy(), config.tolerance)
    }

    pub fn state(&self) -> PricerState { self.state }
    pub fn strategy(&self) -> SelectionStrategy { self.strategy }
    pub fn rounds(&self) -> usize { self.rounds }
    pub fn generated_columns(&self) -> usize { self.generated }

    /// One-time fix-up after the master has transformed its model: every
    /// stored constraint handle is replaced by its transformed counterpart.
    pub fn init<M: MasterProblem>(&mut self, master: &M) -> Result<(), PricingError> {
        self.require("initialize", |s| s == PricerState::Uninitialized)?;
        self.registry
            .remap_constraint_handles(|handle| master.transformed_constraint(handle))?;
        self.state = PricerState::Ready;
        log::info!(
            "Pricer initialized: {} networks, {} pricing constraints, {} strategy",
            self.registry.network_count(),
            self.registry.constraint_count(),
            self.strategy
        );
        Ok(())
    }

    /// Pricing entry point for a feasible LP relaxation.
    pub fn redcost<M>(&mut self, master: &mut M) -> Result<RoundOutcome, PricingError>
    where
        M: MasterProblem + Send + Sync,
    {
        self.price(master, PricingKind::ReducedCost)
    }

    /// Pricing entry point for an infeasible LP relaxation.
    pub fn farkas<M>(&mut self, master: &mut M) -> Result<RoundOutcome, PricingError>
    where
        M: MasterProblem + Send + Sync,
    {
        self.price(master, PricingKind::Farkas)
    }

    /// Runs one full round and returns the number of columns added.
    pub fn price<M>(&mut self, master: &mut M, kind: PricingKind) -> Result<RoundOutcome, PricingError>
    where
        M: MasterProblem + Send + Sync,
    {
        self.require("price", |s| s == PricerState::Ready)?;
        log::info!("Pricing round {} ({:?})", self.rounds + 1, kind);

        let networks = self.registry.get_networks();
        self.zero_weights(&networks);
        log::debug!("Reset weights of {} networks", networks.len());

        self.reweight(&*master, kind)?;
        log::debug!("Reweighted networks from {} constraints", self.registry.constraint_count());

        let candidates = self.shortest_paths(&networks)?;
        let selected = select_paths(candidates, self.strategy, self.tolerance);
        log::debug!("Selected {} improving paths", selected.len());

        let columns = self.generate_columns(master, selected)?;

        self.rounds += 1;
        self.generated += columns;
        log::info!("Pricing round {} added {} columns ({} total)", self.rounds, columns, self.generated);
        Ok(RoundOutcome { columns, status: PricingStatus::Success })
    }

    /// Ends the solve. Any later round is rejected.
    pub fn terminate(&mut self) -> Result<(), PricingError> {
        self.require("terminate", |s| s != PricerState::Terminated)?;
        self.state = PricerState::Terminated;
        log::info!("Pricer terminated after {} rounds, {} columns", self.rounds, self.generated);
        Ok(())
    }

    fn require(&self, operation: &'static str, allowed: impl Fn(PricerState) -> bool) -> Result<(), PricingError> {
        if allowed(self.state) {
            Ok(())
        } else {
            Err(PricingError::InvalidState { operation, state: self.state.to_string() })
        }
    }

    // --- Phases ---

    fn zero_weights(&self, networks: &[sync::Arc<Network>]) {
        self.pool
            .install(|| networks.par_iter().for_each(|network| network.reset_edge_weights()));
    }

    /// Prices are computed per constraint in parallel. The resulting weight
    /// changes are then applied one task per network, in constraint order, so
    /// equal duals always give bit-identical weights.
    fn reweight<M>(&self, master: &M, kind: PricingKind) -> Result<(), PricingError>
    where
        M: MasterProblem + Sync,
    {
        let constraints = self.registry.get_constraints();
        let registry = &*self.registry;
        let tolerance = self.tolerance;
        let deltas = self.pool.install(|| {
            constraints
                .par_iter()
                .map(|constraint| constraint_deltas(master, registry, constraint, kind, tolerance))
                .collect::<Result<Vec<_>, PricingError>>()
        })?;

        let mut by_network: BTreeMap<i32, (sync::Arc<Network>, Vec<(Arc, f64)>)> = BTreeMap::new();
        for (network, arc, delta) in deltas.into_iter().flatten() {
            by_network
                .entry(network.group())
                .or_insert_with(|| (network, Vec::new()))
                .1
                .push((arc, delta));
        }

        self.pool.install(|| {
            by_network
                .par_iter()
                .try_for_each(|(_, (network, changes))| network.add_to_edge_weights(changes))
        })?;
        Ok(())
    }

    /// One shortest path per network, in ascending group order.
    fn shortest_paths(&self, networks: &[sync::Arc<Network>]) -> Result<Vec<Path>, PricingError> {
        let paths = self.pool.install(|| {
            networks
                .par_iter()
                .map(|network| network.shortest_path())
                .collect::<Result<Vec<_>, _>>()
        })?;
        for path in &paths {
            log::trace!("Network {}: shortest path length {}", path.network_group, path.length);
        }
        Ok(paths)
    }

    /// Names are fixed here, in selection order, before any task runs.
    fn generate_columns<M>(&mut self, master: &mut M, selected: Vec<Path>) -> Result<usize, PricingError>
    where
        M: MasterProblem + Send,
    {
        let first = self.next_column_index;
        self.next_column_index += selected.len();

        let master = Mutex::new(master);
        let registry = &*self.registry;
        let tolerance = self.tolerance;
        let committed = self.pool.install(|| {
            selected
                .par_iter()
                .enumerate()
                .map(|(offset, path)| generate_column(&master, registry, &column_name(first + offset), path, tolerance))
                .collect::<Result<Vec<bool>, PricingError>>()
        })?;
        Ok(committed.into_iter().filter(|&added| added).count())
    }
}

/// The weight change `coefficient * price` for every arc of `constraint`,
/// paired with the network that owns the arc.
fn constraint_deltas<M: MasterProblem>(
    master: &M,
    registry: &Registry,
    constraint: &Constraint,
    kind: PricingKind,
    tolerance: f64,
) -> Result<Vec<(sync::Arc<Network>, Arc, f64)>, PricingError> {
    let (operation, value) = match kind {
        PricingKind::ReducedCost => ("dual_value", master.dual_value(constraint.handle)?),
        PricingKind::Farkas => ("farkas_value", master.farkas_value(constraint.handle)?),
    };
    if !value.is_finite() {
        return Err(MasterError::new(
            operation,
            format!("non-finite value {} for constraint {:?}", value, constraint.handle),
        )
        .into());
    }

    // Negated so that a path's length equals the reduced cost of its column.
    let price = -value;
    if price.abs() <= tolerance {
        return Ok(Vec::new());
    }

    let mut deltas = Vec::with_capacity(constraint.arcs.len());
    for &(arc, coefficient) in &constraint.arcs {
        let network = registry.get_network_of_arc(&arc)?;
        log::trace!("{} += {} (constraint {:?})", arc, coefficient * price, constraint.handle);
        deltas.push((network, arc, coefficient * price));
    }
    Ok(deltas)
}

fn lock_master<'a, 'b, M>(master: &'a Mutex<&'b mut M>) -> MutexGuard<'a, &'b mut M> {
    master.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Adds one column for `path`. The master lock is taken per call, never across
/// the whole column. Returns whether a column was committed.
fn generate_column<M: MasterProblem>(
    master: &Mutex<&mut M>,
    registry: &Registry,
    name: &str,
    path: &Path,
    tolerance: f64,
) -> Result<bool, PricingError> {
    if !path.is_negative(tolerance) {
        log::debug!("Skipping path of network {} with length {}", path.network_group, path.length);
        return Ok(false);
    }

    let variable = lock_master(master).add_priced_variable(name, 0.0, f64::INFINITY, 0.0)?;
    for arc in &path.arcs {
        let Some(entries) = registry.get_constraints_of_arc(arc) else {
            continue;
        };
        for entry in entries {
            lock_master(master).add_coefficient(entry.constraint, variable, entry.coefficient)?;
            log::trace!("{}: coefficient {} in constraint {:?}", name, entry.coefficient, entry.constraint);
        }
    }
    lock_master(master).commit_variable(variable)?;

    registry.record_column(name, path.clone());
    log::debug!("Added column {} for network {} (reduced cost {})", name, path.network_group, path.length);
    Ok(true)
}
