use super::types::*;
use crate::error::RegistryError;
use crate::graph::{Arc, Network, Path};
use std::collections::{BTreeMap, HashMap};
use std::sync::{self, Mutex, MutexGuard, PoisonError};

/// Owns all data shared across the pricing phases of one solve.
///
/// Every collection has its own lock, held only for a single O(1) lookup or
/// insert, so operations on different collections never contend and no lock
/// is ever taken while another is held. Getters hand out owned values
/// (`sync::Arc<Network>`, cloned lists and paths) that stay valid while other
/// threads keep inserting.
#[derive(Debug, Default)]
pub struct Registry {
    /// Constraints relevant to pricing, each with the arcs it originally contained.
    constraints: Mutex<Vec<sync::Arc<Constraint>>>,
    /// Networks keyed by group id. Ordered, so iteration is deterministic.
    networks: Mutex<BTreeMap<i32, sync::Arc<Network>>>,
    /// Arc -> every constraint its variable appeared in, with coefficients.
    arc_constraints: Mutex<HashMap<Arc, ConstraintCoefs>>,
    /// Network field of an arc's source node -> group id of its network.
    network_fields: Mutex<HashMap<i32, i32>>,
    /// Generated column name -> the path it represents.
    columns: Mutex<HashMap<String, Path>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Registry {
    pub fn new() -> Self { Self::default() }

    // --- Constraints ---

    pub fn add_constraint(&self, constraint: Constraint) {
        lock(&self.constraints).push(sync::Arc::new(constraint));
    }

    pub fn get_constraints(&self) -> Vec<sync::Arc<Constraint>> {
        lock(&self.constraints).clone()
    }

    pub fn constraint_count(&self) -> usize {
        lock(&self.constraints).len()
    }

    // --- Networks ---

    pub fn add_network(&self, network: Network) -> Result<sync::Arc<Network>, RegistryError> {
        let group = network.group();
        let mut networks = lock(&self.networks);
        if networks.contains_key(&group) {
            return Err(RegistryError::DuplicateGroup { group });
        }
        let shared = sync::Arc::new(network);
        networks.insert(group, sync::Arc::clone(&shared));
        Ok(shared)
    }

    pub fn get_network(&self, group: i32) -> Result<sync::Arc<Network>, RegistryError> {
        lock(&self.networks)
            .get(&group)
            .cloned()
            .ok_or(RegistryError::UnknownGroup { group })
    }

    /// Resolves the network owning `arc` through the network field of its source node.
    pub fn get_network_of_arc(&self, arc: &Arc) -> Result<sync::Arc<Network>, RegistryError> {
        let group = lock(&self.network_fields)
            .get(&arc.source.network)
            .copied()
            .ok_or_else(|| RegistryError::UnknownNetworkForArc { arc: arc.to_string() })?;
        self.get_network(group)
    }

    /// All networks in ascending group order.
    pub fn get_networks(&self) -> Vec<sync::Arc<Network>> {
        lock(&self.networks).values().cloned().collect()
    }

    pub fn network_count(&self) -> usize {
        lock(&self.networks).len()
    }

    /// Records that the given arcs belong to network `group`.
    pub fn add_arcs_of_network(&self, group: i32, arcs: impl IntoIterator<Item = Arc>) -> Result<(), RegistryError> {
        let mut fields = lock(&self.network_fields);
        for arc in arcs {
            let field = arc.source.network;
            match fields.get(&field) {
                Some(&existing) if existing != group => {
                    return Err(RegistryError::ConflictingNetworkField { field, existing, group });
                }
                Some(_) => {}
                None => {
                    fields.insert(field, group);
                }
            }
        }
        Ok(())
    }

    // --- Arc -> constraint index ---

    pub fn add_constraint_to_arc(&self, arc: Arc, constraint: ConsId, coefficient: f64) {
        lock(&self.arc_constraints)
            .entry(arc)
            .or_default()
            .push(ConstraintCoef { constraint, coefficient });
    }

    /// The constraints `arc` appeared in, or `None` if it takes part in no constraint.
    pub fn get_constraints_of_arc(&self, arc: &Arc) -> Option<ConstraintCoefs> {
        lock(&self.arc_constraints).get(arc).cloned()
    }

    /// Replaces every stored constraint handle by `remap(handle)`, in both the
    /// constraint list and the arc index. Used once, after the master problem
    /// has transformed its constraints.
    pub fn remap_constraint_handles<E>(&self, mut remap: impl FnMut(ConsId) -> Result<ConsId, E>) -> Result<(), E> {
        {
            let mut constraints = lock(&self.constraints);
            for constraint in constraints.iter_mut() {
                let handle = remap(constraint.handle)?;
                if handle != constraint.handle {
                    sync::Arc::make_mut(constraint).handle = handle;
                }
            }
        }

        let mut index = lock(&self.arc_constraints);
        for entries in index.values_mut() {
            for entry in entries.iter_mut() {
                entry.constraint = remap(entry.constraint)?;
            }
        }
        Ok(())
    }

    // --- Generated columns ---

    pub fn record_column(&self, name: impl Into<String>, path: Path) {
        lock(&self.columns).insert(name.into(), path);
    }

    /// The path behind a generated column, or `None` if `name` is not one.
    pub fn get_path(&self, name: &str) -> Option<Path> {
        lock(&self.columns).get(name).cloned()
    }

    pub fn column_count(&self) -> usize {
        lock(&self.columns).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::network::tests::{diamond, inner, terminal};
    use crate::graph::Node;
    use rayon::prelude::*;

    fn registry_with_diamonds(groups: &[i32]) -> Registry {
        let registry = Registry::new();
        for &group in groups {
            let network = Network::from_description(&diamond(group)).unwrap();
            let arcs: Vec<Arc> = network.arcs().collect();
            registry.add_network(network).unwrap();
            registry.add_arcs_of_network(group, arcs).unwrap();
        }
        registry
    }

    #[test]
    fn test_network_lookup_by_group_and_arc() {
        let registry = registry_with_diamonds(&[1, 2]);
        assert_eq!(registry.network_count(), 2);
        assert_eq!(registry.get_network(1).unwrap().group(), 1);
        assert_eq!(registry.get_network(2).unwrap().group(), 2);

        let arc_net1 = Arc::new(terminal(-2, 1), inner(2, 1));
        let arc_net2 = Arc::new(inner(3, 2), terminal(35, 2));
        assert_eq!(registry.get_network_of_arc(&arc_net1).unwrap().group(), 1);
        assert_eq!(registry.get_network_of_arc(&arc_net2).unwrap().group(), 2);
    }

    #[test]
    fn test_handles_share_weight_state() {
        let registry = registry_with_diamonds(&[1]);
        let arc = Arc::new(terminal(-2, 1), inner(2, 1));

        let by_group = registry.get_network(1).unwrap();
        let weight = by_group.get_edge_weight(&arc).unwrap();
        by_group.set_edge_weight(&arc, weight + 5.0).unwrap();

        assert_eq!(registry.get_network_of_arc(&arc).unwrap().get_edge_weight(&arc).unwrap(), weight + 5.0);
        assert_eq!(registry.get_network(1).unwrap().get_edge_weight(&arc).unwrap(), weight + 5.0);
    }

    #[test]
    fn test_missing_networks_are_errors() {
        let registry = registry_with_diamonds(&[1]);
        assert_eq!(registry.get_network(7).unwrap_err(), RegistryError::UnknownGroup { group: 7 });

        let stray = Arc::new(inner(1, 9), inner(2, 9));
        assert!(matches!(
            registry.get_network_of_arc(&stray),
            Err(RegistryError::UnknownNetworkForArc { .. })
        ));
    }

    #[test]
    fn test_duplicate_group_is_rejected() {
        let registry = registry_with_diamonds(&[1]);
        let again = Network::from_description(&diamond(1)).unwrap();
        assert_eq!(registry.add_network(again).unwrap_err(), RegistryError::DuplicateGroup { group: 1 });
    }

    #[test]
    fn test_conflicting_network_field_is_rejected() {
        let registry = registry_with_diamonds(&[1]);
        let arc = Arc::new(terminal(-2, 1), inner(2, 1));
        assert_eq!(
            registry.add_arcs_of_network(4, [arc]).unwrap_err(),
            RegistryError::ConflictingNetworkField { field: 1, existing: 1, group: 4 }
        );
        assert!(registry.add_arcs_of_network(1, [arc]).is_ok());
    }

    #[test]
    fn test_constraints_of_arc() {
        let registry = Registry::new();
        let in_two = Arc::new(inner(3, 1), inner(4, 1));
        let in_none = Arc::new(inner(2, 1), inner(4, 1));

        registry.add_constraint_to_arc(in_two, ConsId(3), -1.0);
        registry.add_constraint_to_arc(in_two, ConsId(5), 2.5);

        assert_eq!(registry.get_constraints_of_arc(&in_none), None);
        let entries = registry.get_constraints_of_arc(&in_two).unwrap();
        assert_eq!(
            entries.as_slice(),
            &[
                ConstraintCoef { constraint: ConsId(3), coefficient: -1.0 },
                ConstraintCoef { constraint: ConsId(5), coefficient: 2.5 },
            ]
        );
    }

    #[test]
    fn test_remap_constraint_handles() {
        let registry = Registry::new();
        let arc = Arc::new(inner(3, 1), inner(4, 1));
        registry.add_constraint(Constraint { handle: ConsId(1), arcs: vec![(arc, 1.0)] });
        registry.add_constraint(Constraint { handle: ConsId(2), arcs: vec![] });
        registry.add_constraint_to_arc(arc, ConsId(1), 1.0);

        let before = registry.get_constraints();
        registry.remap_constraint_handles(|c| Ok::<_, ()>(ConsId(c.0 + 100))).unwrap();

        let handles: Vec<ConsId> = registry.get_constraints().iter().map(|c| c.handle).collect();
        assert_eq!(handles, vec![ConsId(101), ConsId(102)]);
        assert_eq!(registry.get_constraints_of_arc(&arc).unwrap()[0].constraint, ConsId(101));
        // Snapshots taken earlier are unaffected.
        assert_eq!(before[0].handle, ConsId(1));
    }

    #[test]
    fn test_remap_propagates_failure() {
        let registry = Registry::new();
        registry.add_constraint(Constraint { handle: ConsId(1), arcs: vec![] });
        assert_eq!(registry.remap_constraint_handles(|_| Err("gone")), Err("gone"));
    }

    #[test]
    fn test_column_records() {
        let registry = Registry::new();
        let path = Path { arcs: vec![Arc::new(Node::default(), Node::default())], length: -3.0, network_group: 4 };
        registry.record_column("p_0", path.clone());

        assert_eq!(registry.get_path("p_0"), Some(path));
        assert_eq!(registry.get_path("p_1"), None);
        assert_eq!(registry.get_path("y(1|1|1|1|1|false|1,1|1|1|1|1|false|1)"), None);
        assert_eq!(registry.column_count(), 1);
    }

    #[test]
    fn test_concurrent_inserts() {
        let registry = Registry::new();
        (0..200u32).into_par_iter().for_each(|i| {
            registry.add_constraint(Constraint { handle: ConsId(i), arcs: vec![] });
            registry.add_constraint_to_arc(Arc::new(inner(1, 1), inner(2, 1)), ConsId(i), 1.0);
            registry.record_column(format!("p_{}", i), Path::unreachable(1));
        });
        assert_eq!(registry.constraint_count(), 200);
        assert_eq!(registry.column_count(), 200);
        assert_eq!(registry.get_constraints_of_arc(&Arc::new(inner(1, 1), inner(2, 1))).unwrap().len(), 200);
    }
}
