//! One pricing subproblem: a weighted DAG with a fixed source and sink, and a
//! cached single-source shortest path over it.
//!
//! Topology is immutable after construction. Edge weights and the cached path
//! live behind one mutex, so every weight operation takes `&self` and is safe
//! under concurrent callers; a mutation always clears the cache while holding
//! the lock, so a stale path can never be observed.

use super::{Arc, Node, Path};
use crate::error::NetworkError;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A vertex as supplied by graph ingestion: an external id plus its attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexRecord {
    pub id: i64,
    pub node: Node,
}

/// A directed edge between two external vertex ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: i64,
    pub target: i64,
}

/// Everything needed to build a `Network`.
///
/// `identifier` names the origin of the description (usually a file name);
/// the network group is derived from it, see [`group_from_identifier`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkDescription {
    #[serde(default)]
    pub identifier: String,
    pub vertices: Vec<VertexRecord>,
    pub edges: Vec<EdgeRecord>,
}

impl NetworkDescription {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn from_reader(reader: impl std::io::Read) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }
}

/// Extracts the network group from an identifier such as `graphs/graph_26.xml`:
/// the digits directly after the last `_`.
pub fn group_from_identifier(identifier: &str) -> Result<i32, NetworkError> {
    let tail = identifier.rsplit('_').next().unwrap_or(identifier);
    let end = tail.find(|c: char| !c.is_ascii_digit()).unwrap_or(tail.len());
    tail[..end]
        .parse::<i32>()
        .map_err(|_| NetworkError::MalformedIdentifier { identifier: identifier.to_string() })
}

#[derive(Debug)]
struct WeightState {
    /// Indexed by `EdgeIndex`.
    weights: Vec<f64>,
    /// `Some` exactly while the last computed path is fresh.
    cached: Option<Path>,
}

#[derive(Debug)]
pub struct Network {
    group: i32,
    graph: DiGraph<Node, ()>,
    order: Vec<NodeIndex>,
    source: NodeIndex,
    sink: NodeIndex,
    vertex_of_node: HashMap<Node, NodeIndex>,
    arc_to_edge: HashMap<Arc, EdgeIndex>,
    state: Mutex<WeightState>,
}

impl Network {
    /// Builds the network, validating that it is a DAG with exactly one source
    /// and one sink and that every edge maps to a distinct arc.
    pub fn from_description(description: &NetworkDescription) -> Result<Self, NetworkError> {
        let identifier = description.identifier.as_str();
        let group = group_from_identifier(identifier)?;

        let mut graph = DiGraph::with_capacity(description.vertices.len(), description.edges.len());
        let mut by_id: HashMap<i64, NodeIndex> = HashMap::with_capacity(description.vertices.len());
        let mut vertex_of_node = HashMap::with_capacity(description.vertices.len());
        let mut source = None;
        let mut sink = None;

        for record in &description.vertices {
            let v = graph.add_node(record.node);
            if by_id.insert(record.id, v).is_some() || vertex_of_node.insert(record.node, v).is_some() {
                return Err(NetworkError::DuplicateVertex { identifier: identifier.to_string(), id: record.id });
            }
            if record.node.is_source() && source.replace(v).is_some() {
                return Err(NetworkError::DuplicateSource { identifier: identifier.to_string(), id: record.id });
            }
            if record.node.is_sink() && sink.replace(v).is_some() {
                return Err(NetworkError::DuplicateSink { identifier: identifier.to_string(), id: record.id });
            }
        }

        let source = source.ok_or_else(|| NetworkError::MissingSource { identifier: identifier.to_string() })?;
        let sink = sink.ok_or_else(|| NetworkError::MissingSink { identifier: identifier.to_string() })?;

        let mut arc_to_edge = HashMap::with_capacity(description.edges.len());
        for record in &description.edges {
            let lookup = |id: i64| {
                by_id
                    .get(&id)
                    .copied()
                    .ok_or_else(|| NetworkError::UnknownVertex { identifier: identifier.to_string(), id })
            };
            let (from, to) = (lookup(record.source)?, lookup(record.target)?);
            let arc = Arc::new(graph[from], graph[to]);
            let edge = graph.add_edge(from, to, ());
            if arc_to_edge.insert(arc, edge).is_some() {
                return Err(NetworkError::DuplicateArc { identifier: identifier.to_string(), arc: arc.to_string() });
            }
        }

        let order = toposort(&graph, None)
            .map_err(|_| NetworkError::Cycle { identifier: identifier.to_string() })?;

        let state = WeightState { weights: vec![0.0; graph.edge_count()], cached: None };

        Ok(Self { group, graph, order, source, sink, vertex_of_node, arc_to_edge, state: Mutex::new(state) })
    }

    // --- Topology (immutable, lock-free) ---

    pub fn group(&self) -> i32 { self.group }
    pub fn vertex_count(&self) -> usize { self.graph.node_count() }
    pub fn edge_count(&self) -> usize { self.graph.edge_count() }
    pub fn source(&self) -> Node { self.graph[self.source] }
    pub fn sink(&self) -> Node { self.graph[self.sink] }

    pub fn contains_arc(&self, arc: &Arc) -> bool {
        self.arc_to_edge.contains_key(arc)
    }

    /// All arcs of the network, in edge insertion order.
    pub fn arcs(&self) -> impl Iterator<Item = Arc> + '_ {
        self.graph.edge_indices().filter_map(move |e| self.arc_of(e))
    }

    // --- Weights ---

    pub fn get_edge_weight(&self, arc: &Arc) -> Result<f64, NetworkError> {
        let edge = self.edge_of(arc)?;
        Ok(self.lock_state().weights[edge.index()])
    }

    pub fn set_edge_weight(&self, arc: &Arc, weight: f64) -> Result<(), NetworkError> {
        let edge = self.edge_of(arc)?;
        let mut state = self.lock_state();
        state.cached = None;
        state.weights[edge.index()] = weight;
        Ok(())
    }

    pub fn add_to_edge_weight(&self, arc: &Arc, weight: f64) -> Result<(), NetworkError> {
        let edge = self.edge_of(arc)?;
        let mut state = self.lock_state();
        state.cached = None;
        state.weights[edge.index()] += weight;
        Ok(())
    }

    /// Applies `(arc, delta)` changes in the given order under one lock. Every
    /// arc is resolved first, so an unknown arc leaves the weights untouched.
    pub fn add_to_edge_weights(&self, changes: &[(Arc, f64)]) -> Result<(), NetworkError> {
        let edges = changes
            .iter()
            .map(|(arc, delta)| Ok((self.edge_of(arc)?, *delta)))
            .collect::<Result<Vec<_>, NetworkError>>()?;
        let mut state = self.lock_state();
        state.cached = None;
        for (edge, delta) in edges {
            state.weights[edge.index()] += delta;
        }
        Ok(())
    }

    pub fn reset_edge_weights(&self) {
        let mut state = self.lock_state();
        state.cached = None;
        state.weights.iter_mut().for_each(|w| *w = 0.0);
    }

    // --- Shortest paths ---

    /// Returns the shortest source-to-sink path under the current weights.
    ///
    /// Runs in O(V + E) by relaxing edges in topological order, which is
    /// correct for negative weights because the graph is acyclic. The result
    /// is cached until the next weight mutation.
    pub fn shortest_path(&self) -> Result<Path, NetworkError> {
        let mut state = self.lock_state();
        if let Some(path) = &state.cached {
            return Ok(path.clone());
        }

        let (distances, predecessors) = self.relax_from(self.source, &state.weights);
        let length = distances[self.sink.index()];
        let path = if length.is_infinite() {
            Path::unreachable(self.group)
        } else {
            Path { arcs: self.walk_back(&predecessors)?, length, network_group: self.group }
        };

        state.cached = Some(path.clone());
        Ok(path)
    }

    /// Distances from `start` to every vertex under the current weights;
    /// unreachable vertices map to `f64::INFINITY`.
    pub fn distances_from(&self, start: &Node) -> Result<BTreeMap<Node, f64>, NetworkError> {
        let start = *self
            .vertex_of_node
            .get(start)
            .ok_or_else(|| NetworkError::UnknownNode { group: self.group, node: start.to_string() })?;
        let (distances, _) = {
            let state = self.lock_state();
            self.relax_from(start, &state.weights)
        };
        Ok(self.graph.node_indices().map(|v| (self.graph[v], distances[v.index()])).collect())
    }

    fn relax_from(&self, start: NodeIndex, weights: &[f64]) -> (Vec<f64>, Vec<Option<EdgeIndex>>) {
        let count = self.graph.node_count();
        let mut distances = vec![f64::INFINITY; count];
        let mut predecessors = vec![None; count];
        distances[start.index()] = 0.0;

        for &u in &self.order {
            let base = distances[u.index()];
            if base.is_infinite() {
                continue;
            }
            for edge in self.graph.edges(u) {
                let v = edge.target().index();
                let candidate = base + weights[edge.id().index()];
                if candidate < distances[v] {
                    distances[v] = candidate;
                    predecessors[v] = Some(edge.id());
                }
            }
        }
        (distances, predecessors)
    }

    /// Follows predecessor edges from the sink back to the source. The walk is
    /// bounded by the vertex count.
    fn walk_back(&self, predecessors: &[Option<EdgeIndex>]) -> Result<Vec<Arc>, NetworkError> {
        let broken = || NetworkError::BrokenPredecessorChain { group: self.group };
        let mut arcs = Vec::new();
        let mut v = self.sink;
        for _ in 0..self.graph.node_count() {
            if v == self.source {
                return Ok(arcs);
            }
            let edge = predecessors[v.index()].ok_or_else(broken)?;
            let (from, _) = self.graph.edge_endpoints(edge).ok_or_else(broken)?;
            arcs.push(self.arc_of(edge).ok_or_else(broken)?);
            v = from;
        }
        if v == self.source { Ok(arcs) } else { Err(broken()) }
    }

    fn edge_of(&self, arc: &Arc) -> Result<EdgeIndex, NetworkError> {
        self.arc_to_edge
            .get(arc)
            .copied()
            .ok_or_else(|| NetworkError::UnknownArc { group: self.group, arc: arc.to_string() })
    }

    fn arc_of(&self, edge: EdgeIndex) -> Option<Arc> {
        let (from, to) = self.graph.edge_endpoints(edge)?;
        Some(Arc::new(self.graph[from], self.graph[to]))
    }

    fn lock_state(&self) -> MutexGuard<'_, WeightState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
