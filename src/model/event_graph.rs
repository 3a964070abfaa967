//! [`EventGraph`]: the arena-owned directed graph of [`Event`]s (§3, §9
//! "Graph ownership"). Built on `petgraph::stable_graph::StableDiGraph` so
//! that loop rewriting can delete nodes mid-algorithm without invalidating
//! the indices of everything else — the idiomatic replacement for the
//! source's object-identity adjacency lists with strong references.

use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::error::{Error, Result};
use crate::model::event::Event;

/// A stable node handle. Two handles are equal iff they index the same slot;
/// they stay valid across node/edge removal (unlike plain `petgraph::Graph`).
pub type NodeId = petgraph::stable_graph::NodeIndex;

/// An ordered pair of node handles — the sole edge payload; edges carry no
/// data of their own (§3 `EventEdge`).
pub type EventEdge = (NodeId, NodeId);

/// A directed graph over [`Event`]s, maintaining the invariant that for
/// every edge `(u, v)`, `v.event_type` appears in some member of
/// `u.event_sets` and `u.event_type` appears in some member of
/// `v.in_event_sets` (checked by [`EventGraph::check_invariants`], not
/// enforced on every mutation — rewriting passes restore it themselves and
/// assert it at the end of each stage).
#[derive(Debug, Default)]
pub struct EventGraph {
    graph: StableDiGraph<Event, ()>,
}

impl EventGraph {
    pub fn new() -> Self {
        EventGraph {
            graph: StableDiGraph::new(),
        }
    }

    pub fn add_event(&mut self, event: Event) -> NodeId {
        self.graph.add_node(event)
    }

    pub fn remove_node(&mut self, id: NodeId) -> Option<Event> {
        self.graph.remove_node(id)
    }

    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        if !self.has_edge(from, to) {
            self.graph.add_edge(from, to, ());
        }
    }

    pub fn remove_edge(&mut self, from: NodeId, to: NodeId) {
        if let Some(edge) = self.graph.find_edge(from, to) {
            self.graph.remove_edge(edge);
        }
    }

    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.graph.find_edge(from, to).is_some()
    }

    pub fn get(&self, id: NodeId) -> &Event {
        &self.graph[id]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Event {
        &mut self.graph[id]
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.graph.node_weight(id).is_some()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Event)> {
        self.graph.node_indices().map(move |id| (id, &self.graph[id]))
    }

    pub fn edges(&self) -> impl Iterator<Item = EventEdge> + '_ {
        self.graph
            .edge_references()
            .map(|edge| (edge.source(), edge.target()))
    }

    pub fn successors(&self, id: NodeId) -> Vec<NodeId> {
        self.graph.neighbors_directed(id, Direction::Outgoing).collect()
    }

    pub fn predecessors(&self, id: NodeId) -> Vec<NodeId> {
        self.graph.neighbors_directed(id, Direction::Incoming).collect()
    }

    pub fn find_by_event_type(&self, event_type: &str) -> Option<NodeId> {
        self.graph
            .node_indices()
            .find(|&id| self.graph[id].event_type == event_type)
    }

    /// Nodes with no incoming edges.
    pub fn roots(&self) -> Vec<NodeId> {
        self.graph
            .node_indices()
            .filter(|&id| self.predecessors(id).is_empty())
            .collect()
    }

    /// The single root of this graph. §7 item 1: a job with zero or more
    /// than one root is an input-shape error.
    pub fn root(&self) -> Result<NodeId> {
        let roots = self.roots();
        match roots.as_slice() {
            [single] => Ok(*single),
            [] => Err(Error::InputShape(
                "event graph has no root (every node has an incoming edge)".into(),
            )),
            _ => Err(Error::InputShape(format!(
                "event graph has {} roots, expected exactly one",
                roots.len()
            ))),
        }
    }

    /// All nodes reachable from `start` following outgoing edges.
    pub fn reachable_from(&self, start: NodeId) -> std::collections::HashSet<NodeId> {
        let mut seen = std::collections::HashSet::new();
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if seen.insert(node) {
                stack.extend(self.successors(node));
            }
        }
        seen
    }

    pub fn has_path(&self, from: NodeId, to: NodeId) -> bool {
        self.reachable_from(from).contains(&to)
    }

    /// Removes every node that the root cannot reach. A no-op if the graph
    /// is empty or has no single root (callers invoke this only after a
    /// rewrite that leaves exactly one root behind).
    pub fn prune_unreachable(&mut self, root: NodeId) {
        let reachable = self.reachable_from(root);
        let dead: Vec<NodeId> = self
            .graph
            .node_indices()
            .filter(|id| !reachable.contains(id))
            .collect();
        for id in dead {
            self.graph.remove_node(id);
        }
    }

    /// Strongly connected components via Tarjan's algorithm (the idiomatic
    /// in-crate replacement for `networkx.strongly_connected_components`).
    /// Each returned group is one SCC; singletons without a self-edge are
    /// trivial and are the caller's responsibility to skip (§4.C
    /// "Determinism & termination").
    pub fn strongly_connected_components(&self) -> Vec<Vec<NodeId>> {
        petgraph::algo::tarjan_scc(&self.graph)
    }

    pub fn is_non_trivial_scc(&self, scc: &[NodeId]) -> bool {
        if scc.len() > 1 {
            return true;
        }
        let node = scc[0];
        self.has_edge(node, node)
    }

    /// Forces recomputation of every node's logic-gate tree; used once after
    /// bulk construction (e.g. deserializing an [`crate::io`] document)
    /// rather than relying on per-mutation dirtying.
    pub fn recompute_all_logic_gate_trees(&self) {
        for id in self.graph.node_indices() {
            self.graph[id].force_recompute_logic_gate_tree();
        }
    }

    /// Projects this graph onto event *types* rather than node identities:
    /// one edge `parent_type -> child_type` for every type pair that
    /// co-occurs in some node's forward event-sets, regardless of how many
    /// distinct nodes happen to share either type. Grounded on the source's
    /// `events_to_markov_graph` — a directly-follows-graph view used for
    /// diagnostics/visualisation, not consumed by any rewrite pass.
    pub fn to_markov_graph(&self) -> std::collections::BTreeMap<String, std::collections::BTreeSet<String>> {
        let mut graph: std::collections::BTreeMap<String, std::collections::BTreeSet<String>> =
            std::collections::BTreeMap::new();
        for id in self.graph.node_indices() {
            let event = &self.graph[id];
            let out_types: std::collections::BTreeSet<String> = event
                .event_sets
                .iter()
                .flat_map(|set| set.iter().map(|(t, _)| t.to_string()))
                .collect();
            graph.entry(event.event_type.clone()).or_default().extend(out_types);
        }
        graph
    }

    /// Checks the structural invariant from §8: every type named in an
    /// event's forward event-sets corresponds to a real outgoing edge.
    pub fn check_invariants(&self) -> Result<()> {
        for id in self.graph.node_indices() {
            let event = &self.graph[id];
            let successor_types: std::collections::HashSet<&str> = self
                .successors(id)
                .iter()
                .map(|&s| self.graph[s].event_type.as_str())
                .collect();
            for event_set in &event.event_sets {
                for (event_type, _) in event_set.iter() {
                    if !successor_types.contains(event_type) {
                        return Err(Error::InvariantViolation(format!(
                            "event `{}` claims successor type `{}` with no matching edge",
                            event.event_type, event_type
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
