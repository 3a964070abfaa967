//! §4.C "start/end/break/loop-edge computation": classifies the nodes of a
//! single non-trivial strongly connected component into the roles the
//! rewrite needs.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::error::Result;
use crate::model::event_graph::{EventGraph, NodeId};

/// The role assignment for one SCC about to be collapsed into a loop event.
/// Start/end/break are each genuinely plural per §4.C (a loop can be entered
/// or exited at more than one point) rather than a single canonical
/// representative picked out of the candidates.
#[derive(Debug, Clone)]
pub struct LoopComponents {
    pub scc: Vec<NodeId>,
    /// Every SCC node entered from outside the component (the loop's first
    /// body event for at least one iteration).
    pub starts: Vec<NodeId>,
    /// Every SCC node whose exit edge(s) resume the enclosing flow after the
    /// loop finishes — the maximal candidates under §4.C's end-event
    /// partial order, as opposed to a `break`, which exits early.
    pub ends: Vec<NodeId>,
    /// `(scc_source, external_target)` pairs for every edge that leaves the
    /// loop early: sourced from a non-end node, or from an end node whose
    /// exit is not that node's designated normal continuation (a dual-
    /// purpose sibling of the real exit, §4.C break canonicalization).
    pub break_edges: Vec<(NodeId, NodeId)>,
    /// External nodes with an edge into some start event (deduplicated,
    /// sorted).
    pub entry_sources: Vec<NodeId>,
    /// External nodes reachable from an end event's normal exit edge
    /// (deduplicated, sorted) — what the rewritten loop event reconnects to.
    pub exit_targets: Vec<NodeId>,
}

impl LoopComponents {
    /// Classifies `scc` within `graph` per spec.md §4.C:
    ///
    /// - **start events**: SCC nodes with an incoming edge from outside the
    ///   component.
    /// - **candidates**: SCC nodes with an edge back to some start event.
    /// - **end events**: the candidates maximal under reachability once
    ///   edges into a start are pruned — a candidate `n` is not an end event
    ///   if some other candidate lies strictly downstream of it (reachable
    ///   from `n` but unable to reach back), since that downstream candidate
    ///   is the one that actually closes the iteration.
    /// - **break events**: every other edge leaving the component — from a
    ///   non-end node outright, or a secondary exit off an end node beyond
    ///   its first (deterministic by node index) normal continuation.
    pub fn compute(graph: &EventGraph, scc: &[NodeId]) -> Result<Self> {
        let scc_set: HashSet<NodeId> = scc.iter().copied().collect();

        let mut starts: BTreeSet<NodeId> = BTreeSet::new();
        let mut entry_sources = Vec::new();
        for &node in scc {
            for pred in graph.predecessors(node) {
                if !scc_set.contains(&pred) {
                    entry_sources.push(pred);
                    starts.insert(node);
                }
            }
        }
        // A component with no external entry point (e.g. a bare self-loop
        // reached only through edges already accounted for by an enclosing
        // rewrite) still needs a start: the earliest node by index stands in.
        if starts.is_empty() {
            starts.insert(scc[0]);
        }

        let mut candidates: BTreeSet<NodeId> = scc
            .iter()
            .copied()
            .filter(|&n| graph.successors(n).into_iter().any(|s| starts.contains(&s)))
            .collect();
        if candidates.is_empty() {
            candidates.insert(*scc.last().unwrap());
        }

        // Reachability among SCC nodes with edges into a start pruned away:
        // this breaks the cycle so "is some other candidate strictly
        // downstream of me" is actually decidable instead of vacuously true
        // for every pair inside a strongly connected component.
        let mut reachable: HashMap<NodeId, HashSet<NodeId>> = HashMap::new();
        for &n in scc {
            let mut seen = HashSet::new();
            let mut queue = VecDeque::from([n]);
            while let Some(cur) = queue.pop_front() {
                for succ in graph.successors(cur) {
                    if scc_set.contains(&succ) && !starts.contains(&succ) && seen.insert(succ) {
                        queue.push_back(succ);
                    }
                }
            }
            reachable.insert(n, seen);
        }

        let mut ends: BTreeSet<NodeId> = candidates
            .iter()
            .copied()
            .filter(|&n| {
                !candidates
                    .iter()
                    .any(|&m| m != n && reachable[&n].contains(&m) && !reachable[&m].contains(&n))
            })
            .collect();
        if ends.is_empty() {
            ends = candidates.clone();
        }

        let mut end_targets = Vec::new();
        let mut break_edges = Vec::new();
        for &node in scc {
            let mut external_succs: Vec<NodeId> =
                graph.successors(node).into_iter().filter(|s| !scc_set.contains(s)).collect();
            if external_succs.is_empty() {
                continue;
            }
            external_succs.sort();
            if ends.contains(&node) {
                // The first exit (deterministic by index) is the node's
                // normal continuation; any further ones are breaks that
                // happen to share this end node as their source.
                end_targets.push(external_succs[0]);
                for &extra in &external_succs[1..] {
                    break_edges.push((node, extra));
                }
            } else {
                for succ in external_succs {
                    break_edges.push((node, succ));
                }
            }
        }

        entry_sources.sort();
        entry_sources.dedup();
        end_targets.sort();
        end_targets.dedup();

        Ok(LoopComponents {
            scc: scc.to_vec(),
            starts: starts.into_iter().collect(),
            ends: ends.into_iter().collect(),
            break_edges,
            entry_sources,
            exit_targets: end_targets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::event::Event;

    fn evt(graph: &mut EventGraph, t: &str) -> NodeId {
        graph.add_event(Event::new(t, t))
    }

    #[test]
    fn simple_two_node_loop_assigns_distinct_start_and_end() {
        let mut graph = EventGraph::new();
        let before = evt(&mut graph, "BEFORE");
        let a = evt(&mut graph, "A");
        let b = evt(&mut graph, "B");
        let after = evt(&mut graph, "AFTER");
        graph.add_edge(before, a);
        graph.add_edge(a, b);
        graph.add_edge(b, a);
        graph.add_edge(b, after);

        let components = LoopComponents::compute(&graph, &[a, b]).unwrap();
        assert_eq!(components.starts, vec![a]);
        assert_eq!(components.ends, vec![b]);
        assert!(components.break_edges.is_empty());
        assert_eq!(components.entry_sources, vec![before]);
        assert_eq!(components.exit_targets, vec![after]);
    }

    #[test]
    fn self_loop_with_no_external_entry_still_gets_a_start() {
        let mut graph = EventGraph::new();
        let a = evt(&mut graph, "A");
        graph.add_edge(a, a);
        let components = LoopComponents::compute(&graph, &[a]).unwrap();
        assert_eq!(components.starts, vec![a]);
        assert_eq!(components.ends, vec![a]);
    }

    #[test]
    fn extra_exit_nodes_beyond_the_canonical_end_become_breaks() {
        let mut graph = EventGraph::new();
        let before = evt(&mut graph, "BEFORE");
        let a = evt(&mut graph, "A");
        let b = evt(&mut graph, "B");
        let after = evt(&mut graph, "AFTER");
        let escape = evt(&mut graph, "ESCAPE");
        graph.add_edge(before, a);
        graph.add_edge(a, b);
        graph.add_edge(b, a);
        graph.add_edge(b, after);
        graph.add_edge(a, escape);

        let components = LoopComponents::compute(&graph, &[a, b]).unwrap();
        assert_eq!(components.break_edges, vec![(a, escape)]);
        assert_eq!(components.ends, vec![b]);
    }

    /// Scenario 5 (spec §8): `A` is a start, not an end — its own exit edge
    /// to `X` is a genuine early break, distinct from `B`'s normal exit to
    /// `E`. `X` itself must show up as a break target (a real node), not a
    /// role assigned to `A`.
    #[test]
    fn scenario_5_break_target_is_the_external_node_not_the_scc_predecessor() {
        let mut graph = EventGraph::new();
        let s = evt(&mut graph, "S");
        let a = evt(&mut graph, "A");
        let b = evt(&mut graph, "B");
        let x = evt(&mut graph, "X");
        let e = evt(&mut graph, "E");
        for (src, dst) in [(s, a), (a, b), (b, a), (b, e), (a, x)] {
            graph.add_edge(src, dst);
        }

        let components = LoopComponents::compute(&graph, &[a, b]).unwrap();
        assert_eq!(components.starts, vec![a]);
        assert_eq!(components.ends, vec![b]);
        assert_eq!(components.break_edges, vec![(a, x)]);
        assert_eq!(components.exit_targets, vec![e]);
    }

    /// A single end node with two distinct external exits: the first
    /// (deterministic by index) is its normal continuation, the second a
    /// dual-purpose break off the same node.
    #[test]
    fn an_end_node_with_two_exits_keeps_one_and_breaks_on_the_other() {
        let mut graph = EventGraph::new();
        let before = evt(&mut graph, "BEFORE");
        let a = evt(&mut graph, "A");
        let b = evt(&mut graph, "B");
        let after = evt(&mut graph, "AFTER");
        let escape = evt(&mut graph, "ESCAPE");
        graph.add_edge(before, a);
        graph.add_edge(a, b);
        graph.add_edge(b, a);
        graph.add_edge(b, after);
        graph.add_edge(b, escape);

        let components = LoopComponents::compute(&graph, &[a, b]).unwrap();
        assert_eq!(components.ends, vec![b]);
        assert_eq!(components.exit_targets, vec![after]);
        assert_eq!(components.break_edges, vec![(b, escape)]);
    }
}
