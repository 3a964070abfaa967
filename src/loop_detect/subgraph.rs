//! §4.C "subgraph construction": deep-copies a loop's SCC (and the real
//! external nodes it breaks to) into its own arena, brackets it with
//! `DUMMY_START`/`DUMMY_END`, and canonicalizes dual-purpose breaks through a
//! fresh `DUMMY_BREAK` event.

use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::loop_detect::components::LoopComponents;
use crate::model::event::Event;
use crate::model::event_graph::{EventGraph, NodeId};
use crate::{DUMMY_BREAK_EVENT_TYPE, DUMMY_END_EVENT, DUMMY_START_EVENT};

/// Builds the standalone loop-body graph for `components`. Returns the body
/// graph together with the `DUMMY_START`/`DUMMY_END` uids and the uids of
/// every real break event copied into it, ready to hand to
/// [`crate::model::loop_event::LoopData::new`].
pub fn build(graph: &EventGraph, components: &LoopComponents) -> Result<(EventGraph, String, String, Vec<String>)> {
    let scc_set: HashSet<NodeId> = components.scc.iter().copied().collect();
    let mut sub = EventGraph::new();
    let mut id_map: HashMap<NodeId, NodeId> = HashMap::new();

    for &node in &components.scc {
        let cloned = graph.get(node).clone();
        let new_id = sub.add_event(cloned);
        id_map.insert(node, new_id);
    }
    for &node in &components.scc {
        for succ in graph.successors(node) {
            if scc_set.contains(&succ) {
                sub.add_edge(id_map[&node], id_map[&succ]);
            }
        }
    }

    let dummy_start = sub.add_event(Event::with_generated_uid(DUMMY_START_EVENT));
    for &start in &components.starts {
        sub.add_edge(dummy_start, id_map[&start]);
    }

    let dummy_end = sub.add_event(Event::with_generated_uid(DUMMY_END_EVENT));

    // Canonicalize the cycle's closing edge(s): any edge inside the body
    // that targets a start event is what made this component a cycle in the
    // first place. Redirecting it to `dummy_end` turns the body into a plain
    // DAG from `dummy_start` to `dummy_end` — one iteration's worth of flow —
    // with the repetition itself left to the walker/emitter layer.
    let start_subs: HashSet<NodeId> = components.starts.iter().map(|s| id_map[s]).collect();
    let back_edges: Vec<(NodeId, NodeId)> = sub.edges().filter(|&(_, dst)| start_subs.contains(&dst)).collect();
    for (src, dst) in back_edges {
        sub.remove_edge(src, dst);
        sub.add_edge(src, dummy_end);
    }

    for &end in &components.ends {
        sub.add_edge(id_map[&end], dummy_end);
    }

    // Break events are real external nodes, not a content-free placeholder:
    // each distinct break target is deep-copied into the body with its own
    // identity so it renders as itself (e.g. Scenario 5's `X`). A break
    // sourced from an end node is a dual-purpose sibling of that node's
    // normal exit and gets a synthetic `DUMMY_BREAK` inserted strictly
    // between the predecessor and the break event, on the intra-loop side,
    // to disambiguate it from the end node's own exit edge; a break sourced
    // from a non-end node needs no such disambiguation.
    let ends_set: HashSet<NodeId> = components.ends.iter().copied().collect();
    let mut copied_targets: HashMap<NodeId, NodeId> = HashMap::new();
    let mut break_uids = Vec::new();
    for &(break_source, break_target) in &components.break_edges {
        let source_sub = id_map[&break_source];
        let target_sub = *copied_targets
            .entry(break_target)
            .or_insert_with(|| sub.add_event(graph.get(break_target).clone()));

        if ends_set.contains(&break_source) {
            let dummy_break = sub.add_event(Event::with_generated_uid(DUMMY_BREAK_EVENT_TYPE));
            sub.add_edge(source_sub, dummy_break);
            sub.add_edge(dummy_break, target_sub);
        } else {
            sub.add_edge(source_sub, target_sub);
        }
        sub.add_edge(target_sub, dummy_end);
        break_uids.push(sub.get(target_sub).uid().to_string());
    }
    break_uids.sort();
    break_uids.dedup();

    sub.recompute_all_logic_gate_trees();

    let start_uid = sub.get(dummy_start).uid().to_string();
    let end_uid = sub.get(dummy_end).uid().to_string();
    Ok((sub, start_uid, end_uid, break_uids))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evt(graph: &mut EventGraph, t: &str) -> NodeId {
        graph.add_event(Event::new(t, t))
    }

    #[test]
    fn brackets_a_simple_loop_with_dummy_start_and_end() {
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
        let (sub, start_uid, end_uid, breaks) = build(&graph, &components).unwrap();

        assert!(breaks.is_empty());
        // 2 body nodes + dummy start + dummy end.
        assert_eq!(sub.node_count(), 4);
        let start_id = sub.find_by_event_type(DUMMY_START_EVENT).unwrap();
        let end_id = sub.find_by_event_type(DUMMY_END_EVENT).unwrap();
        assert_eq!(sub.get(start_id).uid(), start_uid);
        assert_eq!(sub.get(end_id).uid(), end_uid);
        // the back edge B->A must have been redirected to point at dummy_end.
        assert!(sub.successors(sub.find_by_event_type("B").unwrap()).contains(&end_id));
    }

    /// A break sourced from a non-end node is copied in with its own
    /// identity and wired straight to the break target, no `DUMMY_BREAK`
    /// needed.
    #[test]
    fn break_from_a_non_end_node_copies_the_real_external_target() {
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
        let (sub, _start_uid, _end_uid, breaks) = build(&graph, &components).unwrap();

        assert_eq!(breaks.len(), 1);
        assert!(sub.find_by_event_type(DUMMY_BREAK_EVENT_TYPE).is_none());
        let escape_copy = sub.find_by_event_type("ESCAPE").unwrap();
        assert_eq!(sub.get(escape_copy).uid(), breaks[0]);
        assert!(sub.successors(sub.find_by_event_type("A").unwrap()).contains(&escape_copy));
    }

    /// A break sourced from an end node (the same node that also exits
    /// normally) gets a `DUMMY_BREAK` inserted between it and the real
    /// break target, so the two exits stay distinguishable.
    #[test]
    fn break_from_an_end_node_is_canonicalized_through_a_dummy_break() {
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
        let (sub, _start_uid, _end_uid, breaks) = build(&graph, &components).unwrap();

        assert_eq!(breaks.len(), 1);
        let dummy_break = sub.find_by_event_type(DUMMY_BREAK_EVENT_TYPE).unwrap();
        let escape_copy = sub.find_by_event_type("ESCAPE").unwrap();
        assert_eq!(sub.get(escape_copy).uid(), breaks[0]);
        assert!(sub.successors(sub.find_by_event_type("B").unwrap()).contains(&dummy_break));
        assert!(sub.successors(dummy_break).contains(&escape_copy));
    }
}
