//! Component C: loop detection and graph rewriting (§4.C).

pub mod components;
pub mod subgraph;

pub use components::LoopComponents;

use crate::error::Result;
use crate::model::event::Event;
use crate::model::event_graph::{EventGraph, NodeId};
use crate::model::loop_event::LoopData;
use crate::LOOP_EVENT_TYPE;

/// Repeatedly finds and collapses every non-trivial strongly connected
/// component in `graph` into a single loop event, until none remain.
/// Terminates because each rewrite deletes every edge internal to the SCC it
/// processes (including any self-loop), so the same component can never be
/// rediscovered on a later pass — the determinism/termination argument from
/// §4.C.
pub fn detect_loops(mut graph: EventGraph) -> Result<EventGraph> {
    loop {
        let sccs = graph.strongly_connected_components();
        let target = sccs.into_iter().find(|scc| graph.is_non_trivial_scc(scc));
        let Some(scc) = target else { break };
        tracing::debug!(size = scc.len(), "collapsing loop component");
        rewrite_loop(&mut graph, &scc)?;
    }
    graph.check_invariants()?;
    Ok(graph)
}

fn rewrite_loop(graph: &mut EventGraph, scc: &[NodeId]) -> Result<()> {
    let components = LoopComponents::compute(graph, scc)?;
    let (body, start_uid, end_uid, break_uids) = subgraph::build(graph, &components)?;

    // Nested loops inside this body are rewritten before the body is sealed
    // into this loop event, so loop detection never needs to look inside an
    // already-finished `LoopData`.
    let body = detect_loops(body)?;

    let mut loop_event = Event::with_generated_uid(LOOP_EVENT_TYPE);
    let loop_data = LoopData::new(body, start_uid, end_uid, break_uids);
    loop_data.check_invariants()?;
    loop_event.loop_data = Some(Box::new(loop_data));

    let entry_sources = components.entry_sources.clone();
    let exit_targets = components.exit_targets.clone();
    let exit_types: Vec<String> = exit_targets
        .iter()
        .filter(|&&t| graph.contains(t))
        .map(|&t| graph.get(t).event_type.clone())
        .collect();
    if !exit_types.is_empty() {
        loop_event.update_event_sets(exit_types);
    }

    for &id in scc {
        graph.remove_node(id);
    }
    let loop_id = graph.add_event(loop_event);
    for source in entry_sources {
        if graph.contains(source) {
            graph.add_edge(source, loop_id);
        }
    }
    for target in exit_targets {
        if graph.contains(target) {
            graph.add_edge(loop_id, target);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::event::Event as ModelEvent;

    fn evt(graph: &mut EventGraph, t: &str) -> NodeId {
        graph.add_event(ModelEvent::new(t, t))
    }

    #[test_log::test]
    fn collapses_a_simple_loop_into_a_single_loop_event() {
        let mut graph = EventGraph::new();
        let before = evt(&mut graph, "BEFORE");
        let a = evt(&mut graph, "A");
        let b = evt(&mut graph, "B");
        let after = evt(&mut graph, "AFTER");
        graph.add_edge(before, a);
        graph.add_edge(a, b);
        graph.add_edge(b, a);
        graph.add_edge(b, after);

        let result = detect_loops(graph).unwrap();
        assert_eq!(result.node_count(), 3); // BEFORE, LOOP, AFTER
        let loop_id = result.find_by_event_type(LOOP_EVENT_TYPE).unwrap();
        assert!(result.get(loop_id).is_loop_event());
        assert!(result.has_edge(result.find_by_event_type("BEFORE").unwrap(), loop_id));
        assert!(result.has_edge(loop_id, result.find_by_event_type("AFTER").unwrap()));
    }

    #[test]
    fn no_cycles_leaves_the_graph_untouched() {
        let mut graph = EventGraph::new();
        let a = evt(&mut graph, "A");
        let b = evt(&mut graph, "B");
        graph.add_edge(a, b);
        let result = detect_loops(graph).unwrap();
        assert_eq!(result.node_count(), 2);
        assert!(result.find_by_event_type(LOOP_EVENT_TYPE).is_none());
    }

    #[test]
    fn a_bare_self_loop_collapses_without_looping_forever() {
        let mut graph = EventGraph::new();
        let before = evt(&mut graph, "BEFORE");
        let a = evt(&mut graph, "A");
        let after = evt(&mut graph, "AFTER");
        graph.add_edge(before, a);
        graph.add_edge(a, a);
        graph.add_edge(a, after);

        let result = detect_loops(graph).unwrap();
        assert_eq!(result.node_count(), 3);
        let loop_id = result.find_by_event_type(LOOP_EVENT_TYPE).unwrap();
        let body = &result.get(loop_id).loop_data.as_ref().unwrap().sub_graph;
        // dummy_start -> A -> dummy_end, the self-edge canonicalized away.
        assert_eq!(body.node_count(), 3);
    }
}
