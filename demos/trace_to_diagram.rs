//! End-to-end demonstration of Component A feeding Component B/C/D: a raw
//! trace tree (one root, two sequential children) is deduplicated, sequenced
//! into a previous-event assignment, folded into an [`EventGraph`]'s
//! event-sets, and finally run through the full inference pipeline.
//!
//! The fold-into-`EventGraph` step isn't itself a named pipeline stage (only
//! [`tel2puml_core::sequencing::sequence_job`]'s predecessor map is in
//! scope); this demo's glue rule is: an event with no recorded predecessor
//! inherits an edge from its trace parent (nothing else precedes it within
//! that parent's children), otherwise an edge comes from each recorded
//! predecessor.

use std::collections::HashMap;

use tel2puml_core::config::JobConfig;
use tel2puml_core::model::event::Event;
use tel2puml_core::model::event_graph::EventGraph;
use tel2puml_core::sequencing::{find_root, sequence_job, RawTraceEvent};
use tel2puml_core::{dedup, run_pipeline};

fn trace(id: &str, event_type: &str, parent: Option<&str>, children: &[&str], start: i64, end: i64) -> RawTraceEvent {
    RawTraceEvent {
        event_id: id.to_string(),
        event_type: event_type.to_string(),
        parent_event_id: parent.map(str::to_string),
        child_event_ids: children.iter().map(|s| s.to_string()).collect(),
        start_timestamp: start,
        end_timestamp: end,
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let root = trace("r1", "ROOT", None, &["a1", "b1"], 0, 100);
    let a = trace("a1", "A", Some("r1"), &[], 0, 10);
    let b = trace("b1", "B", Some("r1"), &[], 20, 30);

    let events: HashMap<String, &RawTraceEvent> =
        [("r1".to_string(), &root), ("a1".to_string(), &a), ("b1".to_string(), &b)].into_iter().collect();

    let root_event = find_root(&events).expect("exactly one root");
    let representatives = dedup::deduplicate_roots(&[root_event], &events);
    println!("{} distinct trace shape(s)", representatives.len());

    let config = JobConfig::default();
    let predecessors = sequence_job(root_event, &events, &config).expect("sequencing should succeed");

    let mut graph = EventGraph::new();
    let mut nodes = HashMap::new();
    for &event in events.values() {
        let id = graph.add_event(Event::with_generated_uid(event.event_type.clone()));
        nodes.insert(event.event_id.clone(), id);
    }

    for (event_id, previous_ids) in &predecessors {
        let event_type = events[event_id].event_type.clone();
        let node = nodes[event_id];
        if previous_ids.is_empty() {
            if let Some(parent_id) = &events[event_id].parent_event_id {
                let parent_node = nodes[parent_id];
                graph.get_mut(parent_node).update_event_sets([event_type.clone()]);
                graph.add_edge(parent_node, node);
            }
        } else {
            for previous_id in previous_ids {
                let previous_node = nodes[previous_id];
                graph.get_mut(previous_node).update_event_sets([event_type.clone()]);
                graph.add_edge(previous_node, node);
            }
        }
    }

    let puml = run_pipeline(graph, &config).expect("pipeline should succeed on a well-formed graph");
    println!("{}", puml.to_plantuml());
}
