//! The event-set file format round-trip (§6 "Event set file format"):
//! a persisted inference-state document, one entry per event, each carrying
//! its accumulated forward/backward event-sets as nested count records.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::event::Event;
use crate::model::event_graph::EventGraph;
use crate::model::event_set::EventSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EventTypeCount {
    #[serde(rename = "eventType")]
    event_type: String,
    count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EventDocument {
    #[serde(rename = "eventType")]
    event_type: String,
    #[serde(rename = "outgoingEventSets")]
    outgoing_event_sets: Vec<Vec<EventTypeCount>>,
    #[serde(rename = "incomingEventSets")]
    incoming_event_sets: Vec<Vec<EventTypeCount>>,
}

/// The top-level persisted document for one job's accumulated inference
/// state (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSetDocument {
    pub job_name: String,
    events: Vec<EventDocument>,
}

fn event_set_to_wire(set: &EventSet) -> Vec<EventTypeCount> {
    set.iter()
        .map(|(event_type, count)| EventTypeCount {
            event_type: event_type.to_string(),
            count,
        })
        .collect()
}

fn event_set_from_wire(wire: &[EventTypeCount]) -> EventSet {
    let flat: Vec<String> = wire
        .iter()
        .flat_map(|e| std::iter::repeat(e.event_type.clone()).take(e.count.max(1) as usize))
        .collect();
    EventSet::from_events(flat)
}

/// Serializes `job_name`'s event graph to the §6 document shape.
pub fn to_document(job_name: impl Into<String>, graph: &EventGraph) -> EventSetDocument {
    let events = graph
        .node_indices()
        .map(|id| {
            let event = graph.get(id);
            EventDocument {
                event_type: event.event_type.clone(),
                outgoing_event_sets: event.event_sets.iter().map(event_set_to_wire).collect(),
                incoming_event_sets: event.in_event_sets.iter().map(event_set_to_wire).collect(),
            }
        })
        .collect();
    EventSetDocument {
        job_name: job_name.into(),
        events,
    }
}

/// Reconstructs an [`EventGraph`] from a §6 document: one node per listed
/// event type, plus one node per event type that only appears inside an
/// event-set (a successor never independently listed still needs a node to
/// hang an edge off of), with an edge for every type named in a forward
/// event-set.
pub fn from_document(doc: &EventSetDocument) -> Result<EventGraph> {
    let mut graph = EventGraph::new();
    let mut nodes = std::collections::HashMap::new();

    for entry in &doc.events {
        let id = graph.add_event(Event::with_generated_uid(entry.event_type.clone()));
        nodes.insert(entry.event_type.clone(), id);
    }
    for entry in &doc.events {
        for wire_set in entry.outgoing_event_sets.iter().chain(entry.incoming_event_sets.iter()) {
            for count in wire_set {
                nodes.entry(count.event_type.clone()).or_insert_with(|| {
                    graph.add_event(Event::with_generated_uid(count.event_type.clone()))
                });
            }
        }
    }

    for entry in &doc.events {
        let &id = &nodes[&entry.event_type];
        for wire_set in &entry.outgoing_event_sets {
            let set = event_set_from_wire(wire_set);
            graph.get_mut(id).update_event_sets(set.to_list());
            for count in wire_set {
                graph.add_edge(id, nodes[&count.event_type]);
            }
        }
        for wire_set in &entry.incoming_event_sets {
            let set = event_set_from_wire(wire_set);
            graph.get_mut(id).update_in_event_sets(set.to_list());
        }
    }

    Ok(graph)
}

pub fn to_json_string(doc: &EventSetDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(doc)?)
}

pub fn from_json_str(text: &str) -> Result<EventSetDocument> {
    Ok(serde_json::from_str(text)?)
}
