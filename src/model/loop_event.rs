//! Loop-event payload (§3 `LoopEvent`). The source models `LoopEvent` as an
//! `Event` subclass; this crate prefers composition (§9 favors tagged
//! variants and explicit data over inheritance throughout), so an ordinary
//! [`Event`] optionally carries a `LoopData` box instead of a separate type.
//! `event.loop_data.is_some()` is exactly the "is this Event a LoopEvent"
//! predicate the source's `isinstance(event, LoopEvent)` checks would be.

use crate::model::event_graph::EventGraph;

/// The loop body and its canonical entry/exit/break markers.
#[derive(Debug)]
pub struct LoopData {
    pub sub_graph: EventGraph,
    pub start_uid: String,
    pub end_uid: String,
    pub break_uids: Vec<String>,
}

impl LoopData {
    pub fn new(sub_graph: EventGraph, start_uid: String, end_uid: String, break_uids: Vec<String>) -> Self {
        LoopData {
            sub_graph,
            start_uid,
            end_uid,
            break_uids,
        }
    }

    /// Checks the §8 LoopEvent invariant: `sub_graph` has exactly one node
    /// with uid `start_uid`, exactly one with uid `end_uid`, and every
    /// `break_uid` resolves to a real node.
    pub fn check_invariants(&self) -> crate::Result<()> {
        let starts = self
            .sub_graph
            .node_indices()
            .filter(|&id| self.sub_graph.get(id).uid() == self.start_uid)
            .count();
        let ends = self
            .sub_graph
            .node_indices()
            .filter(|&id| self.sub_graph.get(id).uid() == self.end_uid)
            .count();
        if starts != 1 {
            return Err(crate::Error::InvariantViolation(format!(
                "loop subgraph has {starts} nodes with start_uid {}, expected exactly 1",
                self.start_uid
            )));
        }
        if ends != 1 {
            return Err(crate::Error::InvariantViolation(format!(
                "loop subgraph has {ends} nodes with end_uid {}, expected exactly 1",
                self.end_uid
            )));
        }
        for break_uid in &self.break_uids {
            let found = self
                .sub_graph
                .node_indices()
                .any(|id| self.sub_graph.get(id).uid() == break_uid);
            if !found {
                return Err(crate::Error::InvariantViolation(format!(
                    "break_uid {break_uid} has no corresponding node in the loop subgraph"
                )));
            }
        }
        Ok(())
    }
}

impl Clone for LoopData {
    fn clone(&self) -> Self {
        // `EventGraph` intentionally does not derive `Clone` at large (it is
        // meant to be moved, not duplicated, during rewriting); loop data is
        // only ever cloned in tests, where we rebuild a fresh empty body.
        LoopData {
            sub_graph: EventGraph::new(),
            start_uid: self.start_uid.clone(),
            end_uid: self.end_uid.clone(),
            break_uids: self.break_uids.clone(),
        }
    }
}
