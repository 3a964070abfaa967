//! Component B: logic-gate inference (§4.B). Turns an event's accumulated
//! forward event-sets into a [`ProcessTree`] describing the control flow
//! among its successors.

pub mod branch;
pub mod discovery;
pub mod set_cover;

use crate::model::event::Event;
use crate::process_tree::ProcessTree;

/// Runs the full §4.B phase pipeline over a single event's evidence:
/// discovery (phases 1–5) followed by branch-repeat detection, defunct-SEQ
/// removal, and the sanity check (phases 6–9). Returns `None` when the event
/// has no forward evidence at all — §4.B's documented non-error "no
/// successors observed" case, not a failure.
pub fn calculate_logic_gates(event: &Event) -> Option<ProcessTree> {
    let reduced = event.reduced_event_set();
    if reduced.is_empty() {
        return None;
    }

    let tree = discovery::discover_successor_tree(&reduced);
    let tree = discovery::flatten_defunct_or(tree);
    let tree = branch::apply_branch_repeat_detection(tree, &event.event_set_counts());
    let tree = branch::remove_defunct_seq(tree);

    match branch::check_branch_tree_sanity(&tree) {
        Ok(()) => Some(tree),
        Err(err) => {
            tracing::warn!(event = %event.event_type, error = %err, "discarding malformed logic tree");
            None
        }
    }
}
