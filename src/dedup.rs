//! Unique-graph deduplicator (§4.E "Unique-graph deduplicator"). Computes a
//! stable structural hash of each root trace's shape — event type plus the
//! sorted hashes of its children, recursively — so that structurally
//! identical traces (same shape, different event ids/timestamps) can be
//! collapsed to one representative before sequencing.
//!
//! Grounded on `otel_to_pv/data_holders/sql_data_holder/sql_dataholder.py`'s
//! `compute_graph_hash_from_event_ids` (event type concatenated with sorted
//! child hashes, then hashed). That function reaches for `xxhash`; this
//! crate uses `rustc_hash::FxHasher` instead, matching the hasher the
//! teacher crate already depends on and uses throughout its own internals.

use std::collections::HashMap;
use std::hash::Hasher;

use rustc_hash::FxHasher;

use crate::sequencing::RawTraceEvent;

/// The structural hash of a root trace, as a fixed-width hex string (the
/// same external shape as a hash readers would expect to compare/store).
pub fn graph_hash(root: &RawTraceEvent, events: &HashMap<String, &RawTraceEvent>) -> String {
    format!("{:016x}", graph_hash_u64(root, events))
}

fn graph_hash_u64(node: &RawTraceEvent, events: &HashMap<String, &RawTraceEvent>) -> u64 {
    let mut child_hashes: Vec<u64> = node
        .child_event_ids
        .iter()
        .filter_map(|id| events.get(id))
        .map(|&child| graph_hash_u64(child, events))
        .collect();
    child_hashes.sort_unstable();

    let mut hasher = FxHasher::default();
    hasher.write(node.event_type.as_bytes());
    for child_hash in child_hashes {
        hasher.write_u64(child_hash);
    }
    hasher.finish()
}

/// Picks one representative root per distinct structural hash, preserving
/// the order roots first appear in. The representatives are what sequencing
/// should actually run over; everything else is a structural duplicate.
pub fn deduplicate_roots<'a>(
    roots: &[&'a RawTraceEvent],
    events: &HashMap<String, &'a RawTraceEvent>,
) -> Vec<&'a RawTraceEvent> {
    let mut seen = std::collections::HashSet::new();
    let mut representatives = Vec::new();
    for &root in roots {
        let hash = graph_hash_u64(root, events);
        if seen.insert(hash) {
            representatives.push(root);
        }
    }
    representatives
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, children: &[&str]) -> RawTraceEvent {
        RawTraceEvent {
            event_id: id.to_string(),
            event_type: id.chars().take_while(|c| !c.is_ascii_digit()).collect(),
            parent_event_id: None,
            child_event_ids: children.iter().map(|s| s.to_string()).collect(),
            start_timestamp: 0,
            end_timestamp: 0,
        }
    }

    #[test]
    fn identical_shapes_with_different_ids_hash_equal() {
        let a1 = event("A1", &["B1"]);
        let b1 = event("B1", &[]);
        let a2 = event("A2", &["B2"]);
        let b2 = event("B2", &[]);
        let events: HashMap<String, &RawTraceEvent> = [
            ("A1".to_string(), &a1),
            ("B1".to_string(), &b1),
            ("A2".to_string(), &a2),
            ("B2".to_string(), &b2),
        ]
        .into_iter()
        .collect();

        assert_eq!(graph_hash(&a1, &events), graph_hash(&a2, &events));
    }

    #[test]
    fn child_order_in_the_source_tree_does_not_affect_the_hash() {
        let a1 = event("A1", &["B1", "C1"]);
        let b1 = event("B1", &[]);
        let c1 = event("C1", &[]);
        let a2 = event("A2", &["C2", "B2"]);
        let b2 = event("B2", &[]);
        let c2 = event("C2", &[]);
        let events: HashMap<String, &RawTraceEvent> = [
            ("A1".to_string(), &a1),
            ("B1".to_string(), &b1),
            ("C1".to_string(), &c1),
            ("A2".to_string(), &a2),
            ("B2".to_string(), &b2),
            ("C2".to_string(), &c2),
        ]
        .into_iter()
        .collect();

        assert_eq!(graph_hash(&a1, &events), graph_hash(&a2, &events));
    }

    #[test]
    fn differing_shapes_hash_differently() {
        let a1 = event("A1", &["B1"]);
        let b1 = event("B1", &[]);
        let a2 = event("A2", &[]);
        let events: HashMap<String, &RawTraceEvent> =
            [("A1".to_string(), &a1), ("B1".to_string(), &b1), ("A2".to_string(), &a2)].into_iter().collect();

        assert_ne!(graph_hash(&a1, &events), graph_hash(&a2, &events));
    }

    #[test]
    fn deduplicate_roots_keeps_one_representative_per_shape() {
        let a1 = event("A1", &["B1"]);
        let b1 = event("B1", &[]);
        let a2 = event("A2", &["B2"]);
        let b2 = event("B2", &[]);
        let c1 = event("C1", &[]);
        let events: HashMap<String, &RawTraceEvent> = [
            ("A1".to_string(), &a1),
            ("B1".to_string(), &b1),
            ("A2".to_string(), &a2),
            ("B2".to_string(), &b2),
            ("C1".to_string(), &c1),
        ]
        .into_iter()
        .collect();

        let roots = vec![&a1, &a2, &c1];
        let representatives = deduplicate_roots(&roots, &events);
        assert_eq!(representatives.len(), 2);
        assert_eq!(representatives[0].event_id, "A1");
        assert_eq!(representatives[1].event_id, "C1");
    }
}
