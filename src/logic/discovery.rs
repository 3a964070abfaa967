//! §4.B phases 1–5: augmented-log synthesis, process-tree discovery,
//! OR-gate extension, defunct-OR flattening, and missing-AND insertion.
//!
//! The source hands a synthesized event log to an external inductive-miner
//! (treated as a black box). No such process-mining crate exists in this
//! corpus, so this module implements the equivalent cut directly over the
//! *reduced* event-sets (the co-occurrence information the synthesized log
//! actually carries, once every permutation of each occurrence has been
//! enumerated — permuting destroys all ordering evidence, so what's left is
//! exactly "which types co-occurred in the same occurrence"). This keeps the
//! same input/output contract as the black box it replaces (traces in,
//! `ProcessTree` out) while staying entirely self-contained.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;

use crate::logic::set_cover::weighted_cover;
use crate::model::event::Event;
use crate::process_tree::{Operator, ProcessTree};

/// Enumerates, for every reduced event-set observed for `event`, a synthetic
/// trace `[self_type, permutation...]` — the literal operation described in
/// §4.B phase 1. Not consumed by [`discover_successor_tree`] (see module
/// docs), but kept as a first-class operation: a diagnostic/test surface
/// that any future swap-in of a real process-mining backend would plug into
/// unchanged.
pub fn augmented_log(event: &Event) -> Vec<Vec<String>> {
    let mut log = Vec::new();
    for reduced in event.reduced_event_set() {
        let items: Vec<String> = reduced.iter().cloned().collect();
        let len = items.len();
        for perm in items.into_iter().permutations(len) {
            let mut trace = vec![event.event_type.clone()];
            trace.extend(perm);
            log.push(trace);
        }
    }
    log
}

/// Builds a co-occurrence graph over `universe` (an edge between two types
/// whenever some reduced set contains both) and returns its connected
/// components. Grounded directly on the source's
/// `get_overlapping_event_types`: types that never co-occur fall into
/// different components and are therefore mutually exclusive alternatives.
fn overlap_components(
    universe: &BTreeSet<String>,
    reduced_sets: &BTreeSet<BTreeSet<String>>,
) -> Vec<BTreeSet<String>> {
    let mut parent: BTreeMap<String, String> = universe.iter().map(|t| (t.clone(), t.clone())).collect();

    fn find(parent: &mut BTreeMap<String, String>, x: &str) -> String {
        let next = parent.get(x).cloned().unwrap_or_else(|| x.to_string());
        if next == x {
            x.to_string()
        } else {
            let root = find(parent, &next);
            parent.insert(x.to_string(), root.clone());
            root
        }
    }

    for set in reduced_sets {
        let mut iter = set.iter();
        if let Some(first) = iter.next() {
            for other in iter {
                let root_a = find(&mut parent, first);
                let root_b = find(&mut parent, other);
                if root_a != root_b {
                    parent.insert(root_a, root_b);
                }
            }
        }
    }

    let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for t in universe {
        let root = find(&mut parent, t);
        groups.entry(root).or_default().insert(t.clone());
    }
    groups.into_values().collect()
}

/// Discovers the successor logic tree from an event's reduced event-sets
/// (§4.B phases 2–5 collapsed into one direct cut-detection pass; see module
/// docs for why phases 2–4's intermediate tau-XOR representation is skipped
/// in favor of directly emitting OR/AND/XOR).
pub fn discover_successor_tree(reduced_sets: &BTreeSet<BTreeSet<String>>) -> ProcessTree {
    let universe: BTreeSet<String> = reduced_sets.iter().flatten().cloned().collect();

    if universe.len() <= 1 {
        return match universe.into_iter().next() {
            Some(only) => ProcessTree::leaf(only),
            None => ProcessTree::tau(),
        };
    }

    if reduced_sets.len() == 1 && reduced_sets.iter().next() == Some(&universe) {
        // Every observation contains exactly the same full set: a plain AND.
        let mut leaves: Vec<ProcessTree> = universe.into_iter().map(ProcessTree::leaf).collect();
        leaves.sort_by(|a, b| a.label().cmp(&b.label()));
        return ProcessTree::node(Operator::And, leaves);
    }

    let groups = overlap_components(&universe, reduced_sets);
    if groups.len() > 1 {
        let mut children: Vec<ProcessTree> = groups
            .into_iter()
            .map(|group| {
                let group_sets: BTreeSet<BTreeSet<String>> = reduced_sets
                    .iter()
                    .filter(|s| s.is_subset(&group))
                    .cloned()
                    .collect();
                discover_successor_tree(&group_sets)
            })
            .collect();
        children.sort_by_key(|c| c.leaf_labels().join(","));
        return ProcessTree::node(Operator::Xor, children);
    }

    // One connected component spanning the whole universe but more than one
    // distinct combination observed: an OR, refined by a missing-AND
    // insertion (§4.B phase 5) over the proper-subset reduced sets.
    let mut candidates = reduced_sets.clone();
    candidates.remove(&universe);

    match weighted_cover(&candidates, &universe) {
        Some(cover) => {
            let mut children: Vec<ProcessTree> = cover
                .into_iter()
                .map(|subset| {
                    if subset.len() > 1 {
                        let mut leaves: Vec<ProcessTree> =
                            subset.into_iter().map(ProcessTree::leaf).collect();
                        leaves.sort_by(|a, b| a.label().cmp(&b.label()));
                        ProcessTree::node(Operator::And, leaves)
                    } else {
                        ProcessTree::leaf(subset.into_iter().next().unwrap())
                    }
                })
                .collect();
            children.sort_by_key(|c| c.leaf_labels().join(","));
            ProcessTree::node(Operator::Or, children)
        }
        None => {
            // No sub-universe cover exists (only the full set and/or
            // unrelated partial sets were observed): fall back to a flat OR
            // of individual leaves, which is always a safe, if coarser,
            // description of "any non-empty combination may occur".
            let mut leaves: Vec<ProcessTree> = universe.into_iter().map(ProcessTree::leaf).collect();
            leaves.sort_by(|a, b| a.label().cmp(&b.label()));
            ProcessTree::node(Operator::Or, leaves)
        }
    }
}

/// Flattens any OR node whose parent is also an OR into that parent (§4.B
/// phase 4 "Defunct-OR flattening"). [`discover_successor_tree`] never nests
/// OR directly inside OR by construction, but this pass is kept and applied
/// unconditionally so that trees built or edited via other paths (e.g. a
/// deserialized [`ProcessTree`] document) stay normalized.
pub fn flatten_defunct_or(tree: ProcessTree) -> ProcessTree {
    match tree {
        ProcessTree::Leaf(label) => ProcessTree::Leaf(label),
        ProcessTree::Node(Operator::Or, children) => {
            let mut flattened = Vec::with_capacity(children.len());
            for child in children {
                match flatten_defunct_or(child) {
                    ProcessTree::Node(Operator::Or, grandchildren) => flattened.extend(grandchildren),
                    other => flattened.push(other),
                }
            }
            ProcessTree::node(Operator::Or, flattened)
        }
        ProcessTree::Node(op, children) => {
            ProcessTree::node(op, children.into_iter().map(flatten_defunct_or).collect())
        }
    }
}
