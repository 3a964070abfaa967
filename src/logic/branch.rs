//! §4.B phases 6–9: branch-repeat detection, repeat expansion, defunct-SEQ
//! removal, and the branch-tree sanity check.

use std::collections::{BTreeMap, BTreeSet};

use crate::process_tree::{Operator, ProcessTree};

/// Phase 6 ("branch-repeat detection") and phase 7 ("repeat expansion")
/// combined: a leaf whose observed multiplicity *varies* across event-sets
/// is wrapped `BR(XOR(...))`, one child per distinct count, each a plain
/// leaf for a count of 1 or an `AND` expansion of `count` copies of the leaf
/// otherwise — exactly Scenario 6's "for every distinct count of B observed,
/// the branch subtree contains a corresponding AND expansion". A leaf
/// observed with a single, non-varying count greater than one is *not*
/// wrapped in `BR` at all: there is nothing to branch on, so it is replaced
/// directly by its `AND` expansion (a fixed `AND(B,B)`, say, rather than
/// `BR(AND(B,B))`).
pub fn apply_branch_repeat_detection(
    tree: ProcessTree,
    counts: &BTreeMap<String, BTreeSet<u32>>,
) -> ProcessTree {
    match tree {
        ProcessTree::Leaf(label) => expand_leaf(label, counts),
        ProcessTree::Node(op, children) => ProcessTree::node(
            op,
            children
                .into_iter()
                .map(|c| apply_branch_repeat_detection(c, counts))
                .collect(),
        ),
    }
}

fn expand_leaf(label: String, counts: &BTreeMap<String, BTreeSet<u32>>) -> ProcessTree {
    if label == crate::process_tree::TAU {
        return ProcessTree::Leaf(label);
    }
    let Some(observed) = counts.get(&label) else {
        return ProcessTree::Leaf(label);
    };
    match observed.len() {
        0 => ProcessTree::Leaf(label),
        1 => and_expansion(&label, *observed.iter().next().unwrap()),
        _ => {
            let variants: Vec<ProcessTree> = observed.iter().map(|&count| and_expansion(&label, count)).collect();
            ProcessTree::node(Operator::Branch, vec![ProcessTree::node(Operator::Xor, variants)])
        }
    }
}

/// `count` copies of `label` under an `AND`, or the bare leaf for `count <= 1`.
fn and_expansion(label: &str, count: u32) -> ProcessTree {
    if count <= 1 {
        ProcessTree::leaf(label)
    } else {
        ProcessTree::node(Operator::And, (0..count).map(|_| ProcessTree::leaf(label)).collect())
    }
}

/// Phase 8: collapses any `SEQ` node left with a single child. Discovery
/// never emits multi-child `SEQ` (sequencing is Component A's concern, not
/// Component B's), but a tree arriving from elsewhere — a deserialized
/// document, or a future discovery backend — may, so this pass stays
/// unconditional rather than an assertion.
pub fn remove_defunct_seq(tree: ProcessTree) -> ProcessTree {
    match tree {
        ProcessTree::Leaf(label) => ProcessTree::Leaf(label),
        ProcessTree::Node(Operator::Seq, mut children) if children.len() == 1 => {
            remove_defunct_seq(children.remove(0))
        }
        ProcessTree::Node(op, children) => {
            ProcessTree::node(op, children.into_iter().map(remove_defunct_seq).collect())
        }
    }
}

/// Phase 9: validates the branch-tree invariant that every `BR` node has
/// exactly one child (a bare repeat marker around a single successor, never
/// a fork of alternatives — that's what `X`/`O` are for). Violations here
/// indicate a bug in an earlier phase, not bad input, hence
/// [`crate::Error::InvariantViolation`] rather than a recoverable error.
pub fn check_branch_tree_sanity(tree: &ProcessTree) -> crate::Result<()> {
    if let ProcessTree::Node(op, children) = tree {
        if *op == Operator::Branch && children.len() != 1 {
            return Err(crate::Error::InvariantViolation(format!(
                "BR node must have exactly 1 child, found {}",
                children.len()
            )));
        }
        for child in children {
            check_branch_tree_sanity(child)?;
        }
    }
    Ok(())
}
