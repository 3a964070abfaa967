//! Merge-point detection and the `LogicBlockHolder` bookkeeping the walker
//! keeps while a branch block (`switch`/`fork`) is open (§4.D).

use std::collections::{HashSet, VecDeque};

use crate::error::{Error, Result};
use crate::model::event_graph::{EventGraph, NodeId};

/// Hard cap on breadth-first expansion rounds while searching for a merge
/// point. The graph the walker traverses is always a DAG (loop detection has
/// already collapsed every cycle into a single loop event), so a genuine
/// search always terminates well inside this bound — exceeding it means the
/// graph handed to the walker isn't the DAG it's supposed to be, not a
/// slow-but-correct search, hence a fatal error rather than giving up
/// silently.
pub const MAX_FORCED_MERGE_ROUNDS: usize = 10_000;

/// Tracks the branch points currently open while the walker recurses into a
/// `switch`/`fork` block's children — named after the source's
/// `LogicBlockHolder`, which plays the same bookkeeping role around its own
/// stack-based walk.
#[derive(Debug, Default)]
pub struct LogicBlockHolder {
    pub open_branch_starts: Vec<NodeId>,
}

impl LogicBlockHolder {
    pub fn new(branch_starts: Vec<NodeId>) -> Self {
        LogicBlockHolder {
            open_branch_starts: branch_starts,
        }
    }

    /// Finds the node where every open branch rejoins the main flow, if any.
    /// `None` means the branches are kill-paths: they never reconverge and
    /// each must be walked out to its own natural end.
    pub fn find_merge(&self, graph: &EventGraph) -> Result<Option<NodeId>> {
        find_merge_point(graph, &self.open_branch_starts)
    }
}

/// Expands a BFS frontier from each branch start in lockstep and returns the
/// first node common to every branch's visited set, preferring (for
/// determinism when several become common in the same round) the smallest
/// graph index.
pub fn find_merge_point(graph: &EventGraph, branch_starts: &[NodeId]) -> Result<Option<NodeId>> {
    let mut distinct: Vec<NodeId> = branch_starts.to_vec();
    distinct.sort();
    distinct.dedup();
    if distinct.len() < 2 {
        return Ok(distinct.first().copied());
    }

    let mut visited: Vec<HashSet<NodeId>> = distinct.iter().map(|&s| HashSet::from([s])).collect();
    let mut frontiers: Vec<VecDeque<NodeId>> = distinct.iter().map(|&s| VecDeque::from([s])).collect();

    for _ in 0..MAX_FORCED_MERGE_ROUNDS {
        if let Some(common) = first_common_node(&visited) {
            return Ok(Some(common));
        }
        let mut any_progress = false;
        for (branch, frontier) in frontiers.iter_mut().enumerate() {
            let mut next = VecDeque::new();
            while let Some(node) = frontier.pop_front() {
                for succ in graph.successors(node) {
                    if visited[branch].insert(succ) {
                        any_progress = true;
                        next.push_back(succ);
                    }
                }
            }
            *frontier = next;
        }
        if !any_progress {
            return Ok(None);
        }
    }
    Err(Error::MergeResolutionExhausted {
        uid: "branch-merge-search".into(),
        rounds: MAX_FORCED_MERGE_ROUNDS,
    })
}

fn first_common_node(visited: &[HashSet<NodeId>]) -> Option<NodeId> {
    let mut iter = visited.iter();
    let first = iter.next()?;
    let mut candidates: Vec<NodeId> = first.iter().copied().collect();
    candidates.sort();
    for set in iter {
        candidates.retain(|c| set.contains(c));
    }
    candidates.into_iter().next()
}
