//! Component D: the `PUMLGraph` walker (§4.D). Turns a loop-rewritten
//! [`EventGraph`] into a [`PumlGraph`] by following each event's logic-gate
//! tree to decide whether its successors form a plain sequence or a
//! `switch`/`fork` block, and reconciling where such blocks rejoin the main
//! flow.

pub mod merge;

use crate::config::JobConfig;
use crate::error::Result;
use crate::model::event_graph::{EventGraph, NodeId};
use crate::process_tree::{Operator, ProcessTree};
use crate::puml::{PumlGraph, PumlNode};
use merge::LogicBlockHolder;

/// Runs the walker over a (loop-rewritten) event graph, producing the
/// `PUMLGraph` the emitter in [`crate::puml`] renders to text.
///
/// `config` is accepted for symmetry with the rest of the pipeline's entry
/// points and future per-job walker tuning; nothing in the current walk
/// depends on it (sequencing, not walking, is where `JobConfig` actually
/// matters — §4.A).
pub fn walk(graph: &EventGraph, config: &JobConfig) -> Result<PumlGraph> {
    let _ = config;
    let root = graph.root()?;
    let (body, _) = walk_from(graph, root, None, &[])?;
    Ok(body)
}

/// Walks the flow starting at `start`, stopping (without consuming) at
/// `stop_at` if given. Returns the rendered block plus the node it actually
/// stopped at (`None` if it ran off the end of the graph with no more
/// successors). `break_uids` names the nodes of *this* graph (a loop body,
/// or empty outside one) that are real break events (§4.C): each one gets a
/// [`PumlNode::Break`] emitted right after its own event statement.
fn walk_from(
    graph: &EventGraph,
    start: NodeId,
    stop_at: Option<NodeId>,
    break_uids: &[String],
) -> Result<(PumlGraph, Option<NodeId>)> {
    let mut out = PumlGraph::new();
    let mut current = Some(start);

    while let Some(node) = current {
        if Some(node) == stop_at {
            return Ok((out, Some(node)));
        }

        let event = graph.get(node);

        if let Some(loop_data) = &event.loop_data {
            let inner_root = loop_data.sub_graph.root()?;
            let dummy_end = loop_data
                .sub_graph
                .node_indices()
                .find(|&id| loop_data.sub_graph.get(id).uid() == loop_data.end_uid);
            let (mut body, _) =
                walk_from(&loop_data.sub_graph, inner_root, dummy_end, &loop_data.break_uids)?;
            strip_dummy_events(&mut body);
            out.push(PumlNode::Loop {
                body,
                has_break: !loop_data.break_uids.is_empty(),
            });
        } else {
            out.push(PumlNode::Event(event.event_type.clone()));
            if break_uids.iter().any(|uid| uid == event.uid()) {
                out.push(PumlNode::Break);
            }
        }

        let successors = graph.successors(node);
        match event.logic_gate_tree() {
            None | Some(ProcessTree::Leaf(_)) => {
                current = successors.into_iter().next();
            }
            Some(ProcessTree::Node(Operator::Branch, children)) => {
                current = walk_branch_repeat_marker(graph, &children, &successors, &mut out, break_uids)?;
            }
            Some(ProcessTree::Node(operator, children)) => {
                current = walk_fork_or_switch(graph, operator, &children, &successors, &mut out, break_uids)?;
            }
        }
    }

    Ok((out, None))
}

/// A Component B `BR` node wraps exactly one successor type (§4.B phase 9
/// sanity check) meaning "this successor may recur before the flow moves
/// on"; rendered as a trivial single-child loop rather than a branch block.
fn walk_branch_repeat_marker(
    graph: &EventGraph,
    children: &[ProcessTree],
    successors: &[NodeId],
    out: &mut PumlGraph,
    break_uids: &[String],
) -> Result<Option<NodeId>> {
    let Some(child) = children.first() else {
        return Ok(None);
    };
    let Some(label) = child.label() else {
        return Ok(None);
    };
    let Some(&next) = successors.iter().find(|&&s| graph.get(s).event_type == label) else {
        return Ok(None);
    };
    let merge_node = merge::find_merge_point(graph, &[next])?;
    let (body, _) = walk_from(graph, next, merge_node, break_uids)?;
    out.push(PumlNode::Loop { body, has_break: false });
    Ok(merge_node)
}

/// Renders an `X`/`O`/`+` node as a `switch`/`fork` block, walks every
/// branch up to their common reconvergence point (or to each branch's own
/// end, for kill-paths that never reconverge), and returns where the main
/// flow resumes.
fn walk_fork_or_switch(
    graph: &EventGraph,
    operator: Operator,
    children: &[ProcessTree],
    successors: &[NodeId],
    out: &mut PumlGraph,
    break_uids: &[String],
) -> Result<Option<NodeId>> {
    let child_starts: Vec<Vec<NodeId>> = children
        .iter()
        .map(|child| {
            let labels = child.leaf_labels();
            successors
                .iter()
                .copied()
                .filter(|&s| labels.contains(&graph.get(s).event_type.as_str()))
                .collect()
        })
        .collect();

    let all_starts: Vec<NodeId> = child_starts.iter().flatten().copied().collect();
    let holder = LogicBlockHolder::new(all_starts);
    let merge_node = holder.find_merge(graph)?;

    let mut branches = Vec::with_capacity(children.len());
    for (child, starts) in children.iter().zip(&child_starts) {
        branches.push(render_branch(graph, child, starts, merge_node, break_uids)?);
    }

    out.push(PumlNode::Branch { operator, branches });
    if let Some(next) = merge_node {
        out.push(PumlNode::Merge);
        Ok(Some(next))
    } else {
        Ok(None)
    }
}

/// Renders one branch of a `switch`/`fork`. A branch whose process-tree
/// child is itself an `AND` (the successor co-occurs with siblings) is
/// rendered as a nested fork over its own starts rather than a flat
/// sequence, since those successors run concurrently within this branch.
fn render_branch(
    graph: &EventGraph,
    child: &ProcessTree,
    starts: &[NodeId],
    merge_node: Option<NodeId>,
    break_uids: &[String],
) -> Result<PumlGraph> {
    let mut block = PumlGraph::new();
    if child.operator() == Some(Operator::And) && starts.len() > 1 {
        let mut nested = Vec::with_capacity(starts.len());
        for &start in starts {
            let (rendered, _) = walk_from(graph, start, merge_node, break_uids)?;
            nested.push(rendered);
        }
        block.push(PumlNode::Branch {
            operator: Operator::And,
            branches: nested,
        });
    } else {
        for &start in starts {
            let (rendered, _) = walk_from(graph, start, merge_node, break_uids)?;
            block.0.extend(rendered.0);
        }
    }
    Ok(block)
}

/// Strips the structural `DUMMY_START`/`DUMMY_END`/`DUMMY_BREAK` events a
/// loop body is built with (§4.C) — they mark where the body begins/ends or
/// bridge a dual-purpose break but are never real activities and should not
/// appear in the rendered diagram.
fn strip_dummy_events(graph: &mut PumlGraph) {
    graph.0.retain(|node| {
        !matches!(node, PumlNode::Event(t) if t == crate::DUMMY_START_EVENT
            || t == crate::DUMMY_END_EVENT
            || t == crate::DUMMY_BREAK_EVENT_TYPE)
    });
    for node in &mut graph.0 {
        match node {
            PumlNode::Branch { branches, .. } => {
                for branch in branches.iter_mut() {
                    strip_dummy_events(branch);
                }
            }
            PumlNode::Loop { body, .. } => strip_dummy_events(body),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::event::Event;

    fn evt(graph: &mut EventGraph, t: &str) -> NodeId {
        graph.add_event(Event::new(t, t))
    }

    #[test]
    fn a_plain_sequence_walks_straight_through() {
        let mut graph = EventGraph::new();
        let a = evt(&mut graph, "A");
        let b = evt(&mut graph, "B");
        graph.get_mut(a).update_event_sets(["B"]);
        graph.add_edge(a, b);

        let puml = walk(&graph, &JobConfig::default()).unwrap();
        assert_eq!(puml.0, vec![PumlNode::Event("A".into()), PumlNode::Event("B".into())]);
    }

    #[test]
    fn a_xor_fork_renders_a_switch_block_with_a_merge() {
        let mut graph = EventGraph::new();
        let root = evt(&mut graph, "ROOT");
        let c = evt(&mut graph, "C");
        let d = evt(&mut graph, "D");
        let after = evt(&mut graph, "AFTER");
        graph.get_mut(root).update_event_sets(["C"]);
        graph.get_mut(root).update_event_sets(["D"]);
        graph.add_edge(root, c);
        graph.add_edge(root, d);
        graph.add_edge(c, after);
        graph.add_edge(d, after);

        let puml = walk(&graph, &JobConfig::default()).unwrap();
        assert!(matches!(puml.0[1], PumlNode::Branch { operator: Operator::Xor, .. }));
        assert!(puml.0.iter().any(|n| matches!(n, PumlNode::Merge)));
        assert_eq!(puml.0.last(), Some(&PumlNode::Event("AFTER".into())));
    }

    #[test]
    fn a_loop_event_renders_as_a_loop_node_without_dummy_brackets() {
        let mut graph = EventGraph::new();
        let before = evt(&mut graph, "BEFORE");
        let a = evt(&mut graph, "A");
        let b = evt(&mut graph, "B");
        let after = evt(&mut graph, "AFTER");
        graph.add_edge(before, a);
        graph.add_edge(a, b);
        graph.add_edge(b, a);
        graph.add_edge(b, after);

        let rewritten = crate::loop_detect::detect_loops(graph).unwrap();
        let puml = walk(&rewritten, &JobConfig::default()).unwrap();
        assert!(puml.0.iter().any(|n| matches!(n, PumlNode::Loop { .. })));
        if let Some(PumlNode::Loop { body, .. }) = puml.0.iter().find(|n| matches!(n, PumlNode::Loop { .. })) {
            assert!(!body.0.iter().any(|n| matches!(n, PumlNode::Event(t) if t == crate::DUMMY_START_EVENT || t == crate::DUMMY_END_EVENT)));
        }
    }

    /// §4.C/§4.E: a loop with an early exit through `X` (spec §8 Scenario 5)
    /// must render `X` itself inside the loop body, immediately followed by
    /// a real `PumlNode::Break` — not just a cosmetic marker on the loop's
    /// repeat condition.
    #[test]
    fn a_loop_break_renders_the_real_break_event_followed_by_a_break_node() {
        let mut graph = EventGraph::new();
        let s = evt(&mut graph, "S");
        let a = evt(&mut graph, "A");
        let b = evt(&mut graph, "B");
        let x = evt(&mut graph, "X");
        let e = evt(&mut graph, "E");
        graph.get_mut(s).update_event_sets(["A"]);
        graph.get_mut(a).update_event_sets(["B"]);
        graph.get_mut(a).update_event_sets(["X"]);
        graph.get_mut(b).update_event_sets(["A"]);
        graph.get_mut(b).update_event_sets(["E"]);
        graph.get_mut(x).update_event_sets(["E"]);
        for (src, dst) in [(s, a), (a, b), (b, a), (b, e), (a, x), (x, e)] {
            graph.add_edge(src, dst);
        }

        let rewritten = crate::loop_detect::detect_loops(graph).unwrap();
        let puml = walk(&rewritten, &JobConfig::default()).unwrap();
        let PumlNode::Loop { body, has_break } =
            puml.0.iter().find(|n| matches!(n, PumlNode::Loop { .. })).unwrap()
        else {
            unreachable!()
        };
        assert!(has_break);

        let flat = flatten(body);
        let x_pos = flat.iter().position(|n| matches!(n, PumlNode::Event(t) if t == "X")).unwrap();
        assert_eq!(flat.get(x_pos + 1), Some(&PumlNode::Break));
        assert!(!flat.iter().any(|n| matches!(n, PumlNode::Event(t) if t == crate::DUMMY_BREAK_EVENT_TYPE)));
    }

    /// Flattens a rendered block's branches/loop bodies into one ordered
    /// list, purely so tests can look for a node regardless of how deeply a
    /// `switch`/`fork` nested it.
    fn flatten(block: &PumlGraph) -> Vec<PumlNode> {
        let mut out = Vec::new();
        for node in &block.0 {
            match node {
                PumlNode::Branch { branches, .. } => {
                    for branch in branches {
                        out.extend(flatten(branch));
                    }
                }
                PumlNode::Loop { body, .. } => out.extend(flatten(body)),
                other => out.push(other.clone()),
            }
        }
        out
    }
}
