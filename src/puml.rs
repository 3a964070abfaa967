//! `PUMLGraph` (§3, §4.E): the walker's output tree, and a reference
//! PlantUML text emitter for it.
//!
//! The distilled spec treats emission as an external collaborator's concern;
//! the mapping it documents is small enough ("switch/fork/split for
//! operators, `:EventType;` lines, LOOP/BREAK tags, a silent MERGE marker")
//! that leaving it unimplemented would make the crate produce a tree nobody
//! can look at. The interesting work stays in the walker; this module is a
//! straightforward walk-and-print.

use crate::process_tree::Operator;

/// One node of a `PUMLGraph` body. A body is an ordered block — PlantUML
/// activity diagrams are themselves block-structured, so a flat enum over
/// statement kinds maps onto the text directly without an intermediate AST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PumlNode {
    /// A single `:EventType;` activity statement.
    Event(String),
    /// A `switch`/`fork` block: one branch per process-tree child.
    /// `operator` selects the PlantUML construct (`switch` for `X`/`O`,
    /// `fork` for `+`).
    Branch {
        operator: Operator,
        branches: Vec<PumlGraph>,
    },
    /// A `repeat`/`repeat while` block (§4.C loop body, or a Component B
    /// `BR` branch-repeat marker collapsed to the same construct).
    Loop { body: PumlGraph, has_break: bool },
    /// An early `break` statement inside a loop body.
    Break,
    /// A silent synchronization point where diverging branches rejoin.
    /// Emitted as a comment rather than PlantUML syntax, since PlantUML
    /// itself has no explicit merge statement — control simply continues.
    Merge,
}

/// An ordered block of [`PumlNode`]s — one linear stretch of activity-diagram
/// flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PumlGraph(pub Vec<PumlNode>);

impl PumlGraph {
    pub fn new() -> Self {
        PumlGraph(Vec::new())
    }

    pub fn push(&mut self, node: PumlNode) {
        self.0.push(node);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders this block as PlantUML activity-diagram text, `@startuml` /
    /// `@enduml` wrapped.
    pub fn to_plantuml(&self) -> String {
        let mut out = String::from("@startuml\nstart\n");
        self.render(&mut out, 0);
        out.push_str("stop\n@enduml\n");
        out
    }

    fn render(&self, out: &mut String, indent: usize) {
        for node in &self.0 {
            node.render(out, indent);
        }
    }
}

impl PumlNode {
    fn render(&self, out: &mut String, indent: usize) {
        let pad = "  ".repeat(indent);
        match self {
            PumlNode::Event(event_type) => {
                out.push_str(&pad);
                out.push(':');
                out.push_str(event_type);
                out.push_str(";\n");
            }
            PumlNode::Branch { operator, branches } => {
                let keyword = match operator {
                    Operator::And => "fork",
                    _ => "switch",
                };
                for (i, branch) in branches.iter().enumerate() {
                    out.push_str(&pad);
                    if i == 0 {
                        out.push_str(keyword);
                        out.push_str(" (");
                        out.push_str(operator.as_str());
                        out.push_str(")\n");
                    } else {
                        out.push_str(if *operator == Operator::And { "fork again\n" } else { "case ()\n" });
                    }
                    branch.render(out, indent + 1);
                }
                out.push_str(&pad);
                out.push_str(if *operator == Operator::And { "end fork\n" } else { "endswitch\n" });
            }
            PumlNode::Loop { body, has_break } => {
                out.push_str(&pad);
                out.push_str("repeat\n");
                body.render(out, indent + 1);
                out.push_str(&pad);
                if *has_break {
                    out.push_str("repeat while (LOOP) is (yes) not (BREAK)\n");
                } else {
                    out.push_str("repeat while (LOOP)\n");
                }
            }
            PumlNode::Break => {
                out.push_str(&pad);
                out.push_str("break\n");
            }
            PumlNode::Merge => {
                out.push_str(&pad);
                out.push_str("' MERGE\n");
            }
        }
    }
}
