//! [`ProcessTree`]: the logic-gate representation produced by Component B
//! and consumed by Component D. Re-architected per §9's design note as a
//! plain tagged variant — no parent pointers, no dynamic dispatch.

use serde::{de::Error as DeError, ser::Error as SerError, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// The `tau` sentinel leaf label, meaning "absent" / "does not occur".
pub const TAU: &str = "tau";

/// A logic-gate operator. ASCII string values match §6's persisted-document
/// encoding (`"->", "X", "+", "*", "O", "BR"`); `LOOP` is a structural
/// operator used only inside the walker's own node trees, never by Component
/// B (loops are Component C's concern, not a logic gate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "->")]
    Seq,
    #[serde(rename = "X")]
    Xor,
    #[serde(rename = "+")]
    And,
    #[serde(rename = "O")]
    Or,
    #[serde(rename = "BR")]
    Branch,
    #[serde(rename = "LOOP")]
    Loop,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Seq => "->",
            Operator::Xor => "X",
            Operator::And => "+",
            Operator::Or => "O",
            Operator::Branch => "BR",
            Operator::Loop => "LOOP",
        }
    }
}

/// A node in a process tree: either a terminal label or an operator over a
/// list of child trees.
///
/// Serializes per §6 ("Process-tree serialization for logic gates") as
/// nested `{operator, children[]}` / `{label}` documents rather than via a
/// derived representation, since the wire shape is a fixed external contract
/// independent of how this type is laid out in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessTree {
    Leaf(String),
    Node(Operator, Vec<ProcessTree>),
}

impl Serialize for ProcessTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.to_json().map_err(S::Error::custom)?;
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ProcessTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ProcessTree::from_json(&value).map_err(D::Error::custom)
    }
}

impl ProcessTree {
    fn to_json(&self) -> serde_json::Result<Value> {
        Ok(match self {
            ProcessTree::Leaf(label) => serde_json::json!({ "label": label }),
            ProcessTree::Node(operator, children) => {
                let children: serde_json::Result<Vec<Value>> =
                    children.iter().map(ProcessTree::to_json).collect();
                serde_json::json!({ "operator": operator, "children": children? })
            }
        })
    }

    fn from_json(value: &Value) -> serde_json::Result<ProcessTree> {
        if let Some(label) = value.get("label") {
            let label: String = serde_json::from_value(label.clone())?;
            return Ok(ProcessTree::Leaf(label));
        }
        let operator: Operator = serde_json::from_value(
            value
                .get("operator")
                .cloned()
                .ok_or_else(|| serde_json::Error::custom("process tree node missing `operator`"))?,
        )?;
        let children = value
            .get("children")
            .and_then(Value::as_array)
            .ok_or_else(|| serde_json::Error::custom("process tree node missing `children`"))?;
        let children: serde_json::Result<Vec<ProcessTree>> =
            children.iter().map(ProcessTree::from_json).collect();
        Ok(ProcessTree::Node(operator, children?))
    }
}

impl ProcessTree {
    pub fn leaf<S: Into<String>>(label: S) -> Self {
        ProcessTree::Leaf(label.into())
    }

    pub fn tau() -> Self {
        ProcessTree::Leaf(TAU.to_string())
    }

    pub fn is_tau(&self) -> bool {
        matches!(self, ProcessTree::Leaf(label) if label == TAU)
    }

    pub fn node(operator: Operator, children: Vec<ProcessTree>) -> Self {
        ProcessTree::Node(operator, children)
    }

    pub fn operator(&self) -> Option<Operator> {
        match self {
            ProcessTree::Node(op, _) => Some(*op),
            ProcessTree::Leaf(_) => None,
        }
    }

    pub fn children(&self) -> &[ProcessTree] {
        match self {
            ProcessTree::Node(_, children) => children,
            ProcessTree::Leaf(_) => &[],
        }
    }

    pub fn children_mut(&mut self) -> &mut Vec<ProcessTree> {
        match self {
            ProcessTree::Node(_, children) => children,
            ProcessTree::Leaf(_) => panic!("leaf nodes have no children to mutate"),
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            ProcessTree::Leaf(label) => Some(label.as_str()),
            ProcessTree::Node(..) => None,
        }
    }

    /// All non-operator (leaf) labels reachable under this node, in
    /// depth-first order, `tau` included.
    pub fn leaf_labels(&self) -> Vec<&str> {
        let mut labels = Vec::new();
        self.collect_leaf_labels(&mut labels);
        labels
    }

    fn collect_leaf_labels<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            ProcessTree::Leaf(label) => out.push(label.as_str()),
            ProcessTree::Node(_, children) => {
                for child in children {
                    child.collect_leaf_labels(out);
                }
            }
        }
    }

    /// Structural equality up to child reordering within AND/OR/XOR nodes
    /// (used by the idempotence round-trip law in §8).
    pub fn isomorphic(&self, other: &ProcessTree) -> bool {
        match (self, other) {
            (ProcessTree::Leaf(a), ProcessTree::Leaf(b)) => a == b,
            (ProcessTree::Node(op_a, a_children), ProcessTree::Node(op_b, b_children)) => {
                if op_a != op_b || a_children.len() != b_children.len() {
                    return false;
                }
                let mut remaining: Vec<&ProcessTree> = b_children.iter().collect();
                for child in a_children {
                    if let Some(pos) = remaining.iter().position(|c| child.isomorphic(c)) {
                        remaining.remove(pos);
                    } else {
                        return false;
                    }
                }
                true
            }
            _ => false,
        }
    }
}
