//! The error taxonomy from the design's error-handling section. Each variant
//! family maps to one numbered item; empty evidence and inference ambiguity
//! are deliberately absent here because neither is an error (see
//! [`crate::model::event::Event::logic_gate_tree`]).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors the core pipeline can surface to its caller. No partial output is
/// ever produced alongside an `Err`: a failing stage aborts the whole run.
#[derive(Debug, Error)]
pub enum Error {
    /// An event referenced as a parent/child does not exist, or a job has
    /// zero or more than one root.
    #[error("malformed input: {0}")]
    InputShape(String),

    /// A post-condition that loop rewriting is supposed to maintain (no
    /// residual cycle in the parent graph, SCC nodes weakly connected in the
    /// constructed subgraph, ...) did not hold. Always indicates a bug in
    /// this crate rather than bad input.
    #[error("invariant violated during graph rewriting: {0}")]
    InvariantViolation(String),

    /// The walker could not resolve a merge and the forced-merge fallback
    /// also ran out its hard iteration budget.
    #[error("merge resolution exhausted after {rounds} rounds at node {uid}")]
    MergeResolutionExhausted { uid: String, rounds: usize },

    /// A configured job name has no matching entry, or a referenced event
    /// type has no corresponding node.
    #[error("unknown {kind}: {name}")]
    NotFound { kind: &'static str, name: String },

    /// Failure deserializing/serializing one of the external document
    /// formats (§6).
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
