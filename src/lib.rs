//! Infers logic gates, loop structure, and well-nested activity-diagram
//! control flow from observed execution trace event-sets.
//!
//! The pipeline runs in four stages, each a module here: [`model`] (event-set
//! accumulation), [`logic`] (per-event logic gate inference), [`loop_detect`]
//! (strongly-connected-component loop rewriting), and [`walker`] (the
//! topological walk that produces a [`puml::PumlGraph`]).

pub mod config;
pub mod dedup;
pub mod error;
pub mod io;
pub mod logic;
pub mod loop_detect;
pub mod model;
pub mod process_tree;
pub mod puml;
pub mod sequencing;
pub mod walker;

pub use error::{Error, Result};
pub use model::event::Event;
pub use model::event_graph::EventGraph;
pub use model::event_set::EventSet;
pub use process_tree::{Operator, ProcessTree};
pub use puml::PumlGraph;

/// Reserved event type for the synthetic loop-entry sentinel.
pub const DUMMY_START_EVENT: &str = "|||START|||";
/// Reserved event type for the synthetic loop-exit sentinel.
pub const DUMMY_END_EVENT: &str = "|||END|||";
/// Reserved event type for a synthesized break anchor inserted between an
/// end event and a dual-purpose break sibling.
pub const DUMMY_BREAK_EVENT_TYPE: &str = "DUMMY_BREAK_EVENT_TYPE";
/// Event type assigned to every synthesized loop event (§4.C). Every loop
/// event carries this same type rather than a `LOOP_<k>` per-instance suffix;
/// instances are already distinguished by uid and by their own `loop_data`,
/// and nothing downstream needs to look a specific loop instance up by type.
pub const LOOP_EVENT_TYPE: &str = "LOOP";

/// Runs the full inference pipeline — loop detection followed by the walk —
/// over an already-accumulated set of events and produces the final
/// [`PumlGraph`] for one job.
pub fn run_pipeline(
    mut graph: EventGraph,
    config: &config::JobConfig,
) -> Result<PumlGraph> {
    graph.recompute_all_logic_gate_trees();
    let rewritten = loop_detect::detect_loops(graph)?;
    walker::walk(&rewritten, config)
}
