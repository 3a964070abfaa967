//! Per-run configuration (§6 "Configuration"). This module only models an
//! already-loaded configuration document; reading it from disk, merging
//! overrides, etc. belongs to the enclosing CLI (out of scope, per the
//! Non-goals).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An event-rewriting rule applied during ancestor sequencing (§4.A).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventNameMapInformation {
    pub mapped_event_type: String,
    #[serde(default)]
    pub child_event_types: Vec<String>,
}

/// Sequencing configuration for a single job name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobConfig {
    /// `event_type -> (child_event_type -> group_id)`. Children sharing a
    /// group id under the same parent are treated as concurrent siblings.
    #[serde(default)]
    pub async_event_groups: HashMap<String, HashMap<String, String>>,

    /// Rewriting rules applied while sequencing a trace DAG.
    #[serde(default)]
    pub event_name_map_information: HashMap<String, EventNameMapInformation>,

    /// Whether the whole job defaults to async sibling semantics when no
    /// more specific group assignment applies.
    #[serde(default)]
    pub async_flag: bool,
}

impl JobConfig {
    /// The group id for `child` under `parent`, if any async grouping was
    /// configured for that pair.
    pub fn group_id(&self, parent: &str, child: &str) -> Option<&str> {
        self.async_event_groups
            .get(parent)
            .and_then(|children| children.get(child))
            .map(String::as_str)
    }

    /// The type a child event of `parent` should be treated as for sequencing
    /// purposes (§4.A async grouping, §6): `child` itself, unless a rewrite
    /// rule is configured for `parent` that names `child` among its
    /// `child_event_types`, in which case the rule's `mapped_event_type`
    /// applies. Lets traces that emit a distinguishing child event type per
    /// call site (e.g. `FETCH_A`, `FETCH_B`) still share one async group
    /// configured under a single common type.
    pub fn effective_event_type<'a>(&'a self, parent: &str, child: &'a str) -> &'a str {
        match self.event_name_map_information.get(parent) {
            Some(rule) if rule.child_event_types.iter().any(|t| t == child) => &rule.mapped_event_type,
            _ => child,
        }
    }
}

/// The full, multi-job configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub jobs: HashMap<String, JobConfig>,
}

impl Config {
    pub fn job(&self, job_name: &str) -> Option<&JobConfig> {
        self.jobs.get(job_name)
    }
}
