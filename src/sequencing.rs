//! Component A's ancestor-sequencing algorithm (§4.A): turns a trace's
//! parent/child event tree into a previous-event assignment per event,
//! honoring per-job async grouping so that siblings known to run
//! concurrently don't get an arbitrary total order imposed on them.
//!
//! Grounded on `otel_to_pv/sequence_otel.py`'s recursive ancestor walk. One
//! deliberate deviation: the source's recursive helper reuses its
//! `previous_event_ids` parameter name both as the predecessor it was
//! called with *and*, after its own loop over child groups, as that loop's
//! final state — so a non-leaf event's own entry in the output map ends up
//! holding its own last child group's ids rather than the predecessor its
//! caller passed in. This implementation records each event's real
//! predecessor up front, before recursing into its children, which is the
//! mapping a consumer actually wants.

use std::collections::{BTreeMap, HashMap};

use crate::config::JobConfig;
use crate::error::{Error, Result};

/// One observed trace event as ingested from an external source (§4.E
/// "Trace ingestor" schema) — the input this crate's own pipeline starts
/// from, prior to any `EventGraph` construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTraceEvent {
    pub event_id: String,
    pub event_type: String,
    pub parent_event_id: Option<String>,
    pub child_event_ids: Vec<String>,
    pub start_timestamp: i64,
    pub end_timestamp: i64,
}

/// Finds the single event with no parent. More than one, or none, is an
/// input-shape error (§7 item 1).
pub fn find_root<'a>(events: &HashMap<String, &'a RawTraceEvent>) -> Result<&'a RawTraceEvent> {
    let roots: Vec<&&RawTraceEvent> = events.values().filter(|e| e.parent_event_id.is_none()).collect();
    match roots.as_slice() {
        [single] => Ok(single),
        [] => Err(Error::InputShape("trace has no root event (every event has a parent)".into())),
        _ => Err(Error::InputShape(format!(
            "trace has {} root events, expected exactly one",
            roots.len()
        ))),
    }
}

/// Sorts each group internally by start timestamp, then sorts the groups
/// themselves by their first event's start timestamp. Each group must be
/// non-empty.
pub fn order_groups_by_start_timestamp<'a>(
    mut groups: Vec<Vec<&'a RawTraceEvent>>,
) -> Result<Vec<Vec<&'a RawTraceEvent>>> {
    for group in &mut groups {
        if group.is_empty() {
            return Err(Error::InputShape("empty event group while ordering by start timestamp".into()));
        }
        group.sort_by_key(|e| e.start_timestamp);
    }
    groups.sort_by_key(|g| g[0].start_timestamp);
    Ok(groups)
}

/// Merges groups whose time windows overlap into a single concurrent group,
/// after ordering them by start timestamp — the async-sibling coalescing
/// mode (`async_flag = true`).
pub fn sequence_groups_asynchronously<'a>(
    groups: Vec<Vec<&'a RawTraceEvent>>,
) -> Result<Vec<Vec<&'a RawTraceEvent>>> {
    let ordered = order_groups_by_start_timestamp(groups)?;
    let Some(first) = ordered.first() else {
        return Ok(Vec::new());
    };
    let mut merged: Vec<Vec<&'a RawTraceEvent>> = vec![first.clone()];
    for group in &ordered[1..] {
        let previous_last_end = merged.last().unwrap().last().unwrap().end_timestamp;
        let group_first_start = group.first().unwrap().start_timestamp;
        if previous_last_end < group_first_start {
            merged.push(group.clone());
        } else {
            merged.last_mut().unwrap().extend(group.iter().copied());
        }
    }
    Ok(merged)
}

/// Splits `events` into one group per configured async group id (children
/// sharing a group id are siblings known to run concurrently) plus one
/// singleton group per remaining event, in that order. Each child's group
/// lookup key is its configured rewritten type under `parent_event_type`
/// (§6 `event_name_map_information`) rather than its raw type, so
/// differently-typed children of the same call site can still share a group.
pub fn group_events_by_async_information<'a>(
    events: &[&'a RawTraceEvent],
    async_event_types: &HashMap<String, String>,
    config: &JobConfig,
    parent_event_type: &str,
) -> Vec<Vec<&'a RawTraceEvent>> {
    if events.is_empty() {
        return Vec::new();
    }
    let mut async_groups: BTreeMap<String, Vec<&'a RawTraceEvent>> = BTreeMap::new();
    let mut singleton_groups = Vec::new();
    for &event in events {
        let effective_type = config.effective_event_type(parent_event_type, &event.event_type);
        match async_event_types.get(effective_type) {
            Some(group_id) => async_groups.entry(group_id.clone()).or_default().push(event),
            None => singleton_groups.push(vec![event]),
        }
    }
    let mut groups: Vec<Vec<&'a RawTraceEvent>> = async_groups.into_values().collect();
    groups.extend(singleton_groups);
    groups
}

/// Runs the full ancestor-sequencing walk starting at `root`, returning the
/// map from every reachable event's id to the ids of the event(s)
/// immediately preceding it.
pub fn sequence_job(
    root: &RawTraceEvent,
    event_map: &HashMap<String, &RawTraceEvent>,
    config: &JobConfig,
) -> Result<HashMap<String, Vec<String>>> {
    let mut out = HashMap::new();
    sequence_event_ancestors(root, event_map, &[], config, &mut out)?;
    Ok(out)
}

fn sequence_event_ancestors<'a>(
    event: &'a RawTraceEvent,
    event_map: &HashMap<String, &'a RawTraceEvent>,
    previous_event_ids: &[String],
    config: &JobConfig,
    out: &mut HashMap<String, Vec<String>>,
) -> Result<()> {
    out.insert(event.event_id.clone(), previous_event_ids.to_vec());

    let child_events: Result<Vec<&'a RawTraceEvent>> = event
        .child_event_ids
        .iter()
        .map(|id| {
            event_map.get(id).copied().ok_or_else(|| Error::NotFound {
                kind: "event",
                name: id.clone(),
            })
        })
        .collect();
    let child_events = child_events?;

    let empty_group_map = HashMap::new();
    let group_map = config
        .async_event_groups
        .get(&event.event_type)
        .unwrap_or(&empty_group_map);
    let groups = group_events_by_async_information(&child_events, group_map, config, &event.event_type);
    let groups = if config.async_flag {
        sequence_groups_asynchronously(groups)?
    } else {
        order_groups_by_start_timestamp(groups)?
    };

    let mut previous: Vec<String> = previous_event_ids.to_vec();
    for group in &groups {
        for &group_event in group {
            sequence_event_ancestors(group_event, event_map, &previous, config, out)?;
        }
        previous = group.iter().map(|e| e.event_id.clone()).collect();
    }
    Ok(())
}
