//! [`Event`]: the unit of inference (§3). Owns the forward/backward
//! event-set evidence and lazily caches its derived logic-gate tree.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::logic;
use crate::model::event_set::{event_set_counts, reduced_event_sets, EventSet};
use crate::model::loop_event::LoopData;
use crate::process_tree::ProcessTree;

static NEXT_UID: AtomicU64 = AtomicU64::new(0);

/// Generates a fresh, process-unique identifier. Deterministic and
/// allocation-cheap, unlike the source's `uuid4()` default — this crate's
/// tests rely on reproducible uids, so callers that need one assigned for
/// them get a monotonic counter rather than randomness.
pub fn generate_uid(prefix: &str) -> String {
    let n = NEXT_UID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{n}")
}

/// The unit of inference: a distinct event type together with the forward
/// and backward multi-set evidence observed for it.
#[derive(Debug)]
pub struct Event {
    pub event_type: String,
    uid: String,
    pub event_sets: BTreeSet<EventSet>,
    pub in_event_sets: BTreeSet<EventSet>,
    logic_cache: RefCell<Option<ProcessTree>>,
    dirty: Cell<bool>,
    /// Present iff this event is a loop event (§3 `LoopEvent`); composition
    /// stands in for the source's subclassing (see `loop_event` module docs).
    pub loop_data: Option<Box<LoopData>>,
}

impl Clone for Event {
    fn clone(&self) -> Self {
        Event {
            event_type: self.event_type.clone(),
            uid: self.uid.clone(),
            event_sets: self.event_sets.clone(),
            in_event_sets: self.in_event_sets.clone(),
            logic_cache: RefCell::new(self.logic_cache.borrow().clone()),
            dirty: Cell::new(self.dirty.get()),
            loop_data: self.loop_data.clone(),
        }
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
    }
}
impl Eq for Event {}

impl std::hash::Hash for Event {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.uid.hash(state);
    }
}

impl Event {
    pub fn new(event_type: impl Into<String>, uid: impl Into<String>) -> Self {
        Event {
            event_type: event_type.into(),
            uid: uid.into(),
            event_sets: BTreeSet::new(),
            in_event_sets: BTreeSet::new(),
            logic_cache: RefCell::new(None),
            dirty: Cell::new(false),
            loop_data: None,
        }
    }

    pub fn is_loop_event(&self) -> bool {
        self.loop_data.is_some()
    }

    /// Builds an `Event` with a freshly generated uid.
    pub fn with_generated_uid(event_type: impl Into<String>) -> Self {
        let event_type = event_type.into();
        let uid = generate_uid(&event_type);
        Event::new(event_type, uid)
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Adds a forward event-set and marks the logic-tree cache stale.
    /// A no-op on an empty list, matching the source's guard.
    pub fn update_event_sets<I, S>(&mut self, events: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let events: Vec<String> = events.into_iter().map(Into::into).collect();
        if events.is_empty() {
            return;
        }
        self.event_sets.insert(EventSet::from_events(events));
        self.dirty.set(true);
    }

    /// Adds a backward event-set. Backward evidence does not feed the logic
    /// tree, so this does not mark the cache stale.
    pub fn update_in_event_sets<I, S>(&mut self, events: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let events: Vec<String> = events.into_iter().map(Into::into).collect();
        if events.is_empty() {
            return;
        }
        self.in_event_sets.insert(EventSet::from_events(events));
    }

    /// Drops every forward event-set that mentions `event_type` (used by
    /// loop rewriting when an event type is subsumed into a loop event).
    pub fn remove_event_type_from_event_sets(&mut self, event_type: &str) {
        self.event_sets.retain(|set| !set.contains(event_type));
        self.dirty.set(true);
    }

    pub fn remove_event_type_from_in_event_sets(&mut self, event_type: &str) {
        self.in_event_sets.retain(|set| !set.contains(event_type));
    }

    /// The logic-gate tree derived from `event_sets`, recomputed on demand
    /// when evidence has changed since the last read (§4.B "Cache
    /// semantics"). `None` when there is no evidence at all (§4.B "Failure
    /// mode" — empty evidence is not an error).
    pub fn logic_gate_tree(&self) -> Option<ProcessTree> {
        if self.dirty.get() || self.logic_cache.borrow().is_none() {
            let computed = logic::calculate_logic_gates(self);
            *self.logic_cache.borrow_mut() = computed.clone();
            self.dirty.set(false);
            return computed;
        }
        self.logic_cache.borrow().clone()
    }

    /// Forces recomputation regardless of the dirty flag; used after bulk
    /// graph surgery where the caller can't statistically track every
    /// mutation site.
    pub fn force_recompute_logic_gate_tree(&self) -> Option<ProcessTree> {
        self.dirty.set(true);
        self.logic_gate_tree()
    }

    pub fn reduced_event_set(&self) -> BTreeSet<BTreeSet<String>> {
        reduced_event_sets(&self.event_sets)
    }

    pub fn event_set_counts(&self) -> std::collections::BTreeMap<String, BTreeSet<u32>> {
        event_set_counts(&self.event_sets)
    }
}
