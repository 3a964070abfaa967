//! [`EventSet`]: a multi-set of event-type identifiers, the evidentiary unit
//! Component A accumulates and Component B reasons over.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

/// A multi-set of event-type identifiers (`event_type -> positive count`).
/// Backed by a `BTreeMap` so that two sets built from the same multiplicities
/// always compare, hash, and iterate identically regardless of insertion
/// order — the Rust analogue of the source's `dict` subclass whose `__hash__`
/// is the hash of its sorted `(key, count)` tuple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct EventSet(BTreeMap<String, u32>);

impl EventSet {
    /// Builds an `EventSet` from a (possibly repeating) list of event types,
    /// counting multiplicities.
    pub fn from_events<I, S>(events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = BTreeMap::new();
        for event in events {
            *map.entry(event.into()).or_insert(0) += 1;
        }
        EventSet(map)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, event_type: &str) -> Option<u32> {
        self.0.get(event_type).copied()
    }

    pub fn contains(&self, event_type: &str) -> bool {
        self.0.contains_key(event_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// The underlying type universe as a set, discarding multiplicities —
    /// the "reduced" event-set used as a process-mining cut key.
    pub fn to_frozenset(&self) -> BTreeSet<String> {
        self.0.keys().cloned().collect()
    }

    /// Expands back to a flat, sorted list of event types (each repeated by
    /// its count).
    pub fn to_list(&self) -> Vec<String> {
        self.0
            .iter()
            .flat_map(|(event, count)| std::iter::repeat(event.clone()).take(*count as usize))
            .collect()
    }

    /// True iff every event type in `self` appears in `other` with at least
    /// the same count (§3 "sub-multiset test").
    pub fn is_subset(&self, other: &EventSet) -> bool {
        self.0
            .iter()
            .all(|(event, count)| other.0.get(event).copied().unwrap_or(0) >= *count)
    }

    /// True iff `self`'s type universe is a subset of `universe`.
    pub fn types_subset_of(&self, universe: &BTreeSet<String>) -> bool {
        self.0.keys().all(|event| universe.contains(event))
    }

    /// Counts restricted to a chosen type universe — 0 for types absent from
    /// this set (§3 "projection onto a chosen type universe").
    pub fn counts_for_types<'a, I>(&self, event_types: I) -> BTreeMap<String, u32>
    where
        I: IntoIterator<Item = &'a str>,
    {
        event_types
            .into_iter()
            .map(|t| (t.to_string(), self.0.get(t).copied().unwrap_or(0)))
            .collect()
    }

    /// Every type in `self` that also exists in `event_types` — "intersect
    /// keys with a universe of types".
    pub fn intersect_types<'a, I>(&self, event_types: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let universe: HashSet<&str> = event_types.into_iter().collect();
        self.0
            .keys()
            .filter(|k| universe.contains(k.as_str()))
            .cloned()
            .collect()
    }

    pub fn has_intersection_with(&self, event_types: &BTreeSet<String>) -> bool {
        self.0.keys().any(|k| event_types.contains(k))
    }

    /// The event types whose count in this set is `> 1` along with that
    /// count.
    pub fn repeated_events(&self) -> BTreeMap<String, u32> {
        self.0
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }
}

impl FromIterator<(String, u32)> for EventSet {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        EventSet(iter.into_iter().collect())
    }
}

/// Reduces a collection of event-sets to their type universes (§4.B
/// "reduced event-set").
pub fn reduced_event_sets<'a, I>(event_sets: I) -> BTreeSet<BTreeSet<String>>
where
    I: IntoIterator<Item = &'a EventSet>,
{
    event_sets.into_iter().map(EventSet::to_frozenset).collect()
}

/// Aggregates, across a collection of event-sets, the distinct counts each
/// event type has been observed with (§4.B phase 6 "branch-repeat
/// detection").
pub fn event_set_counts<'a, I>(event_sets: I) -> BTreeMap<String, BTreeSet<u32>>
where
    I: IntoIterator<Item = &'a EventSet>,
{
    let mut counts: BTreeMap<String, BTreeSet<u32>> = BTreeMap::new();
    for event_set in event_sets {
        for (event, count) in event_set.iter() {
            counts.entry(event.to_string()).or_default().insert(count);
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_events_counts_multiplicities() {
        let set = EventSet::from_events(["A", "B", "A"]);
        assert_eq!(set.get("A"), Some(2));
        assert_eq!(set.get("B"), Some(1));
        assert_eq!(set.get("C"), None);
    }

    #[test]
    fn equal_multisets_hash_and_compare_equal_regardless_of_build_order() {
        let a = EventSet::from_events(["A", "B", "A"]);
        let b = EventSet::from_events(["B", "A", "A"]);
        assert_eq!(a, b);

        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut ha = DefaultHasher::new();
        a.hash(&mut ha);
        let mut hb = DefaultHasher::new();
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn is_subset_checks_counts_not_just_membership() {
        let small = EventSet::from_events(["A"]);
        let big = EventSet::from_events(["A", "A", "B"]);
        assert!(small.is_subset(&big));
        assert!(!big.is_subset(&small));

        let two_a = EventSet::from_events(["A", "A"]);
        assert!(!two_a.is_subset(&small));
    }

    #[test]
    fn to_list_expands_multiplicities() {
        let set = EventSet::from_events(["A", "B", "A"]);
        let mut list = set.to_list();
        list.sort();
        assert_eq!(list, vec!["A", "A", "B"]);
    }

    #[test]
    fn event_set_counts_collects_distinct_multiplicities_per_type() {
        let sets = vec![
            EventSet::from_events(["A", "B"]),
            EventSet::from_events(["A", "B", "B"]),
        ];
        let counts = event_set_counts(&sets);
        assert_eq!(counts["A"], BTreeSet::from([1]));
        assert_eq!(counts["B"], BTreeSet::from([1, 2]));
    }
}
