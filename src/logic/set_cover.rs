//! Weighted (minimum-cardinality) set cover over a leaf universe (§4.B phase
//! 5 "Missing-AND insertion"). Universes here are an event's successor
//! alphabet — small in practice — so an exact branch-and-bound search is
//! both simpler and more honest than a greedy approximation that could
//! silently pick a non-minimal cover.

use std::collections::BTreeSet;

/// Finds a minimum-cardinality sub-collection of `candidates` whose union is
/// exactly `universe`, preferring (for determinism when multiple minimal
/// covers exist) the cover whose members sort first. Returns `None` if no
/// cover exists.
pub fn weighted_cover(
    candidates: &BTreeSet<BTreeSet<String>>,
    universe: &BTreeSet<String>,
) -> Option<Vec<BTreeSet<String>>> {
    let candidates: Vec<BTreeSet<String>> = candidates
        .iter()
        .filter(|c| !c.is_empty() && c.is_subset(universe))
        .cloned()
        .collect();

    let mut best: Option<Vec<BTreeSet<String>>> = None;
    let mut chosen = Vec::new();
    search(&candidates, universe, 0, &mut chosen, &mut best);
    best
}

fn search(
    candidates: &[BTreeSet<String>],
    remaining_universe: &BTreeSet<String>,
    start: usize,
    chosen: &mut Vec<BTreeSet<String>>,
    best: &mut Option<Vec<BTreeSet<String>>>,
) {
    if remaining_universe.is_empty() {
        if best.as_ref().map_or(true, |b| chosen.len() < b.len()) {
            *best = Some(chosen.clone());
        }
        return;
    }
    if let Some(b) = best {
        if chosen.len() + 1 >= b.len() {
            // Cannot possibly beat the current best even with one more set.
            return;
        }
    }
    for (i, candidate) in candidates.iter().enumerate().skip(start) {
        if candidate.is_disjoint(remaining_universe) {
            continue;
        }
        let next_remaining: BTreeSet<String> =
            remaining_universe.difference(candidate).cloned().collect();
        chosen.push(candidate.clone());
        search(candidates, &next_remaining, i + 1, chosen, best);
        chosen.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn prefers_fewest_subsets() {
        let universe = set(&["A", "B", "C"]);
        let candidates: BTreeSet<BTreeSet<String>> = [
            set(&["A"]),
            set(&["B"]),
            set(&["C"]),
            set(&["A", "B"]),
        ]
        .into_iter()
        .collect();

        let cover = weighted_cover(&candidates, &universe).unwrap();
        // {A,B} + {C} covers with 2 sets, beating the 3-singleton cover.
        assert_eq!(cover.len(), 2);
        let total: BTreeSet<String> = cover.iter().flatten().cloned().collect();
        assert_eq!(total, universe);
    }

    #[test]
    fn returns_none_when_universe_cannot_be_covered() {
        let universe = set(&["A", "B"]);
        let candidates: BTreeSet<BTreeSet<String>> = [set(&["A"])].into_iter().collect();
        assert!(weighted_cover(&candidates, &universe).is_none());
    }

    #[test]
    fn single_set_equal_to_universe_is_its_own_cover() {
        let universe = set(&["A", "B"]);
        let candidates: BTreeSet<BTreeSet<String>> = [set(&["A"]), set(&["B"])].into_iter().collect();
        let cover = weighted_cover(&candidates, &universe).unwrap();
        assert_eq!(cover.len(), 2);
    }
}
