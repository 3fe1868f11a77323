//! Weighted Control List
//!
//! Strategies append candidate entries while a resolution pass collects;
//! [`WeightedControlList::decide`] consumes the list, ranks it and makes the
//! final call. A list is single-use: a new pass builds a new list.

use crate::config::TieBreak;
use crate::found_type::FoundType;
use crate::index::IndexedControl;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightedEntry {
    /// Provider handle of the control.
    pub control: u32,
    /// Document order of the control, the final tie-breaker.
    pub order: usize,
    pub found_type: FoundType,
    /// Gap from the path to the control, or the in-label gap without a path.
    pub distance: usize,
    /// In-label gap of a label strategy when a path is present, else zero.
    pub label_distance: usize,
}

impl WeightedEntry {
    /// Sort key: `(weight, distance, label distance, document order)`.
    pub fn sort_key(&self) -> (u32, usize, usize, usize) {
        (
            self.found_type.weight(),
            self.distance,
            self.label_distance,
            self.order,
        )
    }

    /// What decides between distinct controls.
    pub fn rank(&self) -> (u32, usize, usize) {
        (self.found_type.weight(), self.distance, self.label_distance)
    }
}

/// One control after deduplication: its best entry plus every strategy that
/// found it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedControl {
    pub best: WeightedEntry,
    pub found_by: Vec<FoundType>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Unique(RankedControl),
    NotFound,
    /// Distinct controls tied at the best rank, in document order.
    Ambiguous(Vec<RankedControl>),
}

#[derive(Debug, Clone, Default)]
pub struct WeightedControlList {
    entries: Vec<WeightedEntry>,
}

impl WeightedControlList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, control: &IndexedControl, found_type: FoundType, distance: usize) {
        self.add_scored(control, found_type, distance, 0);
    }

    pub fn add_scored(
        &mut self,
        control: &IndexedControl,
        found_type: FoundType,
        distance: usize,
        label_distance: usize,
    ) {
        self.add_entry(WeightedEntry {
            control: control.id,
            order: control.order,
            found_type,
            distance,
            label_distance,
        });
    }

    pub fn add_entry(&mut self, entry: WeightedEntry) {
        self.entries.push(entry);
    }

    pub fn add_all(&mut self, other: WeightedControlList) {
        self.entries.extend(other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[WeightedEntry] {
        &self.entries
    }

    /// All entries ordered by [`WeightedEntry::sort_key`].
    pub fn entries_sorted(&self) -> Vec<&WeightedEntry> {
        let mut sorted: Vec<&WeightedEntry> = self.entries.iter().collect();
        sorted.sort_by_key(|e| e.sort_key());
        sorted
    }

    /// One entry per control, best first. A control found by several
    /// strategies is represented by its best entry.
    pub fn ranked(&self) -> Vec<RankedControl> {
        let mut ranked: Vec<RankedControl> = Vec::new();
        let mut position: HashMap<u32, usize> = HashMap::new();

        for entry in self.entries_sorted() {
            match position.get(&entry.control) {
                Some(&i) => {
                    let found_by = &mut ranked[i].found_by;
                    if !found_by.contains(&entry.found_type) {
                        found_by.push(entry.found_type);
                    }
                }
                None => {
                    position.insert(entry.control, ranked.len());
                    ranked.push(RankedControl {
                        best: entry.clone(),
                        found_by: vec![entry.found_type],
                    });
                }
            }
        }

        ranked
    }

    /// The best entry overall, regardless of ties.
    pub fn first_entry(&self) -> Option<&WeightedEntry> {
        self.entries.iter().min_by_key(|e| e.sort_key())
    }

    /// Rank and decide. A unique winner must be strictly better than every
    /// other control, unless ties are settled by document order.
    pub fn decide(self, tie_break: TieBreak) -> Decision {
        let mut ranked = self.ranked();
        if ranked.is_empty() {
            return Decision::NotFound;
        }

        let best_rank = ranked[0].best.rank();
        let tied = ranked
            .iter()
            .take_while(|r| r.best.rank() == best_rank)
            .count();

        if tied > 1 && tie_break == TieBreak::Ambiguous {
            ranked.truncate(tied);
            return Decision::Ambiguous(ranked);
        }

        Decision::Unique(ranked.swap_remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(control: u32, order: usize, found_type: FoundType, distance: usize) -> WeightedEntry {
        WeightedEntry {
            control,
            order,
            found_type,
            distance,
            label_distance: 0,
        }
    }

    fn list(entries: Vec<WeightedEntry>) -> WeightedControlList {
        let mut list = WeightedControlList::new();
        for e in entries {
            list.add_entry(e);
        }
        list
    }

    #[test]
    fn test_sorted_by_weight_then_distance_then_order() {
        let l = list(vec![
            entry(3, 2, FoundType::ByText, 0),
            entry(2, 1, FoundType::ByLabel, 5),
            entry(1, 0, FoundType::ByLabel, 5),
            entry(4, 3, FoundType::ByLabel, 1),
        ]);
        let ids: Vec<u32> = l.entries_sorted().iter().map(|e| e.control).collect();
        assert_eq!(ids, vec![4, 1, 2, 3]);
        assert_eq!(l.first_entry().unwrap().control, 4);
    }

    #[test]
    fn test_empty_is_not_found() {
        let l = WeightedControlList::new();
        assert!(l.is_empty());
        assert_eq!(l.decide(TieBreak::Ambiguous), Decision::NotFound);
    }

    #[test]
    fn test_same_control_counts_once() {
        let l = list(vec![
            entry(7, 0, FoundType::ByText, 0),
            entry(7, 0, FoundType::ByLabel, 0),
            entry(7, 0, FoundType::ById, 0),
        ]);
        match l.decide(TieBreak::Ambiguous) {
            Decision::Unique(r) => {
                assert_eq!(r.best.found_type, FoundType::ById);
                assert_eq!(
                    r.found_by,
                    vec![FoundType::ById, FoundType::ByLabel, FoundType::ByText]
                );
            }
            other => panic!("expected unique, got {:?}", other),
        }
    }

    #[test]
    fn test_tie_between_distinct_controls_is_ambiguous() {
        let l = list(vec![
            entry(2, 1, FoundType::ByLabel, 0),
            entry(1, 0, FoundType::ByLabel, 0),
            entry(3, 2, FoundType::ByText, 0),
        ]);
        match l.decide(TieBreak::Ambiguous) {
            Decision::Ambiguous(tied) => {
                let ids: Vec<u32> = tied.iter().map(|r| r.best.control).collect();
                assert_eq!(ids, vec![1, 2]);
            }
            other => panic!("expected ambiguous, got {:?}", other),
        }
    }

    #[test]
    fn test_tie_settled_by_document_order() {
        let l = list(vec![
            entry(2, 1, FoundType::ByLabel, 0),
            entry(1, 0, FoundType::ByLabel, 0),
        ]);
        match l.decide(TieBreak::DocumentOrder) {
            Decision::Unique(r) => assert_eq!(r.best.control, 1),
            other => panic!("expected unique, got {:?}", other),
        }
    }

    #[test]
    fn test_strictly_better_wins_over_other_controls() {
        let l = list(vec![
            entry(1, 0, FoundType::ByLabel, 3),
            entry(2, 1, FoundType::ByLabel, 2),
        ]);
        match l.decide(TieBreak::Ambiguous) {
            Decision::Unique(r) => assert_eq!(r.best.control, 2),
            other => panic!("expected unique, got {:?}", other),
        }
    }

    #[test]
    fn test_label_distance_breaks_equal_distance() {
        let near = WeightedEntry {
            label_distance: 1,
            ..entry(6, 1, FoundType::ByLabelTextBefore, 7)
        };
        let far = WeightedEntry {
            label_distance: 9,
            ..entry(3, 0, FoundType::ByLabelTextBefore, 7)
        };
        match list(vec![far, near]).decide(TieBreak::Ambiguous) {
            Decision::Unique(r) => assert_eq!(r.best.control, 6),
            other => panic!("expected unique, got {:?}", other),
        }
    }

    #[test]
    fn test_insertion_order_irrelevant() {
        let a = list(vec![
            entry(1, 0, FoundType::ByText, 0),
            entry(2, 1, FoundType::ByName, 4),
        ]);
        let mut b = list(vec![entry(2, 1, FoundType::ByName, 4)]);
        b.add_all(list(vec![entry(1, 0, FoundType::ByText, 0)]));
        assert_eq!(a.len(), b.len());
        assert_eq!(a.decide(TieBreak::Ambiguous), b.decide(TieBreak::Ambiguous));
    }
}
