//! Candidate solutions and the arena that owns them.
//!
//! A [`Candidate`] is a fixed-cardinality seed set plus its objective vector.
//! Population slots and archive entries refer to candidates by
//! [`CandidateId`]; the [`CandidateArena`] owns the values. Moving a
//! candidate inserts a fresh entry rather than mutating the old one, so an
//! archive entry stays valid after the population slot it came from moves on.

use crate::graph::NodeId;
use crate::pareto::dominates;
use std::collections::{BTreeSet, HashSet};
use std::ops::Index;

/// Ordered set of node identifiers forming one candidate solution.
pub type SeedSet = BTreeSet<NodeId>;

/// Stable handle to a candidate stored in a [`CandidateArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CandidateId(usize);

impl CandidateId {
    /// Raw slot index inside the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A seed set and its objective values (maximization).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate {
    /// Exactly `budget` distinct nodes.
    pub position: SeedSet,
    /// One value per objective; higher is better.
    pub cost: Vec<f64>,
}

impl Candidate {
    /// Creates a candidate from an evaluated position.
    pub fn new(position: SeedSet, cost: Vec<f64>) -> Self {
        Self { position, cost }
    }

    /// Returns `true` if `self` Pareto-dominates `other`.
    pub fn dominates(&self, other: &Candidate) -> bool {
        dominates(&self.cost, &other.cost)
    }
}

/// Owner of every live candidate.
///
/// Slots of swept candidates are recycled, so ids are only meaningful while
/// the candidate is referenced by the population, the archive or its fronts.
#[derive(Debug, Clone, Default)]
pub struct CandidateArena {
    entries: Vec<Option<Candidate>>,
    free: Vec<usize>,
    live: usize,
}

impl CandidateArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a candidate and returns its id.
    pub fn insert(&mut self, candidate: Candidate) -> CandidateId {
        self.live += 1;
        match self.free.pop() {
            Some(slot) => {
                self.entries[slot] = Some(candidate);
                CandidateId(slot)
            }
            None => {
                self.entries.push(Some(candidate));
                CandidateId(self.entries.len() - 1)
            }
        }
    }

    /// Returns the candidate for `id`, or `None` if it was swept.
    pub fn get(&self, id: CandidateId) -> Option<&Candidate> {
        self.entries.get(id.0).and_then(Option::as_ref)
    }

    /// Objective vector of `id`.
    ///
    /// # Panics
    /// Panics if `id` is stale.
    pub fn cost(&self, id: CandidateId) -> &[f64] {
        &self[id].cost
    }

    /// Number of live candidates.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if no candidate is stored.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Drops every candidate whose id is not in `keep`.
    pub fn retain(&mut self, keep: &HashSet<CandidateId>) {
        for (slot, entry) in self.entries.iter_mut().enumerate() {
            if entry.is_some() && !keep.contains(&CandidateId(slot)) {
                *entry = None;
                self.free.push(slot);
                self.live -= 1;
            }
        }
    }
}

impl Index<CandidateId> for CandidateArena {
    type Output = Candidate;

    fn index(&self, id: CandidateId) -> &Candidate {
        self.get(id).expect("stale candidate id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(nodes: &[NodeId], cost: &[f64]) -> Candidate {
        Candidate::new(nodes.iter().copied().collect(), cost.to_vec())
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut arena = CandidateArena::new();
        let a = arena.insert(cand(&[0, 1], &[1.0, 2.0]));
        let b = arena.insert(cand(&[2, 3], &[3.0, 1.0]));
        assert_ne!(a, b);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.cost(b), &[3.0, 1.0]);
    }

    #[test]
    fn test_retain_recycles_slots() {
        let mut arena = CandidateArena::new();
        let a = arena.insert(cand(&[0], &[1.0]));
        let b = arena.insert(cand(&[1], &[2.0]));
        arena.retain(&[b].into_iter().collect());
        assert_eq!(arena.len(), 1);
        assert!(arena.get(a).is_none());

        let c = arena.insert(cand(&[2], &[3.0]));
        assert_eq!(c.index(), a.index());
        assert_eq!(arena.len(), 2);
        assert_eq!(arena[c].cost, vec![3.0]);
    }

    #[test]
    fn test_candidate_dominates() {
        let strong = cand(&[0], &[3.0, 3.0]);
        let weak = cand(&[1], &[2.0, 3.0]);
        assert!(strong.dominates(&weak));
        assert!(!weak.dominates(&strong));
        assert!(!strong.dominates(&strong));
    }
}
