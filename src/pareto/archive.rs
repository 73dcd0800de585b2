//! Bounded Pareto archive.
//!
//! The archive is rebuilt from scratch on every [`ArchiveManager::update`]:
//! the pool `archive ∪ candidates` is fully sorted, all layers are kept as
//! fronts, and the archive becomes front 0, trimmed by crowding distance when
//! it exceeds capacity. Rebuilding rather than patching gives elitism for
//! free: an archived solution only leaves when something dominates it or
//! crowding pushes it out.

use super::dominance::{crowding_order, non_dominated_sort};
use super::hypervolume::HypervolumeMethod;
use crate::candidate::{CandidateArena, CandidateId};
use std::collections::HashSet;

/// Capacity-bounded elite set plus the dominance layers of the last update.
#[derive(Debug, Clone)]
pub struct ArchiveManager {
    capacity: usize,
    members: Vec<CandidateId>,
    fronts: Vec<Vec<CandidateId>>,
}

impl ArchiveManager {
    /// Creates an empty archive holding at most `capacity` members.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            members: Vec::new(),
            fronts: Vec::new(),
        }
    }

    /// Maximum number of members retained by [`update`](Self::update).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current archive members.
    pub fn members(&self) -> &[CandidateId] {
        &self.members
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the archive holds no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns `true` if `id` is an archive member.
    pub fn contains(&self, id: CandidateId) -> bool {
        self.members.contains(&id)
    }

    /// Dominance layers of the pool seen by the last update, best first.
    ///
    /// Front 0 is the untrimmed non-dominated layer, so it may be larger than
    /// the archive itself.
    pub fn fronts(&self) -> &[Vec<CandidateId>] {
        &self.fronts
    }

    /// Appends members outside of an update.
    ///
    /// Used to pad the archive with population members when it is too small
    /// to supply leaders. The capacity bound is restored by the next update.
    pub fn extend_members<I: IntoIterator<Item = CandidateId>>(&mut self, ids: I) {
        for id in ids {
            if !self.members.contains(&id) {
                self.members.push(id);
            }
        }
    }

    /// Rebuilds the archive from `archive ∪ candidates`.
    ///
    /// Duplicated ids are considered once. An empty `candidates` slice leaves
    /// the archive and fronts untouched.
    pub fn update(&mut self, arena: &CandidateArena, candidates: &[CandidateId]) {
        if candidates.is_empty() {
            return;
        }

        let mut seen = HashSet::with_capacity(self.members.len() + candidates.len());
        let pool: Vec<CandidateId> = self
            .members
            .iter()
            .chain(candidates)
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        let objectives: Vec<&[f64]> = pool.iter().map(|&id| arena.cost(id)).collect();
        let sorted = non_dominated_sort(&objectives);

        self.fronts = sorted
            .fronts
            .iter()
            .map(|front| front.iter().map(|&i| pool[i]).collect())
            .collect();

        let front_0 = &sorted.fronts[0];
        self.members = if front_0.len() > self.capacity {
            let front_objs: Vec<&[f64]> = front_0.iter().map(|&i| objectives[i]).collect();
            crowding_order(&front_objs)
                .into_iter()
                .take(self.capacity)
                .map(|k| pool[front_0[k]])
                .collect()
        } else {
            front_0.iter().map(|&i| pool[i]).collect()
        };
    }

    /// Hypervolume of the archive against `reference_point`.
    ///
    /// Returns 0 for an empty archive.
    pub fn calculate_hypervolume(
        &self,
        arena: &CandidateArena,
        reference_point: &[f64],
        method: HypervolumeMethod,
    ) -> f64 {
        let points: Vec<&[f64]> = self.members.iter().map(|&id| arena.cost(id)).collect();
        method.compute(&points, reference_point)
    }

    /// Every id the archive still refers to, members and fronts alike.
    pub fn referenced(&self) -> impl Iterator<Item = CandidateId> + '_ {
        self.members
            .iter()
            .chain(self.fronts.iter().flatten())
            .copied()
    }
}
