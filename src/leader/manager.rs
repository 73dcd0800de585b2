//! Leader selection from archive fronts.

use super::region::{normalize_front, RegionRule, Zone};
use crate::candidate::{CandidateArena, CandidateId};
use crate::pareto::{crowding_order, ArchiveManager};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashSet;

/// Number of zone leaders (alpha, beta, delta).
pub const ZONE_LEADERS: usize = 3;

/// Picks the candidates that guide population movement.
///
/// Leaders are returned in the order `[spread, fair, tradeoff]`, followed by
/// the explorer when enabled. Zones that could not be filled are backfilled
/// in place, so positions in the slice are not guaranteed to match zones.
#[derive(Debug, Clone, Copy)]
pub struct LeaderManager {
    rule: RegionRule,
    explorer: bool,
}

impl LeaderManager {
    /// Creates a manager with the given zone rule and optional explorer.
    pub fn new(rule: RegionRule, explorer: bool) -> Self {
        Self { rule, explorer }
    }

    /// Zone classification rule in use.
    pub fn rule(&self) -> RegionRule {
        self.rule
    }

    /// Number of leaders requested per selection: 3, or 4 with the explorer.
    pub fn required(&self) -> usize {
        if self.explorer {
            ZONE_LEADERS + 1
        } else {
            ZONE_LEADERS
        }
    }

    /// Pads `archive` with population members until it holds `required`.
    ///
    /// Candidates outside the archive are taken in descending order of the
    /// first objective. Stops early when the population runs out.
    pub fn ensure_leader_minimum(
        archive: &mut ArchiveManager,
        arena: &CandidateArena,
        population: &[CandidateId],
        required: usize,
    ) {
        if archive.len() >= required {
            return;
        }

        let mut seen = HashSet::new();
        let mut supplement: Vec<CandidateId> = population
            .iter()
            .copied()
            .filter(|&id| !archive.contains(id) && seen.insert(id))
            .collect();
        supplement.sort_by(|&a, &b| arena.cost(b)[0].total_cmp(&arena.cost(a)[0]));

        let needed = required - archive.len();
        archive.extend_members(supplement.into_iter().take(needed));
    }

    /// Selects leaders by objective-space region, scanning fronts best first.
    ///
    /// Each front is normalized on its own; members are classified into
    /// zones, and every unfilled zone takes its best member on the zone's
    /// criterion. Scanning stops once all three zones are filled. Missing
    /// leaders are backfilled from the remaining candidates by descending
    /// first objective. The explorer is drawn from the less-crowded half of
    /// the tradeoff pool, or uniformly from unassigned candidates when that
    /// pool is empty.
    ///
    /// The result holds [`required`](Self::required) distinct ids whenever
    /// the fronts contain that many distinct candidates.
    pub fn select_leaders_by_region<R: Rng>(
        &self,
        arena: &CandidateArena,
        fronts: &[Vec<CandidateId>],
        rng: &mut R,
    ) -> Vec<CandidateId> {
        let mut zone_leaders: [Option<CandidateId>; ZONE_LEADERS] = [None; ZONE_LEADERS];
        let mut tradeoff_pool: Vec<CandidateId> = Vec::new();

        for front in fronts.iter().filter(|f| !f.is_empty()) {
            if zone_leaders.iter().all(Option::is_some) {
                break;
            }

            let costs: Vec<&[f64]> = front.iter().map(|&id| arena.cost(id)).collect();
            let normalized = normalize_front(&costs);
            let zones: Vec<Zone> = normalized
                .iter()
                .map(|&(f1, f2)| self.rule.classify(f1, f2))
                .collect();

            tradeoff_pool.extend(
                front
                    .iter()
                    .zip(&zones)
                    .filter(|(_, &z)| z == Zone::Tradeoff)
                    .map(|(&id, _)| id),
            );

            for (slot, zone) in Zone::ALL.iter().enumerate() {
                if zone_leaders[slot].is_some() {
                    continue;
                }
                let members = front
                    .iter()
                    .zip(&zones)
                    .filter(|(_, &z)| z == *zone)
                    .map(|(&id, _)| id);
                zone_leaders[slot] = best_by(members, |id| zone.criterion(arena.cost(id)));
            }
        }

        let mut leaders: Vec<CandidateId> = zone_leaders.iter().flatten().copied().collect();
        let missing = ZONE_LEADERS - leaders.len();
        if missing > 0 {
            let mut rest = unassigned(fronts, &leaders);
            rest.sort_by(|&a, &b| arena.cost(b)[0].total_cmp(&arena.cost(a)[0]));
            let mut backfill = rest.into_iter().take(missing);
            leaders = zone_leaders
                .iter()
                .filter_map(|slot| slot.or_else(|| backfill.next()))
                .collect();
        }

        if self.explorer {
            if let Some(explorer) = self.pick_explorer(arena, fronts, &tradeoff_pool, &leaders, rng) {
                leaders.push(explorer);
            }
        }

        leaders
    }

    fn pick_explorer<R: Rng>(
        &self,
        arena: &CandidateArena,
        fronts: &[Vec<CandidateId>],
        tradeoff_pool: &[CandidateId],
        leaders: &[CandidateId],
        rng: &mut R,
    ) -> Option<CandidateId> {
        let pool: Vec<CandidateId> = tradeoff_pool
            .iter()
            .copied()
            .filter(|id| !leaders.contains(id))
            .collect();

        match pool.len() {
            0 => unassigned(fronts, leaders).choose(rng).copied(),
            1 => Some(pool[0]),
            n => {
                let costs: Vec<&[f64]> = pool.iter().map(|&id| arena.cost(id)).collect();
                let ranked = crowding_order(&costs);
                let sparse = &ranked[..n.div_ceil(2)];
                sparse.choose(rng).map(|&k| pool[k])
            }
        }
    }
}

/// Distinct candidates across all fronts that are not in `taken`, in front order.
fn unassigned(fronts: &[Vec<CandidateId>], taken: &[CandidateId]) -> Vec<CandidateId> {
    let mut seen: HashSet<CandidateId> = taken.iter().copied().collect();
    fronts
        .iter()
        .flatten()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}

/// First id with the maximal key.
fn best_by<I, F>(ids: I, key: F) -> Option<CandidateId>
where
    I: Iterator<Item = CandidateId>,
    F: Fn(CandidateId) -> f64,
{
    let mut best: Option<(CandidateId, f64)> = None;
    for id in ids {
        let k = key(id);
        if best.map_or(true, |(_, b)| k > b) {
            best = Some((id, k));
        }
    }
    best.map(|(id, _)| id)
}
