//! Initial population construction.

use super::config::Initialization;
use crate::candidate::SeedSet;
use crate::graph::NodeId;
use crate::structure::StructureMetrics;
use rand::seq::{index, IndexedRandom, SliceRandom};
use rand::Rng;
use std::collections::BTreeMap;

/// Builds `pop_size` seed sets of exactly `budget` nodes each.
///
/// `communities` must be present for [`Initialization::CommunityCoverage`];
/// the caller validates that.
pub(crate) fn initial_positions<R: Rng>(
    strategy: Initialization,
    metrics: &StructureMetrics,
    communities: Option<&[usize]>,
    budget: usize,
    pop_size: usize,
    rng: &mut R,
) -> Vec<SeedSet> {
    let n = metrics.node_count();
    match strategy {
        Initialization::Random => (0..pop_size).map(|_| random_set(n, budget, rng)).collect(),
        Initialization::DegreeSeeded {
            fraction,
            top_ratio,
        } => {
            let random_count = ((1.0 - fraction) * pop_size as f64) as usize;
            let top_k = ((n as f64 * top_ratio) as usize).max(1);
            let top = metrics.top_degree_nodes(top_k);
            (0..pop_size)
                .map(|i| {
                    if i < random_count {
                        random_set(n, budget, rng)
                    } else {
                        degree_seeded_set(&top, n, budget, rng)
                    }
                })
                .collect()
        }
        Initialization::CommunityCoverage => (0..pop_size)
            .map(|_| {
                let mut set = random_set(n, budget, rng);
                if let Some(map) = communities {
                    improve_coverage(&mut set, map, budget, rng);
                }
                set
            })
            .collect(),
    }
}

fn random_set<R: Rng>(n: usize, budget: usize, rng: &mut R) -> SeedSet {
    index::sample(rng, n, budget).into_iter().collect()
}

/// Between 1 and `min(|top|, budget)` nodes from `top`, filled at random.
fn degree_seeded_set<R: Rng>(top: &[NodeId], n: usize, budget: usize, rng: &mut R) -> SeedSet {
    let num_top = top.len().min(budget);
    let mut set: SeedSet = if num_top == 0 {
        SeedSet::new()
    } else {
        let k = rng.random_range(1..=num_top);
        top.choose_multiple(rng, k).copied().collect()
    };

    let rest: Vec<NodeId> = (0..n).filter(|v| !set.contains(v)).collect();
    set.extend(rest.choose_multiple(rng, budget - set.len()).copied());
    set
}

/// Number of distinct communities in `set`.
fn coverage(set: &SeedSet, communities: &[usize]) -> usize {
    let mut seen: Vec<usize> = set.iter().map(|&v| communities[v]).collect();
    seen.sort_unstable();
    seen.dedup();
    seen.len()
}

/// Swaps nodes out of over-represented communities into uncovered ones until
/// the set spans `max(2, budget / 2)` communities or no swap helps.
fn improve_coverage<R: Rng>(set: &mut SeedSet, communities: &[usize], budget: usize, rng: &mut R) {
    let required = (budget / 2).max(2);

    while coverage(set, communities) < required {
        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for &v in set.iter() {
            *counts.entry(communities[v]).or_default() += 1;
        }

        // Most represented community; ties go to the lowest id.
        let Some((&crowded, _)) = counts
            .iter()
            .filter(|(_, &c)| c > 1)
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
        else {
            return;
        };
        let Some(&outgoing) = set.iter().find(|&&v| communities[v] == crowded) else {
            return;
        };

        let mut uncovered: Vec<usize> = communities
            .iter()
            .copied()
            .filter(|c| !counts.contains_key(c))
            .collect();
        uncovered.sort_unstable();
        uncovered.dedup();
        uncovered.shuffle(rng);

        let incoming = uncovered.iter().find_map(|&c| {
            let members: Vec<NodeId> = (0..communities.len())
                .filter(|&v| communities[v] == c && !set.contains(&v))
                .collect();
            members.choose(rng).copied()
        });
        let Some(incoming) = incoming else {
            return;
        };

        set.remove(&outgoing);
        set.insert(incoming);
    }
}
