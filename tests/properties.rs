//! Property tests for the Pareto machinery and optimizer invariants.

use proptest::prelude::*;
use u_seedopt::error::BoxError;
use u_seedopt::pareto::{dominates, exact_hypervolume, rectangle_sum, ArchiveManager};
use u_seedopt::{AdjacencyGraph, Candidate, CandidateArena, CandidateId, Graph, Optimizer, OptimizerConfig, SeedSet};

fn objective_vec(dims: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((0u8..6).prop_map(f64::from), dims)
}

fn cost_list() -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(objective_vec(2), 1..40)
}

fn fill_arena(costs: &[Vec<f64>]) -> (CandidateArena, Vec<CandidateId>) {
    let mut arena = CandidateArena::new();
    let ids = costs
        .iter()
        .enumerate()
        .map(|(i, c)| arena.insert(Candidate::new([i].into_iter().collect(), c.clone())))
        .collect();
    (arena, ids)
}

fn max_of(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::NEG_INFINITY, f64::max)
}

proptest! {
    #[test]
    fn dominance_is_transitive(
        a in objective_vec(3),
        b in objective_vec(3),
        c in objective_vec(3),
    ) {
        if dominates(&a, &b) && dominates(&b, &c) {
            prop_assert!(dominates(&a, &c));
        }
    }

    #[test]
    fn dominance_is_asymmetric(a in objective_vec(2), b in objective_vec(2)) {
        prop_assert!(!(dominates(&a, &b) && dominates(&b, &a)));
        prop_assert!(!dominates(&a, &a));
    }

    #[test]
    fn archive_respects_capacity(costs in cost_list(), capacity in 1usize..10) {
        let (arena, ids) = fill_arena(&costs);
        let mut archive = ArchiveManager::new(capacity);
        archive.update(&arena, &ids);
        prop_assert!(archive.len() <= capacity);
        prop_assert!(!archive.is_empty());
    }

    #[test]
    fn archive_members_are_mutually_non_dominated(costs in cost_list(), capacity in 1usize..10) {
        let (arena, ids) = fill_arena(&costs);
        let mut archive = ArchiveManager::new(capacity);
        archive.update(&arena, &ids);

        for &x in archive.members() {
            for &y in archive.members() {
                prop_assert!(!dominates(arena.cost(x), arena.cost(y)));
            }
        }
    }

    #[test]
    fn archive_retains_objective_extremes(costs in cost_list(), capacity in 2usize..10) {
        let (arena, ids) = fill_arena(&costs);
        let mut archive = ArchiveManager::new(capacity);
        archive.update(&arena, &ids);

        let front_0 = &archive.fronts()[0];
        for k in 0..2 {
            let best = max_of(front_0.iter().map(|&id| arena.cost(id)[k]));
            let kept = max_of(archive.members().iter().map(|&id| arena.cost(id)[k]));
            prop_assert_eq!(best, kept);
        }
    }

    #[test]
    fn archive_update_twice_is_stable(costs in cost_list(), capacity in 1usize..10) {
        let (arena, ids) = fill_arena(&costs);
        let mut archive = ArchiveManager::new(capacity);
        archive.update(&arena, &ids);
        let before = archive.members().to_vec();
        archive.update(&arena, &ids);
        prop_assert_eq!(archive.members().len(), before.len());
    }

    #[test]
    fn hypervolume_grows_under_dominating_replacement(
        points in prop::collection::vec(objective_vec(2), 1..12),
        slot in any::<prop::sample::Index>(),
        boost in (0u8..4, 1u8..4),
    ) {
        let i = slot.index(points.len());
        let mut improved = points.clone();
        improved[i][0] += f64::from(boost.0);
        improved[i][1] += f64::from(boost.1);

        let reference = [0.0, 0.0];
        prop_assert!(exact_hypervolume(&improved, &reference) >= exact_hypervolume(&points, &reference));
        prop_assert!(rectangle_sum(&improved, &reference) >= rectangle_sum(&points, &reference));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn seed_sets_keep_budget(seed in any::<u64>(), budget in 1usize..7, chords in 0usize..30) {
        let n = 40;
        let mut edges: Vec<(usize, usize)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
        edges.extend((0..chords).map(|i| (i, (i * 13 + 7) % n)));
        let graph = AdjacencyGraph::from_edges(n, &edges);

        let evaluator = |s: &SeedSet| -> Result<Vec<f64>, BoxError> {
            let reach: usize = s.iter().map(|&v| graph.degree(v)).sum();
            let low = s.iter().filter(|&&v| v < 20).count();
            Ok(vec![reach as f64, (s.len() - low).min(low) as f64])
        };
        let config = OptimizerConfig::fast()
            .with_budget(budget)
            .with_population_size(10)
            .with_archive_size(6)
            .with_max_iterations(6)
            .with_seed(seed);

        let mut optimizer = Optimizer::new(&graph, evaluator, config).unwrap();
        optimizer.initialize().unwrap();
        loop {
            prop_assert!(optimizer.population().all(|c| c.position.len() == budget));
            if !optimizer.step().unwrap() {
                break;
            }
        }
        let result = optimizer.result(false);
        prop_assert!(result.seed_sets().all(|s| s.len() == budget));
        prop_assert!(result.archive.len() <= 6);
    }
}
