//! Candidate movement: base inheritance, pool ranking and perturbation.

use super::config::{BaseRule, OptimizerConfig, PoolSampling};
use crate::candidate::SeedSet;
use crate::graph::{Graph, NodeId};
use crate::perturbation::{PerturbationContext, PerturbationHandler, SearchTendency};
use crate::structure::StructureMetrics;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::BTreeMap;

/// New position of one candidate.
#[derive(Debug, Clone)]
pub(crate) struct Move {
    pub position: SeedSet,
    pub perturbed: bool,
    pub fallback: bool,
}

/// Everything a candidate move needs that is fixed for one generation.
///
/// Built once per generation, then shared read-only across candidates.
pub(crate) struct MovePlan<'a> {
    metrics: &'a StructureMetrics,
    perturbation: &'a PerturbationHandler,
    budget: usize,
    cap: usize,
    sampling: PoolSampling,
    scores: Vec<f64>,
    /// All nodes by descending score; ties keep the lower id first.
    ranking: Vec<NodeId>,
    leader_core: SeedSet,
    /// Leader nodes with their 1- and 2-hop neighbors, ascending.
    local_region: Vec<NodeId>,
    perturb_prob: f64,
    ctx: PerturbationContext,
}

impl<'a> MovePlan<'a> {
    pub(crate) fn new<G: Graph + ?Sized>(
        graph: &G,
        metrics: &'a StructureMetrics,
        perturbation: &'a PerturbationHandler,
        config: &OptimizerConfig,
        leaders: &[&SeedSet],
        ctx: PerturbationContext,
    ) -> Self {
        let scores = metrics.scores_at(ctx.t, ctx.max_iter, ctx.transition_point);
        let ranking = rank(graph.nodes(), &scores);
        let local_region = match ctx.tendency {
            SearchTendency::Local => two_hop_region(graph, leaders),
            SearchTendency::Global => Vec::new(),
        };

        Self {
            metrics,
            perturbation,
            budget: config.budget,
            cap: config.base_cap(ctx.t),
            sampling: config.pool_sampling,
            scores,
            ranking,
            leader_core: leader_core(config.base_rule, leaders),
            local_region,
            perturb_prob: PerturbationHandler::dynamic_perturbation_prob(
                ctx.t,
                ctx.max_iter,
                ctx.transition_point,
                ctx.stagnation,
            ),
            ctx,
        }
    }

    /// Moves one candidate.
    ///
    /// Keeps `position ∩ leader_core` (randomly capped), fills the rest
    /// from the phase's ranked pool, tops up randomly if the pool runs short
    /// and finally perturbs with the scheduled probability. The result
    /// always holds exactly `budget` nodes.
    pub(crate) fn move_candidate<R: Rng>(&self, position: &SeedSet, rng: &mut R) -> Move {
        let base = self.base(position, rng);
        let needed = self.budget - base.len();

        let mut next = base.clone();
        next.extend(self.pool(position, &base, needed, rng));

        let fallback = next.len() < self.budget;
        if fallback {
            let unused: Vec<NodeId> = (0..self.metrics.node_count())
                .filter(|v| !next.contains(v))
                .collect();
            let missing = self.budget - next.len();
            next.extend(unused.choose_multiple(rng, missing).copied());
        }

        let perturbed = rng.random::<f64>() < self.perturb_prob;
        if perturbed {
            next = self.perturbation.apply_perturbation(&next, &base, &self.ctx, rng);
        }

        Move {
            position: next,
            perturbed,
            fallback,
        }
    }

    fn base<R: Rng>(&self, position: &SeedSet, rng: &mut R) -> SeedSet {
        let kept: Vec<NodeId> = position.intersection(&self.leader_core).copied().collect();
        if kept.len() <= self.cap {
            kept.into_iter().collect()
        } else {
            kept.choose_multiple(rng, self.cap).copied().collect()
        }
    }

    /// Top `needed` pool nodes by score, excluding `base` and `position`.
    fn pool<R: Rng>(
        &self,
        position: &SeedSet,
        base: &SeedSet,
        needed: usize,
        rng: &mut R,
    ) -> Vec<NodeId> {
        if needed == 0 {
            return Vec::new();
        }
        let free = |v: &NodeId| !position.contains(v) && !base.contains(v);

        let limit = match (self.ctx.tendency, self.sampling) {
            (SearchTendency::Global, PoolSampling::Full) => {
                return self.ranking.iter().copied().filter(free).take(needed).collect();
            }
            (SearchTendency::Local, PoolSampling::Full) => None,
            (SearchTendency::Global, PoolSampling::DegreeStratified { global, .. }) => Some(global),
            (SearchTendency::Local, PoolSampling::DegreeStratified { local, .. }) => Some(local),
        };

        let mut pool: Vec<NodeId> = match self.ctx.tendency {
            SearchTendency::Global => self.ranking.iter().copied().filter(free).collect(),
            SearchTendency::Local => self.local_region.iter().copied().filter(free).collect(),
        };
        if let Some(size) = limit {
            if pool.len() > size {
                pool = self.metrics.stratified_sample(&pool, size, rng);
            }
        }

        pool.sort_by(|&a, &b| self.scores[b].total_cmp(&self.scores[a]).then(a.cmp(&b)));
        pool.truncate(needed);
        pool
    }
}

/// Nodes in descending score order, lower id first on ties.
fn rank(nodes: impl Iterator<Item = NodeId>, scores: &[f64]) -> Vec<NodeId> {
    let mut order: Vec<NodeId> = nodes.collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    order
}

/// Leader nodes a candidate may inherit under `rule`.
pub(crate) fn leader_core(rule: BaseRule, leaders: &[&SeedSet]) -> SeedSet {
    match rule {
        BaseRule::Union => leaders.iter().flat_map(|s| s.iter().copied()).collect(),
        BaseRule::Intersection => match leaders.split_first() {
            Some((first, rest)) => first
                .iter()
                .copied()
                .filter(|v| rest.iter().all(|s| s.contains(v)))
                .collect(),
            None => SeedSet::new(),
        },
        BaseRule::PairwiseIntersection => {
            let mut counts: BTreeMap<NodeId, usize> = BTreeMap::new();
            for &v in leaders.iter().flat_map(|s| s.iter()) {
                *counts.entry(v).or_default() += 1;
            }
            counts
                .into_iter()
                .filter(|&(_, c)| c >= 2)
                .map(|(v, _)| v)
                .collect()
        }
    }
}

/// Leader nodes plus everything within two hops, ascending.
fn two_hop_region<G: Graph + ?Sized>(graph: &G, leaders: &[&SeedSet]) -> Vec<NodeId> {
    let mut in_region = vec![false; graph.node_count()];
    let mut frontier: Vec<NodeId> = Vec::new();
    for &v in leaders.iter().flat_map(|s| s.iter()) {
        if !in_region[v] {
            in_region[v] = true;
            frontier.push(v);
        }
    }

    for _ in 0..2 {
        let mut next = Vec::new();
        for &u in &frontier {
            for &w in graph.neighbors(u) {
                if !in_region[w] {
                    in_region[w] = true;
                    next.push(w);
                }
            }
        }
        frontier = next;
    }

    (0..graph.node_count()).filter(|&v| in_region[v]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AdjacencyGraph;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn path(n: usize) -> AdjacencyGraph {
        let edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1)).collect();
        AdjacencyGraph::from_edges(n, &edges)
    }

    fn set(nodes: &[NodeId]) -> SeedSet {
        nodes.iter().copied().collect()
    }

    fn ctx(t: usize, tendency: SearchTendency) -> PerturbationContext {
        PerturbationContext {
            t,
            max_iter: 10,
            transition_point: 0.4,
            tendency,
            stagnation: 0,
        }
    }

    #[test]
    fn test_leader_core_rules() {
        let a = set(&[1, 2, 3]);
        let b = set(&[2, 3, 4]);
        let c = set(&[3, 4, 5]);
        let leaders = [&a, &b, &c];

        assert_eq!(leader_core(BaseRule::PairwiseIntersection, &leaders), set(&[2, 3, 4]));
        assert_eq!(leader_core(BaseRule::Union, &leaders), set(&[1, 2, 3, 4, 5]));
        assert_eq!(leader_core(BaseRule::Intersection, &leaders), set(&[3]));
        assert!(leader_core(BaseRule::Intersection, &[]).is_empty());
    }

    #[test]
    fn test_two_hop_region() {
        let graph = path(10);
        let leader = set(&[5]);
        assert_eq!(two_hop_region(&graph, &[&leader]), vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_move_keeps_budget() {
        let graph = path(30);
        let metrics = StructureMetrics::new(&graph);
        let handler = PerturbationHandler::new(30, metrics.hub_nodes(5));
        let config = OptimizerConfig::default().with_budget(6).with_max_iterations(10);
        let a = set(&[0, 1, 2, 3, 4, 5]);
        let b = set(&[3, 4, 5, 6, 7, 8]);
        let mut rng = StdRng::seed_from_u64(3);

        for (t, tendency) in [(0, SearchTendency::Global), (8, SearchTendency::Local)] {
            let plan = MovePlan::new(&graph, &metrics, &handler, &config, &[&a, &b], ctx(t, tendency));
            for _ in 0..50 {
                let moved = plan.move_candidate(&a, &mut rng);
                assert_eq!(moved.position.len(), 6);
                assert!(moved.position.iter().all(|&v| v < 30));
            }
        }
    }

    #[test]
    fn test_base_respects_cap() {
        let graph = path(20);
        let metrics = StructureMetrics::new(&graph);
        let handler = PerturbationHandler::new(20, Vec::new());
        let config = OptimizerConfig::default()
            .with_budget(10)
            .with_max_iterations(10)
            .with_base_rule(BaseRule::Union);
        let leader = set(&(0..10).collect::<Vec<_>>());
        let plan = MovePlan::new(&graph, &metrics, &handler, &config, &[&leader], ctx(0, SearchTendency::Global));
        let mut rng = StdRng::seed_from_u64(0);

        // Cap at t = 0 is ⌊0.3 · 10⌋ = 3.
        let base = plan.base(&leader, &mut rng);
        assert_eq!(base.len(), 3);
        assert!(base.is_subset(&leader));
    }

    #[test]
    fn test_global_pool_skips_current_position() {
        let graph = path(12);
        let metrics = StructureMetrics::new(&graph);
        let handler = PerturbationHandler::new(12, Vec::new());
        let config = OptimizerConfig::default().with_budget(3).with_max_iterations(10);
        let position = set(&[4, 5, 6]);
        let plan = MovePlan::new(&graph, &metrics, &handler, &config, &[], ctx(0, SearchTendency::Global));
        let mut rng = StdRng::seed_from_u64(0);

        let picked = plan.pool(&position, &SeedSet::new(), 3, &mut rng);
        assert_eq!(picked.len(), 3);
        assert!(picked.iter().all(|v| !position.contains(v)));
    }

    #[test]
    fn test_empty_local_region_falls_back() {
        // No leaders means no local region; every slot comes from the fill.
        let graph = path(15);
        let metrics = StructureMetrics::new(&graph);
        let handler = PerturbationHandler::new(15, Vec::new());
        let config = OptimizerConfig::default().with_budget(4).with_max_iterations(10);
        let plan = MovePlan::new(&graph, &metrics, &handler, &config, &[], ctx(9, SearchTendency::Local));
        let mut rng = StdRng::seed_from_u64(11);

        let moved = plan.move_candidate(&set(&[0, 1, 2, 3]), &mut rng);
        assert!(moved.fallback);
        assert_eq!(moved.position.len(), 4);
    }
}
