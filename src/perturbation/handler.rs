//! Perturbation schedules and the replacement operator.

use super::SearchTendency;
use crate::candidate::SeedSet;
use crate::graph::NodeId;
use rand::seq::IndexedRandom;
use rand::Rng;

const PROB_GLOBAL_START: f64 = 0.05;
const PROB_GLOBAL_SPAN: f64 = 0.10;
const PROB_LOCAL_START: f64 = 0.15;
const PROB_LOCAL_SPAN: f64 = 0.30;
const PROB_STAGNATION_STEP: f64 = 0.015;
const PROB_STAGNATION_CAP: f64 = 0.15;
const PROB_MAX: f64 = 0.9;

const RATIO_GLOBAL_START: f64 = 0.05;
const RATIO_GLOBAL_SPAN: f64 = 0.05;
const RATIO_LOCAL_START: f64 = 0.10;
const RATIO_LOCAL_SPAN: f64 = 0.10;
const RATIO_STAGNATION_STEP: f64 = 0.05;
const RATIO_MAX: f64 = 0.6;

const KEEP_START: f64 = 0.8;
const KEEP_STAGNATION_STEP: f64 = 0.03;
const KEEP_FLOOR: f64 = 0.5;

/// Generation-dependent inputs of one perturbation.
#[derive(Debug, Clone, Copy)]
pub struct PerturbationContext {
    /// Current generation (0-based).
    pub t: usize,
    /// Total number of generations.
    pub max_iter: usize,
    /// Fraction of the run spent in the global phase.
    pub transition_point: f64,
    /// Current search phase.
    pub tendency: SearchTendency,
    /// Consecutive generations without hypervolume progress.
    pub stagnation: usize,
}

/// Replaces part of a seed set with hubs or random nodes.
///
/// Holds only the node count and the precomputed hub list; the schedules are
/// associated functions.
#[derive(Debug, Clone)]
pub struct PerturbationHandler {
    node_count: usize,
    hub_nodes: Vec<NodeId>,
}

impl PerturbationHandler {
    /// Creates a handler over a graph of `node_count` nodes.
    pub fn new(node_count: usize, hub_nodes: Vec<NodeId>) -> Self {
        Self {
            node_count,
            hub_nodes,
        }
    }

    /// Hub nodes offered during local-phase perturbation.
    pub fn hub_nodes(&self) -> &[NodeId] {
        &self.hub_nodes
    }

    /// Probability of perturbing a position at generation `t`.
    ///
    /// Ramps 0.05 → 0.15 before the transition and 0.15 → 0.45 after it,
    /// plus `0.015` per stagnating generation (at most +0.15), clamped to
    /// `[0, 0.9]`.
    pub fn dynamic_perturbation_prob(
        t: usize,
        max_iter: usize,
        transition_point: f64,
        stagnation_counter: usize,
    ) -> f64 {
        let base = match phase_progress(t, max_iter, transition_point) {
            (SearchTendency::Global, p) => PROB_GLOBAL_START + PROB_GLOBAL_SPAN * p,
            (SearchTendency::Local, p) => PROB_LOCAL_START + PROB_LOCAL_SPAN * p,
        };
        let feedback = (PROB_STAGNATION_STEP * stagnation_counter as f64).min(PROB_STAGNATION_CAP);
        (base + feedback).clamp(0.0, PROB_MAX)
    }

    /// Fraction of a position to replace, before stagnation feedback.
    ///
    /// Ramps 0.05 → 0.1 before the transition and 0.1 → 0.2 after it.
    pub fn dynamic_perturbation_ratio(t: usize, max_iter: usize, transition_point: f64) -> f64 {
        match phase_progress(t, max_iter, transition_point) {
            (SearchTendency::Global, p) => RATIO_GLOBAL_START + RATIO_GLOBAL_SPAN * p,
            (SearchTendency::Local, p) => RATIO_LOCAL_START + RATIO_LOCAL_SPAN * p,
        }
    }

    /// Replacement fraction including `0.05` per stagnating generation,
    /// capped at 0.6.
    pub fn effective_ratio(
        t: usize,
        max_iter: usize,
        transition_point: f64,
        stagnation_counter: usize,
    ) -> f64 {
        let boost = RATIO_STAGNATION_STEP * stagnation_counter as f64;
        (Self::dynamic_perturbation_ratio(t, max_iter, transition_point) + boost).min(RATIO_MAX)
    }

    /// Probability that a non-base node is shielded from replacement.
    ///
    /// Starts at 0.8 and drops 0.03 per stagnating generation down to 0.5.
    pub fn keep_probability(stagnation_counter: usize) -> f64 {
        (KEEP_START - KEEP_STAGNATION_STEP * stagnation_counter as f64).max(KEEP_FLOOR)
    }

    /// Replaces a share of `position \ base` with new nodes.
    ///
    /// `num_replace = max(1, ⌊ratio · |position|⌋)`. Each non-base node is
    /// a replacement candidate with probability `1 - keep_probability`; if
    /// none qualifies, every non-base node does. In the local phase half of
    /// the incoming nodes are unused hubs, the rest (and everything in the
    /// global phase) uniformly random unused nodes. The result always has
    /// exactly `|position|` nodes; base nodes are never removed.
    pub fn apply_perturbation<R: Rng>(
        &self,
        position: &SeedSet,
        base: &SeedSet,
        ctx: &PerturbationContext,
        rng: &mut R,
    ) -> SeedSet {
        let ratio = Self::effective_ratio(ctx.t, ctx.max_iter, ctx.transition_point, ctx.stagnation);
        let num_replace = ((position.len() as f64 * ratio) as usize).max(1);
        let keep = Self::keep_probability(ctx.stagnation);

        let free: Vec<NodeId> = position.difference(base).copied().collect();
        let mut replaceable: Vec<NodeId> = free
            .iter()
            .copied()
            .filter(|_| rng.random::<f64>() > keep)
            .collect();
        if replaceable.is_empty() {
            replaceable = free;
        }
        if replaceable.is_empty() {
            return position.clone();
        }

        let count = num_replace.min(replaceable.len());
        let mut incoming = SeedSet::new();

        if ctx.tendency == SearchTendency::Local {
            let hubs: Vec<NodeId> = self
                .hub_nodes
                .iter()
                .copied()
                .filter(|v| !position.contains(v))
                .collect();
            incoming.extend(hubs.choose_multiple(rng, (count / 2).min(hubs.len())).copied());
        }

        let unused: Vec<NodeId> = (0..self.node_count)
            .filter(|v| !position.contains(v) && !incoming.contains(v))
            .collect();
        let remaining = (count - incoming.len()).min(unused.len());
        incoming.extend(unused.choose_multiple(rng, remaining).copied());

        let outgoing: Vec<NodeId> = replaceable
            .choose_multiple(rng, incoming.len())
            .copied()
            .collect();

        log::trace!(
            "perturbation at t={} ({:?}): replacing {} of {} nodes",
            ctx.t,
            ctx.tendency,
            outgoing.len(),
            position.len()
        );

        let mut result = position.clone();
        for v in &outgoing {
            result.remove(v);
        }
        result.extend(incoming);
        result
    }
}

/// Phase at `t` and the linear progress through that phase, in `[0, 1]`.
fn phase_progress(t: usize, max_iter: usize, transition_point: f64) -> (SearchTendency, f64) {
    let max_iter = max_iter.max(1) as f64;
    let t = t as f64;
    let switch = transition_point * max_iter;

    if t < switch {
        (SearchTendency::Global, t / switch)
    } else {
        let span = max_iter * (1.0 - transition_point);
        let progress = if span > 0.0 { ((t - switch) / span).clamp(0.0, 1.0) } else { 1.0 };
        (SearchTendency::Local, progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ctx(t: usize, tendency: SearchTendency, stagnation: usize) -> PerturbationContext {
        PerturbationContext {
            t,
            max_iter: 100,
            transition_point: 0.4,
            tendency,
            stagnation,
        }
    }

    // ---- Schedules ----

    #[test]
    fn test_prob_start_and_end() {
        let p0 = PerturbationHandler::dynamic_perturbation_prob(0, 100, 0.4, 0);
        assert!((p0 - 0.05).abs() < 1e-12);

        let p_switch = PerturbationHandler::dynamic_perturbation_prob(40, 100, 0.4, 0);
        assert!((p_switch - 0.15).abs() < 1e-12);

        let p_end = PerturbationHandler::dynamic_perturbation_prob(99, 100, 0.4, 0);
        assert!((p_end - 0.445).abs() < 1e-9, "got {p_end}");
    }

    #[test]
    fn test_prob_stagnation_feedback_capped() {
        let base = PerturbationHandler::dynamic_perturbation_prob(10, 100, 0.4, 0);
        let boosted = PerturbationHandler::dynamic_perturbation_prob(10, 100, 0.4, 4);
        assert!((boosted - base - 0.06).abs() < 1e-12);

        let capped = PerturbationHandler::dynamic_perturbation_prob(10, 100, 0.4, 1000);
        assert!((capped - base - 0.15).abs() < 1e-12);
        assert!(PerturbationHandler::dynamic_perturbation_prob(100, 100, 0.4, 1000) <= 0.9);
    }

    #[test]
    fn test_ratio_schedule() {
        assert!((PerturbationHandler::dynamic_perturbation_ratio(0, 100, 0.4) - 0.05).abs() < 1e-12);
        assert!((PerturbationHandler::dynamic_perturbation_ratio(20, 100, 0.4) - 0.075).abs() < 1e-12);
        assert!((PerturbationHandler::dynamic_perturbation_ratio(40, 100, 0.4) - 0.1).abs() < 1e-12);
        assert!((PerturbationHandler::dynamic_perturbation_ratio(100, 100, 0.4) - 0.2).abs() < 1e-12);
        assert!((PerturbationHandler::effective_ratio(0, 100, 0.4, 100) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_keep_probability_floor() {
        assert!((PerturbationHandler::keep_probability(0) - 0.8).abs() < 1e-12);
        assert!((PerturbationHandler::keep_probability(5) - 0.65).abs() < 1e-12);
        assert!((PerturbationHandler::keep_probability(50) - 0.5).abs() < 1e-12);
    }

    // ---- Operator ----

    #[test]
    fn test_preserves_cardinality_and_base() {
        let handler = PerturbationHandler::new(50, vec![0, 1, 2, 3]);
        let position: SeedSet = (10..20).collect();
        let base: SeedSet = (10..13).collect();
        let mut rng = StdRng::seed_from_u64(42);

        for stagnation in [0, 5, 30] {
            for tendency in [SearchTendency::Global, SearchTendency::Local] {
                let out =
                    handler.apply_perturbation(&position, &base, &ctx(80, tendency, stagnation), &mut rng);
                assert_eq!(out.len(), position.len());
                assert!(base.is_subset(&out));
                assert_ne!(out, position);
            }
        }
    }

    #[test]
    fn test_local_phase_draws_hubs() {
        let handler = PerturbationHandler::new(200, vec![0, 1, 2, 3, 4, 5]);
        let position: SeedSet = (100..120).collect();
        let base = SeedSet::new();
        let mut rng = StdRng::seed_from_u64(3);

        // Heavy stagnation: ratio capped at 0.6, keep probability at its floor.
        let out = handler.apply_perturbation(
            &position,
            &base,
            &ctx(90, SearchTendency::Local, 20),
            &mut rng,
        );
        assert_eq!(out.len(), 20);
        assert!(
            out.iter().any(|v| handler.hub_nodes().contains(v)),
            "expected at least one hub in {out:?}"
        );
    }

    #[test]
    fn test_all_base_is_unchanged() {
        let handler = PerturbationHandler::new(10, vec![]);
        let position: SeedSet = (0..4).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let out = handler.apply_perturbation(
            &position,
            &position,
            &ctx(0, SearchTendency::Global, 0),
            &mut rng,
        );
        assert_eq!(out, position);
    }

    #[test]
    fn test_full_graph_cannot_grow() {
        // Every node already used: nothing to swap in.
        let handler = PerturbationHandler::new(5, vec![0]);
        let position: SeedSet = (0..5).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let out = handler.apply_perturbation(
            &position,
            &SeedSet::new(),
            &ctx(90, SearchTendency::Local, 3),
            &mut rng,
        );
        assert_eq!(out, position);
    }
}
