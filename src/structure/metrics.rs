//! Precomputed structural scores and node pools derived from them.

use super::centrality::{self, EIGENVECTOR_MAX_ITER, EIGENVECTOR_TOLERANCE};
use crate::graph::{Graph, NodeId};
use rand::seq::IndexedRandom;
use rand::Rng;

/// Closeness weight at generation 0.
const W_START: f64 = 0.8;
/// Closeness weight at the transition generation.
const W_TRANSITION: f64 = 0.5;
/// Closeness weight at the final generation.
const W_END: f64 = 0.2;

/// Upper degree bound of the low stratum in [`StructureMetrics::stratified_sample`].
pub const LOW_DEGREE_MAX: usize = 10;
/// Upper degree bound of the middle stratum.
pub const MID_DEGREE_MAX: usize = 30;

/// Normalized structural scores of every node, computed once per graph.
#[derive(Debug, Clone)]
pub struct StructureMetrics {
    raw_degree: Vec<usize>,
    degree: Vec<f64>,
    closeness: Vec<f64>,
    eigenvector: Vec<f64>,
}

impl StructureMetrics {
    /// Computes degree, closeness and eigenvector centrality for `graph`.
    pub fn new<G: Graph + ?Sized>(graph: &G) -> Self {
        let raw_degree: Vec<usize> = graph.nodes().map(|v| graph.degree(v)).collect();
        let degree = centrality::normalize(&centrality::degree(graph));
        let closeness = centrality::normalize(&centrality::closeness(graph));

        let (eigen, converged) =
            centrality::eigenvector(graph, EIGENVECTOR_MAX_ITER, EIGENVECTOR_TOLERANCE);
        if !converged {
            log::warn!(
                "eigenvector centrality did not converge within {} iterations",
                EIGENVECTOR_MAX_ITER
            );
        }
        let eigenvector = centrality::normalize(&eigen);

        Self {
            raw_degree,
            degree,
            closeness,
            eigenvector,
        }
    }

    /// Number of nodes covered.
    pub fn node_count(&self) -> usize {
        self.degree.len()
    }

    /// Unnormalized degree of `node`.
    pub fn raw_degree(&self, node: NodeId) -> usize {
        self.raw_degree[node]
    }

    /// Normalized degree centrality.
    pub fn degree(&self) -> &[f64] {
        &self.degree
    }

    /// Normalized closeness centrality.
    pub fn closeness(&self) -> &[f64] {
        &self.closeness
    }

    /// Normalized eigenvector centrality.
    pub fn eigenvector(&self) -> &[f64] {
        &self.eigenvector
    }

    /// Closeness weight `w1` of the score at generation `t`.
    ///
    /// Decays linearly from 0.8 to 0.5 at `transition_point · max_iter`,
    /// then from 0.5 to 0.2 at the final generation.
    pub fn closeness_weight(t: usize, max_iter: usize, transition_point: f64) -> f64 {
        let max_iter = max_iter.max(1) as f64;
        let t = (t as f64).min(max_iter);
        let switch = transition_point * max_iter;

        if t < switch {
            W_START - (W_START - W_TRANSITION) * (t / switch)
        } else {
            let span = max_iter - switch;
            let progress = if span > 0.0 { ((t - switch) / span).min(1.0) } else { 1.0 };
            W_TRANSITION - (W_TRANSITION - W_END) * progress
        }
    }

    /// Time-varying structural score `w1 · closeness + (1 - w1) · degree`.
    pub fn score(&self, node: NodeId, t: usize, max_iter: usize, transition_point: f64) -> f64 {
        let w1 = Self::closeness_weight(t, max_iter, transition_point);
        w1 * self.closeness[node] + (1.0 - w1) * self.degree[node]
    }

    /// Scores of every node at generation `t`.
    pub fn scores_at(&self, t: usize, max_iter: usize, transition_point: f64) -> Vec<f64> {
        let w1 = Self::closeness_weight(t, max_iter, transition_point);
        self.closeness
            .iter()
            .zip(&self.degree)
            .map(|(c, d)| w1 * c + (1.0 - w1) * d)
            .collect()
    }

    /// The `k` nodes with the highest eigenvector centrality.
    pub fn hub_nodes(&self, k: usize) -> Vec<NodeId> {
        top_k(&self.eigenvector, k)
    }

    /// The `k` nodes with the highest degree.
    pub fn top_degree_nodes(&self, k: usize) -> Vec<NodeId> {
        top_k(&self.degree, k)
    }

    /// Degree-stratified random subset of `nodes`.
    ///
    /// Strata are degree `≤ 10`, `11..=30` and `> 30`, drawing up to 40%,
    /// 40% and 20% of `size` respectively. The result can be smaller than
    /// `size` when a stratum runs short.
    pub fn stratified_sample<R: Rng>(
        &self,
        nodes: &[NodeId],
        size: usize,
        rng: &mut R,
    ) -> Vec<NodeId> {
        let mut strata: [Vec<NodeId>; 3] = Default::default();
        for &v in nodes {
            let stratum = match self.raw_degree[v] {
                d if d <= LOW_DEGREE_MAX => 0,
                d if d <= MID_DEGREE_MAX => 1,
                _ => 2,
            };
            strata[stratum].push(v);
        }

        let low = size * 2 / 5;
        let mid = size * 2 / 5;
        let quotas = [low, mid, size - low - mid];

        let mut sampled = Vec::with_capacity(size);
        for (stratum, quota) in strata.iter().zip(quotas) {
            sampled.extend(stratum.choose_multiple(rng, quota.min(stratum.len())).copied());
        }
        sampled
    }
}

/// Indices of the `k` largest values; ties favor the lower index.
fn top_k(values: &[f64], k: usize) -> Vec<NodeId> {
    let mut order: Vec<NodeId> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    order.truncate(k);
    order
}
