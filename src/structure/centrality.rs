//! Node centrality measures on unweighted graphs.

use crate::graph::Graph;
use std::collections::VecDeque;

/// Default iteration bound for [`eigenvector`].
pub const EIGENVECTOR_MAX_ITER: usize = 500;

/// Per-node tolerance for [`eigenvector`] convergence.
pub const EIGENVECTOR_TOLERANCE: f64 = 1e-6;

/// Guard added to the range in [`normalize`].
const RANGE_EPSILON: f64 = 1e-9;

/// Raw degree of every node.
pub fn degree<G: Graph + ?Sized>(graph: &G) -> Vec<f64> {
    graph.nodes().map(|v| graph.degree(v) as f64).collect()
}

/// Closeness centrality from breadth-first distances.
///
/// For a node reaching `r - 1` other nodes at total distance `s`, closeness
/// is `(r - 1) / s`, scaled by `(r - 1) / (n - 1)` so nodes in small
/// components are not over-rewarded (Wasserman & Faust). Isolated nodes get 0.
pub fn closeness<G: Graph + ?Sized>(graph: &G) -> Vec<f64> {
    let n = graph.node_count();
    let mut result = vec![0.0; n];
    if n <= 1 {
        return result;
    }

    let mut dist = vec![usize::MAX; n];
    let mut queue = VecDeque::new();
    let mut touched = Vec::new();

    for source in graph.nodes() {
        dist[source] = 0;
        touched.push(source);
        queue.push_back(source);

        let mut total = 0usize;
        let mut reached = 0usize;
        while let Some(u) = queue.pop_front() {
            for &w in graph.neighbors(u) {
                if dist[w] == usize::MAX {
                    dist[w] = dist[u] + 1;
                    total += dist[w];
                    reached += 1;
                    touched.push(w);
                    queue.push_back(w);
                }
            }
        }

        if total > 0 {
            let r = reached as f64;
            result[source] = (r / total as f64) * (r / (n - 1) as f64);
        }

        for v in touched.drain(..) {
            dist[v] = usize::MAX;
        }
    }

    result
}

/// Eigenvector centrality by power iteration.
///
/// Iterates `x ← (A + I) x`, normalizing to unit Euclidean length each step;
/// the identity shift keeps bipartite graphs from oscillating. Stops when the
/// L1 change drops below `n · tolerance` or after `max_iter` rounds. Returns
/// the vector and whether it converged.
pub fn eigenvector<G: Graph + ?Sized>(
    graph: &G,
    max_iter: usize,
    tolerance: f64,
) -> (Vec<f64>, bool) {
    let n = graph.node_count();
    if n == 0 {
        return (Vec::new(), true);
    }

    let mut x = vec![1.0 / n as f64; n];
    for _ in 0..max_iter {
        let mut next = x.clone();
        for u in graph.nodes() {
            for &w in graph.neighbors(u) {
                next[w] += x[u];
            }
        }

        let norm = next.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            next.iter_mut().for_each(|v| *v /= norm);
        }

        let delta: f64 = next.iter().zip(&x).map(|(a, b)| (a - b).abs()).sum();
        x = next;
        if delta < n as f64 * tolerance {
            return (x, true);
        }
    }
    (x, false)
}

/// Min-max normalization to `[0, 1]`.
///
/// A constant vector maps to all zeros.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min + RANGE_EPSILON;
    values.iter().map(|&v| (v - min) / range).collect()
}
