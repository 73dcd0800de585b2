//! Pareto dominance, non-dominated sorting and crowding distance.
//!
//! All objectives are **maximized**: higher values are better.
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"
//! - IEEE Transactions on Evolutionary Computation, 6(2), 182-197

use std::cmp::Ordering;

/// Result of non-dominated sorting.
///
/// Each element of `ranks` corresponds to the Pareto rank of the solution
/// at the same index. Rank 0 is the Pareto front (non-dominated solutions).
#[derive(Debug, Clone, Default)]
pub struct NondominatedSortResult {
    /// Pareto rank for each solution (0 = front).
    pub ranks: Vec<usize>,

    /// Indices grouped by front: `fronts[0]` contains rank-0 indices, etc.
    pub fronts: Vec<Vec<usize>>,
}

/// Dominance comparison result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// Left dominates right.
    Left,
    /// Right dominates left.
    Right,
    /// Neither dominates the other.
    Neither,
}

/// Compares two objective vectors for Pareto dominance (maximization).
pub fn dominance_cmp(a: &[f64], b: &[f64]) -> Dominance {
    debug_assert_eq!(a.len(), b.len(), "objective vectors must have equal length");
    let mut a_better_in_some = false;
    let mut b_better_in_some = false;

    for (&va, &vb) in a.iter().zip(b.iter()) {
        if va > vb {
            a_better_in_some = true;
        } else if vb > va {
            b_better_in_some = true;
        }
    }

    match (a_better_in_some, b_better_in_some) {
        (true, false) => Dominance::Left,
        (false, true) => Dominance::Right,
        _ => Dominance::Neither,
    }
}

/// Returns `true` if `a` is at least as good as `b` everywhere and strictly
/// better in at least one objective.
///
/// ```
/// use u_seedopt::pareto::dominates;
///
/// assert!(dominates(&[3.0, 3.0], &[2.0, 2.0]));
/// assert!(!dominates(&[1.0, 5.0], &[5.0, 1.0]));
/// assert!(!dominates(&[2.0, 2.0], &[2.0, 2.0]));
/// ```
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    dominance_cmp(a, b) == Dominance::Left
}

/// Fast non-dominated sorting.
///
/// # Algorithm (Deb et al., 2002)
///
/// 1. For each pair, record who dominates whom: `n(i)` counts the dominators
///    of `i`, `S(i)` lists the solutions `i` dominates
/// 2. Front 0 is every `i` with `n(i) = 0`
/// 3. Peel the current front: decrement `n(j)` for `j ∈ S(i)`, promoting
///    members that reach zero into the next front; stop on an empty front
///
/// An empty input yields an empty result.
///
/// # Complexity
///
/// O(m * n²) where m = number of objectives, n = number of solutions
///
/// # Example
///
/// ```
/// use u_seedopt::pareto::non_dominated_sort;
///
/// let objectives = vec![
///     vec![1.0, 5.0],
///     vec![5.0, 1.0],
///     vec![3.0, 3.0],
///     vec![2.0, 2.0], // dominated by (3, 3)
/// ];
///
/// let result = non_dominated_sort(&objectives);
/// assert_eq!(result.fronts[0], vec![0, 1, 2]);
/// assert_eq!(result.ranks[3], 1);
/// ```
pub fn non_dominated_sort<O: AsRef<[f64]>>(objectives: &[O]) -> NondominatedSortResult {
    let n = objectives.len();
    if n == 0 {
        return NondominatedSortResult::default();
    }

    let mut domination_count = vec![0usize; n];
    let mut dominated_set: Vec<Vec<usize>> = vec![Vec::new(); n];

    for i in 0..n {
        for j in (i + 1)..n {
            match dominance_cmp(objectives[i].as_ref(), objectives[j].as_ref()) {
                Dominance::Left => {
                    dominated_set[i].push(j);
                    domination_count[j] += 1;
                }
                Dominance::Right => {
                    dominated_set[j].push(i);
                    domination_count[i] += 1;
                }
                Dominance::Neither => {}
            }
        }
    }

    let mut ranks = vec![0usize; n];
    let front_0: Vec<usize> = (0..n).filter(|&i| domination_count[i] == 0).collect();

    let mut fronts = vec![front_0];
    loop {
        let current = &fronts[fronts.len() - 1];
        let mut next_front = Vec::new();

        for &i in current {
            for &j in &dominated_set[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    next_front.push(j);
                }
            }
        }

        if next_front.is_empty() {
            break;
        }
        next_front.sort_unstable();
        for &j in &next_front {
            ranks[j] = fronts.len();
        }
        fronts.push(next_front);
    }

    NondominatedSortResult { ranks, fronts }
}

/// Crowding distance assignment for diversity preservation.
///
/// Higher distance means the solution is more isolated. For every objective
/// with a non-zero range, the two boundary solutions receive `f64::INFINITY`
/// and interior solutions accumulate `(next - prev) / (max - min)`. An
/// objective where every solution has the same value contributes nothing.
/// Sets of one or two distinct solutions are all boundary.
///
/// Exact duplicates are collapsed before distances are computed: the first
/// occurrence of a cost vector carries its distance and every later copy gets
/// `0.0`, so two copies of one extreme never hold two boundary slots.
///
/// Sorting is stable, so ties keep their input order.
///
/// # Example
///
/// ```
/// use u_seedopt::pareto::crowding_distance;
///
/// let d = crowding_distance(&[vec![1.0, 5.0], vec![3.0, 3.0], vec![5.0, 1.0]]);
/// assert!(d[0].is_infinite() && d[2].is_infinite());
/// assert!((d[1] - 2.0).abs() < 1e-12);
///
/// let d = crowding_distance(&[vec![1.0, 5.0], vec![1.0, 5.0], vec![5.0, 1.0]]);
/// assert_eq!(d[1], 0.0);
/// ```
pub fn crowding_distance<O: AsRef<[f64]>>(objectives: &[O]) -> Vec<f64> {
    let n = objectives.len();
    let unique = first_occurrences(objectives);
    let mut distances = vec![0.0f64; n];
    if unique.len() == n {
        distinct_crowding(objectives, &mut distances);
        return distances;
    }

    let representatives: Vec<&[f64]> = unique.iter().map(|&i| objectives[i].as_ref()).collect();
    let mut unique_distances = vec![0.0f64; unique.len()];
    distinct_crowding(&representatives, &mut unique_distances);
    for (&i, d) in unique.iter().zip(unique_distances) {
        distances[i] = d;
    }
    distances
}

/// Indices of the first occurrence of each distinct cost vector, ascending.
fn first_occurrences<O: AsRef<[f64]>>(objectives: &[O]) -> Vec<usize> {
    let lex = |a: usize, b: usize| {
        objectives[a]
            .as_ref()
            .iter()
            .zip(objectives[b].as_ref())
            .map(|(x, y)| x.total_cmp(y))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    };

    let mut order: Vec<usize> = (0..objectives.len()).collect();
    order.sort_by(|&a, &b| lex(a, b));
    let mut unique: Vec<usize> = Vec::with_capacity(order.len());
    for (pos, &i) in order.iter().enumerate() {
        if pos == 0 || lex(order[pos - 1], i).is_ne() {
            unique.push(i);
        }
    }
    unique.sort_unstable();
    unique
}

fn distinct_crowding<O: AsRef<[f64]>>(objectives: &[O], distances: &mut [f64]) {
    let n = objectives.len();
    if n <= 2 {
        distances.fill(f64::INFINITY);
        return;
    }

    let m = objectives[0].as_ref().len();
    let value = |i: usize, k: usize| objectives[i].as_ref()[k];

    for obj_idx in 0..m {
        let mut indices: Vec<usize> = (0..n).collect();
        indices.sort_by(|&a, &b| value(a, obj_idx).total_cmp(&value(b, obj_idx)));

        let min_val = value(indices[0], obj_idx);
        let max_val = value(indices[n - 1], obj_idx);
        let range = max_val - min_val;
        if range <= 0.0 {
            continue;
        }

        distances[indices[0]] = f64::INFINITY;
        distances[indices[n - 1]] = f64::INFINITY;

        for i in 1..(n - 1) {
            let prev = value(indices[i - 1], obj_idx);
            let next = value(indices[i + 1], obj_idx);
            distances[indices[i]] += (next - prev) / range;
        }
    }
}

/// Indices ordered by crowding distance, most isolated first.
///
/// Ties keep their input order.
pub fn crowding_order<O: AsRef<[f64]>>(objectives: &[O]) -> Vec<usize> {
    let distances = crowding_distance(objectives);
    let mut order: Vec<usize> = (0..objectives.len()).collect();
    order.sort_by(|&a, &b| distances[b].total_cmp(&distances[a]));
    order
}
