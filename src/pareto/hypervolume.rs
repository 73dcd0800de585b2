//! Hypervolume indicators for monitoring archive progress.
//!
//! Two measures are provided:
//!
//! - [`rectangle_sum`]: sum of each solution's box against the reference
//!   point. Cheap and monotone, but counts overlapping regions repeatedly,
//!   so it overestimates the dominated volume once two boxes overlap.
//! - [`exact`]: the true dominated volume, computed by slicing along the last
//!   objective and recursing (HSO). Exponential in the number of objectives,
//!   fine for the 2–3 objective fronts this crate deals with.

/// Which hypervolume measure the optimizer records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HypervolumeMethod {
    /// Sum of per-solution boxes. See [`rectangle_sum`].
    #[default]
    RectangleSum,
    /// Exact dominated volume. See [`exact`].
    Exact,
}

impl HypervolumeMethod {
    /// Evaluates this measure over `points` against `reference`.
    pub fn compute<O: AsRef<[f64]>>(self, points: &[O], reference: &[f64]) -> f64 {
        match self {
            HypervolumeMethod::RectangleSum => rectangle_sum(points, reference),
            HypervolumeMethod::Exact => exact(points, reference),
        }
    }
}

/// Sum over all points of `Π max(0, p[i] - reference[i])`.
///
/// ```
/// use u_seedopt::pareto::rectangle_sum;
///
/// let hv = rectangle_sum(&[vec![1.0, 5.0], vec![5.0, 1.0]], &[0.0, 0.0]);
/// assert_eq!(hv, 10.0);
/// ```
pub fn rectangle_sum<O: AsRef<[f64]>>(points: &[O], reference: &[f64]) -> f64 {
    points
        .iter()
        .map(|p| {
            p.as_ref()
                .iter()
                .zip(reference)
                .map(|(&v, &r)| (v - r).max(0.0))
                .product::<f64>()
        })
        .sum()
}

/// Exact volume of the region dominated by `points` and bounded below by
/// `reference` (maximization).
///
/// Points that do not strictly exceed the reference in every objective
/// contribute nothing and are discarded.
///
/// ```
/// use u_seedopt::pareto::exact_hypervolume;
///
/// // Two boxes of area 5 overlapping in a unit square.
/// let hv = exact_hypervolume(&[vec![1.0, 5.0], vec![5.0, 1.0]], &[0.0, 0.0]);
/// assert!((hv - 9.0).abs() < 1e-12);
/// ```
pub fn exact<O: AsRef<[f64]>>(points: &[O], reference: &[f64]) -> f64 {
    let dims = reference.len();
    if dims == 0 {
        return 0.0;
    }
    let mut kept: Vec<Vec<f64>> = points
        .iter()
        .map(|p| p.as_ref().to_vec())
        .filter(|p| p.iter().zip(reference).all(|(&v, &r)| v > r))
        .collect();
    if kept.is_empty() {
        return 0.0;
    }
    slice_volume(&mut kept, reference, dims)
}

/// Volume dominated in the first `dims` objectives.
fn slice_volume(points: &mut [Vec<f64>], reference: &[f64], dims: usize) -> f64 {
    if dims == 1 {
        let top = points.iter().map(|p| p[0]).fold(f64::NEG_INFINITY, f64::max);
        return top - reference[0];
    }

    let d = dims - 1;
    points.sort_by(|a, b| b[d].total_cmp(&a[d]));

    let mut volume = 0.0;
    for i in 0..points.len() {
        let floor = if i + 1 < points.len() {
            points[i + 1][d]
        } else {
            reference[d]
        };
        let height = points[i][d] - floor;
        if height > 0.0 {
            let mut slab: Vec<Vec<f64>> = points[..=i].to_vec();
            volume += height * slice_volume(&mut slab, reference, d);
        }
    }
    volume
}
