//! Objective-space zones used to diversify leaders.

use std::f64::consts::PI;

/// Guard added to per-front ranges during normalization.
const NORM_EPSILON: f64 = 1e-9;

/// Region of normalized two-objective space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Zone {
    /// First objective (spread) dominant.
    Spread,
    /// Second objective (fairness) dominant.
    Fair,
    /// Balanced between both objectives.
    Tradeoff,
}

impl Zone {
    /// Zones in the order leaders are assigned.
    pub const ALL: [Zone; 3] = [Zone::Spread, Zone::Fair, Zone::Tradeoff];

    /// Criterion a zone representative maximizes, on raw objectives.
    pub fn criterion(self, cost: &[f64]) -> f64 {
        let first = cost[0];
        let second = second_objective(cost);
        match self {
            Zone::Spread => first,
            Zone::Fair => second,
            Zone::Tradeoff => first + second,
        }
    }
}

/// Rule mapping a normalized `(f1, f2)` point to a [`Zone`].
///
/// The two rules draw different boundaries and select materially different
/// leaders; they are not interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegionRule {
    /// Polar angle `θ = atan2(f2, f1)`: `θ ≤ π/6` is Spread, `θ ≤ π/3`
    /// Tradeoff, larger angles Fair. The origin is Tradeoff.
    #[default]
    PolarAngle,
    /// Axis dominance above the anti-diagonal: `f1 ≥ f2` with
    /// `f1 + f2 ≥ 1` is Spread, `f2 ≥ f1` with `f1 + f2 ≥ 1` Fair,
    /// everything below the diagonal Tradeoff.
    AxisDominance,
}

impl RegionRule {
    /// Classifies a normalized point.
    pub fn classify(self, f1: f64, f2: f64) -> Zone {
        match self {
            RegionRule::PolarAngle => {
                if f1 == 0.0 && f2 == 0.0 {
                    return Zone::Tradeoff;
                }
                let angle = f2.atan2(f1);
                if angle <= PI / 6.0 {
                    Zone::Spread
                } else if angle <= PI / 3.0 {
                    Zone::Tradeoff
                } else {
                    Zone::Fair
                }
            }
            RegionRule::AxisDominance => {
                let above = f1 + f2 >= 1.0;
                if above && f1 >= f2 {
                    Zone::Spread
                } else if above && f2 >= f1 {
                    Zone::Fair
                } else {
                    Zone::Tradeoff
                }
            }
        }
    }
}

/// Second objective, or 0 for single-objective costs.
pub(crate) fn second_objective(cost: &[f64]) -> f64 {
    cost.get(1).copied().unwrap_or(0.0)
}

/// Min-max normalizes the first two objectives of `costs` to `[0, 1]`.
pub fn normalize_front(costs: &[&[f64]]) -> Vec<(f64, f64)> {
    let bounds = |k: usize| {
        costs.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
            let v = if k == 0 { c[0] } else { second_objective(c) };
            (lo.min(v), hi.max(v))
        })
    };
    let (min0, max0) = bounds(0);
    let (min1, max1) = bounds(1);

    costs
        .iter()
        .map(|c| {
            (
                (c[0] - min0) / (max0 - min0 + NORM_EPSILON),
                (second_objective(c) - min1) / (max1 - min1 + NORM_EPSILON),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polar_angle_zones() {
        let rule = RegionRule::PolarAngle;
        assert_eq!(rule.classify(1.0, 0.0), Zone::Spread);
        assert_eq!(rule.classify(1.0, 0.5), Zone::Spread); // ~26.6°
        assert_eq!(rule.classify(1.0, 1.0), Zone::Tradeoff); // 45°
        assert_eq!(rule.classify(0.0, 1.0), Zone::Fair);
        assert_eq!(rule.classify(0.0, 0.0), Zone::Tradeoff);
    }

    #[test]
    fn test_axis_dominance_zones() {
        let rule = RegionRule::AxisDominance;
        assert_eq!(rule.classify(1.0, 0.0), Zone::Spread);
        assert_eq!(rule.classify(0.2, 0.9), Zone::Fair);
        assert_eq!(rule.classify(0.3, 0.3), Zone::Tradeoff);
    }

    #[test]
    fn test_rules_disagree() {
        // ~39.8°: inside the polar tradeoff wedge, but above the diagonal.
        assert_eq!(RegionRule::PolarAngle.classify(0.6, 0.5), Zone::Tradeoff);
        assert_eq!(RegionRule::AxisDominance.classify(0.6, 0.5), Zone::Spread);
    }

    #[test]
    fn test_normalize_front() {
        let a = [1.0, 10.0];
        let b = [3.0, 20.0];
        let norm = normalize_front(&[&a, &b]);
        assert!(norm[0].0.abs() < 1e-12 && norm[0].1.abs() < 1e-12);
        assert!((norm[1].0 - 1.0).abs() < 1e-6 && (norm[1].1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zone_criterion() {
        let cost = [2.0, 5.0];
        assert_eq!(Zone::Spread.criterion(&cost), 2.0);
        assert_eq!(Zone::Fair.criterion(&cost), 5.0);
        assert_eq!(Zone::Tradeoff.criterion(&cost), 7.0);
    }
}
