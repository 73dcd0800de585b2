//! Adaptive perturbation of seed sets.
//!
//! Two schedules drive the operator: the probability that a freshly
//! generated position is perturbed at all, and the fraction of its nodes
//! that get replaced. Both ramp up slowly during the global phase, faster in
//! the local phase, and are boosted further while the hypervolume stagnates.

mod handler;

pub use handler::{PerturbationContext, PerturbationHandler};

/// Search phase of the optimizer.
///
/// The optimizer switches once from [`Global`](SearchTendency::Global) to
/// [`Local`](SearchTendency::Local) at `transition_point · max_iter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchTendency {
    /// Exploration over the whole graph.
    Global,
    /// Exploitation around the leaders' neighborhoods.
    Local,
}

impl SearchTendency {
    /// Phase for generation `t`.
    pub fn at(t: usize, max_iter: usize, transition_point: f64) -> Self {
        if (t as f64) < transition_point * max_iter as f64 {
            SearchTendency::Global
        } else {
            SearchTendency::Local
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_hard_switch() {
        let phases: Vec<_> = (0..10).map(|t| SearchTendency::at(t, 10, 0.4)).collect();
        assert!(phases[..4].iter().all(|&p| p == SearchTendency::Global));
        assert!(phases[4..].iter().all(|&p| p == SearchTendency::Local));
    }

    #[test]
    fn test_extreme_transition_points() {
        assert_eq!(SearchTendency::at(0, 10, 0.0), SearchTendency::Local);
        assert_eq!(SearchTendency::at(9, 10, 1.0), SearchTendency::Global);
    }
}
