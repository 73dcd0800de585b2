//! Evaluator contract and run results.

use crate::candidate::{Candidate, SeedSet};
use crate::error::BoxError;
use crate::perturbation::SearchTendency;
use std::time::Duration;

/// Scores a seed set on every objective (all maximized).
///
/// The optimizer calls [`evaluate`](Evaluator::evaluate) once per candidate
/// per generation, possibly from several threads at once. Implementations
/// that simulate diffusion own their randomness.
///
/// # Example
///
/// ```
/// use u_seedopt::candidate::SeedSet;
/// use u_seedopt::error::BoxError;
/// use u_seedopt::optimizer::Evaluator;
///
/// struct SizeAndMinId;
///
/// impl Evaluator for SizeAndMinId {
///     fn evaluate(&self, seed_set: &SeedSet) -> Result<Vec<f64>, BoxError> {
///         let min = seed_set.iter().next().copied().unwrap_or(0);
///         Ok(vec![seed_set.len() as f64, -(min as f64)])
///     }
/// }
///
/// let seeds: SeedSet = [3, 7].into_iter().collect();
/// assert_eq!(SizeAndMinId.evaluate(&seeds).unwrap(), vec![2.0, -3.0]);
/// ```
pub trait Evaluator: Send + Sync {
    /// Number of objectives returned by `evaluate`.
    fn num_objectives(&self) -> usize {
        2
    }

    /// Objective vector of `seed_set`. An error aborts the run.
    fn evaluate(&self, seed_set: &SeedSet) -> Result<Vec<f64>, BoxError>;

    /// Called after each generation with its 1-based index and the archive
    /// hypervolume.
    fn on_generation(&self, _generation: usize, _hypervolume: f64) {}
}

/// Plain closures are two-objective evaluators. Wrap a closure with
/// [`with_objectives`] when it returns any other number of objectives.
impl<F> Evaluator for F
where
    F: Fn(&SeedSet) -> Result<Vec<f64>, BoxError> + Send + Sync,
{
    fn evaluate(&self, seed_set: &SeedSet) -> Result<Vec<f64>, BoxError> {
        self(seed_set)
    }
}

/// Closure evaluator with an explicit objective count.
///
/// Built by [`with_objectives`].
#[derive(Debug, Clone)]
pub struct WithObjectives<F> {
    num_objectives: usize,
    evaluate: F,
}

/// Wraps `f` as an evaluator returning `num_objectives` objectives.
///
/// # Example
///
/// ```
/// use u_seedopt::candidate::SeedSet;
/// use u_seedopt::error::BoxError;
/// use u_seedopt::optimizer::{with_objectives, Evaluator};
///
/// let eval = with_objectives(3, |s: &SeedSet| -> Result<Vec<f64>, BoxError> {
///     Ok(vec![s.len() as f64, 0.0, 1.0])
/// });
/// assert_eq!(eval.num_objectives(), 3);
/// ```
pub fn with_objectives<F>(num_objectives: usize, f: F) -> WithObjectives<F>
where
    F: Fn(&SeedSet) -> Result<Vec<f64>, BoxError> + Send + Sync,
{
    WithObjectives {
        num_objectives,
        evaluate: f,
    }
}

impl<F> Evaluator for WithObjectives<F>
where
    F: Fn(&SeedSet) -> Result<Vec<f64>, BoxError> + Send + Sync,
{
    fn num_objectives(&self) -> usize {
        self.num_objectives
    }

    fn evaluate(&self, seed_set: &SeedSet) -> Result<Vec<f64>, BoxError> {
        (self.evaluate)(seed_set)
    }
}

/// Lifecycle of an [`Optimizer`](super::Optimizer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizerState {
    /// Population not yet built.
    Init,
    /// Ready to run generation `t` (0-based).
    Iterating(usize),
    /// All generations done.
    Done,
}

/// Per-generation summary.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    /// 0-based generation index.
    pub generation: usize,
    /// Phase the generation ran in.
    pub tendency: SearchTendency,
    /// Archive members after the update.
    pub archive_size: usize,
    /// Number of stored fronts after the update.
    pub front_count: usize,
    /// Archive hypervolume after the update.
    pub hypervolume: f64,
    /// Stagnation counter after this generation.
    pub stagnation: usize,
    /// Candidates whose move included a perturbation.
    pub perturbed: usize,
    /// Candidates whose pool ran short and were filled randomly.
    pub fallback_fills: usize,
    /// Wall-clock time of the generation.
    pub elapsed: Duration,
}

/// Outcome of an optimization run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizationResult {
    /// Final archive members, copied out of the optimizer.
    pub archive: Vec<Candidate>,

    /// Objective vectors of the archive after each generation.
    pub archive_history: Vec<Vec<Vec<f64>>>,

    /// Archive hypervolume after each generation.
    pub hypervolume_history: Vec<f64>,

    /// Wall-clock duration of each generation.
    pub time_history: Vec<Duration>,

    /// Per-generation statistics.
    pub generation_stats: Vec<GenerationStats>,

    /// Number of generations executed.
    pub generations: usize,

    /// Whether the run was stopped through the cancellation flag.
    pub cancelled: bool,
}

impl OptimizationResult {
    /// Final hypervolume, or `None` when no generation ran.
    pub fn final_hypervolume(&self) -> Option<f64> {
        self.hypervolume_history.last().copied()
    }

    /// Total wall-clock time across all generations.
    pub fn total_time(&self) -> Duration {
        self.time_history.iter().sum()
    }

    /// Seed sets of the final archive.
    pub fn seed_sets(&self) -> impl Iterator<Item = &SeedSet> {
        self.archive.iter().map(|c| &c.position)
    }
}
