//! Generational seed-set optimizer.
//!
//! Candidates are fixed-size seed sets scored by a user [`Evaluator`] on
//! several maximized objectives. Each generation every candidate keeps part
//! of what its leaders agree on, refills from structurally ranked nodes and
//! is occasionally perturbed; the archive keeps the non-dominated result.
//!
//! # Key Types
//!
//! - [`OptimizerConfig`]: Run parameters, strategy switches and presets
//! - [`Optimizer`]: Owns the population and archive, executes the loop
//! - [`OptimizationResult`]: Final archive with per-generation history
//!
//! # Phases
//!
//! Before `transition_point · max_iterations` the search is global: the
//! refill pool is every unused node, ranked by a closeness-heavy score.
//! Afterwards it is local: the pool shrinks to the leaders' two-hop
//! neighborhood and the score leans on degree.
//!
//! # References
//!
//! - Mirjalili et al. (2016), *Multi-objective grey wolf optimizer*
//! - Deb et al. (2002), *A Fast and Elitist Multiobjective GA: NSGA-II*
//! - Kempe, Kleinberg, Tardos (2003), *Maximizing the Spread of Influence
//!   through a Social Network*

mod config;
mod init;
mod movement;
mod runner;
mod types;

pub use config::{BaseRule, Initialization, OptimizerConfig, PoolSampling};
pub use runner::Optimizer;
pub use types::{with_objectives, Evaluator, GenerationStats, OptimizationResult, OptimizerState, WithObjectives};
