//! Structure-guided multi-objective seed-set optimization.
//!
//! Selects fixed-size sets of graph nodes ("seed sets") that trade off
//! several objectives at once, typically influence spread against fairness
//! of coverage. The objectives come from a user-supplied [`Evaluator`]; the
//! crate supplies the search:
//!
//! - **Pareto archive**: Non-dominated sorting, crowding-distance trimming
//!   and hypervolume tracking over a bounded elite set.
//! - **Region-based leaders**: One guide per objective-space zone (spread,
//!   fairness, balanced) instead of the three best points.
//! - **Structural guidance**: Degree, closeness and eigenvector centrality
//!   blended into a score whose weighting shifts over the run.
//! - **Adaptive perturbation**: Replacement schedules that grow with
//!   progress and with hypervolume stagnation.
//!
//! # Example
//!
//! ```
//! use u_seedopt::{AdjacencyGraph, Graph, Optimizer, OptimizerConfig, SeedSet};
//!
//! let edges: Vec<_> = (0..30).map(|i| (i, (i + 1) % 30)).collect();
//! let graph = AdjacencyGraph::from_edges(30, &edges);
//!
//! let evaluator = |s: &SeedSet| -> Result<Vec<f64>, u_seedopt::error::BoxError> {
//!     let reach: usize = s.iter().map(|&v| graph.degree(v)).sum();
//!     let span = s.iter().max().unwrap_or(&0) - s.iter().min().unwrap_or(&0);
//!     Ok(vec![reach as f64, span as f64])
//! };
//!
//! let config = OptimizerConfig::fast().with_budget(3).with_max_iterations(4).with_seed(1);
//! let result = Optimizer::new(&graph, evaluator, config).unwrap().run().unwrap();
//! assert_eq!(result.generations, 4);
//! ```
//!
//! # Features
//!
//! - `parallel` (default): move and evaluate candidates on the rayon pool.
//! - `serde`: `Serialize`/`Deserialize` for configuration and results.
//!
//! # Logging
//!
//! Progress is reported through the [`log`] facade; no logger is installed.

pub mod candidate;
pub mod error;
pub mod graph;
pub mod leader;
pub mod optimizer;
pub mod pareto;
pub mod perturbation;
pub mod structure;

pub use candidate::{Candidate, CandidateArena, CandidateId, SeedSet};
pub use error::{ConfigError, OptimizerError};
pub use graph::{AdjacencyGraph, Graph, NodeId};
pub use optimizer::{Evaluator, Optimizer, OptimizerConfig, OptimizationResult};
