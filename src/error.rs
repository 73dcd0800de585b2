//! Error types.

use std::error::Error;

/// Boxed error returned by external collaborators such as the evaluator.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Invalid optimizer configuration, detected at construction.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Seed sets must hold at least one node.
    #[error("budget must be at least 1")]
    ZeroBudget,
    /// The graph has fewer nodes than the budget.
    #[error("budget {budget} exceeds graph node count {nodes}")]
    BudgetExceedsNodes { budget: usize, nodes: usize },
    /// The archive cannot be empty.
    #[error("archive_size must be at least 1")]
    ZeroArchiveSize,
    /// The population cannot be empty.
    #[error("population_size must be at least 1")]
    ZeroPopulation,
    /// At least one generation must run.
    #[error("max_iterations must be at least 1")]
    ZeroIterations,
    /// Phase switch outside `[0, 1]`.
    #[error("transition_point must lie in [0, 1], got {0}")]
    InvalidTransitionPoint(f64),
    /// A named ratio or probability outside `[0, 1]`.
    #[error("{name} must lie in [0, 1], got {value}")]
    InvalidFraction { name: &'static str, value: f64 },
    /// Reference point length differs from the objective count.
    #[error("reference point has {found} dimensions, evaluator reports {expected} objectives")]
    ReferencePointDimension { expected: usize, found: usize },
    /// Community-coverage initialization without a community map.
    #[error("community-coverage initialization requires a community map")]
    MissingCommunities,
    /// Community map length differs from the node count.
    #[error("community map covers {found} nodes, graph has {expected}")]
    CommunityMapLength { expected: usize, found: usize },
    /// The evaluator reports zero objectives.
    #[error("evaluator must report at least one objective")]
    NoObjectives,
}

/// Failure during an optimization run.
#[derive(Debug, thiserror::Error)]
pub enum OptimizerError {
    /// Configuration rejected at construction.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The evaluator failed on one population slot.
    #[error("evaluation failed for population slot {slot}")]
    Evaluation {
        slot: usize,
        #[source]
        source: BoxError,
    },
    /// The evaluator returned the wrong number of objectives.
    #[error("evaluator returned {found} objectives, expected {expected}")]
    ObjectiveCount { expected: usize, found: usize },
}
