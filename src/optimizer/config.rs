//! Optimizer configuration.
//!
//! [`OptimizerConfig`] holds all parameters that control the search: problem
//! size, archive capacity, phase schedule, and the pluggable strategies for
//! initialization, base construction, leader zoning and pool sampling.

use crate::error::ConfigError;
use crate::leader::RegionRule;
use crate::pareto::HypervolumeMethod;

/// How the initial population is built.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Initialization {
    /// Every seed set drawn uniformly at random.
    Random,
    /// A `fraction` of the population starts from high-degree nodes: each of
    /// those seed sets takes between 1 and `budget` nodes from the top
    /// `top_ratio` of nodes by degree and fills the rest randomly.
    DegreeSeeded { fraction: f64, top_ratio: f64 },
    /// Random seed sets repaired to cover at least `max(2, budget / 2)`
    /// communities where the community map allows it.
    CommunityCoverage,
}

impl Default for Initialization {
    fn default() -> Self {
        Initialization::DegreeSeeded {
            fraction: 0.5,
            top_ratio: 0.2,
        }
    }
}

/// Which leader nodes a candidate may keep as its base.
///
/// The base is always intersected with the candidate's own position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BaseRule {
    /// Nodes shared by at least two leaders.
    #[default]
    PairwiseIntersection,
    /// Nodes of any leader.
    Union,
    /// Nodes shared by every leader.
    Intersection,
}

/// Optional down-sampling of candidate pools before ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PoolSampling {
    /// Rank the full pool.
    #[default]
    Full,
    /// Degree-stratified sample of at most `global` (global phase) or
    /// `local` (local phase) nodes.
    DegreeStratified { global: usize, local: usize },
}

/// Configuration for the seed-set optimizer.
///
/// # Defaults
///
/// ```
/// use u_seedopt::optimizer::OptimizerConfig;
///
/// let config = OptimizerConfig::default();
/// assert_eq!(config.population_size, 30);
/// assert_eq!(config.max_iterations, 50);
/// assert!((config.transition_point - 0.4).abs() < 1e-12);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_seedopt::optimizer::{BaseRule, OptimizerConfig};
///
/// let config = OptimizerConfig::default()
///     .with_budget(10)
///     .with_population_size(40)
///     .with_base_rule(BaseRule::Union)
///     .with_seed(7);
/// assert!(config.validate(100).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizerConfig {
    /// Size of every seed set.
    pub budget: usize,

    /// Number of candidates moved each generation.
    pub population_size: usize,

    /// Maximum number of archive members after an update.
    pub archive_size: usize,

    /// Number of generations. The only termination criterion.
    pub max_iterations: usize,

    /// Fraction of the run spent in the global phase (0.0–1.0).
    pub transition_point: f64,

    /// Initial population strategy.
    pub initialization: Initialization,

    /// Which leader nodes may be inherited.
    pub base_rule: BaseRule,

    /// Base cap as a fraction of `budget` at generation 0.
    pub base_cap_start: f64,

    /// Base cap as a fraction of `budget` at the final generation.
    pub base_cap_end: f64,

    /// Zone classification used for leader selection.
    pub region_rule: RegionRule,

    /// Whether a fourth, crowding-based explorer leader is selected.
    pub explorer_leader: bool,

    /// Candidate pool sampling before ranking.
    pub pool_sampling: PoolSampling,

    /// Number of top-eigenvector hubs offered by local perturbation.
    pub hub_count: usize,

    /// Hypervolume reference point. `None` uses the origin.
    pub reference_point: Option<Vec<f64>>,

    /// Hypervolume measure recorded each generation.
    pub hypervolume: HypervolumeMethod,

    /// Hypervolume changes smaller than this count as stagnation.
    pub stagnation_tolerance: f64,

    /// Whether candidates are moved and evaluated in parallel.
    pub parallel: bool,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            budget: 5,
            population_size: 30,
            archive_size: 50,
            max_iterations: 50,
            transition_point: 0.4,
            initialization: Initialization::default(),
            base_rule: BaseRule::default(),
            base_cap_start: 0.3,
            base_cap_end: 0.7,
            region_rule: RegionRule::default(),
            explorer_leader: false,
            pool_sampling: PoolSampling::default(),
            hub_count: 20,
            reference_point: None,
            hypervolume: HypervolumeMethod::default(),
            stagnation_tolerance: 1e-6,
            parallel: true,
            seed: None,
        }
    }
}

impl OptimizerConfig {
    /// Sets the seed-set size.
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the archive capacity.
    pub fn with_archive_size(mut self, n: usize) -> Self {
        self.archive_size = n;
        self
    }

    /// Sets the number of generations.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the global-to-local transition point.
    pub fn with_transition_point(mut self, tp: f64) -> Self {
        self.transition_point = tp;
        self
    }

    /// Sets the initialization strategy.
    pub fn with_initialization(mut self, init: Initialization) -> Self {
        self.initialization = init;
        self
    }

    /// Sets the base rule.
    pub fn with_base_rule(mut self, rule: BaseRule) -> Self {
        self.base_rule = rule;
        self
    }

    /// Sets the base cap schedule, as fractions of `budget`.
    pub fn with_base_cap(mut self, start: f64, end: f64) -> Self {
        self.base_cap_start = start;
        self.base_cap_end = end;
        self
    }

    /// Sets the leader zone rule.
    pub fn with_region_rule(mut self, rule: RegionRule) -> Self {
        self.region_rule = rule;
        self
    }

    /// Enables or disables the explorer leader.
    pub fn with_explorer_leader(mut self, enabled: bool) -> Self {
        self.explorer_leader = enabled;
        self
    }

    /// Sets pool sampling.
    pub fn with_pool_sampling(mut self, sampling: PoolSampling) -> Self {
        self.pool_sampling = sampling;
        self
    }

    /// Sets the number of hub nodes.
    pub fn with_hub_count(mut self, k: usize) -> Self {
        self.hub_count = k;
        self
    }

    /// Sets the hypervolume reference point.
    pub fn with_reference_point(mut self, point: Vec<f64>) -> Self {
        self.reference_point = Some(point);
        self
    }

    /// Sets the hypervolume measure.
    pub fn with_hypervolume(mut self, method: HypervolumeMethod) -> Self {
        self.hypervolume = method;
        self
    }

    /// Sets the stagnation tolerance.
    pub fn with_stagnation_tolerance(mut self, tol: f64) -> Self {
        self.stagnation_tolerance = tol.max(0.0);
        self
    }

    /// Enables or disables parallel movement and evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Small, quick runs: population 20, 30 generations, archive 30.
    pub fn fast() -> Self {
        Self {
            population_size: 20,
            max_iterations: 30,
            archive_size: 30,
            ..Self::default()
        }
    }

    /// The reference setting: population 30, 50 generations, archive 50.
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Large runs on big graphs: population 50, 100 generations, archive
    /// 100, degree-stratified pools.
    pub fn quality() -> Self {
        Self {
            population_size: 50,
            max_iterations: 100,
            archive_size: 100,
            pool_sampling: PoolSampling::DegreeStratified {
                global: 200,
                local: 500,
            },
            ..Self::default()
        }
    }

    /// Base cap (in nodes) at generation `t`.
    ///
    /// Grows linearly from `base_cap_start · budget` to
    /// `base_cap_end · budget` over the run.
    pub fn base_cap(&self, t: usize) -> usize {
        let progress = (t as f64 / self.max_iterations.max(1) as f64).min(1.0);
        let fraction = self.base_cap_start + (self.base_cap_end - self.base_cap_start) * progress;
        (fraction * self.budget as f64) as usize
    }

    /// Validates the configuration against a graph of `node_count` nodes.
    pub fn validate(&self, node_count: usize) -> Result<(), ConfigError> {
        if self.budget == 0 {
            return Err(ConfigError::ZeroBudget);
        }
        if self.budget > node_count {
            return Err(ConfigError::BudgetExceedsNodes {
                budget: self.budget,
                nodes: node_count,
            });
        }
        if self.archive_size == 0 {
            return Err(ConfigError::ZeroArchiveSize);
        }
        if self.population_size == 0 {
            return Err(ConfigError::ZeroPopulation);
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if !(0.0..=1.0).contains(&self.transition_point) {
            return Err(ConfigError::InvalidTransitionPoint(self.transition_point));
        }
        check_fraction("base_cap_start", self.base_cap_start)?;
        check_fraction("base_cap_end", self.base_cap_end)?;
        if let Initialization::DegreeSeeded {
            fraction,
            top_ratio,
        } = self.initialization
        {
            check_fraction("initialization.fraction", fraction)?;
            check_fraction("initialization.top_ratio", top_ratio)?;
        }
        Ok(())
    }
}

fn check_fraction(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidFraction { name, value })
    }
}
