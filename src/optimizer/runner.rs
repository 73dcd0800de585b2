//! Optimizer main loop.
//!
//! [`Optimizer`] drives the generational search:
//! initialize → (pad archive → pick leaders → move and evaluate every
//! candidate → update archive) × `max_iterations`.

use super::config::{Initialization, OptimizerConfig};
use super::init::initial_positions;
use super::movement::{Move, MovePlan};
use super::types::{Evaluator, GenerationStats, OptimizationResult, OptimizerState};
use crate::candidate::{Candidate, CandidateArena, CandidateId, SeedSet};
use crate::error::{ConfigError, OptimizerError};
use crate::graph::Graph;
use crate::leader::LeaderManager;
use crate::pareto::ArchiveManager;
use crate::perturbation::{PerturbationContext, PerturbationHandler, SearchTendency};
use crate::structure::StructureMetrics;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Structure-guided multi-objective seed-set optimizer.
///
/// Owns the candidate arena, the population, the archive and the master
/// RNG. Structural metrics are computed once per graph; pass precomputed
/// ones through [`with_metrics`](Self::with_metrics) to reuse them across
/// runs.
///
/// # Usage
///
/// ```
/// use u_seedopt::candidate::SeedSet;
/// use u_seedopt::error::BoxError;
/// use u_seedopt::graph::{AdjacencyGraph, Graph};
/// use u_seedopt::optimizer::{Optimizer, OptimizerConfig};
///
/// let edges: Vec<_> = (0..40).map(|i| (i, (i * 7 + 3) % 40)).collect();
/// let graph = AdjacencyGraph::from_edges(40, &edges);
///
/// let evaluator = |s: &SeedSet| -> Result<Vec<f64>, BoxError> {
///     let reach: usize = s.iter().map(|&v| graph.degree(v)).sum();
///     let groups = s.iter().map(|v| v % 4).collect::<std::collections::BTreeSet<_>>();
///     Ok(vec![reach as f64, groups.len() as f64])
/// };
///
/// let config = OptimizerConfig::fast()
///     .with_budget(4)
///     .with_max_iterations(5)
///     .with_seed(42);
/// let mut optimizer = Optimizer::new(&graph, evaluator, config).unwrap();
/// let result = optimizer.run().unwrap();
///
/// assert_eq!(result.generations, 5);
/// assert!(result.seed_sets().all(|s| s.len() == 4));
/// ```
pub struct Optimizer<'g, G: Graph + ?Sized, E: Evaluator> {
    graph: &'g G,
    evaluator: E,
    config: OptimizerConfig,
    metrics: StructureMetrics,
    perturbation: PerturbationHandler,
    leaders: LeaderManager,
    communities: Option<Vec<usize>>,
    num_objectives: usize,
    reference_point: Vec<f64>,

    arena: CandidateArena,
    population: Vec<CandidateId>,
    archive: ArchiveManager,
    rng: StdRng,
    state: OptimizerState,
    stagnation: usize,
    last_hypervolume: f64,

    archive_history: Vec<Vec<Vec<f64>>>,
    hypervolume_history: Vec<f64>,
    time_history: Vec<Duration>,
    generation_stats: Vec<GenerationStats>,
}

impl<'g, G: Graph + ?Sized, E: Evaluator> Optimizer<'g, G, E> {
    /// Creates an optimizer, computing structural metrics for `graph`.
    pub fn new(graph: &'g G, evaluator: E, config: OptimizerConfig) -> Result<Self, ConfigError> {
        let metrics = StructureMetrics::new(graph);
        Self::with_metrics(graph, metrics, evaluator, config)
    }

    /// Creates an optimizer from metrics already computed for `graph`.
    pub fn with_metrics(
        graph: &'g G,
        metrics: StructureMetrics,
        evaluator: E,
        config: OptimizerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate(graph.node_count())?;
        debug_assert_eq!(metrics.node_count(), graph.node_count());

        let num_objectives = evaluator.num_objectives();
        if num_objectives == 0 {
            return Err(ConfigError::NoObjectives);
        }
        let reference_point = config
            .reference_point
            .clone()
            .unwrap_or_else(|| vec![0.0; num_objectives]);
        if reference_point.len() != num_objectives {
            return Err(ConfigError::ReferencePointDimension {
                expected: num_objectives,
                found: reference_point.len(),
            });
        }

        let rng = StdRng::seed_from_u64(config.seed.unwrap_or_else(rand::random));
        let perturbation =
            PerturbationHandler::new(graph.node_count(), metrics.hub_nodes(config.hub_count));

        Ok(Self {
            graph,
            evaluator,
            leaders: LeaderManager::new(config.region_rule, config.explorer_leader),
            archive: ArchiveManager::new(config.archive_size),
            config,
            metrics,
            perturbation,
            communities: None,
            num_objectives,
            reference_point,
            arena: CandidateArena::new(),
            population: Vec::new(),
            rng,
            state: OptimizerState::Init,
            stagnation: 0,
            last_hypervolume: 0.0,
            archive_history: Vec::new(),
            hypervolume_history: Vec::new(),
            time_history: Vec::new(),
            generation_stats: Vec::new(),
        })
    }

    /// Attaches a node → community map, used by community-coverage
    /// initialization.
    pub fn with_communities(mut self, communities: Vec<usize>) -> Result<Self, ConfigError> {
        if communities.len() != self.graph.node_count() {
            return Err(ConfigError::CommunityMapLength {
                expected: self.graph.node_count(),
                found: communities.len(),
            });
        }
        self.communities = Some(communities);
        Ok(self)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> OptimizerState {
        self.state
    }

    /// Configuration in use.
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// The evaluator scoring candidates.
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Structural metrics of the graph.
    pub fn metrics(&self) -> &StructureMetrics {
        &self.metrics
    }

    /// Current population.
    pub fn population(&self) -> impl Iterator<Item = &Candidate> + '_ {
        self.population.iter().map(|&id| &self.arena[id])
    }

    /// Current archive members.
    pub fn archive(&self) -> impl Iterator<Item = &Candidate> + '_ {
        self.archive.members().iter().map(|&id| &self.arena[id])
    }

    /// Consecutive generations without hypervolume progress.
    pub fn stagnation(&self) -> usize {
        self.stagnation
    }

    /// Number of candidates alive in the arena.
    pub fn live_candidates(&self) -> usize {
        self.arena.len()
    }

    /// Builds and evaluates the initial population.
    ///
    /// Calling it again discards all progress and starts over.
    pub fn initialize(&mut self) -> Result<(), OptimizerError> {
        let communities = self.communities.as_deref();
        if self.config.initialization == Initialization::CommunityCoverage && communities.is_none() {
            return Err(ConfigError::MissingCommunities.into());
        }

        let positions = initial_positions(
            self.config.initialization,
            &self.metrics,
            communities,
            self.config.budget,
            self.config.population_size,
            &mut self.rng,
        );

        let evaluator = &self.evaluator;
        let expected = self.num_objectives;
        let candidates = map_slots(positions, self.config.parallel, |slot, position| {
            let cost = evaluate(evaluator, expected, slot, &position)?;
            Ok(Candidate::new(position, cost))
        })?;

        self.arena = CandidateArena::new();
        self.archive = ArchiveManager::new(self.config.archive_size);
        self.population = candidates.into_iter().map(|c| self.arena.insert(c)).collect();
        self.archive.update(&self.arena, &self.population);

        self.stagnation = 0;
        self.last_hypervolume = self.hypervolume();
        self.archive_history.clear();
        self.hypervolume_history.clear();
        self.time_history.clear();
        self.generation_stats.clear();
        self.state = OptimizerState::Iterating(0);

        log::info!(
            "initialized {} candidates on {} nodes (budget {}), hypervolume {:.6}",
            self.population.len(),
            self.graph.node_count(),
            self.config.budget,
            self.last_hypervolume
        );
        Ok(())
    }

    /// Runs one generation, initializing first if needed.
    ///
    /// Returns whether more generations remain. An evaluation error aborts
    /// the generation before any move is committed.
    pub fn step(&mut self) -> Result<bool, OptimizerError> {
        let t = match self.state {
            OptimizerState::Init => {
                self.initialize()?;
                0
            }
            OptimizerState::Iterating(t) => t,
            OptimizerState::Done => return Ok(false),
        };
        let started = Instant::now();
        let max_iter = self.config.max_iterations;
        let tp = self.config.transition_point;

        LeaderManager::ensure_leader_minimum(
            &mut self.archive,
            &self.arena,
            &self.population,
            self.leaders.required(),
        );
        let tendency = SearchTendency::at(t, max_iter, tp);
        let leader_ids =
            self.leaders
                .select_leaders_by_region(&self.arena, self.archive.fronts(), &mut self.rng);
        let seeds: Vec<u64> = (0..self.population.len()).map(|_| self.rng.random()).collect();

        let ctx = PerturbationContext {
            t,
            max_iter,
            transition_point: tp,
            tendency,
            stagnation: self.stagnation,
        };

        let moves: Vec<(Move, Vec<f64>)> = {
            let leader_positions: Vec<&SeedSet> =
                leader_ids.iter().map(|&id| &self.arena[id].position).collect();
            let plan = MovePlan::new(
                self.graph,
                &self.metrics,
                &self.perturbation,
                &self.config,
                &leader_positions,
                ctx,
            );
            let jobs: Vec<(&SeedSet, u64)> = self
                .population
                .iter()
                .map(|&id| &self.arena[id].position)
                .zip(seeds)
                .collect();
            let evaluator = &self.evaluator;
            let expected = self.num_objectives;

            map_slots(jobs, self.config.parallel, |slot, (position, seed)| {
                let mut rng = StdRng::seed_from_u64(seed);
                let moved = plan.move_candidate(position, &mut rng);
                let cost = evaluate(evaluator, expected, slot, &moved.position)?;
                Ok((moved, cost))
            })?
        };

        let mut perturbed = 0;
        let mut fallback_fills = 0;
        for (slot, (moved, cost)) in moves.into_iter().enumerate() {
            perturbed += usize::from(moved.perturbed);
            fallback_fills += usize::from(moved.fallback);
            self.population[slot] = self.arena.insert(Candidate::new(moved.position, cost));
        }
        if fallback_fills > 0 {
            log::warn!(
                "generation {t}: candidate pool ran short for {fallback_fills} candidates, filled randomly"
            );
        }

        self.archive.update(&self.arena, &self.population);
        self.sweep();

        let hypervolume = self.hypervolume();
        if (hypervolume - self.last_hypervolume).abs() < self.config.stagnation_tolerance {
            self.stagnation += 1;
        } else {
            self.stagnation = 0;
        }
        self.last_hypervolume = hypervolume;

        let elapsed = started.elapsed();
        self.archive_history.push(
            self.archive
                .members()
                .iter()
                .map(|&id| self.arena.cost(id).to_vec())
                .collect(),
        );
        self.hypervolume_history.push(hypervolume);
        self.time_history.push(elapsed);
        self.generation_stats.push(GenerationStats {
            generation: t,
            tendency,
            archive_size: self.archive.len(),
            front_count: self.archive.fronts().len(),
            hypervolume,
            stagnation: self.stagnation,
            perturbed,
            fallback_fills,
            elapsed,
        });

        log::debug!(
            "generation {t} ({tendency:?}): archive {}, hypervolume {hypervolume:.6}, stagnation {}, perturbed {perturbed}",
            self.archive.len(),
            self.stagnation
        );
        self.evaluator.on_generation(t + 1, hypervolume);

        self.state = if t + 1 >= max_iter {
            OptimizerState::Done
        } else {
            OptimizerState::Iterating(t + 1)
        };
        Ok(self.state != OptimizerState::Done)
    }

    /// Runs all remaining generations.
    pub fn run(&mut self) -> Result<OptimizationResult, OptimizerError> {
        self.run_with_cancel(None)
    }

    /// Runs with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the run stops
    /// before the next generation and returns the archive found so far.
    pub fn run_with_cancel(
        &mut self,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<OptimizationResult, OptimizerError> {
        if self.state == OptimizerState::Init {
            self.initialize()?;
        }

        let mut cancelled = false;
        while let OptimizerState::Iterating(_) = self.state {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }
            self.step()?;
        }

        let result = self.result(cancelled);
        log::info!(
            "optimization {} after {} generations: {} archive members, hypervolume {:.6}",
            if cancelled { "cancelled" } else { "finished" },
            result.generations,
            result.archive.len(),
            self.last_hypervolume
        );
        Ok(result)
    }

    /// Snapshot of the run so far.
    pub fn result(&self, cancelled: bool) -> OptimizationResult {
        OptimizationResult {
            archive: self.archive().cloned().collect(),
            archive_history: self.archive_history.clone(),
            hypervolume_history: self.hypervolume_history.clone(),
            time_history: self.time_history.clone(),
            generation_stats: self.generation_stats.clone(),
            generations: self.hypervolume_history.len(),
            cancelled,
        }
    }

    fn hypervolume(&self) -> f64 {
        self.archive
            .calculate_hypervolume(&self.arena, &self.reference_point, self.config.hypervolume)
    }

    /// Drops arena entries no longer held by the population or archive.
    fn sweep(&mut self) {
        let keep: HashSet<CandidateId> = self
            .population
            .iter()
            .copied()
            .chain(self.archive.referenced())
            .collect();
        self.arena.retain(&keep);
    }
}

/// Evaluates one seed set and checks its objective count.
fn evaluate<E: Evaluator>(
    evaluator: &E,
    expected: usize,
    slot: usize,
    position: &SeedSet,
) -> Result<Vec<f64>, OptimizerError> {
    let cost = evaluator
        .evaluate(position)
        .map_err(|source| OptimizerError::Evaluation { slot, source })?;
    if cost.len() != expected {
        return Err(OptimizerError::ObjectiveCount {
            expected,
            found: cost.len(),
        });
    }
    Ok(cost)
}

/// Applies `work` to every item with its slot index, in parallel if asked.
#[cfg(feature = "parallel")]
fn map_slots<T, U, F>(items: Vec<T>, parallel: bool, work: F) -> Result<Vec<U>, OptimizerError>
where
    T: Send,
    U: Send,
    F: Fn(usize, T) -> Result<U, OptimizerError> + Send + Sync,
{
    if parallel {
        items
            .into_par_iter()
            .enumerate()
            .map(|(slot, item)| work(slot, item))
            .collect()
    } else {
        items
            .into_iter()
            .enumerate()
            .map(|(slot, item)| work(slot, item))
            .collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn map_slots<T, U, F>(items: Vec<T>, _parallel: bool, work: F) -> Result<Vec<U>, OptimizerError>
where
    F: Fn(usize, T) -> Result<U, OptimizerError>,
{
    items
        .into_iter()
        .enumerate()
        .map(|(slot, item)| work(slot, item))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::graph::AdjacencyGraph;
    use crate::optimizer::PoolSampling;
    use std::sync::atomic::AtomicUsize;

    /// Two hubs joined by a path, plus a ring.
    fn test_graph() -> AdjacencyGraph {
        let mut edges: Vec<_> = (0..60).map(|i| (i, (i + 1) % 60)).collect();
        edges.extend((2..20).map(|i| (0, i * 3)));
        edges.extend((5..25).map(|i| (1, i * 2 + 1)));
        AdjacencyGraph::from_edges(60, &edges)
    }

    /// Reach (degree sum) against spread over id buckets.
    fn objectives(graph: &AdjacencyGraph, s: &SeedSet) -> Vec<f64> {
        let reach: usize = s.iter().map(|&v| graph.degree(v)).sum();
        let buckets: HashSet<usize> = s.iter().map(|v| v / 10).collect();
        vec![reach as f64, buckets.len() as f64]
    }

    fn config() -> OptimizerConfig {
        OptimizerConfig::default()
            .with_budget(5)
            .with_population_size(12)
            .with_archive_size(8)
            .with_max_iterations(10)
            .with_seed(42)
    }

    #[test]
    fn test_run_completes_all_generations() {
        let graph = test_graph();
        let eval = |s: &SeedSet| -> Result<Vec<f64>, BoxError> { Ok(objectives(&graph, s)) };
        let mut optimizer = Optimizer::new(&graph, eval, config()).unwrap();

        let result = optimizer.run().unwrap();
        assert_eq!(optimizer.state(), OptimizerState::Done);
        assert_eq!(result.generations, 10);
        assert_eq!(result.hypervolume_history.len(), 10);
        assert_eq!(result.time_history.len(), 10);
        assert_eq!(result.archive_history.len(), 10);
        assert_eq!(result.generation_stats.len(), 10);
        assert!(!result.cancelled);
        assert!(!result.archive.is_empty());
        assert!(result.archive.len() <= 8);
    }

    #[test]
    fn test_cardinality_is_fixed_every_generation() {
        let graph = test_graph();
        let eval = |s: &SeedSet| -> Result<Vec<f64>, BoxError> { Ok(objectives(&graph, s)) };
        let mut optimizer = Optimizer::new(&graph, eval, config().with_parallel(false)).unwrap();

        optimizer.initialize().unwrap();
        while optimizer.step().unwrap() {
            assert!(optimizer.population().all(|c| c.position.len() == 5));
            assert!(optimizer.archive().all(|c| c.position.len() == 5));
        }
    }

    #[test]
    fn test_arena_stays_bounded() {
        let graph = test_graph();
        let eval = |s: &SeedSet| -> Result<Vec<f64>, BoxError> { Ok(objectives(&graph, s)) };
        let config = config().with_max_iterations(30);
        let bound = 2 * config.population_size + config.archive_size;
        let mut optimizer = Optimizer::new(&graph, eval, config).unwrap();

        optimizer.initialize().unwrap();
        while optimizer.step().unwrap() {
            assert!(optimizer.live_candidates() <= bound);
        }
    }

    #[test]
    fn test_seeded_runs_match_across_threading() {
        let graph = test_graph();
        let eval = |s: &SeedSet| -> Result<Vec<f64>, BoxError> { Ok(objectives(&graph, s)) };

        let mut parallel = Optimizer::new(&graph, eval, config().with_parallel(true)).unwrap();
        let mut serial = Optimizer::new(&graph, eval, config().with_parallel(false)).unwrap();
        let a = parallel.run().unwrap();
        let b = serial.run().unwrap();

        assert_eq!(a.hypervolume_history, b.hypervolume_history);
        assert_eq!(a.archive, b.archive);
    }

    #[test]
    fn test_stagnation_tracks_flat_hypervolume() {
        let graph = test_graph();
        let eval = |_: &SeedSet| -> Result<Vec<f64>, BoxError> { Ok(vec![1.0, 1.0]) };
        let mut optimizer = Optimizer::new(&graph, eval, config()).unwrap();

        let result = optimizer.run().unwrap();
        assert_eq!(optimizer.stagnation(), 10);
        let counters: Vec<usize> = result.generation_stats.iter().map(|s| s.stagnation).collect();
        assert_eq!(counters, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_evaluation_error_aborts() {
        let graph = test_graph();
        let calls = AtomicUsize::new(0);
        let eval = |s: &SeedSet| -> Result<Vec<f64>, BoxError> {
            if calls.fetch_add(1, Ordering::SeqCst) >= 20 {
                return Err("simulation diverged".into());
            }
            Ok(objectives(&graph, s))
        };
        let mut optimizer = Optimizer::new(&graph, eval, config().with_parallel(false)).unwrap();

        let err = optimizer.run().unwrap_err();
        // 12 initial evaluations, so the 21st call is slot 8 of generation 0.
        assert!(matches!(err, OptimizerError::Evaluation { slot: 8, .. }));
        assert_eq!(optimizer.state(), OptimizerState::Iterating(0));
    }

    #[test]
    fn test_objective_count_mismatch() {
        let graph = test_graph();
        let eval = |_: &SeedSet| -> Result<Vec<f64>, BoxError> { Ok(vec![1.0, 2.0, 3.0]) };
        let mut optimizer = Optimizer::new(&graph, eval, config()).unwrap();
        assert!(matches!(
            optimizer.initialize(),
            Err(OptimizerError::ObjectiveCount { expected: 2, found: 3 })
        ));
    }

    #[test]
    fn test_reference_point_dimension() {
        let graph = test_graph();
        let eval = |_: &SeedSet| -> Result<Vec<f64>, BoxError> { Ok(vec![1.0, 2.0]) };
        let result = Optimizer::new(&graph, eval, config().with_reference_point(vec![0.0]));
        assert!(matches!(
            result,
            Err(ConfigError::ReferencePointDimension { expected: 2, found: 1 })
        ));
    }

    #[test]
    fn test_community_initialization_requires_map() {
        let graph = test_graph();
        let eval = |s: &SeedSet| -> Result<Vec<f64>, BoxError> { Ok(objectives(&graph, s)) };
        let config = config().with_initialization(Initialization::CommunityCoverage);

        let mut optimizer = Optimizer::new(&graph, eval, config.clone()).unwrap();
        assert!(matches!(
            optimizer.initialize(),
            Err(OptimizerError::Config(ConfigError::MissingCommunities))
        ));

        let short = Optimizer::new(&graph, eval, config.clone())
            .unwrap()
            .with_communities(vec![0; 10]);
        assert!(matches!(short, Err(ConfigError::CommunityMapLength { .. })));

        let communities: Vec<usize> = (0..60).map(|v| v / 10).collect();
        let mut optimizer = Optimizer::new(&graph, eval, config)
            .unwrap()
            .with_communities(communities)
            .unwrap();
        assert!(optimizer.run().is_ok());
    }

    #[test]
    fn test_cancel_before_first_generation() {
        let graph = test_graph();
        let eval = |s: &SeedSet| -> Result<Vec<f64>, BoxError> { Ok(objectives(&graph, s)) };
        let mut optimizer = Optimizer::new(&graph, eval, config()).unwrap();

        let cancel = Arc::new(AtomicBool::new(true));
        let result = optimizer.run_with_cancel(Some(cancel)).unwrap();
        assert!(result.cancelled);
        assert_eq!(result.generations, 0);
        assert!(!result.archive.is_empty());
    }

    #[test]
    fn test_explorer_and_sampling_options() {
        let graph = test_graph();
        let eval = |s: &SeedSet| -> Result<Vec<f64>, BoxError> { Ok(objectives(&graph, s)) };
        let config = config()
            .with_explorer_leader(true)
            .with_pool_sampling(PoolSampling::DegreeStratified {
                global: 20,
                local: 30,
            });
        let mut optimizer = Optimizer::new(&graph, eval, config).unwrap();

        let result = optimizer.run().unwrap();
        assert_eq!(result.generations, 10);
        assert!(result.seed_sets().all(|s| s.len() == 5));
    }
}
