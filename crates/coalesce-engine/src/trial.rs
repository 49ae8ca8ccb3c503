//! Single seeded trials: generate, place, cache, solve, verify.

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use coalesce_core::{Cell, ConfigError, Move, SearchError};
use coalesce_maze::{GenerationStats, MazeError, MazeGenerator};
use coalesce_search::{
    CacheMetrics, CancelToken, CoalescingPathfinder, CostEstimator, Heuristic,
    PairwiseDistanceCache, SearchMetrics, SearchState,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::config::{HeuristicChoice, TrialConfig};
use crate::sampling::sample_agents;

// ── Error type ──────────────────────────────────────────────────

/// Why a trial failed.
#[derive(Debug, PartialEq)]
pub enum TrialError {
    /// The configuration was rejected.
    Config(ConfigError),
    /// Board generation failed.
    Maze(MazeError),
    /// The cache build or the solve failed.
    Search(SearchError),
    /// Replaying the solution did not coalesce the agents.
    ReplayMismatch {
        /// Where the solver said the agents meet.
        expected: Cell,
        /// Where replay actually left them.
        found: Vec<Cell>,
    },
}

impl fmt::Display for TrialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Maze(e) => write!(f, "maze: {e}"),
            Self::Search(e) => write!(f, "search: {e}"),
            Self::ReplayMismatch { expected, found } => write!(
                f,
                "replay ended on {} cells instead of meeting at {expected}",
                found.len()
            ),
        }
    }
}

impl Error for TrialError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Maze(e) => Some(e),
            Self::Search(e) => Some(e),
            Self::ReplayMismatch { .. } => None,
        }
    }
}

impl From<ConfigError> for TrialError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<MazeError> for TrialError {
    fn from(e: MazeError) -> Self {
        Self::Maze(e)
    }
}

impl From<SearchError> for TrialError {
    fn from(e: SearchError) -> Self {
        Self::Search(e)
    }
}

// ── Report ──────────────────────────────────────────────────────

/// Everything measured in one trial.
#[derive(Clone, Debug)]
pub struct TrialReport {
    /// Trial index within its batch.
    pub index: u64,
    /// Seed actually used (`config.seed ^ index`).
    pub seed: u64,
    /// Open cells on the generated board.
    pub open_cells: usize,
    /// Dead ends on the generated board.
    pub dead_ends: usize,
    /// Distinct agent locations at the start.
    pub agents: usize,
    /// Optimal (or best-found, for a learned heuristic) move count.
    pub total_moves: u32,
    /// The moves, in order.
    pub moves: Vec<Move>,
    /// Final shared location.
    pub meeting_cell: Cell,
    /// Generator counters.
    pub generation: GenerationStats,
    /// Cache build counters, when a cache was built.
    pub cache: Option<CacheMetrics>,
    /// Search counters.
    pub search: SearchMetrics,
    /// Wall-clock time for the whole trial, in microseconds.
    pub elapsed_us: u64,
}

// ── Runner ──────────────────────────────────────────────────────

/// Runs reproducible coalescing trials from a [`TrialConfig`].
///
/// # Examples
///
/// ```
/// use coalesce_engine::{Occupancy, TrialConfig, TrialRunner};
///
/// let runner = TrialRunner::new(TrialConfig {
///     board_size: 5,
///     seed: 3,
///     occupancy: Occupancy::Fraction(0.45),
///     ..TrialConfig::default()
/// })
/// .unwrap();
/// let report = runner.run(0).unwrap();
/// assert_eq!(report.total_moves as usize, report.moves.len());
/// ```
#[derive(Clone)]
pub struct TrialRunner {
    config: TrialConfig,
    generator: MazeGenerator,
    estimator: Option<Arc<dyn CostEstimator>>,
    cancel: Option<CancelToken>,
}

impl TrialRunner {
    /// Validate `config` and build a runner.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from [`TrialConfig::validate`].
    pub fn new(config: TrialConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let generator = MazeGenerator::new(config.board_size)?;
        Ok(Self {
            config,
            generator,
            estimator: None,
            cancel: None,
        })
    }

    /// Attach the estimator used by [`HeuristicChoice::Learned`].
    pub fn with_estimator(mut self, estimator: Arc<dyn CostEstimator>) -> Self {
        self.estimator = Some(estimator);
        self
    }

    /// Attach a token that aborts every running and future trial.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The validated configuration.
    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    /// Run trial `index`.
    ///
    /// # Errors
    ///
    /// [`TrialError::Config`] if the learned heuristic is selected without
    /// an estimator, [`TrialError::Search`] for cache or solve failures
    /// (budget aborts included), and [`TrialError::ReplayMismatch`] if
    /// verification is on and the moves do not coalesce.
    pub fn run(&self, index: u64) -> Result<TrialReport, TrialError> {
        self.run_with_workers(index, self.config.resolved_worker_count())
    }

    pub(crate) fn run_with_workers(
        &self,
        index: u64,
        cache_workers: usize,
    ) -> Result<TrialReport, TrialError> {
        let started = Instant::now();
        let seed = self.config.seed ^ index;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let maze = self.generator.generate(&mut rng)?;
        let open = maze.grid.open_cells();
        let agents = sample_agents(&open, self.config.occupancy, &mut rng);

        let (heuristic, cache) = match self.config.heuristic {
            HeuristicChoice::Zero => (Heuristic::Zero, None),
            HeuristicChoice::Learned => {
                let estimator = self
                    .estimator
                    .clone()
                    .ok_or(ConfigError::MissingEstimator)?;
                (Heuristic::Learned(estimator), None)
            }
            HeuristicChoice::PairwiseMax => {
                let budget = self.config.budget(self.cancel.as_ref());
                let cache = PairwiseDistanceCache::for_grid(&maze.grid, cache_workers, &budget)?;
                let metrics = cache.metrics().clone();
                (Heuristic::PairwiseMax(Arc::new(cache)), Some(metrics))
            }
        };

        let start = SearchState::root(&maze.grid, &maze.dead_ends, agents.iter().copied())?;
        let solver = CoalescingPathfinder::new(heuristic)
            .with_budget(self.config.budget(self.cancel.as_ref()));
        let solution = solver.solve_state(&start)?;

        if self.config.verify_replay {
            let end = start.replay(solution.moves.iter().copied());
            if end.locations().as_slice() != [solution.meeting_cell] {
                return Err(TrialError::ReplayMismatch {
                    expected: solution.meeting_cell,
                    found: end.locations().as_slice().to_vec(),
                });
            }
        }

        let report = TrialReport {
            index,
            seed,
            open_cells: open.len(),
            dead_ends: maze.dead_ends.len(),
            agents: agents.len(),
            total_moves: solution.total_moves,
            moves: solution.moves,
            meeting_cell: solution.meeting_cell,
            generation: maze.stats,
            cache,
            search: solution.metrics,
            elapsed_us: started.elapsed().as_micros() as u64,
        };
        debug!(
            index,
            seed,
            agents = report.agents,
            moves = report.total_moves,
            heuristic = solver.heuristic().name(),
            elapsed_us = report.elapsed_us,
            "trial finished"
        );
        Ok(report)
    }
}

impl fmt::Debug for TrialRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrialRunner")
            .field("config", &self.config)
            .field("has_estimator", &self.estimator.is_some())
            .field("has_cancel", &self.cancel.is_some())
            .finish()
    }
}
