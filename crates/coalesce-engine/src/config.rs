//! Trial configuration and validation.
//!
//! [`TrialConfig`] is the input for a [`TrialRunner`](crate::TrialRunner).
//! [`validate()`](TrialConfig::validate) checks it once, up front; nothing
//! is generated or solved for an invalid configuration.

use std::time::{Duration, Instant};

use coalesce_core::ConfigError;
use coalesce_maze::MazeGenerator;
use coalesce_search::{CancelToken, SearchBudget};

// ── Occupancy ──────────────────────────────────────────────────────

/// How agents are placed on a freshly generated board.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Occupancy {
    /// One agent on every open cell.
    All,
    /// `floor(p * open)` uniform draws with replacement, at least one,
    /// collapsed to a set. `p` must be finite and in `(0, 1]`.
    Fraction(f64),
}

impl Occupancy {
    /// Check the fraction, if any.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::All => Ok(()),
            Self::Fraction(p) if p.is_finite() && p > 0.0 && p <= 1.0 => Ok(()),
            Self::Fraction(value) => Err(ConfigError::InvalidOccupancy { value }),
        }
    }
}

// ── HeuristicChoice ────────────────────────────────────────────────

/// Which cost-to-go estimator a trial uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HeuristicChoice {
    /// Pairwise-max over a freshly built distance cache. Optimal.
    #[default]
    PairwiseMax,
    /// The runner's attached [`CostEstimator`](coalesce_search::CostEstimator).
    Learned,
    /// No guidance; uniform-cost search. Optimal but slow.
    Zero,
}

// ── TrialConfig ────────────────────────────────────────────────────

/// Configuration for one trial, or for every trial of a batch.
#[derive(Clone, Debug)]
pub struct TrialConfig {
    /// Board dimension (square). Default: 6.
    pub board_size: u32,
    /// Base seed; trial `i` uses `seed ^ i`. Default: 0.
    pub seed: u64,
    /// Agent placement. Default: [`Occupancy::All`].
    pub occupancy: Occupancy,
    /// Heuristic. Default: [`HeuristicChoice::PairwiseMax`].
    pub heuristic: HeuristicChoice,
    /// Worker threads for cache builds and batches. `None` = auto-detect.
    pub cache_workers: Option<usize>,
    /// Wall-clock limit per solve (and per cache build). Default: none.
    pub deadline: Option<Duration>,
    /// Expansion limit per solve. Default: none.
    pub max_expansions: Option<u64>,
    /// Re-apply the found moves and check they coalesce. Default: true.
    pub verify_replay: bool,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            board_size: 6,
            seed: 0,
            occupancy: Occupancy::All,
            heuristic: HeuristicChoice::PairwiseMax,
            cache_workers: None,
            deadline: None,
            max_expansions: None,
            verify_replay: true,
        }
    }
}

impl TrialConfig {
    /// Check every field.
    ///
    /// # Errors
    ///
    /// [`ConfigError::BoardTooSmall`] for `board_size < 2`,
    /// [`ConfigError::InvalidOccupancy`] for a bad fraction, and
    /// [`ConfigError::ZeroWorkers`] for `cache_workers == Some(0)`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        MazeGenerator::new(self.board_size)?;
        self.occupancy.validate()?;
        if self.cache_workers == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(())
    }

    /// Resolve the worker count, auto-detecting if `None`.
    ///
    /// Explicit values are clamped to `[1, 64]`. Auto-detection uses the
    /// available parallelism, clamped to `[1, 16]`.
    pub fn resolved_worker_count(&self) -> usize {
        match self.cache_workers {
            Some(n) => n.clamp(1, 64),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
                .clamp(1, 16),
        }
    }

    /// A fresh budget for one solve, starting its deadline clock now.
    pub(crate) fn budget(&self, cancel: Option<&CancelToken>) -> SearchBudget {
        SearchBudget {
            cancel: cancel.cloned(),
            deadline: self.deadline.map(|d| Instant::now() + d),
            max_expansions: self.max_expansions,
        }
    }
}
