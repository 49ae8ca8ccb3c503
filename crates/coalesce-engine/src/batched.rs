//! Independent trials across worker threads.
//!
//! [`TrialRunner::run_batch`] hands trial indices to a pool of scoped
//! workers over a crossbeam channel and gathers their reports into a
//! [`BatchReport`]. Trials share nothing but the runner, so the only
//! coordination is the channel and a stop flag raised by the first failure.
//!
//! Each trial builds its cache on its own worker thread; parallelism comes
//! from running trials side by side, not from splitting one cache build.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use tracing::info;

use crate::trial::{TrialError, TrialReport, TrialRunner};

// ── Error type ──────────────────────────────────────────────────

/// Error from a batch, annotated with the failing trial index.
#[derive(Debug, PartialEq)]
pub enum BatchError {
    /// A trial failed. When several fail, the lowest index that ran is
    /// reported.
    Trial {
        /// Index of the trial that failed.
        trial_index: u64,
        /// The underlying trial error.
        error: TrialError,
    },
    /// A worker thread panicked.
    WorkerFailed {
        /// Description of what went wrong.
        reason: String,
    },
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trial { trial_index, error } => {
                write!(f, "trial {trial_index} failed: {error}")
            }
            Self::WorkerFailed { reason } => write!(f, "batch worker failed: {reason}"),
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Trial { error, .. } => Some(error),
            Self::WorkerFailed { .. } => None,
        }
    }
}

// ── Report ──────────────────────────────────────────────────────

/// Aggregates over a batch of trials.
#[derive(Clone, Debug)]
pub struct BatchReport {
    /// Per-trial reports, ordered by index.
    pub trials: Vec<TrialReport>,
    /// Worker threads used.
    pub workers: usize,
    /// Mean optimal move count.
    pub mean_moves: f64,
    /// Largest move count in the batch.
    pub max_moves: u32,
    /// Mean number of distinct starting agent locations.
    pub mean_agents: f64,
    /// Mean time per trial spent in the coalescing search, in microseconds.
    pub mean_search_us: f64,
    /// Mean time per trial spent building caches, in microseconds.
    pub mean_cache_us: f64,
    /// Wall-clock time for the whole batch, in microseconds.
    pub elapsed_us: u64,
}

impl BatchReport {
    fn from_trials(mut trials: Vec<TrialReport>, workers: usize, started: Instant) -> Self {
        trials.sort_by_key(|t| t.index);
        let n = trials.len().max(1) as f64;
        let mean = |f: &dyn Fn(&TrialReport) -> f64| trials.iter().map(f).sum::<f64>() / n;
        Self {
            workers,
            mean_moves: mean(&|t| t.total_moves as f64),
            max_moves: trials.iter().map(|t| t.total_moves).max().unwrap_or(0),
            mean_agents: mean(&|t| t.agents as f64),
            mean_search_us: mean(&|t| t.search.elapsed_us as f64),
            mean_cache_us: mean(&|t| t.cache.as_ref().map_or(0.0, |c| c.elapsed_us as f64)),
            elapsed_us: started.elapsed().as_micros() as u64,
            trials,
        }
    }

    /// Number of trials.
    pub fn len(&self) -> usize {
        self.trials.len()
    }

    /// Whether the batch ran no trials.
    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }
}

impl TrialRunner {
    /// Run trials `0..count` across
    /// [`resolved_worker_count`](crate::TrialConfig::resolved_worker_count)
    /// threads.
    ///
    /// Results are independent of the worker count: trial `i` always uses
    /// seed `config.seed ^ i`.
    ///
    /// # Errors
    ///
    /// [`BatchError::Trial`] with the lowest failing index, or
    /// [`BatchError::WorkerFailed`] if a worker panics.
    pub fn run_batch(&self, count: u64) -> Result<BatchReport, BatchError> {
        let started = Instant::now();
        let workers = self
            .config()
            .resolved_worker_count()
            .min(count.max(1) as usize);
        let stop = AtomicBool::new(false);

        let (task_tx, task_rx) = crossbeam_channel::bounded::<u64>(workers * 2);
        let (result_tx, result_rx) = crossbeam_channel::unbounded();

        let mut trials = Vec::with_capacity(count as usize);
        let mut failures: Vec<(u64, TrialError)> = Vec::new();
        let mut panicked = false;

        thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let task_rx = task_rx.clone();
                    let result_tx = result_tx.clone();
                    let stop = &stop;
                    scope.spawn(move || worker_loop(self, task_rx, result_tx, stop))
                })
                .collect();
            drop(task_rx);
            drop(result_tx);

            for index in 0..count {
                if stop.load(Ordering::Acquire) || task_tx.send(index).is_err() {
                    break;
                }
            }
            drop(task_tx);

            for (index, result) in result_rx {
                match result {
                    Ok(report) => trials.push(report),
                    Err(e) => failures.push((index, e)),
                }
            }
            for handle in handles {
                panicked |= handle.join().is_err();
            }
        });

        if let Some((trial_index, error)) = failures.into_iter().min_by_key(|(i, _)| *i) {
            return Err(BatchError::Trial { trial_index, error });
        }
        if panicked {
            return Err(BatchError::WorkerFailed {
                reason: "trial worker panicked".into(),
            });
        }

        let report = BatchReport::from_trials(trials, workers, started);
        info!(
            trials = report.len(),
            workers,
            mean_moves = report.mean_moves,
            max_moves = report.max_moves,
            mean_agents = report.mean_agents,
            elapsed_us = report.elapsed_us,
            "batch finished"
        );
        Ok(report)
    }
}

/// Runs until the task channel closes or the stop flag rises.
fn worker_loop(
    runner: &TrialRunner,
    task_rx: Receiver<u64>,
    result_tx: Sender<(u64, Result<TrialReport, TrialError>)>,
    stop: &AtomicBool,
) {
    while let Ok(index) = task_rx.recv() {
        if stop.load(Ordering::Acquire) {
            break;
        }
        let result = runner.run_with_workers(index, 1);
        if result.is_err() {
            stop.store(true, Ordering::Release);
        }
        if result_tx.send((index, result)).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HeuristicChoice, Occupancy, TrialConfig};
    use coalesce_core::{ConfigError, SearchError};
    use coalesce_search::CancelToken;

    fn runner(workers: usize) -> TrialRunner {
        TrialRunner::new(TrialConfig {
            board_size: 5,
            seed: 77,
            occupancy: Occupancy::Fraction(0.75),
            cache_workers: Some(workers),
            ..TrialConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn batch_is_independent_of_worker_count() {
        let one = runner(1).run_batch(6).unwrap();
        let four = runner(4).run_batch(6).unwrap();
        assert_eq!(one.len(), 6);
        assert_eq!(four.workers, 4);
        for (a, b) in one.trials.iter().zip(&four.trials) {
            assert_eq!(a.index, b.index);
            assert_eq!(a.moves, b.moves);
        }
        assert_eq!(one.mean_moves, four.mean_moves);
        assert_eq!(one.max_moves, four.max_moves);
    }

    #[test]
    fn aggregates_match_trials() {
        let report = runner(2).run_batch(4).unwrap();
        let indices: Vec<u64> = report.trials.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        let mean = report.trials.iter().map(|t| t.total_moves as f64).sum::<f64>() / 4.0;
        assert!((report.mean_moves - mean).abs() < 1e-9);
        assert!(report.mean_cache_us >= 0.0);
    }

    #[test]
    fn empty_batch() {
        let report = runner(2).run_batch(0).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.mean_moves, 0.0);
        assert_eq!(report.max_moves, 0);
    }

    #[test]
    fn failing_trials_report_lowest_index() {
        let r = TrialRunner::new(TrialConfig {
            heuristic: HeuristicChoice::Learned,
            cache_workers: Some(1),
            ..TrialConfig::default()
        })
        .unwrap();
        let err = r.run_batch(5).unwrap_err();
        assert_eq!(
            err,
            BatchError::Trial {
                trial_index: 0,
                error: TrialError::Config(ConfigError::MissingEstimator),
            }
        );
    }

    #[test]
    fn cancelled_batch_fails() {
        let token = CancelToken::new();
        token.cancel();
        let err = runner(2).with_cancel(token).run_batch(3).unwrap_err();
        assert!(matches!(
            err,
            BatchError::Trial {
                error: TrialError::Search(SearchError::Cancelled),
                ..
            }
        ));
    }
}
