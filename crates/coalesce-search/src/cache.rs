//! Exact two-agent meeting distances for every pair of cells.
//!
//! Built once per board, then frozen and shared read-only (behind an
//! `Arc`) by every search that uses the pairwise-max heuristic. Each entry
//! is the optimal result of a two-agent coalescing search under the
//! Manhattan heuristic, so the cache holds true distances, not bounds.
//!
//! Pairs are independent, so [`PairwiseDistanceCache::build_parallel`]
//! hands rows of the pair triangle to a pool of scoped worker threads over
//! a crossbeam channel. Row `i` covers every pair `(cells[i], cells[j])`
//! with `j > i`. Results come back over a second channel; the first error
//! raises a shared stop flag so idle workers drain quickly.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use coalesce_core::{Cell, SearchError};
use coalesce_space::{DeadEndSet, Grid};
use crossbeam_channel::{Receiver, Sender};
use tracing::debug;

use crate::budget::SearchBudget;
use crate::heuristic::Heuristic;
use crate::metrics::{CacheMetrics, SearchMetrics};
use crate::pathfinder::CoalescingPathfinder;

/// Symmetric map from an unordered cell pair to its meeting distance.
#[derive(Clone, Debug, Default)]
pub struct PairwiseDistanceCache {
    distances: HashMap<(Cell, Cell), u32>,
    metrics: CacheMetrics,
}

/// One solved row of the pair triangle.
struct RowResult {
    entries: Vec<((Cell, Cell), u32)>,
    metrics: SearchMetrics,
}

fn key(a: Cell, b: Cell) -> (Cell, Cell) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl PairwiseDistanceCache {
    /// Distance for the pair `{a, b}` in either order. `(a, a)` is 0.
    pub fn get(&self, a: Cell, b: Cell) -> Option<u32> {
        if a == b {
            return Some(0);
        }
        self.distances.get(&key(a, b)).copied()
    }

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// Whether no pairs are stored.
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Build counters.
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Stored pairs as `((a, b), distance)` with `a < b`, in no particular
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = ((Cell, Cell), u32)> + '_ {
        self.distances.iter().map(|(&k, &d)| (k, d))
    }

    /// Largest stored distance, 0 when empty.
    pub fn max_distance(&self) -> u32 {
        self.distances.values().copied().max().unwrap_or(0)
    }

    /// Cache every pair of open cells on `grid`, using `workers` threads.
    ///
    /// # Errors
    ///
    /// See [`build_parallel`](Self::build_parallel).
    pub fn for_grid(
        grid: &Grid,
        workers: usize,
        budget: &SearchBudget,
    ) -> Result<Self, SearchError> {
        let cells = grid.open_cells();
        if workers <= 1 {
            Self::build(grid, &cells, budget)
        } else {
            Self::build_parallel(grid, &cells, workers, budget)
        }
    }

    /// Solve every unordered pair of `cells` on the current thread.
    ///
    /// `budget` applies to each two-agent search separately; its
    /// cancellation token and deadline therefore bound the whole build.
    ///
    /// # Errors
    ///
    /// [`SearchError::Config`] if a cell is closed, budget aborts, and any
    /// other two-agent search failure.
    pub fn build(grid: &Grid, cells: &[Cell], budget: &SearchBudget) -> Result<Self, SearchError> {
        let started = Instant::now();
        let cells = canonical(cells);
        let solver = pair_solver(budget);
        let none = DeadEndSet::default();

        let mut distances = HashMap::new();
        let mut expanded = 0;
        for i in 0..cells.len() {
            let row = solve_row(&solver, grid, &none, &cells, i)?;
            expanded += row.metrics.expanded;
            distances.extend(row.entries);
        }
        Ok(Self::finish(distances, 1, expanded, started))
    }

    /// Solve every unordered pair of `cells` across `workers` threads.
    ///
    /// # Errors
    ///
    /// [`SearchError::Config`] for `workers == 0` or a closed cell,
    /// [`SearchError::WorkerFailed`] if a worker panics, and the first
    /// two-agent search failure otherwise.
    pub fn build_parallel(
        grid: &Grid,
        cells: &[Cell],
        workers: usize,
        budget: &SearchBudget,
    ) -> Result<Self, SearchError> {
        if workers == 0 {
            return Err(coalesce_core::ConfigError::ZeroWorkers.into());
        }
        let started = Instant::now();
        let cells = canonical(cells);
        let workers = workers.min(cells.len().max(1));
        let solver = pair_solver(budget);
        let none = DeadEndSet::default();
        let stop = AtomicBool::new(false);

        let (task_tx, task_rx) = crossbeam_channel::bounded::<usize>(workers * 2);
        let (result_tx, result_rx) = crossbeam_channel::unbounded();

        let mut distances = HashMap::new();
        let mut expanded = 0;
        let mut first_error = None;

        thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let task_rx = task_rx.clone();
                    let result_tx = result_tx.clone();
                    let (solver, none, cells, stop) = (&solver, &none, &cells, &stop);
                    scope.spawn(move || {
                        worker_loop(task_rx, result_tx, solver, grid, none, cells, stop)
                    })
                })
                .collect();
            drop(task_rx);
            drop(result_tx);

            for i in 0..cells.len() {
                if stop.load(Ordering::Acquire) || task_tx.send(i).is_err() {
                    break;
                }
            }
            drop(task_tx);

            for result in result_rx {
                match result {
                    Ok(row) => {
                        expanded += row.metrics.expanded;
                        distances.extend(row.entries);
                    }
                    Err(e) => {
                        first_error.get_or_insert(e);
                    }
                }
            }

            for handle in handles {
                if handle.join().is_err() {
                    first_error.get_or_insert(SearchError::WorkerFailed {
                        reason: "cache worker panicked".into(),
                    });
                }
            }
        });

        if let Some(e) = first_error {
            return Err(e);
        }
        Ok(Self::finish(distances, workers, expanded, started))
    }

    fn finish(
        distances: HashMap<(Cell, Cell), u32>,
        workers: usize,
        expanded: u64,
        started: Instant,
    ) -> Self {
        let metrics = CacheMetrics {
            pairs: distances.len(),
            workers,
            expanded,
            elapsed_us: started.elapsed().as_micros() as u64,
        };
        debug!(
            pairs = metrics.pairs,
            workers = metrics.workers,
            expanded = metrics.expanded,
            elapsed_us = metrics.elapsed_us,
            "pairwise cache built"
        );
        Self { distances, metrics }
    }
}

fn canonical(cells: &[Cell]) -> Vec<Cell> {
    let mut cells = cells.to_vec();
    cells.sort_unstable();
    cells.dedup();
    cells
}

fn pair_solver(budget: &SearchBudget) -> CoalescingPathfinder {
    CoalescingPathfinder::new(Heuristic::Manhattan).with_budget(budget.clone())
}

fn solve_row(
    solver: &CoalescingPathfinder,
    grid: &Grid,
    none: &DeadEndSet,
    cells: &[Cell],
    i: usize,
) -> Result<RowResult, SearchError> {
    let a = cells[i];
    let mut row = RowResult {
        entries: Vec::with_capacity(cells.len() - i - 1),
        metrics: SearchMetrics::default(),
    };
    for &b in &cells[i + 1..] {
        let solution = solver.solve(grid, none, [a, b])?;
        row.metrics.absorb(&solution.metrics);
        row.entries.push(((a, b), solution.total_moves));
    }
    Ok(row)
}

/// Runs until the task channel closes or the stop flag rises.
fn worker_loop(
    task_rx: Receiver<usize>,
    result_tx: Sender<Result<RowResult, SearchError>>,
    solver: &CoalescingPathfinder,
    grid: &Grid,
    none: &DeadEndSet,
    cells: &[Cell],
    stop: &AtomicBool,
) {
    while let Ok(i) = task_rx.recv() {
        if stop.load(Ordering::Acquire) {
            break;
        }
        let result = solve_row(solver, grid, none, cells, i);
        if result.is_err() {
            stop.store(true, Ordering::Release);
        }
        if result_tx.send(result).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::CancelToken;

    fn c(r: i32, col: i32) -> Cell {
        Cell::new(r, col)
    }

    #[test]
    fn lookup_is_symmetric() {
        let grid = Grid::open(3, 3).unwrap();
        let cache = PairwiseDistanceCache::build(
            &grid,
            &[c(0, 0), c(2, 2), c(0, 2)],
            &SearchBudget::unlimited(),
        )
        .unwrap();
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get(c(0, 0), c(2, 2)), Some(4));
        assert_eq!(cache.get(c(2, 2), c(0, 0)), Some(4));
        assert_eq!(cache.get(c(0, 0), c(0, 2)), Some(2));
        assert_eq!(cache.get(c(1, 1), c(0, 0)), None);
        assert_eq!(cache.get(c(1, 1), c(1, 1)), Some(0));
    }

    #[test]
    fn covers_every_open_pair() {
        let grid = Grid::parse("...\n.#.\n...").unwrap();
        let cache = PairwiseDistanceCache::for_grid(&grid, 1, &SearchBudget::unlimited()).unwrap();
        let n = grid.open_count();
        assert_eq!(cache.len(), n * (n - 1) / 2);
        assert_eq!(cache.metrics().pairs, cache.len());
        assert_eq!(cache.metrics().workers, 1);
        for ((a, b), d) in cache.iter() {
            assert!(a < b);
            assert!(d >= a.manhattan(b));
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let grid = Grid::parse("....\n.##.\n....\n#...").unwrap();
        let budget = SearchBudget::unlimited();
        let cells = grid.open_cells();
        let seq = PairwiseDistanceCache::build(&grid, &cells, &budget).unwrap();
        let par = PairwiseDistanceCache::build_parallel(&grid, &cells, 3, &budget).unwrap();
        assert_eq!(seq.distances, par.distances);
        assert_eq!(par.metrics().workers, 3);
    }

    #[test]
    fn zero_workers_rejected() {
        let grid = Grid::open(2, 2).unwrap();
        let err = PairwiseDistanceCache::build_parallel(
            &grid,
            &grid.open_cells(),
            0,
            &SearchBudget::unlimited(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SearchError::Config(coalesce_core::ConfigError::ZeroWorkers)
        );
    }

    #[test]
    fn cancelled_build_fails_fast() {
        let grid = Grid::open(4, 4).unwrap();
        let token = CancelToken::new();
        token.cancel();
        let budget = SearchBudget::unlimited().with_cancel(token);
        let err = PairwiseDistanceCache::for_grid(&grid, 4, &budget).unwrap_err();
        assert_eq!(err, SearchError::Cancelled);
    }

    #[test]
    fn closed_cell_is_a_config_error() {
        let grid = Grid::parse(".#\n..").unwrap();
        let err = PairwiseDistanceCache::build(
            &grid,
            &[c(0, 0), c(0, 1)],
            &SearchBudget::unlimited(),
        )
        .unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }
}
