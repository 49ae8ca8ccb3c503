//! Duplicate-tolerant A* over agent-location sets.
//!
//! The search keeps a best-known move count per location set and a
//! predecessor link, but no closed set. A state is pushed again whenever a
//! strictly shorter path to it is found; older queue entries for it are
//! recognized as stale when popped (their `g` exceeds the recorded
//! distance) and skipped. With an admissible heuristic the first goal pop
//! is optimal. With the learned heuristic the search still terminates but
//! the answer may be longer than optimal.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::time::Instant;

use coalesce_core::{Cell, Move, SearchError};
use coalesce_space::{DeadEndSet, Grid};
use tracing::{debug, warn};

use crate::budget::SearchBudget;
use crate::heuristic::Heuristic;
use crate::metrics::SearchMetrics;
use crate::state::{LocationSet, SearchState};

/// An optimal (or, for inadmissible heuristics, best-found) move sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// Number of moves; equals `moves.len()`.
    pub total_moves: u32,
    /// Moves in execution order.
    pub moves: Vec<Move>,
    /// Where the agents end up.
    pub meeting_cell: Cell,
    /// Search counters.
    pub metrics: SearchMetrics,
}

/// How a location set was first reached along its current best path.
struct Parent {
    prev: LocationSet,
    /// `None` marks the self-looped root.
    move_taken: Option<Move>,
}

struct QueueEntry {
    f: f64,
    g: u32,
    width: usize,
    seq: u64,
    key: LocationSet,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    // Reversed for BinaryHeap: lowest f first, then fewer locations, then
    // insertion order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.width.cmp(&self.width))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Single-threaded coalescing solver.
///
/// # Examples
///
/// ```
/// use coalesce_core::Cell;
/// use coalesce_search::{CoalescingPathfinder, Heuristic};
/// use coalesce_space::{DeadEndSet, Grid};
///
/// let grid = Grid::open(3, 3).unwrap();
/// let solver = CoalescingPathfinder::new(Heuristic::Manhattan);
/// let solution = solver
///     .solve(&grid, &DeadEndSet::default(), [Cell::new(0, 0), Cell::new(2, 2)])
///     .unwrap();
/// assert_eq!(solution.total_moves, 4);
/// ```
#[derive(Clone, Debug)]
pub struct CoalescingPathfinder {
    heuristic: Heuristic,
    budget: SearchBudget,
}

impl CoalescingPathfinder {
    /// A solver with an unlimited budget.
    pub fn new(heuristic: Heuristic) -> Self {
        Self {
            heuristic,
            budget: SearchBudget::unlimited(),
        }
    }

    /// Replace the budget.
    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    /// The heuristic in use.
    pub fn heuristic(&self) -> &Heuristic {
        &self.heuristic
    }

    /// The budget in use.
    pub fn budget(&self) -> &SearchBudget {
        &self.budget
    }

    /// Validate `locations` as a start state and solve from it.
    ///
    /// # Errors
    ///
    /// [`SearchError::Config`] for an empty or closed start, plus every
    /// error of [`solve_state`](Self::solve_state).
    pub fn solve<I: IntoIterator<Item = Cell>>(
        &self,
        grid: &Grid,
        dead_ends: &DeadEndSet,
        locations: I,
    ) -> Result<Solution, SearchError> {
        let start = SearchState::root(grid, dead_ends, locations)?;
        self.solve_state(&start)
    }

    /// Find the fewest shared moves that coalesce every agent in `start`.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Cancelled`], [`SearchError::DeadlineExceeded`] or
    ///   [`SearchError::ExpansionLimit`] when the budget runs out.
    /// - [`SearchError::Estimator`] or [`SearchError::MissingPair`] from
    ///   the heuristic.
    /// - [`SearchError::Exhausted`] if the queue empties, which a connected
    ///   board rules out.
    pub fn solve_state(&self, start: &SearchState<'_>) -> Result<Solution, SearchError> {
        let started = Instant::now();
        let grid = start.grid();
        let dead_ends = start.dead_ends();
        let mut metrics = SearchMetrics::default();

        let root = start.locations().clone();
        let mut dist: HashMap<LocationSet, u32> = HashMap::new();
        let mut pred: HashMap<LocationSet, Parent> = HashMap::new();
        dist.insert(root.clone(), 0);
        pred.insert(
            root.clone(),
            Parent {
                prev: root.clone(),
                move_taken: None,
            },
        );

        let mut queue = BinaryHeap::new();
        let mut seq = 0u64;
        queue.push(QueueEntry {
            f: self.heuristic.estimate(start)?,
            g: 0,
            width: root.len(),
            seq,
            key: root,
        });
        metrics.pushed = 1;
        metrics.peak_queue = 1;

        while let Some(entry) = queue.pop() {
            if dist.get(&entry.key).is_some_and(|&best| entry.g > best) {
                metrics.stale_skips += 1;
                continue;
            }
            if entry.key.is_coalesced() {
                let moves = reconstruct(&pred, &entry.key);
                metrics.elapsed_us = started.elapsed().as_micros() as u64;
                debug!(
                    agents = start.locations().len(),
                    moves = moves.len(),
                    expanded = metrics.expanded,
                    pushed = metrics.pushed,
                    stale = metrics.stale_skips,
                    heuristic = self.heuristic.name(),
                    elapsed_us = metrics.elapsed_us,
                    "coalesced"
                );
                return Ok(Solution {
                    total_moves: moves.len() as u32,
                    moves,
                    meeting_cell: entry.key.as_slice()[0],
                    metrics,
                });
            }
            if let Err(e) = self.budget.check(metrics.expanded, started) {
                warn!(
                    error = %e,
                    agents = start.locations().len(),
                    expanded = metrics.expanded,
                    "search aborted"
                );
                return Err(e);
            }
            metrics.expanded += 1;

            let g = entry.g + 1;
            for mv in Move::ALL {
                let next = entry.key.shifted(grid, mv);
                if dist.get(&next).is_some_and(|&best| best <= g) {
                    continue;
                }
                let child = SearchState::from_parts(grid, dead_ends, next.clone(), Some(mv));
                let h = self.heuristic.estimate(&child)?;
                dist.insert(next.clone(), g);
                pred.insert(
                    next.clone(),
                    Parent {
                        prev: entry.key.clone(),
                        move_taken: Some(mv),
                    },
                );
                seq += 1;
                queue.push(QueueEntry {
                    f: g as f64 + h,
                    g,
                    width: next.len(),
                    seq,
                    key: next,
                });
                metrics.pushed += 1;
            }
            metrics.peak_queue = metrics.peak_queue.max(queue.len());
        }

        Err(SearchError::Exhausted {
            expanded: metrics.expanded,
        })
    }
}

/// Walk predecessor links back to the self-looped root.
fn reconstruct(pred: &HashMap<LocationSet, Parent>, goal: &LocationSet) -> Vec<Move> {
    let mut moves = Vec::new();
    let mut cur = goal;
    while let Some(Parent {
        prev,
        move_taken: Some(mv),
    }) = pred.get(cur)
    {
        moves.push(*mv);
        cur = prev;
    }
    moves.reverse();
    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::CancelToken;

    fn c(r: i32, col: i32) -> Cell {
        Cell::new(r, col)
    }

    #[test]
    fn single_agent_needs_no_moves() {
        let grid = Grid::open(3, 3).unwrap();
        let solver = CoalescingPathfinder::new(Heuristic::Zero);
        let sol = solver.solve(&grid, &DeadEndSet::default(), [c(1, 2)]).unwrap();
        assert_eq!(sol.total_moves, 0);
        assert!(sol.moves.is_empty());
        assert_eq!(sol.meeting_cell, c(1, 2));
        assert_eq!(sol.metrics.expanded, 0);
    }

    #[test]
    fn opposite_corners_of_open_three_by_three() {
        let grid = Grid::open(3, 3).unwrap();
        let none = DeadEndSet::default();
        let start = SearchState::root(&grid, &none, [c(0, 0), c(2, 2)]).unwrap();
        for h in [Heuristic::Zero, Heuristic::Manhattan] {
            let sol = CoalescingPathfinder::new(h).solve_state(&start).unwrap();
            assert_eq!(sol.total_moves, 4);
            assert_eq!(sol.moves.len(), 4);
            let end = start.replay(sol.moves.iter().copied());
            assert!(end.is_goal());
            assert_eq!(end.locations().as_slice(), &[sol.meeting_cell]);
        }
    }

    #[test]
    fn wall_lets_agents_catch_up() {
        // Corridor: the left agent is pinned by the border while the
        // right one walks over.
        let grid = Grid::parse(".....").unwrap();
        let solver = CoalescingPathfinder::new(Heuristic::Manhattan);
        let sol = solver
            .solve(&grid, &DeadEndSet::default(), [c(0, 0), c(0, 4)])
            .unwrap();
        assert_eq!(sol.total_moves, 4);
        let uniform = |mv: Move| sol.moves.iter().all(|&m| m == mv);
        assert!(uniform(Move::Left) || uniform(Move::Right));
    }

    #[test]
    fn rejects_closed_start() {
        let grid = Grid::parse(".#\n..").unwrap();
        let solver = CoalescingPathfinder::new(Heuristic::Zero);
        let err = solver
            .solve(&grid, &DeadEndSet::default(), [c(0, 1)])
            .unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }

    #[test]
    fn pre_cancelled_search_aborts() {
        let grid = Grid::open(4, 4).unwrap();
        let token = CancelToken::new();
        token.cancel();
        let solver = CoalescingPathfinder::new(Heuristic::Zero)
            .with_budget(SearchBudget::unlimited().with_cancel(token));
        let err = solver
            .solve(&grid, &DeadEndSet::default(), grid.open_cells())
            .unwrap_err();
        assert_eq!(err, SearchError::Cancelled);
    }

    #[test]
    fn expansion_limit_aborts() {
        let grid = Grid::open(5, 5).unwrap();
        let solver = CoalescingPathfinder::new(Heuristic::Zero)
            .with_budget(SearchBudget::unlimited().with_max_expansions(1));
        let err = solver
            .solve(&grid, &DeadEndSet::default(), [c(0, 0), c(4, 4)])
            .unwrap_err();
        assert_eq!(err, SearchError::ExpansionLimit { limit: 1 });
    }

    #[test]
    fn queue_order_prefers_low_f_then_narrow_then_fifo() {
        let key = LocationSet::new([c(0, 0)]);
        let entry = |f: f64, width: usize, seq: u64| QueueEntry {
            f,
            g: 0,
            width,
            seq,
            key: key.clone(),
        };
        let mut heap = BinaryHeap::new();
        heap.push(entry(2.0, 1, 0));
        heap.push(entry(1.0, 3, 1));
        heap.push(entry(1.0, 2, 2));
        heap.push(entry(1.0, 2, 3));
        let order: Vec<(f64, usize, u64)> = std::iter::from_fn(|| heap.pop())
            .map(|e| (e.f, e.width, e.seq))
            .collect();
        assert_eq!(
            order,
            vec![(1.0, 2, 2), (1.0, 2, 3), (1.0, 3, 1), (2.0, 1, 0)]
        );
    }
}
