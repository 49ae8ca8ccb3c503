//! Test utilities for coalesce development.
//!
//! Board fixtures live in [`fixtures`]. The oracles here are written
//! independently of the search crate so they can check it: a plain
//! breadth-first search over location sets, and an invariant check for
//! generated boards.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::{HashSet, VecDeque};

use coalesce_core::{Cell, Move};
use coalesce_space::{DeadEndSet, Grid};

fn step(grid: &Grid, locations: &[Cell], mv: Move) -> Vec<Cell> {
    let mut next: Vec<Cell> = locations
        .iter()
        .map(|&loc| {
            let to = loc.shifted(mv);
            if grid.is_open(to) {
                to
            } else {
                loc
            }
        })
        .collect();
    next.sort_unstable();
    next.dedup();
    next
}

/// Fewest shared moves that coalesce `locations`, by exhaustive BFS.
///
/// Returns `None` if no single-location state is reachable within
/// `max_states` visited states. Only practical for small boards or few
/// agents.
pub fn brute_force_distance(grid: &Grid, locations: &[Cell], max_states: usize) -> Option<u32> {
    let mut start = locations.to_vec();
    start.sort_unstable();
    start.dedup();
    if start.len() <= 1 {
        return Some(0);
    }

    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    seen.insert(start.clone());
    queue.push_back((start, 0u32));
    while let Some((locs, depth)) = queue.pop_front() {
        for mv in Move::ALL {
            let next = step(grid, &locs, mv);
            if next.len() == 1 {
                return Some(depth + 1);
            }
            if seen.len() < max_states && seen.insert(next.clone()) {
                queue.push_back((next, depth + 1));
            }
        }
    }
    None
}

/// Assert the properties every generated board must have: one connected
/// open region, and `dead_ends` exactly the open cells with one open
/// neighbour, non-empty.
pub fn assert_maze_invariants(grid: &Grid, dead_ends: &DeadEndSet) {
    assert!(grid.open_count() > 0, "board has no open cells");
    assert!(grid.is_connected(), "open region is disconnected:\n{grid}");
    assert!(!dead_ends.is_empty(), "board has no dead ends:\n{grid}");

    let scanned: Vec<Cell> = grid
        .cells()
        .filter(|&c| grid.is_open(c) && grid.open_neighbour_count(c) == 1)
        .collect();
    let recorded: Vec<Cell> = dead_ends.iter().collect();
    assert_eq!(recorded, scanned, "dead-end set mismatch on\n{grid}");
}

/// Apply `moves` to `locations` and return the final canonical set.
pub fn replay(grid: &Grid, locations: &[Cell], moves: &[Move]) -> Vec<Cell> {
    let mut locs = locations.to_vec();
    locs.sort_unstable();
    locs.dedup();
    moves.iter().fold(locs, |locs, &mv| step(grid, &locs, mv))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brute_force_on_open_corners() {
        let grid = fixtures::open_grid(3);
        let d = brute_force_distance(&grid, &[Cell::new(0, 0), Cell::new(2, 2)], 10_000);
        assert_eq!(d, Some(4));
    }

    #[test]
    fn brute_force_single_agent_is_zero() {
        let grid = fixtures::open_grid(2);
        assert_eq!(brute_force_distance(&grid, &[Cell::new(1, 1)], 1), Some(0));
    }

    #[test]
    fn replay_merges_agents() {
        let grid = fixtures::grid(fixtures::SNAKE);
        let end = replay(
            &grid,
            &[Cell::new(0, 0), Cell::new(0, 3)],
            &[Move::Left, Move::Left, Move::Left],
        );
        assert_eq!(end, vec![Cell::new(0, 0)]);
    }

    #[test]
    fn fixtures_are_valid_boards() {
        for text in [
            fixtures::RING,
            fixtures::TWO_ROOMS,
            fixtures::SNAKE,
            fixtures::MAZELET,
        ] {
            let grid = fixtures::grid(text);
            assert!(grid.is_connected());
        }
        let (grid, agents) = fixtures::three_clusters();
        assert!(agents.iter().all(|&a| grid.is_open(a)));
    }
}
