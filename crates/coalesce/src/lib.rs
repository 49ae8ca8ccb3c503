//! Coalesce: minimum-move coalescing of agents on grid mazes.
//!
//! Indistinguishable agents sit on the open cells of a procedurally
//! generated maze. Every move shifts all of them one step in the same
//! direction; walls hold agents in place and agents that meet merge. This
//! facade re-exports the sub-crates that generate boards, search for the
//! shortest coalescing move sequence, and run seeded trials.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use coalesce::prelude::*;
//!
//! let maze = MazeGenerator::new(5).unwrap().generate_seeded(1).unwrap();
//! let cache = PairwiseDistanceCache::for_grid(&maze.grid, 2, &SearchBudget::unlimited()).unwrap();
//! let solver = CoalescingPathfinder::new(Heuristic::PairwiseMax(Arc::new(cache)));
//! let solution = solver
//!     .solve(&maze.grid, &maze.dead_ends, maze.grid.open_cells())
//!     .unwrap();
//! assert_eq!(solution.total_moves as usize, solution.moves.len());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `coalesce-core` | Cells, moves, error enums |
//! | [`space`] | `coalesce-space` | Immutable grids and dead-end sets |
//! | [`maze`] | `coalesce-maze` | Two-phase maze generator |
//! | [`search`] | `coalesce-search` | States, heuristics, cache, A* solver |
//! | [`engine`] | `coalesce-engine` | Seeded trials and parallel batches |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core value types and errors (`coalesce-core`).
pub use coalesce_core as types;

/// Grids and dead-end sets (`coalesce-space`).
///
/// [`space::Grid`] is immutable once built and validated as a single open
/// region.
pub use coalesce_space as space;

/// Maze generation (`coalesce-maze`).
pub use coalesce_maze as maze;

/// Coalescing search (`coalesce-search`).
///
/// [`search::CoalescingPathfinder`] solves from a start state under a
/// [`search::Heuristic`]; [`search::PairwiseDistanceCache`] backs the
/// optimal pairwise-max heuristic.
pub use coalesce_search as search;

/// Trials and batches (`coalesce-engine`).
pub use coalesce_engine as engine;

/// Common imports for typical usage.
///
/// ```rust
/// use coalesce::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use coalesce_core::{Cell, ConfigError, EstimatorError, Move, SearchError};

    // Boards
    pub use coalesce_maze::{Maze, MazeError, MazeGenerator};
    pub use coalesce_space::{CellStatus, DeadEndSet, Grid};

    // Search
    pub use coalesce_search::{
        CancelToken, CoalescingPathfinder, CostEstimator, FnEstimator, Heuristic,
        PairwiseDistanceCache, SearchBudget, SearchState, Solution,
    };

    // Engine
    pub use coalesce_engine::{
        BatchReport, HeuristicChoice, Occupancy, TrialConfig, TrialError, TrialRunner,
    };
}
