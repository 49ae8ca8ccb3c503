//! Benchmark profiles for the coalesce workspace.
//!
//! - [`reference_maze`]: the 6x6 board size the estimator is trained on.
//! - [`stress_maze`]: a 10x10 board for cache-build timing.
//! - [`reference_config`]: a trial configuration matching the reference
//!   board, with 45% occupancy.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use coalesce_engine::{Occupancy, TrialConfig};
use coalesce_maze::{Maze, MazeError, MazeGenerator};

/// Reference board dimension.
pub const REFERENCE_SIZE: u32 = 6;

/// Stress board dimension.
pub const STRESS_SIZE: u32 = 10;

fn maze(size: u32, seed: u64) -> Result<Maze, MazeError> {
    MazeGenerator::new(size)?.generate_seeded(seed)
}

/// Generate the reference board for `seed`.
pub fn reference_maze(seed: u64) -> Result<Maze, MazeError> {
    maze(REFERENCE_SIZE, seed)
}

/// Generate the stress board for `seed`.
pub fn stress_maze(seed: u64) -> Result<Maze, MazeError> {
    maze(STRESS_SIZE, seed)
}

/// Trial configuration for the reference board.
pub fn reference_config(seed: u64) -> TrialConfig {
    TrialConfig {
        board_size: REFERENCE_SIZE,
        seed,
        occupancy: Occupancy::Fraction(0.45),
        ..TrialConfig::default()
    }
}
