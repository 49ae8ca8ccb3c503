//! Two-phase maze generator.
//!
//! **Open-spanning phase.** Starting from an all-closed board, one random
//! cell is opened. The frontier holds every closed cell with exactly one
//! open neighbour; repeatedly opening a random frontier cell grows a random
//! spanning tree, because a cell with two open neighbours would close a
//! cycle and is dropped from the frontier instead. While growing, the
//! generator tracks dead-end candidates: open cells with exactly one open
//! neighbour.
//!
//! **Loop-carving phase.** About half of the candidates get a random
//! closed neighbour opened, which turns the tree into a graph with loops.
//! Each carve invalidates every candidate next to the opened cell. A carve
//! that would leave no candidates is undone and ends the phase, so at least
//! one dead end always survives.
//!
//! Both working sets are [`IndexSet`]s so that random picks are O(1) and
//! the whole process is reproducible from the RNG state alone.

use coalesce_core::{Cell, ConfigError};
use coalesce_space::{DeadEndSet, Grid};
use indexmap::IndexSet;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use smallvec::SmallVec;
use tracing::debug;

use crate::canvas::Canvas;
use crate::error::MazeError;

/// Counters describing one generation run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Open cells when the spanning phase finished.
    pub spanning_open: usize,
    /// Dead-end candidates when the spanning phase finished.
    pub initial_dead_ends: usize,
    /// Carves the loop phase aimed for (`initial_dead_ends / 2`).
    pub carve_target: usize,
    /// Carves actually performed.
    pub carves: usize,
    /// Whether the lower-bound guard stopped the loop phase early.
    pub guard_triggered: bool,
}

/// A generated board and its dead ends.
#[derive(Clone, Debug)]
pub struct Maze {
    /// The finished, immutable board.
    pub grid: Grid,
    /// Every open cell with exactly one open neighbour. Never empty.
    pub dead_ends: DeadEndSet,
    /// How the board came to be.
    pub stats: GenerationStats,
}

/// Generator for square maze boards.
///
/// # Examples
///
/// ```
/// use coalesce_maze::MazeGenerator;
///
/// let maze = MazeGenerator::new(6).unwrap().generate_seeded(42).unwrap();
/// assert!(maze.grid.is_connected());
/// assert!(!maze.dead_ends.is_empty());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct MazeGenerator {
    size: u32,
}

impl MazeGenerator {
    /// Smallest board with a meaningful spanning phase.
    pub const MIN_SIZE: u32 = 2;

    /// Create a generator for `size x size` boards.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BoardTooSmall`] for `size < 2` and
    /// [`ConfigError::DimensionTooLarge`] when `size` does not fit the
    /// coordinate space.
    pub fn new(size: u32) -> Result<Self, ConfigError> {
        if size < Self::MIN_SIZE {
            return Err(ConfigError::BoardTooSmall { size });
        }
        if size as usize > Grid::MAX_DIM {
            return Err(ConfigError::DimensionTooLarge {
                name: "size",
                value: size as usize,
                max: Grid::MAX_DIM,
            });
        }
        Ok(Self { size })
    }

    /// Board dimension.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Generate a board with a ChaCha8 RNG seeded from `seed`.
    pub fn generate_seeded(&self, seed: u64) -> Result<Maze, MazeError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.generate(&mut rng)
    }

    /// Generate a board, drawing all randomness from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`MazeError::NoDeadEnds`] if the finished board has no dead
    /// end, and [`MazeError::Config`] if the board fails [`Grid`]
    /// validation. Neither happens for a correct generator.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Maze, MazeError> {
        let mut canvas = Canvas::closed(self.size);
        let mut candidates = span(&mut canvas, self.size, rng);

        let mut stats = GenerationStats {
            spanning_open: canvas.open_count(),
            initial_dead_ends: candidates.len(),
            carve_target: candidates.len() / 2,
            ..GenerationStats::default()
        };
        carve_loops(&mut canvas, &mut candidates, rng, &mut stats);

        let grid = canvas.freeze()?;
        let dead_ends = DeadEndSet::from_grid(&grid);
        if dead_ends.is_empty() {
            return Err(MazeError::NoDeadEnds);
        }
        debug_assert!(candidates.iter().all(|&c| dead_ends.contains(c)));

        debug!(
            size = self.size,
            open = grid.open_count(),
            dead_ends = dead_ends.len(),
            carves = stats.carves,
            guard = stats.guard_triggered,
            "maze generated"
        );
        Ok(Maze {
            grid,
            dead_ends,
            stats,
        })
    }
}

/// Open-spanning phase. Returns the dead-end candidates.
fn span<R: Rng + ?Sized>(canvas: &mut Canvas, size: u32, rng: &mut R) -> IndexSet<Cell> {
    let n = size as i32;
    let mut frontier: IndexSet<Cell> = IndexSet::new();
    let mut candidates: IndexSet<Cell> = IndexSet::new();

    let start = Cell::new(rng.random_range(0..n), rng.random_range(0..n));
    canvas.set_open(start, true);
    frontier.extend(canvas.neighbours(start));

    while !frontier.is_empty() {
        let pick = rng.random_range(0..frontier.len());
        let Some(cell) = frontier.swap_remove_index(pick) else {
            break;
        };
        canvas.set_open(cell, true);

        let mut open_adj = 0;
        for adj in canvas.neighbours(cell) {
            if canvas.is_open(adj) {
                open_adj += 1;
                // adj just gained `cell` as a second open neighbour.
                candidates.swap_remove(&adj);
            } else if canvas.open_neighbour_count(adj) == 1 {
                frontier.insert(adj);
            } else {
                frontier.swap_remove(&adj);
            }
        }
        if open_adj == 1 {
            candidates.insert(cell);
        }
    }
    candidates
}

/// Loop-carving phase.
fn carve_loops<R: Rng + ?Sized>(
    canvas: &mut Canvas,
    candidates: &mut IndexSet<Cell>,
    rng: &mut R,
    stats: &mut GenerationStats,
) {
    while stats.carves < stats.carve_target && !candidates.is_empty() {
        let pick = rng.random_range(0..candidates.len());
        let Some(dead_end) = candidates.swap_remove_index(pick) else {
            break;
        };
        let closed: SmallVec<[Cell; 4]> = canvas
            .neighbours(dead_end)
            .into_iter()
            .filter(|&n| canvas.is_closed(n))
            .collect();
        let Some(&to_open) = closed.choose(rng) else {
            // Only reachable on a degenerate board; keep the dead end.
            candidates.insert(dead_end);
            break;
        };

        canvas.set_open(to_open, true);
        let invalidated: SmallVec<[Cell; 4]> = canvas
            .neighbours(to_open)
            .into_iter()
            .filter(|n| candidates.contains(n))
            .collect();

        if invalidated.len() == candidates.len() {
            canvas.set_open(to_open, false);
            candidates.insert(dead_end);
            stats.guard_triggered = true;
            break;
        }
        for cell in &invalidated {
            candidates.swap_remove(cell);
        }
        stats.carves += 1;
    }
}
