//! Procedural maze boards for coalescing simulations.
//!
//! [`MazeGenerator`] grows a random spanning tree of open cells, then
//! carves loops into roughly half of its dead ends while always keeping at
//! least one. The result is a [`Maze`]: an immutable
//! [`Grid`](coalesce_space::Grid) with a single connected open region and
//! its non-empty [`DeadEndSet`](coalesce_space::DeadEndSet).
//!
//! Generation is deterministic for a given RNG state; use
//! [`MazeGenerator::generate_seeded`] for a ChaCha8-backed board from a
//! plain `u64` seed.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod canvas;
pub mod error;
pub mod generator;

pub use error::MazeError;
pub use generator::{GenerationStats, Maze, MazeGenerator};
