//! Grid boards for coalescing simulations.
//!
//! A [`Grid`] is a rectangular matrix of [`CellStatus`] values with a
//! 4-connected neighbourhood. Grids are immutable once built and are
//! shared by reference between the maze generator, the search engine, and
//! the distance cache.
//!
//! Every constructor enforces the board invariants: rectangular shape, at
//! least one open cell, and a single connected open region.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dead_end;
pub mod grid;

pub use dead_end::DeadEndSet;
pub use grid::{CellStatus, Grid};
