//! Seeded coalescing trials for the coalesce workspace.
//!
//! A trial generates a board, places agents, builds the pairwise distance
//! cache, solves, and optionally replays the solution to check it:
//!
//! - [`TrialConfig`]: validated trial parameters.
//! - [`TrialRunner`]: runs one trial per index, reproducibly.
//! - [`TrialRunner::run_batch`]: independent trials across worker threads,
//!   aggregated into a [`BatchReport`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod batched;
pub mod config;
pub mod sampling;
pub mod trial;

pub use batched::{BatchError, BatchReport};
pub use config::{HeuristicChoice, Occupancy, TrialConfig};
pub use sampling::sample_agents;
pub use trial::{TrialError, TrialReport, TrialRunner};
