//! Multi-agent coalescing search.
//!
//! Indistinguishable agents sit on open cells of a [`Grid`]. Every move
//! shifts all of them one step in the same cardinal direction; agents
//! blocked by a wall stay put, and agents landing on the same cell merge.
//! The search finds the fewest moves that leave a single location.
//!
//! - [`SearchState`]: canonical location set plus transition semantics.
//! - [`CoalescingPathfinder`]: duplicate-tolerant A* over location sets.
//! - [`PairwiseDistanceCache`]: exact two-agent meeting distances for every
//!   pair of open cells, built once per grid (optionally in parallel).
//! - [`Heuristic`]: the cost-to-go estimators, including the pairwise-max
//!   estimator backed by the cache and a pluggable [`CostEstimator`].
//! - [`SearchBudget`]: cancellation, deadlines, and expansion limits.
//!
//! [`Grid`]: coalesce_space::Grid

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod budget;
pub mod cache;
pub mod estimator;
pub mod heuristic;
pub mod metrics;
pub mod pathfinder;
pub mod state;

pub use budget::{CancelToken, SearchBudget};
pub use cache::PairwiseDistanceCache;
pub use estimator::{CostEstimator, FnEstimator};
pub use heuristic::Heuristic;
pub use metrics::{CacheMetrics, SearchMetrics};
pub use pathfinder::{CoalescingPathfinder, Solution};
pub use state::{LocationSet, SearchState};
