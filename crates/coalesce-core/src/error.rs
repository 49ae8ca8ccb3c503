//! Error types for the coalesce workspace.
//!
//! Organized by failure kind: configuration (rejected before any work
//! starts), estimation (the learned cost estimator misbehaved), and search
//! (budget aborts and broken invariants). None of these are transient;
//! callers should not retry.

use std::error::Error;
use std::fmt;

use crate::cell::Cell;

/// Input rejected before generation or search begins.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Board dimension below the minimum of 2.
    BoardTooSmall {
        /// The configured size.
        size: u32,
    },
    /// A board dimension does not fit the `i32` coordinate space.
    DimensionTooLarge {
        /// Which dimension.
        name: &'static str,
        /// The configured value.
        value: usize,
        /// Largest accepted value.
        max: usize,
    },
    /// A grid row has a different length from the first row.
    RaggedGrid {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// A character in a textual grid is neither `.` nor `#`.
    InvalidGridChar {
        /// Row of the character.
        row: usize,
        /// Column of the character.
        col: usize,
        /// The character itself.
        ch: char,
    },
    /// The grid has no open cells.
    NoOpenCells,
    /// Some open cells cannot reach the others through open neighbours.
    DisconnectedGrid {
        /// Open cells outside the region containing the first open cell.
        unreachable: usize,
    },
    /// A search was started with no agent locations.
    EmptyStart,
    /// A start location is a wall or off the board.
    StartCellClosed {
        /// The offending location.
        cell: Cell,
    },
    /// Occupancy fraction outside `(0, 1]` or not finite.
    InvalidOccupancy {
        /// The invalid value.
        value: f64,
    },
    /// A worker count of zero was requested.
    ZeroWorkers,
    /// A learned heuristic was selected but no estimator was supplied.
    MissingEstimator,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoardTooSmall { size } => {
                write!(f, "board size {size} is below minimum of 2")
            }
            Self::DimensionTooLarge { name, value, max } => {
                write!(f, "{name} {value} exceeds maximum of {max}")
            }
            Self::RaggedGrid {
                row,
                expected,
                found,
            } => write!(
                f,
                "grid row {row} has {found} cells, expected {expected}"
            ),
            Self::InvalidGridChar { row, col, ch } => {
                write!(f, "invalid grid character {ch:?} at ({row}, {col})")
            }
            Self::NoOpenCells => write!(f, "grid has no open cells"),
            Self::DisconnectedGrid { unreachable } => write!(
                f,
                "grid open region is disconnected ({unreachable} cells unreachable)"
            ),
            Self::EmptyStart => write!(f, "start state has no agent locations"),
            Self::StartCellClosed { cell } => {
                write!(f, "start location {cell} is not an open cell")
            }
            Self::InvalidOccupancy { value } => {
                write!(f, "occupancy must be finite and in (0, 1], got {value}")
            }
            Self::ZeroWorkers => write!(f, "worker count must be at least 1"),
            Self::MissingEstimator => {
                write!(f, "learned heuristic selected without an estimator")
            }
        }
    }
}

impl Error for ConfigError {}

/// Failures of the learned cost estimator.
///
/// Propagated to the search caller as-is; the search never substitutes a
/// default estimate.
#[derive(Clone, Debug, PartialEq)]
pub enum EstimatorError {
    /// Feature vector length does not match the estimator's input width.
    InputLength {
        /// Width the estimator expects.
        expected: usize,
        /// Width it was given.
        found: usize,
    },
    /// The estimator produced NaN or an infinity.
    NonFinite {
        /// The offending output.
        value: f64,
    },
    /// The estimator failed internally.
    Failed {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for EstimatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputLength { expected, found } => {
                write!(f, "estimator expects {expected} features, got {found}")
            }
            Self::NonFinite { value } => write!(f, "estimator produced non-finite value {value}"),
            Self::Failed { reason } => write!(f, "estimator failed: {reason}"),
        }
    }
}

impl Error for EstimatorError {}

/// Errors from the coalescing search and the distance cache build.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchError {
    /// The start state or board was rejected.
    Config(ConfigError),
    /// The priority queue emptied before any goal state was reached. The
    /// board's single-region guarantee makes this an internal defect.
    Exhausted {
        /// Number of states expanded before the queue ran dry.
        expanded: u64,
    },
    /// The heuristic's estimator failed.
    Estimator(EstimatorError),
    /// The pairwise cache has no entry for an active pair.
    MissingPair {
        /// First cell of the pair.
        a: Cell,
        /// Second cell of the pair.
        b: Cell,
    },
    /// The caller's cancellation token fired.
    Cancelled,
    /// The caller's deadline passed.
    DeadlineExceeded {
        /// Milliseconds spent before the abort.
        elapsed_ms: u64,
    },
    /// The expansion budget ran out.
    ExpansionLimit {
        /// The configured limit.
        limit: u64,
    },
    /// A cache worker thread panicked or disconnected.
    WorkerFailed {
        /// Description of what went wrong.
        reason: String,
    },
}

impl SearchError {
    /// Whether this error came from a caller budget rather than a defect.
    pub fn is_budget_abort(&self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::DeadlineExceeded { .. } | Self::ExpansionLimit { .. }
        )
    }
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Exhausted { expanded } => write!(
                f,
                "search queue exhausted after {expanded} expansions without coalescing"
            ),
            Self::Estimator(e) => write!(f, "estimator: {e}"),
            Self::MissingPair { a, b } => {
                write!(f, "no cached coalescing distance for pair {a} / {b}")
            }
            Self::Cancelled => write!(f, "search cancelled"),
            Self::DeadlineExceeded { elapsed_ms } => {
                write!(f, "search deadline exceeded after {elapsed_ms} ms")
            }
            Self::ExpansionLimit { limit } => {
                write!(f, "search exceeded expansion limit of {limit}")
            }
            Self::WorkerFailed { reason } => write!(f, "cache worker failed: {reason}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Estimator(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for SearchError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<EstimatorError> for SearchError {
    fn from(e: EstimatorError) -> Self {
        Self::Estimator(e)
    }
}
