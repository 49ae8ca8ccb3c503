//! Error types for maze generation.

use std::error::Error;
use std::fmt;

use coalesce_core::ConfigError;

/// Errors arising from maze generation.
#[derive(Clone, Debug, PartialEq)]
pub enum MazeError {
    /// The board size or the finished board was rejected.
    Config(ConfigError),
    /// Generation finished without a single dead end. The loop-carving
    /// guard makes this an internal defect.
    NoDeadEnds,
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::NoDeadEnds => write!(f, "generated maze has no dead ends"),
        }
    }
}

impl Error for MazeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::NoDeadEnds => None,
        }
    }
}

impl From<ConfigError> for MazeError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
