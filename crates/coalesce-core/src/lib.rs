//! Core types for the coalesce workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! value types shared by every other crate ([`Cell`], [`Move`]) and the
//! error enums surfaced by configuration, estimation, and search.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod error;

pub use cell::{Cell, Move};
pub use error::{ConfigError, EstimatorError, SearchError};
