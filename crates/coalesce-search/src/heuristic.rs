//! Cost-to-go estimators for the coalescing search.

use std::fmt;
use std::sync::Arc;

use coalesce_core::{EstimatorError, SearchError};

use crate::cache::PairwiseDistanceCache;
use crate::estimator::CostEstimator;
use crate::state::SearchState;

/// A heuristic over [`SearchState`]s.
///
/// Every variant returns `0.0` for a coalesced state. Cheap to clone; the
/// cache and the estimator are shared.
#[derive(Clone)]
pub enum Heuristic {
    /// Always zero. Turns the search into uniform-cost search.
    Zero,
    /// Largest Manhattan distance between any two locations.
    ///
    /// Admissible: one move changes a pair's row gap or column gap by at
    /// most one. Used for the two-agent searches that fill the cache.
    Manhattan,
    /// Largest cached two-agent meeting distance over all location pairs.
    ///
    /// Admissible and consistent: under shared moves each pair follows
    /// exactly its two-agent trajectory, so the whole set cannot coalesce
    /// before its slowest pair does.
    PairwiseMax(Arc<PairwiseDistanceCache>),
    /// An external model fed the row-major occupancy encoding. Carries no
    /// admissibility guarantee.
    Learned(Arc<dyn CostEstimator>),
}

impl Heuristic {
    /// Estimate the remaining moves from `state`.
    ///
    /// # Errors
    ///
    /// [`SearchError::MissingPair`] if the cache lacks an active pair, and
    /// [`SearchError::Estimator`] if the learned estimator rejects the input
    /// or returns a non-finite value.
    pub fn estimate(&self, state: &SearchState<'_>) -> Result<f64, SearchError> {
        if state.is_goal() {
            return Ok(0.0);
        }
        let locations = state.locations();
        match self {
            Self::Zero => Ok(0.0),
            Self::Manhattan => Ok(locations
                .pairs()
                .map(|(a, b)| a.manhattan(b))
                .max()
                .unwrap_or(0) as f64),
            Self::PairwiseMax(cache) => {
                let mut best = 0;
                for (a, b) in locations.pairs() {
                    let d = cache.get(a, b).ok_or(SearchError::MissingPair { a, b })?;
                    best = best.max(d);
                }
                Ok(best as f64)
            }
            Self::Learned(estimator) => {
                let features = state.grid().encode_occupancy(locations.as_slice());
                if features.len() != estimator.input_len() {
                    return Err(EstimatorError::InputLength {
                        expected: estimator.input_len(),
                        found: features.len(),
                    }
                    .into());
                }
                let value = estimator.estimate(&features)?;
                if !value.is_finite() {
                    return Err(EstimatorError::NonFinite { value }.into());
                }
                Ok(value)
            }
        }
    }

    /// Short name for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::Manhattan => "manhattan",
            Self::PairwiseMax(_) => "pairwise-max",
            Self::Learned(_) => "learned",
        }
    }

    /// Whether the estimate never exceeds the true remaining cost, which
    /// makes the first goal pop optimal.
    pub fn is_admissible(&self) -> bool {
        !matches!(self, Self::Learned(_))
    }
}

impl fmt::Debug for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => f.write_str("Zero"),
            Self::Manhattan => f.write_str("Manhattan"),
            Self::PairwiseMax(cache) => f
                .debug_tuple("PairwiseMax")
                .field(&format_args!("{} pairs", cache.len()))
                .finish(),
            Self::Learned(estimator) => f
                .debug_tuple("Learned")
                .field(&format_args!("input_len={}", estimator.input_len()))
                .finish(),
        }
    }
}
