//! Pluggable learned cost estimator.

use std::fmt;

use coalesce_core::EstimatorError;

/// A cost-to-go model over encoded boards.
///
/// The input is the board in row-major order with one feature per cell:
/// `-1.0` for a wall, `0.0` for an empty open cell and `1.0` for an
/// occupied cell (see [`Grid::encode_occupancy`]). Implementations must be
/// callable from several solver threads at once.
///
/// [`Grid::encode_occupancy`]: coalesce_space::Grid::encode_occupancy
pub trait CostEstimator: Send + Sync {
    /// Number of features the estimator expects.
    fn input_len(&self) -> usize;

    /// Predict the remaining moves for an encoded board.
    ///
    /// # Errors
    ///
    /// Any [`EstimatorError`]; the search propagates it unchanged.
    fn estimate(&self, features: &[f64]) -> Result<f64, EstimatorError>;
}

/// Adapts a closure to [`CostEstimator`].
///
/// Checks the input width before calling the closure.
///
/// ```
/// use coalesce_search::{CostEstimator, FnEstimator};
///
/// let occupied = FnEstimator::new(4, |f: &[f64]| {
///     Ok(f.iter().filter(|&&x| x > 0.0).count() as f64)
/// });
/// assert_eq!(occupied.estimate(&[1.0, 0.0, -1.0, 1.0]).unwrap(), 2.0);
/// assert!(occupied.estimate(&[1.0]).is_err());
/// ```
pub struct FnEstimator<F> {
    input_len: usize,
    f: F,
}

impl<F> FnEstimator<F>
where
    F: Fn(&[f64]) -> Result<f64, EstimatorError> + Send + Sync,
{
    /// Wrap `f`, which expects `input_len` features.
    pub fn new(input_len: usize, f: F) -> Self {
        Self { input_len, f }
    }
}

impl<F> CostEstimator for FnEstimator<F>
where
    F: Fn(&[f64]) -> Result<f64, EstimatorError> + Send + Sync,
{
    fn input_len(&self) -> usize {
        self.input_len
    }

    fn estimate(&self, features: &[f64]) -> Result<f64, EstimatorError> {
        if features.len() != self.input_len {
            return Err(EstimatorError::InputLength {
                expected: self.input_len,
                found: features.len(),
            });
        }
        (self.f)(features)
    }
}

impl<F> fmt::Debug for FnEstimator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnEstimator")
            .field("input_len", &self.input_len)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_checked_before_call() {
        let est = FnEstimator::new(3, |_: &[f64]| -> Result<f64, EstimatorError> {
            panic!("closure must not run on a bad width")
        });
        assert_eq!(
            est.estimate(&[0.0; 2]),
            Err(EstimatorError::InputLength {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn closure_errors_pass_through() {
        let est = FnEstimator::new(1, |_: &[f64]| {
            Err(EstimatorError::Failed {
                reason: "model not loaded".into(),
            })
        });
        assert!(matches!(
            est.estimate(&[0.0]),
            Err(EstimatorError::Failed { .. })
        ));
    }

    #[test]
    fn usable_as_trait_object() {
        let est: Box<dyn CostEstimator> = Box::new(FnEstimator::new(2, |f: &[f64]| Ok(f[0] + f[1])));
        assert_eq!(est.input_len(), 2);
        assert_eq!(est.estimate(&[1.0, 2.0]), Ok(3.0));
    }
}
