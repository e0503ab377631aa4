//! Gaussian beliefs over state and measurement space
//!
//! A single-target estimator works on one Gaussian at a time: the state belief
//! `(mean, cov)` and the predicted measurement `(z_hat, S)` derived from it.

use nalgebra::RealField;

use super::spaces::{Innovation, Measurement, MeasurementCovariance, StateCovariance, StateVector};
use crate::{GmphdError, Result};

// ============================================================================
// State Estimate
// ============================================================================

/// Gaussian belief over a target's hidden state.
///
/// # Type Parameters
///
/// - `T`: Scalar type (typically `f32` or `f64`)
/// - `N`: State dimension
#[derive(Debug, Clone, PartialEq)]
pub struct StateEstimate<T: RealField, const N: usize> {
    /// State mean
    pub mean: StateVector<T, N>,
    /// State covariance
    pub covariance: StateCovariance<T, N>,
}

impl<T: RealField + Copy, const N: usize> Copy for StateEstimate<T, N> {}

impl<T: RealField + Copy, const N: usize> StateEstimate<T, N> {
    #[inline]
    pub fn new(mean: StateVector<T, N>, covariance: StateCovariance<T, N>) -> Self {
        Self { mean, covariance }
    }

    /// Creates an estimate with a diagonal covariance.
    #[inline]
    pub fn with_diagonal_covariance(
        mean: StateVector<T, N>,
        diagonal: &nalgebra::SVector<T, N>,
    ) -> Self {
        Self::new(mean, StateCovariance::from_diagonal(diagonal))
    }

    /// Trace of the covariance (sum of variances).
    #[inline]
    pub fn uncertainty(&self) -> T {
        self.covariance.trace()
    }

    /// Splits into `(mean, covariance)`.
    #[inline]
    pub fn into_parts(self) -> (StateVector<T, N>, StateCovariance<T, N>) {
        (self.mean, self.covariance)
    }
}

// ============================================================================
// Predicted Measurement
// ============================================================================

/// Expected measurement `z_hat` and innovation covariance `S` for a state.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedMeasurement<T: RealField, const M: usize> {
    /// Expected measurement H * x
    pub z_hat: Measurement<T, M>,
    /// Innovation covariance H * P * H^T + R
    pub innovation_covariance: MeasurementCovariance<T, M>,
}

impl<T: RealField + Copy, const M: usize> Copy for PredictedMeasurement<T, M> {}

impl<T: RealField + Copy, const M: usize> PredictedMeasurement<T, M> {
    #[inline]
    pub fn new(z_hat: Measurement<T, M>, innovation_covariance: MeasurementCovariance<T, M>) -> Self {
        Self {
            z_hat,
            innovation_covariance,
        }
    }

    /// Splits into `(z_hat, S)`.
    #[inline]
    pub fn into_parts(self) -> (Measurement<T, M>, MeasurementCovariance<T, M>) {
        (self.z_hat, self.innovation_covariance)
    }
}

/// How [`crate::filters::Filter::update`] obtains `(z_hat, S)`.
///
/// `Reuse` hands over a value from an earlier `predict_measurement` call. It is
/// used verbatim; the caller guarantees it was computed from the same state
/// and measurement model passed to `update`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeasurementPrediction<'a, T: RealField, const M: usize> {
    /// Derive `(z_hat, S)` from the state and measurement model.
    Compute,
    /// Use a previously computed prediction.
    Reuse(&'a PredictedMeasurement<T, M>),
}

impl<'a, T: RealField, const M: usize> From<&'a PredictedMeasurement<T, M>>
    for MeasurementPrediction<'a, T, M>
{
    fn from(prediction: &'a PredictedMeasurement<T, M>) -> Self {
        MeasurementPrediction::Reuse(prediction)
    }
}

// ============================================================================
// Likelihood
// ============================================================================

/// Squared Mahalanobis distance `νᵀ S⁻¹ ν`.
///
/// Fails with [`GmphdError::SingularMatrix`] when `S` is not positive definite.
pub fn mahalanobis_squared<T: RealField + Copy, const M: usize>(
    innovation: &Innovation<T, M>,
    innovation_cov: &MeasurementCovariance<T, M>,
) -> Result<T> {
    let chol = nalgebra::Cholesky::new(*innovation_cov.as_matrix()).ok_or(GmphdError::SingularMatrix)?;
    let nu = innovation.as_svector();
    Ok(nu.dot(&chol.solve(nu)))
}

/// Log density of a zero-mean Gaussian with covariance `S` at `ν`.
pub fn innovation_log_likelihood<T: RealField + Copy, const M: usize>(
    innovation: &Innovation<T, M>,
    innovation_cov: &MeasurementCovariance<T, M>,
) -> Result<T> {
    let l = innovation_cov.cholesky().ok_or(GmphdError::SingularMatrix)?;
    let two: T = nalgebra::convert(2.0);
    let half: T = nalgebra::convert(0.5);
    let m: T = nalgebra::convert(M as f64);

    // log|S| = 2 * sum(log(diag(L)))
    let log_det = (0..M).fold(T::zero(), |acc, i| acc + l[(i, i)].ln()) * two;
    let mahal_sq = mahalanobis_squared(innovation, innovation_cov)?;

    Ok(-half * (m * T::two_pi().ln() + log_det + mahal_sq))
}

/// Density of a zero-mean Gaussian with covariance `S` at `ν`.
pub fn innovation_likelihood<T: RealField + Copy, const M: usize>(
    innovation: &Innovation<T, M>,
    innovation_cov: &MeasurementCovariance<T, M>,
) -> Result<T> {
    innovation_log_likelihood(innovation, innovation_cov).map(|ll| ll.exp())
}
