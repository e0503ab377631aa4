//! Typed transformation matrices and the shared Kalman algebra
//!
//! Matrices carry their source and target spaces, so a transition matrix can
//! only act on state vectors and a gain can only act on innovations.

use ::core::marker::PhantomData;
use nalgebra::{RealField, SMatrix, Scalar};

use super::spaces::{
    Innovation, InnovationSpace, Measurement, MeasurementCovariance, MeasurementSpace,
    StateCovariance, StateSpace, StateVector,
};
use crate::{GmphdError, Result};

// ============================================================================
// Transform Matrix
// ============================================================================

/// A matrix mapping vectors of space `From` (dimension `COLS`) to space `To`
/// (dimension `ROWS`).
#[repr(transparent)]
#[derive(Debug, Clone, PartialEq)]
pub struct Transform<T: Scalar, const ROWS: usize, const COLS: usize, To, From> {
    inner: SMatrix<T, ROWS, COLS>,
    _marker: PhantomData<(To, From)>,
}

impl<T: Scalar, const ROWS: usize, const COLS: usize, To, From> Transform<T, ROWS, COLS, To, From> {
    #[inline]
    pub fn from_matrix(inner: SMatrix<T, ROWS, COLS>) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// Creates a transform from `ROWS * COLS` values in row-major order.
    pub fn try_from_row_slice(data: &[T]) -> Result<Self> {
        if data.len() != ROWS * COLS {
            return Err(GmphdError::DimensionMismatch {
                expected: ROWS * COLS,
                actual: data.len(),
            });
        }
        Ok(Self::from_matrix(SMatrix::from_row_slice(data)))
    }

    #[inline]
    pub fn as_matrix(&self) -> &SMatrix<T, ROWS, COLS> {
        &self.inner
    }

    #[inline]
    pub fn into_matrix(self) -> SMatrix<T, ROWS, COLS> {
        self.inner
    }
}

impl<T: Scalar + Copy, const ROWS: usize, const COLS: usize, To: Clone, From: Clone> Copy
    for Transform<T, ROWS, COLS, To, From>
where
    SMatrix<T, ROWS, COLS>: Copy,
{
}

impl<T: RealField + Copy, const ROWS: usize, const COLS: usize, To, From>
    Transform<T, ROWS, COLS, To, From>
{
    #[inline]
    pub fn zeros() -> Self {
        Self::from_matrix(SMatrix::zeros())
    }

    /// Transpose, mapping `To` back to `From`.
    #[inline]
    pub fn transpose(&self) -> Transform<T, COLS, ROWS, From, To> {
        Transform::from_matrix(self.inner.transpose())
    }
}

/// State transition matrix F: StateSpace -> StateSpace
pub type TransitionMatrix<T, const N: usize> = Transform<T, N, N, StateSpace, StateSpace>;

/// Observation matrix H: StateSpace -> MeasurementSpace
pub type ObservationMatrix<T, const M: usize, const N: usize> =
    Transform<T, M, N, MeasurementSpace, StateSpace>;

/// Kalman gain W: InnovationSpace -> StateSpace
pub type KalmanGain<T, const N: usize, const M: usize> =
    Transform<T, N, M, StateSpace, InnovationSpace>;

impl<T: RealField + Copy, const N: usize> TransitionMatrix<T, N> {
    #[inline]
    pub fn identity() -> Self {
        Self::from_matrix(SMatrix::identity())
    }

    /// F * x
    #[inline]
    pub fn apply_state(&self, state: &StateVector<T, N>) -> StateVector<T, N> {
        StateVector::from_svector(self.inner * state.as_svector())
    }

    /// F * P * F^T
    #[inline]
    pub fn propagate_covariance(&self, cov: &StateCovariance<T, N>) -> StateCovariance<T, N> {
        StateCovariance::from_matrix(self.inner * cov.as_matrix() * self.inner.transpose())
    }
}

impl<T: RealField + Copy, const M: usize, const N: usize> ObservationMatrix<T, M, N> {
    /// H * x
    #[inline]
    pub fn observe(&self, state: &StateVector<T, N>) -> Measurement<T, M> {
        Measurement::from_svector(self.inner * state.as_svector())
    }

    /// H * P * H^T
    #[inline]
    pub fn project_covariance(&self, cov: &StateCovariance<T, N>) -> MeasurementCovariance<T, M> {
        MeasurementCovariance::from_matrix(self.inner * cov.as_matrix() * self.inner.transpose())
    }
}

impl<T: RealField + Copy, const N: usize, const M: usize> KalmanGain<T, N, M> {
    /// W * ν
    #[inline]
    pub fn correct(&self, innovation: &Innovation<T, M>) -> StateVector<T, N> {
        StateVector::from_svector(self.inner * innovation.as_svector())
    }
}

// ============================================================================
// Kalman Algebra
// ============================================================================

/// S = H * P * H^T + R
pub fn innovation_covariance<T: RealField + Copy, const N: usize, const M: usize>(
    state_cov: &StateCovariance<T, N>,
    obs_matrix: &ObservationMatrix<T, M, N>,
    meas_noise: &MeasurementCovariance<T, M>,
) -> MeasurementCovariance<T, M> {
    let h_p_ht = obs_matrix.project_covariance(state_cov);
    MeasurementCovariance::from_matrix(h_p_ht.as_matrix() + meas_noise.as_matrix())
}

/// W = P * H^T * S^{-1}
///
/// Fails with [`GmphdError::SingularMatrix`] when S cannot be inverted.
pub fn kalman_gain<T: RealField + Copy, const N: usize, const M: usize>(
    state_cov: &StateCovariance<T, N>,
    obs_matrix: &ObservationMatrix<T, M, N>,
    innovation_cov: &MeasurementCovariance<T, M>,
) -> Result<KalmanGain<T, N, M>> {
    let s_inv = innovation_cov
        .as_matrix()
        .try_inverse()
        .ok_or(GmphdError::SingularMatrix)?;

    let w = state_cov.as_matrix() * obs_matrix.as_matrix().transpose() * s_inv;
    Ok(KalmanGain::from_matrix(w))
}

/// Joseph-form covariance update.
///
/// P' = (I - W*H) * P * (I - W*H)^T + W * R * W^T
///
/// Both terms are congruence transforms of symmetric PSD matrices, so the
/// result stays symmetric PSD under rounding. The short form (I - W*H) * P
/// does not.
pub fn joseph_update<T: RealField + Copy, const N: usize, const M: usize>(
    state_cov: &StateCovariance<T, N>,
    gain: &KalmanGain<T, N, M>,
    obs_matrix: &ObservationMatrix<T, M, N>,
    meas_noise: &MeasurementCovariance<T, M>,
) -> StateCovariance<T, N> {
    let i_wh = SMatrix::<T, N, N>::identity() - gain.as_matrix() * obs_matrix.as_matrix();

    let prior_term = i_wh * state_cov.as_matrix() * i_wh.transpose();
    let noise_term = gain.as_matrix() * meas_noise.as_matrix() * gain.as_matrix().transpose();

    StateCovariance::from_matrix(prior_term + noise_term)
}
