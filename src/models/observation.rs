//! Measurement (sensor) models
//!
//! Describes how sensor readings relate to target states.

use nalgebra::{RealField, SMatrix};
use num_traits::Float;

use crate::types::spaces::MeasurementCovariance;
use crate::types::transforms::ObservationMatrix;
use crate::{GmphdError, Result};

/// Linear measurement model.
///
/// Describes the measurement process:
/// z = H * x + v,  v ~ N(0, R)
pub trait MeasurementModel<T: RealField + Copy, const N: usize, const M: usize> {
    /// Observation matrix H.
    fn measurement_matrix(&self) -> ObservationMatrix<T, M, N>;

    /// Measurement noise covariance R.
    fn noise_matrix(&self) -> MeasurementCovariance<T, M>;
}

// ============================================================================
// Coordinate Measurement Model
// ============================================================================

/// Observes a subset of the state coordinates directly.
///
/// Row `i` of H selects state coordinate `indices[i]`; R is diagonal with
/// variances `sigmas[i]^2`.
#[derive(Debug, Clone)]
pub struct LinearCoordinateMeasurementModel<T: RealField, const N: usize, const M: usize> {
    indices: [usize; M],
    sigmas: [T; M],
}

impl<T: RealField + Float + Copy, const N: usize, const M: usize>
    LinearCoordinateMeasurementModel<T, N, M>
{
    /// Creates a model observing `indices` with per-coordinate noise `sigmas`.
    ///
    /// Fails with [`GmphdError::DimensionMismatch`] when an index does not
    /// address a state coordinate, and with [`GmphdError::InvalidParameter`]
    /// when a noise value is negative or not finite. Zero noise is allowed.
    pub fn new(indices: [usize; M], sigmas: [T; M]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= N) {
            return Err(GmphdError::DimensionMismatch {
                expected: N,
                actual: bad + 1,
            });
        }
        if sigmas.iter().any(|&s| !Float::is_finite(s) || s < T::zero()) {
            return Err(GmphdError::InvalidParameter { name: "sigmas" });
        }
        Ok(Self { indices, sigmas })
    }

    /// Same noise on every observed coordinate.
    pub fn isotropic(indices: [usize; M], sigma: T) -> Result<Self> {
        Self::new(indices, [sigma; M])
    }

    #[inline]
    pub fn indices(&self) -> &[usize; M] {
        &self.indices
    }
}

impl<T: RealField + Float + Copy> LinearCoordinateMeasurementModel<T, 4, 2> {
    /// Position sensor for the 2D constant velocity state [x, y, vx, vy].
    pub fn position_2d(sigma: T) -> Result<Self> {
        Self::isotropic([0, 1], sigma)
    }
}

impl<T: RealField + Float + Copy> LinearCoordinateMeasurementModel<T, 6, 3> {
    /// Position sensor for the 3D constant velocity state [x, y, z, vx, vy, vz].
    pub fn position_3d(sigma: T) -> Result<Self> {
        Self::isotropic([0, 1, 2], sigma)
    }
}

impl<T: RealField + Float + Copy, const N: usize, const M: usize> MeasurementModel<T, N, M>
    for LinearCoordinateMeasurementModel<T, N, M>
{
    fn measurement_matrix(&self) -> ObservationMatrix<T, M, N> {
        let mut h = SMatrix::<T, M, N>::zeros();
        for (row, &col) in self.indices.iter().enumerate() {
            h[(row, col)] = T::one();
        }
        ObservationMatrix::from_matrix(h)
    }

    fn noise_matrix(&self) -> MeasurementCovariance<T, M> {
        let variances = nalgebra::SVector::<T, M>::from_fn(|i, _| self.sigmas[i] * self.sigmas[i]);
        MeasurementCovariance::from_diagonal(&variances)
    }
}

// ============================================================================
// Explicit Matrix Model
// ============================================================================

/// Measurement model with caller-supplied H and R.
#[derive(Debug, Clone)]
pub struct LinearMeasurementModel<T: RealField, const N: usize, const M: usize> {
    h: ObservationMatrix<T, M, N>,
    r: MeasurementCovariance<T, M>,
}

impl<T: RealField + Copy, const N: usize, const M: usize> LinearMeasurementModel<T, N, M> {
    #[inline]
    pub fn new(h: ObservationMatrix<T, M, N>, r: MeasurementCovariance<T, M>) -> Self {
        Self { h, r }
    }

    /// Builds the model from row-major slices of H (`M * N`) and R (`M * M`).
    pub fn try_from_row_slices(h: &[T], r: &[T]) -> Result<Self> {
        Ok(Self::new(
            ObservationMatrix::try_from_row_slice(h)?,
            MeasurementCovariance::try_from_row_slice(r)?,
        ))
    }
}

impl<T: RealField + Copy, const N: usize> LinearMeasurementModel<T, N, N> {
    /// Full-state observation H = I with noise R.
    pub fn identity(r: MeasurementCovariance<T, N>) -> Self {
        Self::new(ObservationMatrix::from_matrix(SMatrix::identity()), r)
    }
}

impl<T: RealField + Copy, const N: usize, const M: usize> MeasurementModel<T, N, M>
    for LinearMeasurementModel<T, N, M>
{
    fn measurement_matrix(&self) -> ObservationMatrix<T, M, N> {
        self.h.clone()
    }

    fn noise_matrix(&self) -> MeasurementCovariance<T, M> {
        self.r.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::spaces::StateVector;

    #[test]
    fn test_position_sensor_2d() {
        let sensor = LinearCoordinateMeasurementModel::<f64, 4, 2>::position_2d(1.5).unwrap();
        let state = StateVector::from_array([10.0, 20.0, 1.0, 2.0]);

        let z = sensor.measurement_matrix().observe(&state);
        assert_eq!(z.as_slice(), &[10.0, 20.0]);

        let r = sensor.noise_matrix();
        assert!((r.as_matrix()[(0, 0)] - 2.25).abs() < 1e-12);
        assert!(r.as_matrix()[(0, 1)].abs() < 1e-12);
    }

    #[test]
    fn test_coordinate_selection_order() {
        let sensor = LinearCoordinateMeasurementModel::<f64, 3, 2>::new([2, 0], [1.0, 2.0]).unwrap();
        let z = sensor
            .measurement_matrix()
            .observe(&StateVector::from_array([7.0, 8.0, 9.0]));
        assert_eq!(z.as_slice(), &[9.0, 7.0]);
        assert!((sensor.noise_matrix().as_matrix()[(1, 1)] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_coordinate_out_of_range() {
        let err = LinearCoordinateMeasurementModel::<f64, 4, 2>::new([0, 4], [1.0, 1.0]).unwrap_err();
        assert_eq!(err, GmphdError::DimensionMismatch { expected: 4, actual: 5 });

        let err = LinearCoordinateMeasurementModel::<f64, 4, 1>::isotropic([0], -1.0).unwrap_err();
        assert_eq!(err, GmphdError::InvalidParameter { name: "sigmas" });
    }

    #[test]
    fn test_explicit_model() {
        let model = LinearMeasurementModel::<f64, 2, 1>::try_from_row_slices(&[1.0, 1.0], &[0.5]).unwrap();
        let z = model
            .measurement_matrix()
            .observe(&StateVector::from_array([2.0, 3.0]));
        assert_eq!(z.as_slice(), &[5.0]);

        assert!(LinearMeasurementModel::<f64, 2, 1>::try_from_row_slices(&[1.0], &[0.5]).is_err());
    }
}
