//! Linear Kalman filter
//!
//! The linear-Gaussian implementation of [`Filter`]. The filter holds no
//! state and no models; both are passed to every call, so one instance can
//! serve every mixture component of a GM-PHD tracker.
//!
//! # Example
//!
//! ```
//! use gmphd_fusion::prelude::*;
//!
//! let filter = KalmanFilter;
//! let motion = ConstantVelocity2D::new(1.0).unwrap();
//! let sensor = LinearCoordinateMeasurementModel::position_2d(5.0).unwrap();
//!
//! // Initial state: [x, y, vx, vy]
//! let state = StateEstimate::with_diagonal_covariance(
//!     StateVector::from_array([0.0, 0.0, 1.0, 0.0]),
//!     &nalgebra::vector![10.0, 10.0, 1.0, 1.0],
//! );
//!
//! let predicted = filter.predict(&state, &motion, 1.0).unwrap();
//! let z_pred = filter.predict_measurement(&predicted, &sensor).unwrap();
//!
//! let measurement = Measurement::from_array([1.5, 0.2]);
//! let updated = filter
//!     .update(&predicted, &measurement, &sensor, MeasurementPrediction::Reuse(&z_pred))
//!     .unwrap();
//! assert!(updated.uncertainty() < predicted.uncertainty());
//! ```

use nalgebra::RealField;

use super::traits::Filter;
use crate::models::{MeasurementModel, MotionModel};
use crate::types::gaussian::{
    innovation_likelihood, mahalanobis_squared, MeasurementPrediction, PredictedMeasurement,
    StateEstimate,
};
use crate::types::spaces::{ComputeInnovation, Measurement};
use crate::types::transforms::{innovation_covariance, joseph_update, kalman_gain};
use crate::Result;

/// The standard discrete-time linear Kalman filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KalmanFilter;

impl KalmanFilter {
    #[inline]
    pub fn new() -> Self {
        KalmanFilter
    }

    /// Predict followed by update, recomputing `(z_hat, S)`.
    pub fn step<T, Mo, Me, const N: usize, const M: usize>(
        &self,
        state: &StateEstimate<T, N>,
        motion_model: &Mo,
        dt: T,
        measurement: &Measurement<T, M>,
        measurement_model: &Me,
    ) -> Result<StateEstimate<T, N>>
    where
        T: RealField + Copy,
        Mo: MotionModel<T, N> + ?Sized,
        Me: MeasurementModel<T, N, M> + ?Sized,
    {
        let predicted = self.predict(state, motion_model, dt)?;
        self.update(
            &predicted,
            measurement,
            measurement_model,
            MeasurementPrediction::Compute,
        )
    }

    /// Squared Mahalanobis distance of `measurement` from a prediction.
    ///
    /// Compared against a chi-squared quantile with `M` degrees of freedom
    /// this gates unlikely measurement-to-target pairings.
    pub fn mahalanobis_distance_squared<T: RealField + Copy, const M: usize>(
        &self,
        prediction: &PredictedMeasurement<T, M>,
        measurement: &Measurement<T, M>,
    ) -> Result<T> {
        let nu = measurement.innovation(&prediction.z_hat);
        mahalanobis_squared(&nu, &prediction.innovation_covariance)
    }

    /// Gaussian likelihood N(measurement; z_hat, S).
    ///
    /// This is the per-component weight factor of the GM-PHD update.
    pub fn measurement_likelihood<T: RealField + Copy, const M: usize>(
        &self,
        prediction: &PredictedMeasurement<T, M>,
        measurement: &Measurement<T, M>,
    ) -> Result<T> {
        let nu = measurement.innovation(&prediction.z_hat);
        innovation_likelihood(&nu, &prediction.innovation_covariance)
    }
}

impl<T: RealField + Copy, const N: usize> Filter<T, N> for KalmanFilter {
    fn predict<Mo>(&self, state: &StateEstimate<T, N>, motion_model: &Mo, dt: T) -> Result<StateEstimate<T, N>>
    where
        Mo: MotionModel<T, N> + ?Sized,
    {
        let predicted = motion_model.propagate(state, dt)?;
        log::trace!(
            "Kalman predict: dt = {:?}, trace(P) {:?} -> {:?}",
            dt,
            state.covariance.trace(),
            predicted.covariance.trace()
        );
        Ok(predicted)
    }

    fn predict_measurement<Me, const M: usize>(
        &self,
        state: &StateEstimate<T, N>,
        measurement_model: &Me,
    ) -> Result<PredictedMeasurement<T, M>>
    where
        Me: MeasurementModel<T, N, M> + ?Sized,
    {
        let h = measurement_model.measurement_matrix();
        let r = measurement_model.noise_matrix();

        Ok(PredictedMeasurement::new(
            h.observe(&state.mean),
            innovation_covariance(&state.covariance, &h, &r),
        ))
    }

    fn update<Me, const M: usize>(
        &self,
        state: &StateEstimate<T, N>,
        measurement: &Measurement<T, M>,
        measurement_model: &Me,
        prediction: MeasurementPrediction<'_, T, M>,
    ) -> Result<StateEstimate<T, N>>
    where
        Me: MeasurementModel<T, N, M> + ?Sized,
    {
        let h = measurement_model.measurement_matrix();
        let r = measurement_model.noise_matrix();

        let computed;
        let predicted = match prediction {
            MeasurementPrediction::Reuse(predicted) => predicted,
            MeasurementPrediction::Compute => {
                computed = PredictedMeasurement::new(
                    h.observe(&state.mean),
                    innovation_covariance(&state.covariance, &h, &r),
                );
                &computed
            }
        };

        // Innovation
        let nu = measurement.innovation(&predicted.z_hat);

        // W = P * H^T * S^{-1}
        let gain = kalman_gain(&state.covariance, &h, &predicted.innovation_covariance)
            .inspect_err(|_| log::warn!("Kalman update skipped: innovation covariance is singular"))?;

        let mean = state.mean + gain.correct(&nu);
        let covariance = joseph_update(&state.covariance, &gain, &h, &r);

        log::trace!(
            "Kalman update: |innovation| = {:?}, trace(P) {:?} -> {:?}",
            nu.norm(),
            state.covariance.trace(),
            covariance.trace()
        );

        Ok(StateEstimate::new(mean, covariance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConstantVelocity2D, LinearCoordinateMeasurementModel, LinearMeasurementModel};
    use crate::types::spaces::{MeasurementCovariance, StateCovariance, StateVector};
    use crate::GmphdError;

    fn cv_models() -> (ConstantVelocity2D<f64>, LinearCoordinateMeasurementModel<f64, 4, 2>) {
        (
            ConstantVelocity2D::new(0.1).unwrap(),
            LinearCoordinateMeasurementModel::position_2d(1.0).unwrap(),
        )
    }

    #[test]
    fn test_predict() {
        let (motion, _) = cv_models();
        let state = StateEstimate::new(
            StateVector::from_array([0.0, 0.0, 10.0, 0.0]),
            StateCovariance::identity(),
        );

        let predicted = KalmanFilter.predict(&state, &motion, 1.0).unwrap();

        assert!((predicted.mean[0] - 10.0).abs() < 1e-10);
        assert!(predicted.mean[1].abs() < 1e-10);
        assert!((predicted.mean[2] - 10.0).abs() < 1e-10);
        assert!(predicted.uncertainty() > state.uncertainty());
    }

    #[test]
    fn test_predict_propagates_model_error() {
        let (motion, _) = cv_models();
        let state = StateEstimate::new(StateVector::zeros(), StateCovariance::identity());
        assert_eq!(
            KalmanFilter.predict(&state, &motion, -0.5),
            Err(GmphdError::InvalidTimeStep)
        );
    }

    #[test]
    fn test_predict_measurement() {
        let (_, sensor) = cv_models();
        let state = StateEstimate::new(
            StateVector::from_array([3.0, 4.0, 1.0, 1.0]),
            StateCovariance::identity().scale(2.0),
        );

        let predicted = KalmanFilter.predict_measurement(&state, &sensor).unwrap();
        assert_eq!(predicted.z_hat.as_slice(), &[3.0, 4.0]);
        // S = H P H^T + R = 2 + 1
        assert!((predicted.innovation_covariance.as_matrix()[(0, 0)] - 3.0).abs() < 1e-12);
        assert!(predicted.innovation_covariance.as_matrix()[(0, 1)].abs() < 1e-12);
    }

    #[test]
    fn test_update_moves_toward_measurement() {
        let (_, sensor) = cv_models();
        let state = StateEstimate::new(StateVector::zeros(), StateCovariance::identity().scale(100.0));
        let measurement = Measurement::from_array([10.0, 5.0]);

        let updated = KalmanFilter
            .update(&state, &measurement, &sensor, MeasurementPrediction::Compute)
            .unwrap();

        // Gain 100 / 101 on the observed axes
        assert!((updated.mean[0] - 1000.0 / 101.0).abs() < 1e-9);
        assert!((updated.mean[1] - 500.0 / 101.0).abs() < 1e-9);
        assert!(updated.uncertainty() < state.uncertainty());
        assert!(updated.covariance.is_symmetric(1e-12));
    }

    #[test]
    fn test_reused_prediction_matches_recompute() {
        let (motion, sensor) = cv_models();
        let state = StateEstimate::new(
            StateVector::from_array([1.0, 2.0, 0.5, -0.5]),
            StateCovariance::from_diagonal(&nalgebra::vector![4.0, 3.0, 2.0, 1.0]),
        );
        let predicted = KalmanFilter.predict(&state, &motion, 0.5).unwrap();
        let measurement = Measurement::from_array([1.4, 1.6]);

        let z_pred = KalmanFilter.predict_measurement(&predicted, &sensor).unwrap();
        let reused = KalmanFilter
            .update(&predicted, &measurement, &sensor, MeasurementPrediction::Reuse(&z_pred))
            .unwrap();
        let computed = KalmanFilter
            .update(&predicted, &measurement, &sensor, MeasurementPrediction::Compute)
            .unwrap();

        assert!(reused.mean.approx_eq(&computed.mean, 1e-12));
        assert!((reused.covariance.as_matrix() - computed.covariance.as_matrix()).abs().max() < 1e-12);
    }

    #[test]
    fn test_perfect_measurement() {
        let sensor = LinearMeasurementModel::<f64, 2, 2>::identity(MeasurementCovariance::zeros());
        let state = StateEstimate::new(
            StateVector::from_array([0.0, 0.0]),
            StateCovariance::from_matrix(nalgebra::matrix![2.0, 0.5; 0.5, 1.0]),
        );
        let measurement = Measurement::from_array([3.0, -1.0]);

        let updated = KalmanFilter
            .update(&state, &measurement, &sensor, MeasurementPrediction::Compute)
            .unwrap();

        assert!((updated.mean[0] - 3.0).abs() < 1e-10);
        assert!((updated.mean[1] + 1.0).abs() < 1e-10);
        assert!(updated.covariance.as_matrix().abs().max() < 1e-10);
    }

    #[test]
    fn test_singular_innovation_covariance() {
        let sensor = LinearMeasurementModel::<f64, 2, 2>::identity(MeasurementCovariance::zeros());
        let state = StateEstimate::new(StateVector::zeros(), StateCovariance::zeros());

        let result = KalmanFilter.update(
            &state,
            &Measurement::from_array([1.0, 1.0]),
            &sensor,
            MeasurementPrediction::Compute,
        );
        assert_eq!(result, Err(GmphdError::SingularMatrix));
    }

    #[test]
    fn test_step() {
        let (motion, sensor) = cv_models();
        let state = StateEstimate::new(
            StateVector::from_array([0.0, 0.0, 10.0, 5.0]),
            StateCovariance::identity(),
        );

        let updated = KalmanFilter
            .step(&state, &motion, 1.0, &Measurement::from_array([10.0, 5.0]), &sensor)
            .unwrap();

        assert!((updated.mean[0] - 10.0).abs() < 1e-9);
        assert!((updated.mean[1] - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_gating_and_likelihood() {
        let (_, sensor) = cv_models();
        let state = StateEstimate::new(
            StateVector::from_array([10.0, 5.0, 0.0, 0.0]),
            StateCovariance::identity(),
        );
        let z_pred = KalmanFilter.predict_measurement(&state, &sensor).unwrap();

        let close = Measurement::from_array([10.0, 5.0]);
        let far = Measurement::from_array([100.0, 100.0]);

        let d_close = KalmanFilter.mahalanobis_distance_squared(&z_pred, &close).unwrap();
        let d_far = KalmanFilter.mahalanobis_distance_squared(&z_pred, &far).unwrap();
        assert!(d_close < 1e-12);
        assert!(d_far > d_close);

        let l_close = KalmanFilter.measurement_likelihood(&z_pred, &close).unwrap();
        let l_far = KalmanFilter.measurement_likelihood(&z_pred, &far).unwrap();
        // Peak of a 2D Gaussian with S = 2I is 1 / (2 * pi * 2)
        assert!((l_close - 1.0 / (4.0 * core::f64::consts::PI)).abs() < 1e-12);
        assert!(l_close > l_far);
    }
}
