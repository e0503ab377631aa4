//! The point-estimate filter contract.

use nalgebra::RealField;

use crate::models::{MeasurementModel, MotionModel};
use crate::types::gaussian::{MeasurementPrediction, PredictedMeasurement, StateEstimate};
use crate::types::spaces::Measurement;
use crate::Result;

/// A single-target Gaussian estimator.
///
/// Implementations are stateless: every operation is a function of its
/// arguments and the supplied models, and returns a new belief instead of
/// mutating the input. Callers (e.g. a GM-PHD layer running one filter call
/// per mixture component) depend only on these three operations.
pub trait Filter<T: RealField + Copy, const N: usize> {
    /// Advances `state` by `dt` using `motion_model`.
    ///
    /// Fails only when the motion model does, e.g. on an invalid `dt`.
    fn predict<Mo>(&self, state: &StateEstimate<T, N>, motion_model: &Mo, dt: T) -> Result<StateEstimate<T, N>>
    where
        Mo: MotionModel<T, N> + ?Sized;

    /// Expected measurement `z_hat` and innovation covariance `S` for `state`.
    fn predict_measurement<Me, const M: usize>(
        &self,
        state: &StateEstimate<T, N>,
        measurement_model: &Me,
    ) -> Result<PredictedMeasurement<T, M>>
    where
        Me: MeasurementModel<T, N, M> + ?Sized;

    /// Posterior belief after observing `measurement`.
    ///
    /// `prediction` selects whether `(z_hat, S)` is recomputed or taken from an
    /// earlier [`Filter::predict_measurement`] call on the same inputs.
    fn update<Me, const M: usize>(
        &self,
        state: &StateEstimate<T, N>,
        measurement: &Measurement<T, M>,
        measurement_model: &Me,
        prediction: MeasurementPrediction<'_, T, M>,
    ) -> Result<StateEstimate<T, N>>
    where
        Me: MeasurementModel<T, N, M> + ?Sized;
}
