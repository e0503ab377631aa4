//! Single-target filters
//!
//! [`Filter`] is the contract a GM-PHD layer calls once per mixture component;
//! [`kalman::KalmanFilter`] is its linear-Gaussian implementation.

pub mod kalman;
mod traits;

pub use traits::Filter;
pub use crate::types::gaussian::{MeasurementPrediction, PredictedMeasurement, StateEstimate};
