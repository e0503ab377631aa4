//! gmphd-fusion: single-target estimation core for a GM-PHD fusion tracker
//!
//! A linear Kalman filter and per-target track bookkeeping, the building blocks
//! a Gaussian-mixture PHD tracker calls into once per component and time step.
//!
//! # Features
//!
//! - **Type Safety**: State, measurement and innovation spaces are distinct types
//! - **Compile-Time Checks**: Model and filter dimensions are const generics
//! - **Joseph Form**: Posterior covariances stay symmetric positive semi-definite
//! - **no_std Support**: `Track` and `StateVectors` only need the `alloc` feature

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod types;
pub mod models;
pub mod filters;

pub mod prelude {
    pub use crate::types::spaces::*;
    pub use crate::types::transforms::*;
    #[cfg(feature = "alloc")]
    pub use crate::types::collection::*;
    #[cfg(feature = "alloc")]
    pub use crate::types::track::*;
    pub use crate::models::*;
    pub use crate::filters::{Filter, MeasurementPrediction, PredictedMeasurement, StateEstimate};
    pub use crate::filters::kalman::KalmanFilter;
    pub use crate::{GmphdError, Result};
}

/// Error types for the library
#[derive(Debug, Clone, PartialEq)]
pub enum GmphdError {
    /// An estimate or finish time is not strictly after the last recorded slot
    OutOfOrderTime {
        /// Requested time step
        time: u32,
        /// Time of the last recorded slot, `None` if nothing was recorded yet
        last_time: Option<u32>,
    },
    /// The track was already finished and cannot be mutated
    TrackFinished {
        /// Label of the finished track
        label: u32,
    },
    /// Matrix is singular and cannot be inverted
    SingularMatrix,
    /// Input dimension does not match the dimension of the model or container
    DimensionMismatch {
        /// Dimension required by the receiver
        expected: usize,
        /// Dimension that was supplied
        actual: usize,
    },
    /// Time step passed to a motion model is negative or not finite
    InvalidTimeStep,
    /// A model parameter is out of its valid range
    InvalidParameter {
        /// Name of the offending parameter
        name: &'static str,
    },
}

#[cfg(feature = "std")]
impl std::error::Error for GmphdError {}

impl ::core::fmt::Display for GmphdError {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        match self {
            GmphdError::OutOfOrderTime { time, last_time: Some(last) } => {
                write!(f, "Time {} is not after the last recorded time {}", time, last)
            }
            GmphdError::OutOfOrderTime { time, last_time: None } => {
                write!(f, "Time {} precedes the track start", time)
            }
            GmphdError::TrackFinished { label } => write!(f, "Track {} is already finished", label),
            GmphdError::SingularMatrix => write!(f, "Matrix is singular"),
            GmphdError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            GmphdError::InvalidTimeStep => write!(f, "Time step must be finite and non-negative"),
            GmphdError::InvalidParameter { name } => write!(f, "Invalid model parameter: {}", name),
        }
    }
}

pub type Result<T> = ::core::result::Result<T, GmphdError>;
