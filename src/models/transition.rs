//! Motion models for target dynamics
//!
//! A motion model owns the transition matrix F and process noise Q for a
//! given time step; the filter only applies them.

use nalgebra::RealField;
use num_traits::Float;

use crate::types::gaussian::StateEstimate;
use crate::types::spaces::StateCovariance;
use crate::types::transforms::TransitionMatrix;
use crate::{GmphdError, Result};

/// Linear motion model.
///
/// Describes target dynamics in the form:
/// x_{k+1} = F(dt) * x_k + w,  w ~ N(0, Q(dt))
pub trait MotionModel<T: RealField + Copy, const N: usize> {
    /// State transition matrix for time step `dt`.
    fn transition_matrix(&self, dt: T) -> Result<TransitionMatrix<T, N>>;

    /// Process noise covariance for time step `dt`.
    fn process_noise(&self, dt: T) -> Result<StateCovariance<T, N>>;

    /// Advances a state belief by `dt`.
    ///
    /// Returns `(F * mean, F * P * F^T + Q)`.
    fn propagate(&self, state: &StateEstimate<T, N>, dt: T) -> Result<StateEstimate<T, N>> {
        let f = self.transition_matrix(dt)?;
        let q = self.process_noise(dt)?;

        Ok(StateEstimate::new(
            f.apply_state(&state.mean),
            f.propagate_covariance(&state.covariance) + q,
        ))
    }
}

fn check_time_step<T: Float>(dt: T) -> Result<()> {
    if !Float::is_finite(dt) || dt < T::zero() {
        return Err(GmphdError::InvalidTimeStep);
    }
    Ok(())
}

fn check_intensity<T: Float>(value: T, name: &'static str) -> Result<()> {
    if !Float::is_finite(value) || value < T::zero() {
        return Err(GmphdError::InvalidParameter { name });
    }
    Ok(())
}

/// Discrete white noise acceleration terms for one axis:
/// (position variance, position/velocity covariance, velocity variance).
fn white_noise_acceleration<T: RealField + Copy>(dt: T, sigma_a: T) -> (T, T, T) {
    let dt2 = dt * dt;
    let dt3 = dt2 * dt;
    let dt4 = dt3 * dt;
    let sigma_sq = sigma_a * sigma_a;

    let two: T = nalgebra::convert(2.0);
    let four: T = nalgebra::convert(4.0);

    (dt4 / four * sigma_sq, dt3 / two * sigma_sq, dt2 * sigma_sq)
}

// ============================================================================
// Constant Velocity
// ============================================================================

/// Constant velocity model in 2D.
///
/// State: [x, y, vx, vy]
#[derive(Debug, Clone)]
pub struct ConstantVelocity2D<T: RealField> {
    /// Acceleration noise standard deviation
    pub sigma_a: T,
}

impl<T: RealField + Float + Copy> ConstantVelocity2D<T> {
    /// Creates a constant velocity model.
    ///
    /// Fails if `sigma_a` is negative or not finite.
    pub fn new(sigma_a: T) -> Result<Self> {
        check_intensity(sigma_a, "sigma_a")?;
        Ok(Self { sigma_a })
    }
}

impl<T: RealField + Float + Copy> MotionModel<T, 4> for ConstantVelocity2D<T> {
    fn transition_matrix(&self, dt: T) -> Result<TransitionMatrix<T, 4>> {
        check_time_step(dt)?;
        let one = T::one();
        let zero = T::zero();

        Ok(TransitionMatrix::from_matrix(nalgebra::matrix![
            one, zero, dt, zero;
            zero, one, zero, dt;
            zero, zero, one, zero;
            zero, zero, zero, one
        ]))
    }

    fn process_noise(&self, dt: T) -> Result<StateCovariance<T, 4>> {
        check_time_step(dt)?;
        let (q11, q13, q33) = white_noise_acceleration(dt, self.sigma_a);
        let zero = T::zero();

        Ok(StateCovariance::from_matrix(nalgebra::matrix![
            q11, zero, q13, zero;
            zero, q11, zero, q13;
            q13, zero, q33, zero;
            zero, q13, zero, q33
        ]))
    }
}

/// Constant velocity model in 3D.
///
/// State: [x, y, z, vx, vy, vz]
#[derive(Debug, Clone)]
pub struct ConstantVelocity3D<T: RealField> {
    /// Acceleration noise standard deviation
    pub sigma_a: T,
}

impl<T: RealField + Float + Copy> ConstantVelocity3D<T> {
    /// Creates a constant velocity model.
    ///
    /// Fails if `sigma_a` is negative or not finite.
    pub fn new(sigma_a: T) -> Result<Self> {
        check_intensity(sigma_a, "sigma_a")?;
        Ok(Self { sigma_a })
    }
}

impl<T: RealField + Float + Copy> MotionModel<T, 6> for ConstantVelocity3D<T> {
    fn transition_matrix(&self, dt: T) -> Result<TransitionMatrix<T, 6>> {
        check_time_step(dt)?;
        let mut f = TransitionMatrix::<T, 6>::identity().into_matrix();
        for axis in 0..3 {
            f[(axis, axis + 3)] = dt;
        }
        Ok(TransitionMatrix::from_matrix(f))
    }

    fn process_noise(&self, dt: T) -> Result<StateCovariance<T, 6>> {
        check_time_step(dt)?;
        let (q_pos, q_cross, q_vel) = white_noise_acceleration(dt, self.sigma_a);

        let mut q = StateCovariance::<T, 6>::zeros().into_matrix();
        for axis in 0..3 {
            q[(axis, axis)] = q_pos;
            q[(axis, axis + 3)] = q_cross;
            q[(axis + 3, axis)] = q_cross;
            q[(axis + 3, axis + 3)] = q_vel;
        }
        Ok(StateCovariance::from_matrix(q))
    }
}

// ============================================================================
// Random Walk
// ============================================================================

/// Random walk (Brownian) model in any dimension.
///
/// F = I, Q = q * dt * I. Useful for slowly drifting or static targets.
#[derive(Debug, Clone)]
pub struct RandomWalk<T: RealField, const N: usize> {
    /// Diffusion intensity per unit time
    pub q: T,
}

impl<T: RealField + Float + Copy, const N: usize> RandomWalk<T, N> {
    /// Creates a random walk model.
    ///
    /// Fails if `q` is negative or not finite.
    pub fn new(q: T) -> Result<Self> {
        check_intensity(q, "q")?;
        Ok(Self { q })
    }
}

impl<T: RealField + Float + Copy, const N: usize> MotionModel<T, N> for RandomWalk<T, N> {
    fn transition_matrix(&self, dt: T) -> Result<TransitionMatrix<T, N>> {
        check_time_step(dt)?;
        Ok(TransitionMatrix::identity())
    }

    fn process_noise(&self, dt: T) -> Result<StateCovariance<T, N>> {
        check_time_step(dt)?;
        Ok(StateCovariance::identity().scale(self.q * dt))
    }
}
