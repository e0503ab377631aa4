//! Common test helpers for filter and track integration tests

#![allow(dead_code)]

use gmphd_fusion::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

pub const SEED: u64 = 0x5eed_f00d;

pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(SEED)
}

/// Creates a measurement at given position
pub fn make_measurement(x: f64, y: f64) -> Measurement<f64, 2> {
    Measurement::from_array([x, y])
}

/// Standard 2D constant velocity motion and position sensor
pub fn make_test_models(
    sigma_a: f64,
    sigma_z: f64,
) -> (ConstantVelocity2D<f64>, LinearCoordinateMeasurementModel<f64, 4, 2>) {
    (
        ConstantVelocity2D::new(sigma_a).unwrap(),
        LinearCoordinateMeasurementModel::position_2d(sigma_z).unwrap(),
    )
}

/// Creates a state estimate with diagonal covariance
pub fn make_estimate(x: f64, y: f64, vx: f64, vy: f64, pos_var: f64, vel_var: f64) -> StateEstimate<f64, 4> {
    StateEstimate::with_diagonal_covariance(
        StateVector::from_array([x, y, vx, vy]),
        &nalgebra::vector![pos_var, pos_var, vel_var, vel_var],
    )
}

/// Random vector with entries in `[-scale, scale)`
pub fn random_vector<const N: usize>(rng: &mut StdRng, scale: f64) -> nalgebra::SVector<f64, N> {
    nalgebra::SVector::from_fn(|_, _| rng.random_range(-scale..scale))
}

/// Random symmetric positive definite covariance `A * A^T + 0.1 * I`
pub fn random_covariance<const N: usize, Space>(rng: &mut StdRng, scale: f64) -> Covariance<f64, N, Space> {
    let a = nalgebra::SMatrix::<f64, N, N>::from_fn(|_, _| rng.random_range(-scale..scale));
    Covariance::from_matrix(a * a.transpose() + nalgebra::SMatrix::<f64, N, N>::identity() * 0.1)
}

/// Random Gaussian state belief
pub fn random_estimate<const N: usize>(rng: &mut StdRng) -> StateEstimate<f64, N> {
    StateEstimate::new(
        StateVector::from_svector(random_vector(rng, 100.0)),
        random_covariance(rng, 5.0),
    )
}

/// Smallest eigenvalue of a covariance, symmetrized first
pub fn min_eigenvalue<const N: usize, Space>(cov: &Covariance<f64, N, Space>) -> f64 {
    let m = cov.as_matrix();
    let sym = (m + m.transpose()) * 0.5;
    nalgebra::DMatrix::from_column_slice(N, N, sym.as_slice())
        .symmetric_eigenvalues()
        .min()
}

/// Ground truth target moving with constant velocity
#[derive(Debug, Clone, Copy)]
pub struct ConstantVelocityTruth {
    pub initial: [f64; 4],
}

impl ConstantVelocityTruth {
    pub fn new(initial: [f64; 4]) -> Self {
        Self { initial }
    }

    pub fn state_at(&self, t: f64) -> [f64; 4] {
        let [x, y, vx, vy] = self.initial;
        [x + vx * t, y + vy * t, vx, vy]
    }

    pub fn position_at(&self, t: f64) -> [f64; 2] {
        let [x, y, _, _] = self.state_at(t);
        [x, y]
    }

    /// Position measurement corrupted by white Gaussian noise
    pub fn measure(&self, t: f64, noise: &Normal<f64>, rng: &mut StdRng) -> Measurement<f64, 2> {
        let [x, y] = self.position_at(t);
        make_measurement(x + noise.sample(rng), y + noise.sample(rng))
    }
}
