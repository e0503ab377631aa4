//! Typed vectors and covariance matrices
//!
//! State vectors, measurements and innovations share one representation but
//! live in different spaces, so they cannot be accidentally mixed.

use ::core::marker::PhantomData;
use ::core::ops::{Add, Index, Mul, Neg, Sub};
use nalgebra::{RealField, SMatrix, SVector, Scalar};

use crate::{GmphdError, Result};

// ============================================================================
// Vector Space Markers
// ============================================================================

/// Marker type for state space vectors (e.g., position, velocity)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSpace;

/// Marker type for measurement space vectors (sensor observations)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementSpace;

/// Marker type for innovation vectors (measurement - predicted measurement)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InnovationSpace;

// ============================================================================
// Typed Vector
// ============================================================================

/// A column vector parameterized by scalar type, dimension, and space.
///
/// Values are immutable in practice: every filter operation produces a new
/// vector instead of writing into an existing one.
///
/// # Type Parameters
///
/// - `T`: The scalar type (typically `f32` or `f64`)
/// - `N`: The dimension of the vector
/// - `Space`: Marker for the space the vector belongs to
#[repr(transparent)]
#[derive(Debug, Clone, PartialEq)]
pub struct Vector<T: Scalar, const N: usize, Space> {
    inner: SVector<T, N>,
    _marker: PhantomData<Space>,
}

impl<T: Scalar, const N: usize, Space> Vector<T, N, Space> {
    /// Creates a vector from its components.
    #[inline]
    pub fn from_array(data: [T; N]) -> Self {
        Self::from_svector(SVector::from(data))
    }

    /// Wraps an nalgebra vector.
    #[inline]
    pub fn from_svector(inner: SVector<T, N>) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// Creates a vector from an untyped slice.
    ///
    /// Fails with [`GmphdError::DimensionMismatch`] when `data.len() != N`.
    pub fn try_from_slice(data: &[T]) -> Result<Self> {
        if data.len() != N {
            return Err(GmphdError::DimensionMismatch {
                expected: N,
                actual: data.len(),
            });
        }
        Ok(Self::from_svector(SVector::from_column_slice(data)))
    }

    /// Dimension of the vector.
    #[inline]
    pub const fn dim(&self) -> usize {
        N
    }

    #[inline]
    pub fn as_svector(&self) -> &SVector<T, N> {
        &self.inner
    }

    #[inline]
    pub fn into_svector(self) -> SVector<T, N> {
        self.inner
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.inner.as_slice()
    }

    /// Element at `index`, `None` when out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.inner.get(index)
    }

    /// Iterates over the components in order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.inner.iter()
    }
}

impl<T: Scalar + Copy, const N: usize, Space: Clone> Copy for Vector<T, N, Space> {}

impl<T: Scalar, const N: usize, Space> Index<usize> for Vector<T, N, Space> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.inner[index]
    }
}

impl<T: RealField + Copy, const N: usize, Space> Vector<T, N, Space> {
    #[inline]
    pub fn zeros() -> Self {
        Self::from_svector(SVector::zeros())
    }

    /// Squared Euclidean norm.
    #[inline]
    pub fn norm_squared(&self) -> T {
        self.inner.norm_squared()
    }

    /// Euclidean norm.
    #[inline]
    pub fn norm(&self) -> T {
        self.inner.norm()
    }

    /// Returns `true` when every component is within `tol` of `other`.
    pub fn approx_eq(&self, other: &Self, tol: T) -> bool {
        self.inner
            .iter()
            .zip(other.inner.iter())
            .all(|(a, b)| (*a - *b).abs() <= tol)
    }
}

// ============================================================================
// Type Aliases
// ============================================================================

/// A state vector in state space.
pub type StateVector<T, const N: usize> = Vector<T, N, StateSpace>;

/// A measurement vector in measurement space.
pub type Measurement<T, const M: usize> = Vector<T, M, MeasurementSpace>;

/// A measurement residual in innovation space.
pub type Innovation<T, const M: usize> = Vector<T, M, InnovationSpace>;

// ============================================================================
// Same-Space Arithmetic
// ============================================================================

impl<T: RealField + Copy, const N: usize, Space> Add for Vector<T, N, Space> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::from_svector(self.inner + rhs.inner)
    }
}

impl<T: RealField + Copy, const N: usize, Space> Sub for Vector<T, N, Space> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self::from_svector(self.inner - rhs.inner)
    }
}

impl<T: RealField + Copy, const N: usize, Space> Neg for Vector<T, N, Space> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        Self::from_svector(-self.inner)
    }
}

impl<T: RealField + Copy, const N: usize, Space> Mul<T> for Vector<T, N, Space> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: T) -> Self::Output {
        Self::from_svector(self.inner * rhs)
    }
}

/// Subtracting a predicted measurement from an observed one yields an
/// innovation, not another measurement.
pub trait ComputeInnovation<T: RealField, const M: usize> {
    fn innovation(&self, predicted: &Measurement<T, M>) -> Innovation<T, M>;
}

impl<T: RealField + Copy, const M: usize> ComputeInnovation<T, M> for Measurement<T, M> {
    #[inline]
    fn innovation(&self, predicted: &Measurement<T, M>) -> Innovation<T, M> {
        Innovation::from_svector(self.inner - predicted.inner)
    }
}

// ============================================================================
// Covariance Matrix
// ============================================================================

/// A covariance matrix bound to a vector space.
///
/// Expected to be symmetric positive semi-definite. Constructors do not check
/// this; [`Covariance::is_symmetric`] and [`Covariance::cholesky`] are available
/// for callers that need to.
#[repr(transparent)]
#[derive(Debug, Clone, PartialEq)]
pub struct Covariance<T: Scalar, const N: usize, Space> {
    inner: SMatrix<T, N, N>,
    _marker: PhantomData<Space>,
}

impl<T: Scalar, const N: usize, Space> Covariance<T, N, Space> {
    #[inline]
    pub fn from_matrix(inner: SMatrix<T, N, N>) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// Creates a covariance from `N * N` values in row-major order.
    pub fn try_from_row_slice(data: &[T]) -> Result<Self> {
        if data.len() != N * N {
            return Err(GmphdError::DimensionMismatch {
                expected: N * N,
                actual: data.len(),
            });
        }
        Ok(Self::from_matrix(SMatrix::from_row_slice(data)))
    }

    #[inline]
    pub fn as_matrix(&self) -> &SMatrix<T, N, N> {
        &self.inner
    }

    #[inline]
    pub fn into_matrix(self) -> SMatrix<T, N, N> {
        self.inner
    }
}

impl<T: Scalar + Copy, const N: usize, Space: Clone> Copy for Covariance<T, N, Space> where
    SMatrix<T, N, N>: Copy
{
}

impl<T: RealField + Copy, const N: usize, Space> Covariance<T, N, Space> {
    #[inline]
    pub fn zeros() -> Self {
        Self::from_matrix(SMatrix::zeros())
    }

    #[inline]
    pub fn identity() -> Self {
        Self::from_matrix(SMatrix::identity())
    }

    #[inline]
    pub fn from_diagonal(diag: &SVector<T, N>) -> Self {
        Self::from_matrix(SMatrix::from_diagonal(diag))
    }

    #[inline]
    pub fn scale(&self, s: T) -> Self {
        Self::from_matrix(self.inner.scale(s))
    }

    #[inline]
    pub fn transpose(&self) -> Self {
        Self::from_matrix(self.inner.transpose())
    }

    /// Sum of the variances.
    #[inline]
    pub fn trace(&self) -> T {
        self.inner.trace()
    }

    /// Largest absolute difference between mirrored off-diagonal entries.
    pub fn asymmetry(&self) -> T {
        let mut worst = T::zero();
        for i in 0..N {
            for j in (i + 1)..N {
                let diff = (self.inner[(i, j)] - self.inner[(j, i)]).abs();
                if diff > worst {
                    worst = diff;
                }
            }
        }
        worst
    }

    /// Returns `true` when `self == selfᵗ` within `tol`.
    #[inline]
    pub fn is_symmetric(&self, tol: T) -> bool {
        self.asymmetry() <= tol
    }

    /// Determinant via Cholesky; `None` if the matrix is not positive definite.
    pub fn determinant(&self) -> Option<T> {
        let l = self.cholesky()?;
        let det_l = (0..N).fold(T::one(), |acc, i| acc * l[(i, i)]);
        Some(det_l * det_l)
    }

    #[inline]
    pub fn try_inverse(&self) -> Option<Self> {
        self.inner.try_inverse().map(Self::from_matrix)
    }

    /// Lower-triangular Cholesky factor, `None` if not positive definite.
    #[inline]
    pub fn cholesky(&self) -> Option<SMatrix<T, N, N>> {
        nalgebra::Cholesky::new(self.inner).map(|c| c.l())
    }
}

impl<T: RealField + Copy, const N: usize, Space> Add for Covariance<T, N, Space> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::from_matrix(self.inner + rhs.inner)
    }
}

/// Covariance matrix in state space.
pub type StateCovariance<T, const N: usize> = Covariance<T, N, StateSpace>;

/// Alias used by the tracker layer for state covariances.
pub type CovarianceMatrix<T, const N: usize> = StateCovariance<T, N>;

/// Covariance matrix in measurement space.
///
/// Also used for the innovation covariance S = H*P*H' + R, which the filter
/// literature treats as a measurement-space quantity.
pub type MeasurementCovariance<T, const M: usize> = Covariance<T, M, MeasurementSpace>;
