//! Ordered batches of state vectors

use ::core::ops::Index;

use alloc::vec::Vec;
use nalgebra::{Const, Dyn, OMatrix, RealField, Scalar};

use super::spaces::StateVector;
use crate::{GmphdError, Result};

/// An ordered collection of `N`-dimensional state vectors.
///
/// Viewed as a whole it behaves like an `N x n` matrix whose columns are the
/// vectors in insertion order, which is what [`StateVectors::shape`] and
/// [`StateVectors::to_matrix`] expose.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVectors<T: Scalar, const N: usize> {
    vectors: Vec<StateVector<T, N>>,
}

impl<T: Scalar, const N: usize> StateVectors<T, N> {
    /// Creates an empty collection.
    #[inline]
    pub fn new() -> Self {
        Self {
            vectors: Vec::new(),
        }
    }

    /// Wraps an ordered sequence of vectors.
    #[inline]
    pub fn from_vec(vectors: Vec<StateVector<T, N>>) -> Self {
        Self { vectors }
    }

    /// Builds a collection from untyped rows, one row per vector.
    ///
    /// Fails with [`GmphdError::DimensionMismatch`] on the first row whose
    /// length differs from `N`; nothing is built in that case.
    pub fn try_from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self> {
        rows.iter()
            .map(|row| StateVector::try_from_slice(row.as_ref()))
            .collect::<Result<Vec<_>>>()
            .map(Self::from_vec)
    }

    #[inline]
    pub fn push(&mut self, vector: StateVector<T, N>) {
        self.vectors.push(vector);
    }

    /// Number of vectors.
    #[inline]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Aggregate shape `(dimension, count)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (N, self.vectors.len())
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&StateVector<T, N>> {
        self.vectors.get(index)
    }

    #[inline]
    pub fn iter(&self) -> ::core::slice::Iter<'_, StateVector<T, N>> {
        self.vectors.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[StateVector<T, N>] {
        &self.vectors
    }

    #[inline]
    pub fn into_vec(self) -> Vec<StateVector<T, N>> {
        self.vectors
    }
}

impl<T: RealField + Copy, const N: usize> StateVectors<T, N> {
    /// Stacks the vectors as columns of an `N x n` matrix.
    pub fn to_matrix(&self) -> OMatrix<T, Const<N>, Dyn> {
        OMatrix::<T, Const<N>, Dyn>::from_fn(self.vectors.len(), |row, col| {
            self.vectors[col][row]
        })
    }

    /// Component-wise mean, `None` for an empty collection.
    pub fn mean(&self) -> Option<StateVector<T, N>> {
        if self.vectors.is_empty() {
            return None;
        }
        let count: T = nalgebra::convert(self.vectors.len() as f64);
        let sum = self
            .vectors
            .iter()
            .fold(StateVector::zeros(), |acc, v| acc + *v);
        Some(sum * (T::one() / count))
    }
}

impl<T: Scalar, const N: usize> Default for StateVectors<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar, const N: usize> Index<usize> for StateVectors<T, N> {
    type Output = StateVector<T, N>;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.vectors[index]
    }
}

impl<T: Scalar, const N: usize> FromIterator<StateVector<T, N>> for StateVectors<T, N> {
    fn from_iter<I: IntoIterator<Item = StateVector<T, N>>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T: Scalar, const N: usize> IntoIterator for StateVectors<T, N> {
    type Item = StateVector<T, N>;
    type IntoIter = alloc::vec::IntoIter<StateVector<T, N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.vectors.into_iter()
    }
}

impl<'a, T: Scalar, const N: usize> IntoIterator for &'a StateVectors<T, N> {
    type Item = &'a StateVector<T, N>;
    type IntoIter = ::core::slice::Iter<'a, StateVector<T, N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.vectors.iter()
    }
}
