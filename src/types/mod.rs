//! Core types: typed vector spaces, transforms, Gaussian beliefs, state
//! batches and tracks

pub mod gaussian;
pub mod spaces;
pub mod transforms;
#[cfg(feature = "alloc")]
pub mod collection;
#[cfg(feature = "alloc")]
pub mod track;
