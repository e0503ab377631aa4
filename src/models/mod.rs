//! Model capabilities consumed by the filter
//!
//! Motion models supply F and Q for a time step, measurement models supply
//! H and R. The filter never builds these matrices itself.

mod transition;
mod observation;

pub use transition::*;
pub use observation::*;
