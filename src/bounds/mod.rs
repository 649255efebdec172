//! Constraint boundaries: single curves, composite sets, and the masks a
//! design is checked against.

pub mod curve;
pub mod defaults;
pub mod mask;
pub mod set;

pub use curve::*;
pub use mask::*;
pub use set::*;
