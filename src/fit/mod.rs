//! Scoring and stopping.
//!
//! - `evaluator`: mask violations of one decoded filter
//! - `objective`: genome-level adapter for a search engine (parallel per generation)
//! - `convergence`: per-generation early-termination policy

pub mod convergence;
pub mod evaluator;
pub mod objective;

pub use convergence::*;
pub use evaluator::*;
pub use objective::*;
