//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the run configuration (`DesignConfig`)
//! - the exported report schema (`EvaluationReport`, `GenomeReport`)
//! - convergence history rows and replay outcomes

pub mod types;

pub use types::*;
