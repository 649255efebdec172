//! Candidate filter representation.
//!
//! The search engine only sees flat `f64` genomes; this module turns them into
//! zeros, poles and a transfer function.

pub mod phenotype;

pub use phenotype::*;
