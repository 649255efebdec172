//! `filter-optimizer` library crate.
//!
//! The binary (`fopt`) is a thin wrapper around this library so that:
//!
//! - the mask model and the fitness engine are testable without spawning processes
//! - an external search engine can link the library and call `fit::Objective` directly
//!
//! Layers, leaves first: `bounds` and `math`, then `models` (genome decoding),
//! then `fit` (scoring and stopping), then the `app` glue.

pub mod app;
pub mod bounds;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
