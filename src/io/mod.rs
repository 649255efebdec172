//! Input/output helpers.
//!
//! - genome text and genome files (`genome`)
//! - convergence history CSV (`history`)
//! - report JSON read/write (`report`)

pub mod genome;
pub mod history;
pub mod report;

pub use genome::*;
pub use history::*;
pub use report::*;
