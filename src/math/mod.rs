//! Numeric primitives: polynomial synthesis and transfer-function evaluation.

pub mod poly;
pub mod response;

pub use poly::*;
pub use response::*;
