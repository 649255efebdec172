//! Error types.
//!
//! - `FilterError` is what the library core returns (parse/config/genome/range).
//! - `AppError` is what the binary reports: a message plus a process exit code.

use thiserror::Error;

/// Errors raised by the constraint model and the fitness engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// Malformed bound text (arity or numeric format).
    #[error("parse error: {0}")]
    Parse(String),

    /// Interpolation or lookup outside the domain a bound covers.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// Inconsistent configuration (bad limits, sample counts, options).
    #[error("configuration error: {0}")]
    Config(String),

    /// Genome length does not match the zero/pole layout.
    #[error("genome error: {0}")]
    Genome(String),
}

impl FilterError {
    /// Exit code used when this error terminates the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            FilterError::Parse(_) | FilterError::Config(_) | FilterError::Genome(_) => 2,
            FilterError::OutOfRange(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FilterError> for AppError {
    fn from(err: FilterError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
