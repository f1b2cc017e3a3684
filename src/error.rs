//! # Centralized Error Handling
//!
//! Unified error types for the entire crate using `thiserror`.

use thiserror::Error;

/// Main error type for winscan operations
#[derive(Error, Debug)]
pub enum WinscanError {
    /// Configuration errors (non-positive thread count or queue capacity,
    /// malformed quantile level)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A non-finite value pushed into a statistics accumulator
    #[error("Invalid value: {message}")]
    InvalidValue { message: String },

    /// A quantile queried for a level that was not configured at construction
    #[error("Unknown quantile level: {level}")]
    UnknownQuantile { level: f64 },

    /// Submission attempted after shutdown
    #[error("Scheduler is closed")]
    Closed,

    /// A window job failed while executing
    #[error("Window {index} failed: {message}")]
    Window { index: u64, message: String },
}

/// Type alias for Results using WinscanError
pub type Result<T> = std::result::Result<T, WinscanError>;

impl WinscanError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue {
            message: message.into(),
        }
    }

    /// Create a per-window job error
    pub fn window(index: u64, message: impl Into<String>) -> Self {
        Self::Window {
            index,
            message: message.into(),
        }
    }
}
