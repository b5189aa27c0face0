//! Error types for the Turnpike service.

use thiserror::Error;

/// Main error type for Turnpike operations.
#[derive(Error, Debug)]
pub enum TurnpikeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Turnpike operations.
pub type Result<T> = std::result::Result<T, TurnpikeError>;
