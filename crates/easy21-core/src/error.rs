//! Error types for Easy21

use thiserror::Error;

/// Main error type for Easy21
#[derive(Error, Debug)]
pub enum Easy21Error {
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No valid actions from non-terminal state: {0}")]
    EmptyActionSet(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Easy21Error {
    /// Check that a probability-like parameter lies in `[0, 1]`.
    ///
    /// NaN is rejected. Values are never clamped.
    pub fn check_unit_interval(name: &str, value: f64) -> Result<()> {
        if (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(Easy21Error::InvalidConfiguration(format!(
                "{name} must be within [0, 1], got {value}"
            )))
        }
    }
}

/// Result type alias for Easy21 operations
pub type Result<T> = std::result::Result<T, Easy21Error>;
