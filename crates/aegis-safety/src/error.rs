//! Safety monitor error types.

use aegis_events::LogError;

/// Result type alias for safety operations.
pub type Result<T> = std::result::Result<T, SafetyError>;

/// Safety monitor errors.
#[derive(Debug, thiserror::Error)]
pub enum SafetyError {
    /// Invalid limits or configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Underlying event logger failure.
    #[error("event logger error: {0}")]
    Logger(#[from] LogError),
}

impl SafetyError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
