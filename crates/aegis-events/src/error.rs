//! Error types for aegis-events.
//!
//! Every failure on the producer path is returned to the caller; nothing is
//! silently dropped unless the configured overflow policy says so.

use std::time::Duration;

/// Result type alias for event logger operations.
pub type Result<T> = std::result::Result<T, LogError>;

/// Event logger errors.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// Invalid logger configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Event rejected by validation before enqueue.
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// Queue at capacity and the overflow policy refused the event.
    #[error("event queue full (capacity: {capacity})")]
    QueueFull {
        /// Configured queue capacity.
        capacity: usize,
    },

    /// Waited for queue capacity or drain longer than allowed.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Logger has been shut down.
    #[error("event logger is closed")]
    Closed,

    /// Store could not be serialized or parsed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Background consumer failed.
    #[error("consumer error: {0}")]
    Consumer(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LogError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an invalid event error.
    #[must_use]
    pub fn invalid_event(msg: impl Into<String>) -> Self {
        Self::InvalidEvent(msg.into())
    }

    /// Creates a consumer error.
    #[must_use]
    pub fn consumer(msg: impl Into<String>) -> Self {
        Self::Consumer(msg.into())
    }

    /// Returns true if the same event may succeed when logged again later.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::QueueFull { .. } | Self::Timeout(_))
    }
}
