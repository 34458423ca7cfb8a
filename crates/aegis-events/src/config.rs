//! Event logger configuration.
//!
//! Validated at load time: a logger is never built from a configuration
//! that would make the queue unusable.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LogError, Result};

/// What `log` does when the queue is at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Wait for a free slot, up to `block_timeout` if one is set.
    #[default]
    Block,
    /// Evict the oldest queued event to make room.
    DropOldest,
    /// Discard the incoming event and report `QueueFull`.
    DropNewest,
    /// Report `QueueFull` immediately.
    FailFast,
}

/// How strictly incoming events are checked before enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Only known categories and severities, non-empty module.
    #[default]
    Strict,
    /// Accept any labels.
    Permissive,
}

/// Event logger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Queue capacity. Must be at least 1.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Overflow behaviour when the queue is full.
    #[serde(default)]
    pub overflow: OverflowPolicy,

    /// Upper bound on a blocked producer's wait. `None` waits indefinitely.
    #[serde(default, with = "humantime_opt", skip_serializing_if = "Option::is_none")]
    pub block_timeout: Option<Duration>,

    /// Validation applied before enqueue.
    #[serde(default)]
    pub validation: ValidationMode,

    /// Capacity of the live subscription channel.
    #[serde(default = "default_subscriber_capacity")]
    pub subscriber_capacity: usize,
}

const fn default_buffer_size() -> usize {
    100
}

const fn default_subscriber_capacity() -> usize {
    256
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            overflow: OverflowPolicy::default(),
            block_timeout: None,
            validation: ValidationMode::default(),
            subscriber_capacity: default_subscriber_capacity(),
        }
    }
}

impl LoggerConfig {
    /// Creates a configuration with the given queue capacity.
    #[must_use]
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size,
            ..Self::default()
        }
    }

    /// Sets the overflow policy.
    #[must_use]
    pub const fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    /// Sets the blocking timeout used by [`OverflowPolicy::Block`].
    #[must_use]
    pub const fn with_block_timeout(mut self, timeout: Duration) -> Self {
        self.block_timeout = Some(timeout);
        self
    }

    /// Sets the validation mode.
    #[must_use]
    pub const fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }

    /// Sets the live subscription channel capacity.
    #[must_use]
    pub const fn with_subscriber_capacity(mut self, capacity: usize) -> Self {
        self.subscriber_capacity = capacity;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(LogError::config("buffer_size must be at least 1"));
        }
        if self.subscriber_capacity == 0 {
            return Err(LogError::config("subscriber_capacity must be at least 1"));
        }
        if self.block_timeout.is_some_and(|t| t.is_zero()) {
            return Err(LogError::config(
                "block_timeout must be positive; use overflow = \"fail_fast\" instead",
            ));
        }
        if self.block_timeout.is_some() && self.overflow != OverflowPolicy::Block {
            tracing::warn!(
                overflow = ?self.overflow,
                "block_timeout has no effect unless overflow = \"block\""
            );
        }
        Ok(())
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    /// Returns an error if the document cannot be parsed or is invalid.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| LogError::config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| LogError::config(format!("failed to read config: {e}")))?;
        Self::from_toml_str(&content)
    }
}

/// Serde adapter for optional humantime durations (`"250ms"`, `"2s"`).
pub mod humantime_opt {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes `Some(duration)` as a humantime string.
    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_str(&humantime::format_duration(*d).to_string()),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes an optional humantime string.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|s| humantime::parse_duration(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
