//! Operational limits and telemetry samples.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SafetyError};

/// A monitored operational limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Limit {
    /// Maximum altitude.
    Altitude,
    /// Maximum velocity.
    Velocity,
}

impl Limit {
    /// Capitalised name used in violation messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Altitude => "Altitude",
            Self::Velocity => "Velocity",
        }
    }

    /// Metadata key carrying the observed value.
    #[must_use]
    pub const fn current_key(self) -> &'static str {
        match self {
            Self::Altitude => "current_altitude",
            Self::Velocity => "current_velocity",
        }
    }

    /// Metadata key carrying the configured limit.
    #[must_use]
    pub const fn max_key(self) -> &'static str {
        match self {
            Self::Altitude => "max_altitude",
            Self::Velocity => "max_velocity",
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Operational envelope the vehicle must stay within.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyEnvelope {
    /// Maximum altitude.
    #[serde(default = "default_max_altitude")]
    pub max_altitude: f64,
    /// Maximum velocity.
    #[serde(default = "default_max_velocity")]
    pub max_velocity: f64,
}

const fn default_max_altitude() -> f64 {
    100.0
}

const fn default_max_velocity() -> f64 {
    30.0
}

impl Default for SafetyEnvelope {
    fn default() -> Self {
        Self {
            max_altitude: default_max_altitude(),
            max_velocity: default_max_velocity(),
        }
    }
}

impl SafetyEnvelope {
    /// Creates an envelope from explicit limits.
    #[must_use]
    pub const fn new(max_altitude: f64, max_velocity: f64) -> Self {
        Self {
            max_altitude,
            max_velocity,
        }
    }

    /// Returns the configured maximum for a limit.
    #[must_use]
    pub const fn max(&self, limit: Limit) -> f64 {
        match limit {
            Limit::Altitude => self.max_altitude,
            Limit::Velocity => self.max_velocity,
        }
    }

    /// Validates the envelope.
    ///
    /// # Errors
    /// Returns an error if a limit is not a finite number.
    pub fn validate(&self) -> Result<()> {
        for limit in [Limit::Altitude, Limit::Velocity] {
            if !self.max(limit).is_finite() {
                return Err(SafetyError::config(format!(
                    "{} must be a finite number",
                    limit.max_key()
                )));
            }
        }
        Ok(())
    }
}

/// One telemetry sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Telemetry {
    /// Current altitude.
    pub altitude: f64,
    /// Current velocity.
    pub velocity: f64,
}

impl Telemetry {
    /// Creates a sample.
    #[must_use]
    pub const fn new(altitude: f64, velocity: f64) -> Self {
        Self { altitude, velocity }
    }

    /// Returns the observed value for a limit.
    #[must_use]
    pub const fn value(&self, limit: Limit) -> f64 {
        match limit {
            Limit::Altitude => self.altitude,
            Limit::Velocity => self.velocity,
        }
    }
}

/// Result of checking one sample against an envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvelopeVerdict {
    /// Limits exceeded by the sample, in check order.
    pub breaches: Vec<Limit>,
}

impl EnvelopeVerdict {
    /// Returns true if no limit was exceeded.
    #[must_use]
    pub fn is_safe(&self) -> bool {
        self.breaches.is_empty()
    }
}
