//! Combined configuration file for a logger plus its safety envelope.
//!
//! ```toml
//! [logger]
//! buffer_size = 100
//! overflow = "block"
//! block_timeout = "250ms"
//! validation = "strict"
//!
//! [envelope]
//! max_altitude = 100.0
//! max_velocity = 30.0
//! ```

use std::path::Path;

use aegis_events::LoggerConfig;
use serde::{Deserialize, Serialize};

use crate::envelope::SafetyEnvelope;
use crate::error::{Result, SafetyError};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AegisConfig {
    /// Event logger settings.
    #[serde(default)]
    pub logger: LoggerConfig,

    /// Operational limits.
    #[serde(default)]
    pub envelope: SafetyEnvelope,
}

impl AegisConfig {
    /// Validates both sections.
    ///
    /// # Errors
    /// Returns an error if either section is invalid.
    pub fn validate(&self) -> Result<()> {
        self.logger.validate()?;
        self.envelope.validate()
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    /// Returns an error if the document cannot be parsed or is invalid.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| SafetyError::config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SafetyError::config(format!("failed to read config: {e}")))?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use aegis_events::OverflowPolicy;

    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AegisConfig::from_toml_str("").unwrap();
        assert_eq!(config, AegisConfig::default());
    }

    #[test]
    fn test_full_document() {
        let config = AegisConfig::from_toml_str(
            r#"
            [logger]
            buffer_size = 32
            overflow = "block"
            block_timeout = "1s"

            [envelope]
            max_altitude = 120.5
            max_velocity = 25.0
            "#,
        )
        .unwrap();
        assert_eq!(config.logger.buffer_size, 32);
        assert_eq!(config.logger.overflow, OverflowPolicy::Block);
        assert_eq!(config.logger.block_timeout, Some(Duration::from_secs(1)));
        assert_eq!(config.envelope.max_altitude, 120.5);
        assert_eq!(config.envelope.max_velocity, 25.0);
    }

    #[test]
    fn test_invalid_logger_section() {
        let err = AegisConfig::from_toml_str("[logger]\nbuffer_size = 0\n").unwrap_err();
        assert!(matches!(err, SafetyError::Logger(_)));
    }

    #[test]
    fn test_invalid_envelope_section() {
        let err = AegisConfig::from_toml_str("[envelope]\nmax_altitude = nan\n").unwrap_err();
        assert!(matches!(err, SafetyError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aegis.toml");
        std::fs::write(&path, "[envelope]\nmax_velocity = 12.0\n").unwrap();
        let config = AegisConfig::load(&path).unwrap();
        assert_eq!(config.envelope.max_velocity, 12.0);
        assert_eq!(config.envelope.max_altitude, 100.0);
    }
}
