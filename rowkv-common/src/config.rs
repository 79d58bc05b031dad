//! # Configuration
//!
//! Purpose: Carry accessor defaults and logging setup as explicit values
//! instead of process-wide state set on load.
//!
//! ## Usage Notes
//!
//! - Binaries parse an `AccessorConfig` (JSON) and call `init_logging` once.
//! - Libraries and tests never touch the global subscriber; they only read
//!   the values they are handed.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::{ConfigError, ConfigResult};

/// Default per-call timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 3_000;

/// Default log directive; only errors are reported unless asked otherwise.
pub const DEFAULT_LOG_LEVEL: &str = "error";

/// Logging setup handed to `init_logging`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. "error" or "rowkv_engine=debug".
    pub level: String,
    /// Emit ANSI colors.
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: DEFAULT_LOG_LEVEL.to_string(),
            ansi: false,
        }
    }
}

impl LogConfig {
    /// Builds the filter described by `level`.
    pub fn filter(&self) -> ConfigResult<EnvFilter> {
        EnvFilter::try_new(&self.level).map_err(|_| ConfigError::InvalidLevel {
            level: self.level.clone(),
        })
    }
}

/// Installs a formatting subscriber for the whole process.
///
/// # Errors
/// Returns `ConfigError::InvalidLevel` for a bad directive and
/// `ConfigError::LoggerInstalled` when a subscriber is already set.
pub fn init_logging(config: &LogConfig) -> ConfigResult<()> {
    let filter = config.filter()?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .try_init()
        .map_err(|_| ConfigError::LoggerInstalled)
}

/// Accessor-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessorConfig {
    /// Timeout used when a caller has none of its own.
    pub default_timeout_ms: u64,
    pub log: LogConfig,
}

impl Default for AccessorConfig {
    fn default() -> Self {
        AccessorConfig {
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            log: LogConfig::default(),
        }
    }
}

impl AccessorConfig {
    /// Parses and validates a JSON document; missing fields take defaults.
    pub fn from_json(raw: &str) -> ConfigResult<Self> {
        let config: AccessorConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.default_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        self.log.filter().map(|_| ())
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = AccessorConfig::from_json("{}").unwrap();
        assert_eq!(config, AccessorConfig::default());
        assert_eq!(config.default_timeout(), Duration::from_secs(3));
        assert_eq!(config.log.level, "error");
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config =
            AccessorConfig::from_json(r#"{"default_timeout_ms": 250, "log": {"level": "debug"}}"#)
                .unwrap();
        assert_eq!(config.default_timeout(), Duration::from_millis(250));
        assert_eq!(config.log.level, "debug");
        assert!(!config.log.ansi);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = AccessorConfig::from_json(r#"{"default_timeout_ms": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = AccessorConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn bad_level_directive_is_rejected() {
        let config = LogConfig {
            level: "rowkv=notalevel".to_string(),
            ansi: false,
        };
        assert!(matches!(
            config.filter(),
            Err(ConfigError::InvalidLevel { .. })
        ));
    }
}
