//! Configuration for discovery runs.
//!
//! Settings are read from environment variables with defaults. Command line
//! flags override them.
//!
//! # Environment Variables
//!
//! - `COHDISC_LOG_LEVEL`: Logging level - default: "info"
//! - `COHDISC_LOG_JSON`: Emit JSON log lines (true|false) - default: "false"
//! - `COHDISC_HTTP_TIMEOUT`: Timeout in seconds for fetching `http` cache
//!   configurations - default: "30"
//! - `COHDISC_ARCHIVE`: Archive file written when `--archive` is not given
//! - `COHDISC_OUTPUT_FORMAT`: Model format (yaml|json) - default: "yaml"
//!
//! # Example
//!
//! ```no_run
//! use coherence_discovery::DiscoveryConfig;
//!
//! let config = DiscoveryConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("{}", config);
//! ```

use crate::util::logging::{parse_level, LoggingConfig};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const MAX_HTTP_TIMEOUT_SECS: u64 = 600;
const DEFAULT_OUTPUT_FORMAT: &str = "yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Emit JSON log lines instead of console output
    pub log_json: bool,

    /// Timeout for fetching `http` artifacts, in seconds
    pub http_timeout_secs: u64,

    /// Default archive path
    pub archive: Option<PathBuf>,

    /// Model output format (yaml, json)
    pub output_format: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        let log_level = env::var("COHDISC_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let log_json = env::var("COHDISC_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        let http_timeout_secs = env::var("COHDISC_HTTP_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        let archive = env::var("COHDISC_ARCHIVE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let output_format = env::var("COHDISC_OUTPUT_FORMAT")
            .unwrap_or_else(|_| DEFAULT_OUTPUT_FORMAT.to_string())
            .to_lowercase();

        Self {
            log_level,
            log_json,
            http_timeout_secs,
            archive,
            output_format,
        }
    }
}

impl DiscoveryConfig {
    /// Checks that numeric values are in range and that the log level and
    /// output format are known.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "HTTP timeout must be at least 1 second".to_string(),
            ));
        }
        if self.http_timeout_secs > MAX_HTTP_TIMEOUT_SECS {
            return Err(ConfigError::ValidationFailed(
                "HTTP timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        match self.output_format.as_str() {
            "yaml" | "json" => {}
            _ => {
                return Err(ConfigError::ParseError {
                    field: "COHDISC_OUTPUT_FORMAT".to_string(),
                    error: format!("'{}' is not one of yaml, json", self.output_format),
                })
            }
        }

        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Subscriber settings for this configuration. Call after [`validate`](Self::validate).
    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: parse_level(&self.log_level),
            use_json: self.log_json,
            ..Default::default()
        }
    }
}

impl fmt::Display for DiscoveryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Discovery Configuration:")?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  JSON Logs: {}", self.log_json)?;
        writeln!(f, "  HTTP Timeout: {}s", self.http_timeout_secs)?;
        if let Some(ref archive) = self.archive {
            writeln!(f, "  Archive: {}", archive.display())?;
        }
        writeln!(f, "  Output Format: {}", self.output_format)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    /// Temporarily sets an environment variable for a test.
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn remove(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = vec![
            EnvGuard::remove("COHDISC_LOG_LEVEL"),
            EnvGuard::remove("COHDISC_LOG_JSON"),
            EnvGuard::remove("COHDISC_HTTP_TIMEOUT"),
            EnvGuard::remove("COHDISC_ARCHIVE"),
            EnvGuard::remove("COHDISC_OUTPUT_FORMAT"),
        ];

        let config = DiscoveryConfig::default();

        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert!(!config.log_json);
        assert_eq!(config.http_timeout_secs, DEFAULT_HTTP_TIMEOUT_SECS);
        assert!(config.archive.is_none());
        assert_eq!(config.output_format, "yaml");
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = vec![
            EnvGuard::set("COHDISC_LOG_LEVEL", "DEBUG"),
            EnvGuard::set("COHDISC_HTTP_TIMEOUT", "90"),
            EnvGuard::set("COHDISC_ARCHIVE", "/tmp/archive.tar.gz"),
            EnvGuard::set("COHDISC_OUTPUT_FORMAT", "json"),
        ];

        let config = DiscoveryConfig::default();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.http_timeout(), Duration::from_secs(90));
        assert_eq!(config.archive, Some(PathBuf::from("/tmp/archive.tar.gz")));
        assert_eq!(config.output_format, "json");
    }

    #[test]
    #[serial]
    fn test_unparsable_timeout_falls_back_to_default() {
        let _guard = EnvGuard::set("COHDISC_HTTP_TIMEOUT", "soon");

        let config = DiscoveryConfig::default();
        assert_eq!(config.http_timeout_secs, DEFAULT_HTTP_TIMEOUT_SECS);
    }

    #[test]
    #[serial]
    fn test_validation_rejects_timeout_out_of_range() {
        let mut config = DiscoveryConfig::default();
        config.http_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.http_timeout_secs = MAX_HTTP_TIMEOUT_SECS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_validation_rejects_unknown_values() {
        let mut config = DiscoveryConfig::default();
        config.log_level = "chatty".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::ValidationFailed(_))));

        config.log_level = "info".to_string();
        config.output_format = "xml".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::ParseError { .. })));
    }

    #[test]
    #[serial]
    fn test_logging_config_follows_configuration() {
        let _guards = vec![
            EnvGuard::set("COHDISC_LOG_LEVEL", "warn"),
            EnvGuard::set("COHDISC_LOG_JSON", "true"),
        ];

        let logging = DiscoveryConfig::default().logging_config();

        assert_eq!(logging.level, tracing::Level::WARN);
        assert!(logging.use_json);
    }

    #[test]
    #[serial]
    fn test_config_display() {
        let _guard = EnvGuard::set("COHDISC_ARCHIVE", "/tmp/a.tar");
        let display = DiscoveryConfig::default().to_string();

        assert!(display.contains("Discovery Configuration:"));
        assert!(display.contains("Archive: /tmp/a.tar"));
    }
}
