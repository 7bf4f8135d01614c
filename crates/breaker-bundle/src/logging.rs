//! Logging configuration and subscriber set-up

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::{BundleError, BundleResult};

/// Output format of the console subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directives (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (pretty, compact, json)
    pub format: LogFormat,
    /// Whether to log to console
    pub log_to_console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            log_to_console: true,
        }
    }
}

impl LoggingConfig {
    /// Filter for this config; `RUST_LOG` takes precedence when set
    pub fn env_filter(&self) -> BundleResult<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(&self.level).map_err(|e| {
            BundleError::config_with_context(
                format!("Invalid log level: {}", e),
                format!("Parsing logging.level '{}'", self.level),
            )
        })
    }
}

/// Install the global tracing subscriber.
///
/// Returns `Ok(false)` when console logging is off or a subscriber is already
/// installed.
pub fn init_logging(config: &LoggingConfig) -> BundleResult<bool> {
    if !config.log_to_console {
        return Ok(false);
    }

    let filter = config.env_filter()?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    match installed {
        Ok(()) => Ok(true),
        Err(e) => {
            tracing::debug!("tracing subscriber already installed: {}", e);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.log_to_console);
    }

    #[test]
    fn test_format_deserializes_lowercase() {
        let config: LoggingConfig =
            serde_json::from_str(r#"{"level": "debug", "format": "json"}"#).unwrap();
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.log_to_console);
    }

    #[test]
    fn test_console_off_installs_nothing() {
        let config = LoggingConfig {
            log_to_console: false,
            ..Default::default()
        };
        assert!(!init_logging(&config).unwrap());
    }

    #[test]
    fn test_repeat_init_is_noop() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            ..Default::default()
        };
        let _ = init_logging(&config).unwrap();
        assert!(!init_logging(&config).unwrap());
    }
}
