//! Error types for the breaker stream bundle

use breaker_core::PluginError;
use thiserror::Error;

/// Result type alias for bundle operations
pub type BundleResult<T> = Result<T, BundleError>;

/// Start-up errors raised while configuring or running the bundle.
///
/// None of these are retried: the host aborts start-up and reports the
/// message, which names the conflicting resource.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BundleError {
    /// A servlet name or URL mapping is already taken in the target context
    #[error("{resource} is already registered in the {context} context")]
    ConfigurationConflict { context: String, resource: String },

    /// The circuit-breaker plugin slot already holds a publisher
    #[error(
        "{slot} plugin slot already holds '{existing}'; refusing to install '{attempted}'"
    )]
    PluginAlreadyInstalled {
        slot: String,
        existing: String,
        attempted: String,
    },

    /// A stream path that cannot be used as a URL mapping
    #[error("Invalid stream path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A bundle method was called out of order
    #[error("Bundle lifecycle error: {message}")]
    Lifecycle { message: String },

    /// Configuration file or settings could not be used
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// A listener could not be bound or served
    #[error("Server error: {message}")]
    Server { message: String },
}

impl BundleError {
    /// Create a conflict error for `resource` in `context`
    pub fn conflict(context: impl Into<String>, resource: impl Into<String>) -> Self {
        Self::ConfigurationConflict {
            context: context.into(),
            resource: resource.into(),
        }
    }

    /// Create an invalid path error
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a lifecycle error
    pub fn lifecycle(message: impl Into<String>) -> Self {
        Self::Lifecycle {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a server error
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigurationConflict { .. } => "BUNDLE_CONFIGURATION_CONFLICT",
            Self::PluginAlreadyInstalled { .. } => "BUNDLE_PLUGIN_ALREADY_INSTALLED",
            Self::InvalidPath { .. } => "BUNDLE_INVALID_PATH",
            Self::Lifecycle { .. } => "BUNDLE_LIFECYCLE",
            Self::Config { .. } => "BUNDLE_CONFIG",
            Self::Server { .. } => "BUNDLE_SERVER",
        }
    }

    /// Context attached to the error, if any
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Config { context, .. } => context.as_deref(),
            _ => None,
        }
    }
}

impl From<PluginError> for BundleError {
    fn from(err: PluginError) -> Self {
        match err {
            PluginError::AlreadyInstalled {
                slot,
                existing,
                attempted,
            } => Self::PluginAlreadyInstalled {
                slot,
                existing,
                attempted,
            },
        }
    }
}

impl From<std::io::Error> for BundleError {
    fn from(err: std::io::Error) -> Self {
        Self::server(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_names_resource() {
        let err = BundleError::conflict("admin", "servlet 'breaker-metrics-stream'");
        assert_eq!(
            err.to_string(),
            "servlet 'breaker-metrics-stream' is already registered in the admin context"
        );
        assert_eq!(err.error_code(), "BUNDLE_CONFIGURATION_CONFLICT");
    }

    #[test]
    fn test_from_plugin_error() {
        let err: BundleError = PluginError::AlreadyInstalled {
            slot: "metrics_publisher".into(),
            existing: "noop".into(),
            attempted: "metric-registry".into(),
        }
        .into();

        assert_eq!(err.error_code(), "BUNDLE_PLUGIN_ALREADY_INSTALLED");
        assert!(err.to_string().contains("'noop'"));
        assert!(err.to_string().contains("'metric-registry'"));
    }

    #[test]
    fn test_config_context() {
        let err = BundleError::config_with_context("bad toml", "Reading 'app.toml'");
        assert_eq!(err.context(), Some("Reading 'app.toml'"));
        assert_eq!(BundleError::lifecycle("twice").context(), None);
    }
}
