//! Immutable bundle configuration

use std::sync::Arc;

use crate::environment::ContextKind;
use crate::error::{BundleError, BundleResult};
use crate::stream::StreamSettings;

/// Path dashboards poll by default
pub const DEFAULT_STREAM_PATH: &str = "/hystrix.stream";

/// Name the stream servlet is registered under
pub const SERVLET_NAME: &str = "breaker-metrics-stream";

/// Runtime decision whether to install the metrics publisher
pub type MetricsPublisherPredicate<C> = Arc<dyn Fn(&C) -> bool + Send + Sync>;

/// Where the stream servlet is registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamTarget {
    Admin { path: String },
    Application { path: String },
    /// No servlet is registered
    Disabled,
}

impl StreamTarget {
    /// Context the servlet goes to, `None` when disabled
    pub fn context(&self) -> Option<ContextKind> {
        match self {
            Self::Admin { .. } => Some(ContextKind::Admin),
            Self::Application { .. } => Some(ContextKind::Application),
            Self::Disabled => None,
        }
    }

    /// URL mapping of the servlet, `None` when disabled
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Admin { path } | Self::Application { path } => Some(path),
            Self::Disabled => None,
        }
    }
}

impl Default for StreamTarget {
    fn default() -> Self {
        Self::Admin {
            path: DEFAULT_STREAM_PATH.to_string(),
        }
    }
}

/// Check that `path` can be used verbatim as a servlet URL mapping
pub fn validate_stream_path(path: &str) -> BundleResult<()> {
    let reason = if path.is_empty() {
        "path is empty"
    } else if !path.starts_with('/') {
        "path must start with '/'"
    } else if path.chars().any(char::is_whitespace) {
        "path must not contain whitespace"
    } else if path.contains(':') || path.contains('*') {
        "path must not contain route parameters (':' or '*')"
    } else if path.contains("//") {
        "path must not contain empty segments"
    } else {
        return Ok(());
    };
    Err(BundleError::invalid_path(path, reason))
}

/// Configuration consumed by the bundle at start-up, produced by
/// [`BundleConfigurationBuilder::build`](super::BundleConfigurationBuilder::build)
pub struct BundleConfiguration<C> {
    pub(super) target: StreamTarget,
    pub(super) metrics_publisher_enabled: bool,
    pub(super) metrics_publisher_predicate: Option<MetricsPublisherPredicate<C>>,
    pub(super) stream: StreamSettings,
}

impl<C> BundleConfiguration<C> {
    /// Where the stream servlet goes
    pub fn target(&self) -> &StreamTarget {
        &self.target
    }

    /// Whether the publisher flag is set
    pub fn metrics_publisher_enabled(&self) -> bool {
        self.metrics_publisher_enabled
    }

    /// Whether a publisher predicate was given
    pub fn has_metrics_publisher_predicate(&self) -> bool {
        self.metrics_publisher_predicate.is_some()
    }

    /// Stream endpoint settings
    pub fn stream_settings(&self) -> &StreamSettings {
        &self.stream
    }

    /// Flag AND predicate; a missing predicate counts as `true`.
    /// The predicate is not evaluated when the flag is off.
    pub fn should_install_publisher(&self, configuration: &C) -> bool {
        self.metrics_publisher_enabled
            && self
                .metrics_publisher_predicate
                .as_ref()
                .is_none_or(|predicate| predicate(configuration))
    }
}

impl<C> Default for BundleConfiguration<C> {
    fn default() -> Self {
        Self {
            target: StreamTarget::default(),
            metrics_publisher_enabled: true,
            metrics_publisher_predicate: None,
            stream: StreamSettings::default(),
        }
    }
}

impl<C> Clone for BundleConfiguration<C> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            metrics_publisher_enabled: self.metrics_publisher_enabled,
            metrics_publisher_predicate: self.metrics_publisher_predicate.clone(),
            stream: self.stream,
        }
    }
}

impl<C> std::fmt::Debug for BundleConfiguration<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleConfiguration")
            .field("target", &self.target)
            .field("metrics_publisher_enabled", &self.metrics_publisher_enabled)
            .field(
                "metrics_publisher_predicate",
                &self.metrics_publisher_predicate.as_ref().map(|_| "<fn>"),
            )
            .field("stream", &self.stream)
            .finish()
    }
}
