//! Builder for bundle configuration

use std::sync::Arc;

use super::bundle_config::{
    BundleConfiguration, DEFAULT_STREAM_PATH, MetricsPublisherPredicate, StreamTarget,
    validate_stream_path,
};
use crate::error::BundleResult;
use crate::stream::StreamSettings;

/// Builder for [`BundleConfiguration`].
///
/// Setters may be called in any order; [`build`](Self::build) derives the
/// target from the full set of calls:
///
/// - an application path that was not disabled wins, and the admin context
///   then gets nothing;
/// - otherwise the admin context gets the admin path (or
///   [`DEFAULT_STREAM_PATH`]) unless it was disabled;
/// - otherwise no servlet is registered.
///
/// # Example
///
/// ```
/// use breaker_bundle::{BaseConfiguration, BundleConfigurationBuilder, StreamTarget};
///
/// let config = BundleConfigurationBuilder::<BaseConfiguration>::new()
///     .disable_stream_servlet_in_admin_context()
///     .with_application_stream_path("/breakers.stream")
///     .build()
///     .unwrap();
///
/// assert_eq!(
///     config.target(),
///     &StreamTarget::Application { path: "/breakers.stream".into() }
/// );
/// ```
pub struct BundleConfigurationBuilder<C> {
    application_path: Option<String>,
    admin_path: Option<String>,
    admin_disabled: bool,
    application_disabled: bool,
    metrics_publisher_enabled: bool,
    metrics_publisher_predicate: Option<MetricsPublisherPredicate<C>>,
    stream: StreamSettings,
}

impl<C> BundleConfigurationBuilder<C> {
    /// Builder with every default: admin context, default path, publisher on
    pub fn new() -> Self {
        Self {
            application_path: None,
            admin_path: None,
            admin_disabled: false,
            application_disabled: false,
            metrics_publisher_enabled: true,
            metrics_publisher_predicate: None,
            stream: StreamSettings::default(),
        }
    }

    /// Serve the stream on the application context at `path`
    pub fn with_application_stream_path(mut self, path: impl Into<String>) -> Self {
        self.application_path = Some(path.into());
        self
    }

    /// Serve the stream on the admin context at `path`
    pub fn with_admin_stream_uri(mut self, path: impl Into<String>) -> Self {
        self.admin_path = Some(path.into());
        self
    }

    /// Never register the servlet on the admin context
    pub fn disable_stream_servlet_in_admin_context(mut self) -> Self {
        self.admin_disabled = true;
        self
    }

    /// Never register the servlet on the application context
    pub fn disable_stream_servlet_in_application_context(mut self) -> Self {
        self.application_disabled = true;
        self
    }

    /// Do not install the registry-backed metrics publisher
    pub fn disable_metrics_publisher(mut self) -> Self {
        self.metrics_publisher_enabled = false;
        self
    }

    /// Decide at start-up, from the host configuration, whether to install
    /// the publisher. Combined with the publisher flag by logical AND.
    pub fn with_metrics_publisher_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.metrics_publisher_predicate = Some(Arc::new(predicate));
        self
    }

    /// Delay and connection cap of the stream endpoint
    pub fn with_stream_settings(mut self, settings: StreamSettings) -> Self {
        self.stream = settings;
        self
    }

    /// Produce the configuration.
    ///
    /// Every supplied path is validated, including one that ends up unused.
    pub fn build(self) -> BundleResult<BundleConfiguration<C>> {
        for path in [&self.application_path, &self.admin_path].into_iter().flatten() {
            validate_stream_path(path)?;
        }
        self.stream.validate()?;

        let target = match (self.application_path, self.application_disabled) {
            (Some(path), false) => StreamTarget::Application { path },
            _ if !self.admin_disabled => StreamTarget::Admin {
                path: self
                    .admin_path
                    .unwrap_or_else(|| DEFAULT_STREAM_PATH.to_string()),
            },
            _ => StreamTarget::Disabled,
        };

        Ok(BundleConfiguration {
            target,
            metrics_publisher_enabled: self.metrics_publisher_enabled,
            metrics_publisher_predicate: self.metrics_publisher_predicate,
            stream: self.stream,
        })
    }
}

impl<C> Default for BundleConfigurationBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for BundleConfigurationBuilder<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleConfigurationBuilder")
            .field("application_path", &self.application_path)
            .field("admin_path", &self.admin_path)
            .field("admin_disabled", &self.admin_disabled)
            .field("application_disabled", &self.application_disabled)
            .field("metrics_publisher_enabled", &self.metrics_publisher_enabled)
            .field(
                "metrics_publisher_predicate",
                &self.metrics_publisher_predicate.as_ref().map(|_| "<fn>"),
            )
            .field("stream", &self.stream)
            .finish()
    }
}
