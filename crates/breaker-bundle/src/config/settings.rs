//! Host configuration models

use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::builder::BundleConfigurationBuilder;
use super::file_loader::load_from_file;
use crate::error::BundleResult;
use crate::logging::LoggingConfig;
use crate::stream::StreamSettings;

/// Runtime configuration of a host application.
///
/// Bundles receive it in [`Bundle::run`](crate::Bundle::run); publisher
/// predicates are evaluated against it.
pub trait Configuration: Send + Sync + 'static {
    /// Listener addresses
    fn server(&self) -> &ServerSettings;

    /// Logging settings
    fn logging(&self) -> &LoggingConfig;
}

/// Addresses of the two HTTP listeners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub admin_address: SocketAddr,
    pub application_address: SocketAddr,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            admin_address: SocketAddr::from(([127, 0, 0, 1], 8081)),
            application_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

/// Context named by the `breaker_stream.target` setting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    #[default]
    Admin,
    Application,
    Disabled,
}

/// File form of the bundle configuration (`[breaker_stream]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleSettings {
    /// Stream path; the default path when absent
    pub stream_path: Option<String>,
    pub target: TargetKind,
    pub metrics_publisher_enabled: bool,
    pub stream: StreamSettings,
}

impl Default for BundleSettings {
    fn default() -> Self {
        Self {
            stream_path: None,
            target: TargetKind::Admin,
            metrics_publisher_enabled: true,
            stream: StreamSettings::default(),
        }
    }
}

impl BundleSettings {
    /// Builder preloaded with these settings; predicates and further
    /// overrides can still be chained before `build`
    pub fn to_builder<C>(&self) -> BundleConfigurationBuilder<C> {
        let mut builder = BundleConfigurationBuilder::new().with_stream_settings(self.stream);

        builder = match self.target {
            TargetKind::Admin => match &self.stream_path {
                Some(path) => builder.with_admin_stream_uri(path.clone()),
                None => builder,
            },
            TargetKind::Application => builder.with_application_stream_path(
                self.stream_path
                    .clone()
                    .unwrap_or_else(|| super::DEFAULT_STREAM_PATH.to_string()),
            ),
            TargetKind::Disabled => builder
                .disable_stream_servlet_in_admin_context()
                .disable_stream_servlet_in_application_context(),
        };

        if !self.metrics_publisher_enabled {
            builder = builder.disable_metrics_publisher();
        }
        builder
    }
}

/// Ready-made [`Configuration`] for hosts without their own type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseConfiguration {
    pub server: ServerSettings,
    pub logging: LoggingConfig,
    pub breaker_stream: BundleSettings,
}

impl BaseConfiguration {
    /// Load from a TOML, YAML or JSON file; defaults when the file is missing
    pub fn load_from_file(path: impl AsRef<Path>) -> BundleResult<Self> {
        load_from_file(path.as_ref())
    }
}

impl Configuration for BaseConfiguration {
    fn server(&self) -> &ServerSettings {
        &self.server
    }

    fn logging(&self) -> &LoggingConfig {
        &self.logging
    }
}
