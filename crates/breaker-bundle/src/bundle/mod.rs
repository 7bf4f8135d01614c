//! Bundle contract of the host application
//!
//! A bundle is initialized once against the [`Bootstrap`] and then run once
//! against the host configuration and [`Environment`], before any listener
//! accepts connections.

mod breaker_bundle;


pub use breaker_bundle::BreakerStreamBundle;

use crate::config::Configuration;
use crate::environment::Environment;
use crate::error::BundleResult;

/// Start-up information available before configuration is parsed
#[derive(Debug, Clone)]
pub struct Bootstrap {
    application_name: String,
}

impl Bootstrap {
    pub fn new(application_name: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
        }
    }

    pub fn application_name(&self) -> &str {
        &self.application_name
    }
}

/// Lifecycle of a bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleState {
    Uninitialized,
    Initialized,
    /// Terminal: `run` completed
    Active,
}

impl std::fmt::Display for BundleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Initialized => write!(f, "initialized"),
            Self::Active => write!(f, "active"),
        }
    }
}

/// Reusable start-up unit of a host application
pub trait Bundle<C: Configuration>: Send {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Called once before configuration is available
    fn initialize(&mut self, bootstrap: &mut Bootstrap) -> BundleResult<()>;

    /// Called once with the parsed configuration; errors abort start-up
    fn run(&mut self, configuration: &C, environment: &mut Environment) -> BundleResult<()>;
}
