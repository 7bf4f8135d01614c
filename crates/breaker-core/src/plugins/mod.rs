//! Plugin slot of the circuit-breaker library
//!
//! Provides:
//! - `MetricsPublisher` / `BreakerMetrics`: the extension point that receives
//!   every breaker's call outcomes and state changes
//! - `BreakerPlugins`: the write-once slot holding the active publisher
//! - `NoopMetricsPublisher`: what the slot falls back to on first access

mod publisher;
mod slot;


pub use publisher::{BreakerMetrics, MetricsPublisher, NoopBreakerMetrics, NoopMetricsPublisher};
pub use slot::BreakerPlugins;

/// Plugin result type
pub type PluginResult<T> = Result<T, PluginError>;

/// Plugin slot errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PluginError {
    /// The slot already holds an implementation, either installed explicitly
    /// or fixed to the default by an earlier read
    #[error(
        "{slot} plugin slot already holds '{existing}'; refusing to install '{attempted}'"
    )]
    AlreadyInstalled {
        slot: String,
        existing: String,
        attempted: String,
    },
}
