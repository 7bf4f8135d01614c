//! Circuit-breaker metrics stream
//!
//! Provides:
//! - `StreamSettings`: polling delay and connection cap of the endpoint
//! - `BreakerEvent`: the per-breaker JSON payload dashboards consume
//! - `stream_servlet`: the axum handler registered by the bundle

mod event;
mod servlet;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BundleError, BundleResult};

pub use event::{BreakerEvent, EVENT_TYPE};
pub use servlet::{ALLOWED_METHODS, stream_servlet};

/// Delay between two emissions when nothing else is configured
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Smallest delay a client may ask for
pub const MIN_DELAY: Duration = Duration::from_millis(10);

/// Largest delay a client may ask for
pub const MAX_DELAY: Duration = Duration::from_secs(60);

/// Settings of the stream endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    /// Delay between emissions, overridable per request with `?delay=<ms>`
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
    /// Concurrent stream connections before answering 503
    pub max_concurrent_connections: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            max_concurrent_connections: 5,
        }
    }
}

impl StreamSettings {
    /// Delay for one connection: the requested milliseconds if any, else the
    /// configured delay, kept within [`MIN_DELAY`]..=[`MAX_DELAY`]
    pub fn effective_delay(&self, requested_ms: Option<u64>) -> Duration {
        requested_ms
            .map(Duration::from_millis)
            .unwrap_or(self.delay)
            .clamp(MIN_DELAY, MAX_DELAY)
    }

    /// Reject settings the endpoint cannot serve with
    pub fn validate(&self) -> BundleResult<()> {
        if self.max_concurrent_connections == 0 {
            return Err(BundleError::config(
                "stream.max_concurrent_connections must be at least 1",
            ));
        }
        Ok(())
    }
}
