//! Write-once plugin slot

use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};

use super::publisher::{MetricsPublisher, NoopMetricsPublisher};
use super::{PluginError, PluginResult};

const METRICS_PUBLISHER_SLOT: &str = "metrics_publisher";

/// Process-wide slot, for hosts that do not inject their own
static GLOBAL_PLUGINS: Lazy<Arc<BreakerPlugins>> = Lazy::new(|| Arc::new(BreakerPlugins::new()));

/// Plugin slots consulted by the circuit-breaker library.
///
/// Each slot is written at most once. Reading a slot that was never written
/// fixes it to the default implementation, after which installation fails
/// with [`PluginError::AlreadyInstalled`]. Hosts therefore install plugins
/// during start-up, before the first breaker is created.
#[derive(Default)]
pub struct BreakerPlugins {
    metrics_publisher: OnceCell<Arc<dyn MetricsPublisher>>,
}

impl std::fmt::Debug for BreakerPlugins {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreakerPlugins")
            .field(
                "metrics_publisher",
                &self.metrics_publisher.get().map(|p| p.name().to_string()),
            )
            .finish()
    }
}

impl BreakerPlugins {
    /// Create an empty set of slots
    pub fn new() -> Self {
        Self {
            metrics_publisher: OnceCell::new(),
        }
    }

    /// The process-wide instance
    pub fn global() -> Arc<BreakerPlugins> {
        Arc::clone(&GLOBAL_PLUGINS)
    }

    /// Install the metrics publisher.
    ///
    /// Fails if the slot is already occupied, including by the no-op default
    /// fixed by an earlier [`metrics_publisher`](Self::metrics_publisher) call.
    pub fn register_metrics_publisher(
        &self,
        publisher: Arc<dyn MetricsPublisher>,
    ) -> PluginResult<()> {
        let attempted = publisher.name().to_string();
        match self.metrics_publisher.try_insert(publisher) {
            Ok(_) => {
                tracing::info!(publisher = %attempted, "installed circuit breaker metrics publisher");
                Ok(())
            }
            Err((existing, _rejected)) => Err(PluginError::AlreadyInstalled {
                slot: METRICS_PUBLISHER_SLOT.to_string(),
                existing: existing.name().to_string(),
                attempted,
            }),
        }
    }

    /// Fail the way [`register_metrics_publisher`](Self::register_metrics_publisher)
    /// would if the slot is already occupied, without writing it
    pub fn ensure_metrics_publisher_vacant(&self, attempted: &str) -> PluginResult<()> {
        match self.metrics_publisher.get() {
            None => Ok(()),
            Some(existing) => Err(PluginError::AlreadyInstalled {
                slot: METRICS_PUBLISHER_SLOT.to_string(),
                existing: existing.name().to_string(),
                attempted: attempted.to_string(),
            }),
        }
    }

    /// The active metrics publisher; falls back to (and freezes) the no-op
    /// publisher when nothing was installed
    pub fn metrics_publisher(&self) -> Arc<dyn MetricsPublisher> {
        Arc::clone(self.metrics_publisher.get_or_init(|| {
            tracing::debug!("metrics publisher slot read before installation, using no-op publisher");
            Arc::new(NoopMetricsPublisher)
        }))
    }

    /// The installed publisher, without fixing the default
    pub fn installed_metrics_publisher(&self) -> Option<Arc<dyn MetricsPublisher>> {
        self.metrics_publisher.get().cloned()
    }
}
