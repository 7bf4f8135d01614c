//! Metrics publisher extension point

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use crate::circuit_breaker::{CircuitBreakerConfig, CircuitState};

/// Backend that receives circuit-breaker metrics.
///
/// The slot hands every newly created breaker to
/// [`breaker_metrics`](MetricsPublisher::breaker_metrics) once; the returned
/// handle is then fed synchronously from the breaker's hot path, so
/// implementations must not block.
pub trait MetricsPublisher: Send + Sync {
    /// Stable name used in diagnostics
    fn name(&self) -> &str;

    /// Create the metrics handle for one breaker
    fn breaker_metrics(
        &self,
        breaker_name: &str,
        config: &CircuitBreakerConfig,
    ) -> Arc<dyn BreakerMetrics>;

    /// Cast to Any for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// Per-breaker metrics sink
pub trait BreakerMetrics: Send + Sync {
    /// A guarded call succeeded
    fn on_success(&self, latency: Duration) {
        let _ = latency;
    }

    /// A guarded call failed
    fn on_failure(&self, latency: Duration) {
        let _ = latency;
    }

    /// A call was short-circuited without running
    fn on_rejection(&self) {}

    /// The breaker moved to `state`
    fn on_state_change(&self, state: CircuitState) {
        let _ = state;
    }
}

/// Publisher used when nothing was installed before first access
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetricsPublisher;

impl NoopMetricsPublisher {
    pub const NAME: &'static str = "noop";
}

impl MetricsPublisher for NoopMetricsPublisher {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn breaker_metrics(
        &self,
        _breaker_name: &str,
        _config: &CircuitBreakerConfig,
    ) -> Arc<dyn BreakerMetrics> {
        Arc::new(NoopBreakerMetrics)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBreakerMetrics;

impl BreakerMetrics for NoopBreakerMetrics {}
