//! Metrics publisher that writes circuit-breaker metrics into a
//! [`MetricRegistry`](breaker_core::MetricRegistry)

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use breaker_core::{
    BreakerMetrics, CircuitBreakerConfig, CircuitState, Counter, Gauge, Histogram, MetricsPublisher,
    SharedMetricRegistry,
};

/// Publisher installed by the bundle.
///
/// Each breaker gets six metrics named `breaker.<name>.<metric>`:
/// `success_total`, `failure_total` and `rejected_total` counters, a
/// `latency_seconds` histogram, a `state` gauge (closed 0, open 1,
/// half-open 2) and an `open` gauge (0 or 1).
#[derive(Debug, Clone)]
pub struct RegistryMetricsPublisher {
    registry: SharedMetricRegistry,
}

impl RegistryMetricsPublisher {
    pub const NAME: &'static str = "metric-registry";

    pub fn new(registry: SharedMetricRegistry) -> Self {
        Self { registry }
    }

    /// Registry the metrics are written to
    pub fn registry(&self) -> &SharedMetricRegistry {
        &self.registry
    }
}

impl MetricsPublisher for RegistryMetricsPublisher {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn breaker_metrics(
        &self,
        breaker_name: &str,
        _config: &CircuitBreakerConfig,
    ) -> Arc<dyn BreakerMetrics> {
        let metric = |suffix: &str| format!("breaker.{}.{}", breaker_name, suffix);
        let metrics = RegistryBreakerMetrics {
            success: self
                .registry
                .counter(&metric("success_total"), "Successful calls"),
            failure: self
                .registry
                .counter(&metric("failure_total"), "Failed calls"),
            rejected: self
                .registry
                .counter(&metric("rejected_total"), "Calls short-circuited by an open circuit"),
            latency: self
                .registry
                .histogram(&metric("latency_seconds"), "Latency of executed calls"),
            state: self
                .registry
                .gauge(&metric("state"), "Circuit state: closed 0, open 1, half-open 2"),
            open: self
                .registry
                .gauge(&metric("open"), "Whether the circuit is open"),
        };

        tracing::debug!(circuit = %breaker_name, "publishing circuit breaker metrics");
        Arc::new(metrics)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct RegistryBreakerMetrics {
    success: Arc<Counter>,
    failure: Arc<Counter>,
    rejected: Arc<Counter>,
    latency: Arc<Histogram>,
    state: Arc<Gauge>,
    open: Arc<Gauge>,
}

impl BreakerMetrics for RegistryBreakerMetrics {
    fn on_success(&self, latency: Duration) {
        self.success.inc();
        self.latency.observe_duration(latency);
    }

    fn on_failure(&self, latency: Duration) {
        self.failure.inc();
        self.latency.observe_duration(latency);
    }

    fn on_rejection(&self) {
        self.rejected.inc();
    }

    fn on_state_change(&self, state: CircuitState) {
        self.state.set(state.as_gauge());
        self.open
            .set(if state == CircuitState::Open { 1.0 } else { 0.0 });
    }
}
