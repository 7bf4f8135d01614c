//! Breaker Stream Core Library
//!
//! This crate provides the pieces the stream bundle integrates with:
//! circuit breakers and their registry, the process-wide plugin slot that
//! decides where breaker metrics are published, and a small metrics registry
//! of counters, gauges and histograms.

pub mod circuit_breaker;
pub mod plugins;
pub mod telemetry;

// Re-export commonly used types
pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerRegistry,
    CircuitBreakerStats, CircuitState, LatencySnapshot, RollingCounts,
};
pub use plugins::{
    BreakerMetrics, BreakerPlugins, MetricsPublisher, NoopMetricsPublisher, PluginError,
    PluginResult,
};
pub use telemetry::{
    Counter, Gauge, Histogram, HistogramData, HistogramTimer, Metric,
    MetricReading, MetricRegistry, MetricType, MetricValue, MetricsSnapshot, SharedMetricRegistry,
};
