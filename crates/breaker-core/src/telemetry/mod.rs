//! Metrics registry that circuit-breaker statistics are published into
//!
//! Named counters, gauges and histograms are created on first use; a
//! serializable snapshot feeds the admin `metrics` servlet.

pub mod metrics;
pub mod registry;

pub use metrics::{Counter, Gauge, Histogram, HistogramData, HistogramTimer, Metric, MetricType, MetricValue};
pub use registry::{MetricReading, MetricRegistry, MetricsSnapshot, SharedMetricRegistry};
