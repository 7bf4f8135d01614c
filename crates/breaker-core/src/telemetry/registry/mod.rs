//! Named metric registry

mod registry;
mod types;


pub use registry::MetricRegistry;
pub use types::{MetricReading, MetricsSnapshot, SharedMetricRegistry};
