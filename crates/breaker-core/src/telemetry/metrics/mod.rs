//! Metric primitives
//!
//! - Counters: monotonically increasing values
//! - Gauges: values that can go up or down
//! - Histograms: bucketed distributions

mod counter;
mod gauge;
mod histogram;
mod types;

#[cfg(test)]
mod tests;

pub use counter::Counter;
pub use gauge::Gauge;
pub use histogram::{Histogram, HistogramTimer};
pub use types::{HistogramData, Metric, MetricType, MetricValue};
