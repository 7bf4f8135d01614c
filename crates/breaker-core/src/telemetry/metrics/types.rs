//! Metric types and trait definitions

use serde::{Deserialize, Serialize};

/// Kind of metric held by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    /// Monotonically increasing count
    Counter,
    /// Point-in-time value
    Gauge,
    /// Distribution of observations
    Histogram,
}

/// Current value of a metric
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    Counter(u64),
    Gauge(f64),
    Histogram(HistogramData),
}

/// Histogram contents at the time of reading
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistogramData {
    /// Number of observations
    pub count: u64,
    /// Sum of all observations
    pub sum: f64,
    /// Smallest observation, 0 when empty
    pub min: f64,
    /// Largest observation, 0 when empty
    pub max: f64,
    /// Cumulative bucket counts as `(upper_bound, count)`
    pub buckets: Vec<(f64, u64)>,
}

impl HistogramData {
    /// Arithmetic mean of the observations
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Estimate a quantile (`0.0..=1.0`) from the cumulative buckets.
    ///
    /// Returns the upper bound of the first bucket reaching the requested
    /// rank, or `max` when the rank falls above the last bucket.
    pub fn quantile(&self, q: f64) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let rank = (q.clamp(0.0, 1.0) * self.count as f64).ceil() as u64;
        self.buckets
            .iter()
            .find(|(_, count)| *count >= rank.max(1))
            .map(|(bound, _)| bound.min(self.max))
            .unwrap_or(self.max)
    }
}

/// Common interface of everything stored in a [`MetricRegistry`](crate::telemetry::MetricRegistry)
pub trait Metric: Send + Sync {
    /// Registered metric name
    fn name(&self) -> &str;

    /// Metric kind
    fn metric_type(&self) -> MetricType;

    /// Current value
    fn value(&self) -> MetricValue;

    /// Reset to the initial value
    fn reset(&self);
}
