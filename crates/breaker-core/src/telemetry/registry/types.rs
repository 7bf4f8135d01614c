//! Snapshot and shared-handle types for the metric registry

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::metrics::{HistogramData, Metric, MetricType, MetricValue};
use super::MetricRegistry;

/// Registry contents at a point in time, keyed by metric name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,
    /// Seconds since the registry was created
    pub uptime_seconds: u64,
    pub counters: BTreeMap<String, u64>,
    pub gauges: BTreeMap<String, f64>,
    pub histograms: BTreeMap<String, HistogramData>,
}

impl MetricsSnapshot {
    /// Total number of metrics in the snapshot
    pub fn len(&self) -> usize {
        self.counters.len() + self.gauges.len() + self.histograms.len()
    }

    /// Whether the snapshot holds no metrics
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Quantiles estimated for histogram readings
const READING_QUANTILES: &[(&str, f64)] = &[("p50", 0.5), ("p90", 0.9), ("p99", 0.99)];

/// Current value of a single registered metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricReading {
    pub name: String,
    pub kind: MetricType,
    pub value: MetricValue,
    /// Bucket-estimated quantiles, histograms only
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub quantiles: BTreeMap<String, f64>,
}

impl MetricReading {
    pub(super) fn of(metric: &dyn Metric) -> Self {
        let value = metric.value();
        let quantiles = match &value {
            MetricValue::Histogram(data) => READING_QUANTILES
                .iter()
                .map(|(label, q)| (label.to_string(), data.quantile(*q)))
                .collect(),
            _ => BTreeMap::new(),
        };
        Self {
            name: metric.name().to_string(),
            kind: metric.metric_type(),
            value,
            quantiles,
        }
    }
}

/// Registry handle shared between the environment and publishers
pub type SharedMetricRegistry = Arc<MetricRegistry>;
