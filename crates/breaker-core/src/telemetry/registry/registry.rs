//! Metric registry implementation

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::super::metrics::{Counter, Gauge, Histogram, Metric};
use super::types::{MetricReading, MetricsSnapshot};

/// Registry of named counters, gauges and histograms.
///
/// Metrics are created on first request and shared afterwards: asking for an
/// existing name returns the same instance. A name is owned by one metric
/// kind; asking for a counter named like an existing gauge returns a
/// detached counter and logs a warning instead of replacing the gauge.
#[derive(Debug)]
pub struct MetricRegistry {
    counters: RwLock<HashMap<String, Arc<Counter>>>,
    gauges: RwLock<HashMap<String, Arc<Gauge>>>,
    histograms: RwLock<HashMap<String, Arc<Histogram>>>,
    started_at: DateTime<Utc>,
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            counters: RwLock::new(HashMap::new()),
            gauges: RwLock::new(HashMap::new()),
            histograms: RwLock::new(HashMap::new()),
            started_at: Utc::now(),
        }
    }

    /// Get or create a counter
    pub fn counter(&self, name: &str, help: &str) -> Arc<Counter> {
        if let Some(counter) = self.counters.read().get(name) {
            return Arc::clone(counter);
        }
        if self.is_taken_by_other_kind(name, Kind::Counter) {
            tracing::warn!(metric = %name, "metric name already registered with another type");
            return Arc::new(Counter::new(name, help));
        }
        Arc::clone(
            self.counters
                .write()
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Counter::new(name, help))),
        )
    }

    /// Get or create a gauge
    pub fn gauge(&self, name: &str, help: &str) -> Arc<Gauge> {
        if let Some(gauge) = self.gauges.read().get(name) {
            return Arc::clone(gauge);
        }
        if self.is_taken_by_other_kind(name, Kind::Gauge) {
            tracing::warn!(metric = %name, "metric name already registered with another type");
            return Arc::new(Gauge::new(name, help));
        }
        Arc::clone(
            self.gauges
                .write()
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Gauge::new(name, help))),
        )
    }

    /// Get or create a histogram with latency buckets
    pub fn histogram(&self, name: &str, help: &str) -> Arc<Histogram> {
        if let Some(histogram) = self.histograms.read().get(name) {
            return Arc::clone(histogram);
        }
        if self.is_taken_by_other_kind(name, Kind::Histogram) {
            tracing::warn!(metric = %name, "metric name already registered with another type");
            return Arc::new(Histogram::new(name, help));
        }
        Arc::clone(
            self.histograms
                .write()
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Histogram::new(name, help))),
        )
    }

    /// Whether a metric with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.counters.read().contains_key(name)
            || self.gauges.read().contains_key(name)
            || self.histograms.read().contains_key(name)
    }

    /// Current reading of the metric named `name`, whatever its kind
    pub fn read(&self, name: &str) -> Option<MetricReading> {
        if let Some(counter) = self.counters.read().get(name) {
            return Some(MetricReading::of(&**counter));
        }
        if let Some(gauge) = self.gauges.read().get(name) {
            return Some(MetricReading::of(&**gauge));
        }
        self.histograms
            .read()
            .get(name)
            .map(|histogram| MetricReading::of(&**histogram))
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .counters
            .read()
            .keys()
            .chain(self.gauges.read().keys())
            .chain(self.histograms.read().keys())
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Remove a metric of any kind; returns whether something was removed
    pub fn remove(&self, name: &str) -> bool {
        self.counters.write().remove(name).is_some()
            | self.gauges.write().remove(name).is_some()
            | self.histograms.write().remove(name).is_some()
    }

    /// Reset every metric to its initial value without unregistering it
    pub fn reset(&self) {
        self.counters.read().values().for_each(|m| m.reset());
        self.gauges.read().values().for_each(|m| m.reset());
        self.histograms.read().values().for_each(|m| m.reset());
    }

    /// Snapshot of all current values
    pub fn snapshot(&self) -> MetricsSnapshot {
        let now = Utc::now();
        MetricsSnapshot {
            timestamp: now,
            uptime_seconds: (now - self.started_at).num_seconds().max(0) as u64,
            counters: self
                .counters
                .read()
                .iter()
                .map(|(name, m)| (name.clone(), m.get()))
                .collect(),
            gauges: self
                .gauges
                .read()
                .iter()
                .map(|(name, m)| (name.clone(), m.get()))
                .collect(),
            histograms: self
                .histograms
                .read()
                .iter()
                .map(|(name, m)| (name.clone(), m.get_data()))
                .collect(),
        }
    }

    fn is_taken_by_other_kind(&self, name: &str, kind: Kind) -> bool {
        (kind != Kind::Counter && self.counters.read().contains_key(name))
            || (kind != Kind::Gauge && self.gauges.read().contains_key(name))
            || (kind != Kind::Histogram && self.histograms.read().contains_key(name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Counter,
    Gauge,
    Histogram,
}
