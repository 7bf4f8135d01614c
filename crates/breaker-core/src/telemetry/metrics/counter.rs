//! Counter metric

use std::sync::atomic::{AtomicU64, Ordering};

use super::types::{Metric, MetricType, MetricValue};

/// Monotonically increasing counter
#[derive(Debug)]
pub struct Counter {
    name: String,
    help: String,
    value: AtomicU64,
}

impl Counter {
    /// Create a counter starting at zero
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            value: AtomicU64::new(0),
        }
    }

    /// Increment by one
    pub fn inc(&self) {
        self.inc_by(1);
    }

    /// Increment by `n`
    pub fn inc_by(&self, n: u64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    /// Current count
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Help text supplied at registration
    pub fn help(&self) -> &str {
        &self.help
    }
}

impl Metric for Counter {
    fn name(&self) -> &str {
        &self.name
    }

    fn metric_type(&self) -> MetricType {
        MetricType::Counter
    }

    fn value(&self) -> MetricValue {
        MetricValue::Counter(self.get())
    }

    fn reset(&self) {
        self.value.store(0, Ordering::Relaxed);
    }
}
