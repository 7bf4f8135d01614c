//! Gauge metric

use std::sync::atomic::{AtomicU64, Ordering};

use super::types::{Metric, MetricType, MetricValue};

/// Point-in-time value that can move in both directions.
///
/// The `f64` is stored as its bit pattern so reads and writes stay lock-free.
#[derive(Debug)]
pub struct Gauge {
    name: String,
    help: String,
    bits: AtomicU64,
}

impl Gauge {
    /// Create a gauge at `0.0`
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            bits: AtomicU64::new(0f64.to_bits()),
        }
    }

    /// Set the value
    pub fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Add `delta` (negative values decrement)
    pub fn add(&self, delta: f64) {
        let mut current = self.bits.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + delta).to_bits();
            match self
                .bits
                .compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }

    /// Increment by one
    pub fn inc(&self) {
        self.add(1.0);
    }

    /// Decrement by one
    pub fn dec(&self) {
        self.add(-1.0);
    }

    /// Current value
    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// Help text supplied at registration
    pub fn help(&self) -> &str {
        &self.help
    }
}

impl Metric for Gauge {
    fn name(&self) -> &str {
        &self.name
    }

    fn metric_type(&self) -> MetricType {
        MetricType::Gauge
    }

    fn value(&self) -> MetricValue {
        MetricValue::Gauge(self.get())
    }

    fn reset(&self) {
        self.set(0.0);
    }
}
