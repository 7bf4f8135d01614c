//! Histogram metric

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::types::{HistogramData, Metric, MetricType, MetricValue};

/// Default latency buckets, in seconds
pub(crate) const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Bucketed distribution of observations
#[derive(Debug)]
pub struct Histogram {
    name: String,
    help: String,
    inner: Mutex<HistogramData>,
}

impl Histogram {
    /// Create a histogram with latency buckets (seconds)
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self::with_buckets(name, help, LATENCY_BUCKETS.to_vec())
    }

    /// Create a histogram with custom upper bounds; bounds are sorted and
    /// deduplicated
    pub fn with_buckets(
        name: impl Into<String>,
        help: impl Into<String>,
        mut bounds: Vec<f64>,
    ) -> Self {
        bounds.sort_by(|a, b| a.total_cmp(b));
        bounds.dedup();
        Self {
            name: name.into(),
            help: help.into(),
            inner: Mutex::new(HistogramData {
                buckets: bounds.into_iter().map(|b| (b, 0)).collect(),
                ..Default::default()
            }),
        }
    }

    /// Record an observation
    pub fn observe(&self, value: f64) {
        let mut data = self.inner.lock();
        if data.count == 0 {
            data.min = value;
            data.max = value;
        } else {
            data.min = data.min.min(value);
            data.max = data.max.max(value);
        }
        data.count += 1;
        data.sum += value;
        for (bound, count) in data.buckets.iter_mut() {
            if value <= *bound {
                *count += 1;
            }
        }
    }

    /// Record a duration in seconds
    pub fn observe_duration(&self, duration: Duration) {
        self.observe(duration.as_secs_f64());
    }

    /// Start a timer that records into this histogram when stopped
    pub fn start_timer(&self) -> HistogramTimer<'_> {
        HistogramTimer {
            histogram: self,
            started: Instant::now(),
        }
    }

    /// Copy of the current contents
    pub fn get_data(&self) -> HistogramData {
        self.inner.lock().clone()
    }

    /// Help text supplied at registration
    pub fn help(&self) -> &str {
        &self.help
    }
}

impl Metric for Histogram {
    fn name(&self) -> &str {
        &self.name
    }

    fn metric_type(&self) -> MetricType {
        MetricType::Histogram
    }

    fn value(&self) -> MetricValue {
        MetricValue::Histogram(self.get_data())
    }

    fn reset(&self) {
        let mut data = self.inner.lock();
        data.count = 0;
        data.sum = 0.0;
        data.min = 0.0;
        data.max = 0.0;
        for (_, count) in data.buckets.iter_mut() {
            *count = 0;
        }
    }
}

/// Measures the time until [`stop`](HistogramTimer::stop) is called
pub struct HistogramTimer<'a> {
    histogram: &'a Histogram,
    started: Instant,
}

impl HistogramTimer<'_> {
    /// Record the elapsed time and return it
    pub fn stop(self) -> Duration {
        let elapsed = self.started.elapsed();
        self.histogram.observe_duration(elapsed);
        elapsed
    }

    /// Elapsed time so far
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
