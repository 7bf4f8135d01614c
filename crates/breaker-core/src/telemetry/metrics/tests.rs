//! Tests for metric primitives

use std::time::Duration;

use super::counter::Counter;
use super::gauge::Gauge;
use super::histogram::Histogram;
use super::types::{HistogramData, Metric, MetricType, MetricValue};

#[test]
fn test_counter_counts() {
    let counter = Counter::new("breaker.search.success_total", "Successful calls");

    counter.inc();
    counter.inc_by(4);

    assert_eq!(counter.get(), 5);
    assert_eq!(counter.name(), "breaker.search.success_total");
    assert_eq!(counter.help(), "Successful calls");
}

#[test]
fn test_counter_reset() {
    let counter = Counter::new("test", "Test counter");
    counter.inc_by(100);
    counter.reset();
    assert_eq!(counter.get(), 0);
}

#[test]
fn test_gauge_set_and_add() {
    let gauge = Gauge::new("breaker.search.state", "Breaker state");

    gauge.set(2.0);
    assert_eq!(gauge.get(), 2.0);

    gauge.add(0.5);
    gauge.dec();
    assert!((gauge.get() - 1.5).abs() < f64::EPSILON);
}

#[test]
fn test_gauge_keeps_fractions_and_negatives() {
    let gauge = Gauge::new("drift", "Clock drift");
    gauge.set(-0.000_125);
    assert_eq!(gauge.get(), -0.000_125);
    gauge.reset();
    assert_eq!(gauge.get(), 0.0);
}

#[test]
fn test_histogram_tracks_min_max_sum() {
    let histogram = Histogram::new("latency", "Latency");

    histogram.observe(0.2);
    histogram.observe(0.05);
    histogram.observe(0.3);

    let data = histogram.get_data();
    assert_eq!(data.count, 3);
    assert!((data.sum - 0.55).abs() < 1e-9);
    assert_eq!(data.min, 0.05);
    assert_eq!(data.max, 0.3);
}

#[test]
fn test_histogram_buckets_are_cumulative_and_sorted() {
    let histogram = Histogram::with_buckets("test", "Test", vec![1.0, 0.1, 0.5, 0.5]);

    histogram.observe(0.05);
    histogram.observe(0.3);
    histogram.observe(0.8);

    let data = histogram.get_data();
    assert_eq!(data.buckets, vec![(0.1, 1), (0.5, 2), (1.0, 3)]);
}

#[test]
fn test_histogram_reset_clears_buckets() {
    let histogram = Histogram::with_buckets("test", "Test", vec![1.0]);
    histogram.observe(0.5);
    histogram.reset();

    let data = histogram.get_data();
    assert_eq!(data.count, 0);
    assert_eq!(data.buckets, vec![(1.0, 0)]);
}

#[test]
fn test_histogram_timer_records_elapsed() {
    let histogram = Histogram::new("test", "Test");
    let timer = histogram.start_timer();
    std::thread::sleep(Duration::from_millis(5));
    let elapsed = timer.stop();

    let data = histogram.get_data();
    assert_eq!(data.count, 1);
    assert!(elapsed >= Duration::from_millis(5));
    assert!(data.sum >= 0.005);
}

#[test]
fn test_histogram_quantile_from_buckets() {
    let data = HistogramData {
        count: 4,
        sum: 1.0,
        min: 0.05,
        max: 0.6,
        buckets: vec![(0.1, 2), (0.5, 3), (1.0, 4)],
    };

    assert_eq!(data.quantile(0.5), 0.1);
    assert_eq!(data.quantile(0.75), 0.5);
    // upper bound is clamped to the largest observation
    assert_eq!(data.quantile(1.0), 0.6);
    assert!((data.mean() - 0.25).abs() < f64::EPSILON);
}

#[test]
fn test_empty_histogram_quantile_is_zero() {
    assert_eq!(HistogramData::default().quantile(0.99), 0.0);
}

#[test]
fn test_metric_trait_values() {
    let counter = Counter::new("test", "Test counter");
    counter.inc_by(42);

    assert_eq!(counter.metric_type(), MetricType::Counter);
    assert!(matches!(counter.value(), MetricValue::Counter(42)));

    let gauge = Gauge::new("g", "Gauge");
    gauge.set(1.0);
    assert!(matches!(gauge.value(), MetricValue::Gauge(v) if v == 1.0));
}
