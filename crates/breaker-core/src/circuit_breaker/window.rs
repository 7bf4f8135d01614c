//! Rolling statistics window

use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};

use super::types::{LatencySnapshot, RollingCounts};

/// Number of count buckets the window is split into
const BUCKETS: u32 = 10;

/// Upper bound on retained latency samples; the oldest are dropped first.
/// Outcome counts are kept in buckets and are not affected.
const MAX_LATENCY_SAMPLES: usize = 4096;

/// Percentiles reported in latency snapshots, with their labels
const PERCENTILES: &[(&str, f64)] = &[
    ("0", 0.0),
    ("25", 25.0),
    ("50", 50.0),
    ("75", 75.0),
    ("90", 90.0),
    ("95", 95.0),
    ("99", 99.0),
    ("99.5", 99.5),
    ("100", 100.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Outcome {
    Success,
    Failure,
    Rejected,
}

#[derive(Debug)]
struct Bucket {
    started: Instant,
    counts: RollingCounts,
}

/// Outcome counts and latencies of the calls seen during the last `span`
#[derive(Debug)]
pub(super) struct RollingWindow {
    span: Duration,
    bucket_width: Duration,
    buckets: VecDeque<Bucket>,
    latencies: VecDeque<(Instant, Duration)>,
}

impl RollingWindow {
    pub(super) fn new(span: Duration) -> Self {
        Self {
            span,
            bucket_width: (span / BUCKETS).max(Duration::from_millis(1)),
            buckets: VecDeque::new(),
            latencies: VecDeque::new(),
        }
    }

    pub(super) fn record(&mut self, outcome: Outcome, latency: Option<Duration>) {
        let now = Instant::now();
        self.evict(now);

        let stale = self
            .buckets
            .back()
            .is_none_or(|b| now.duration_since(b.started) >= self.bucket_width);
        if stale {
            self.buckets.push_back(Bucket {
                started: now,
                counts: RollingCounts::default(),
            });
        }
        let Some(current) = self.buckets.back_mut() else {
            return;
        };
        match outcome {
            Outcome::Success => current.counts.successes += 1,
            Outcome::Failure => current.counts.failures += 1,
            Outcome::Rejected => current.counts.rejections += 1,
        }

        if let Some(latency) = latency {
            if self.latencies.len() == MAX_LATENCY_SAMPLES {
                self.latencies.pop_front();
            }
            self.latencies.push_back((now, latency));
        }
    }

    pub(super) fn clear(&mut self) {
        self.buckets.clear();
        self.latencies.clear();
    }

    pub(super) fn counts(&mut self) -> RollingCounts {
        self.evict(Instant::now());
        self.buckets
            .iter()
            .fold(RollingCounts::default(), |mut total, bucket| {
                total.successes += bucket.counts.successes;
                total.failures += bucket.counts.failures;
                total.rejections += bucket.counts.rejections;
                total
            })
    }

    pub(super) fn latency(&mut self) -> LatencySnapshot {
        self.evict(Instant::now());
        let mut millis: Vec<u64> = self
            .latencies
            .iter()
            .map(|(_, l)| l.as_millis() as u64)
            .collect();

        if millis.is_empty() {
            return LatencySnapshot {
                mean_ms: 0,
                percentiles: PERCENTILES
                    .iter()
                    .map(|(label, _)| (label.to_string(), 0))
                    .collect(),
            };
        }

        millis.sort_unstable();
        let mean_ms = millis.iter().sum::<u64>() / millis.len() as u64;
        let percentiles: BTreeMap<String, u64> = PERCENTILES
            .iter()
            .map(|(label, p)| (label.to_string(), nearest_rank(&millis, *p)))
            .collect();

        LatencySnapshot {
            mean_ms,
            percentiles,
        }
    }

    // a bucket leaves the window once its start is older than `span`
    fn evict(&mut self, now: Instant) {
        while self
            .buckets
            .front()
            .is_some_and(|b| now.duration_since(b.started) > self.span)
        {
            self.buckets.pop_front();
        }
        while self
            .latencies
            .front()
            .is_some_and(|(at, _)| now.duration_since(*at) > self.span)
        {
            self.latencies.pop_front();
        }
    }
}

/// Nearest-rank percentile over sorted values
fn nearest_rank(sorted: &[u64], percentile: f64) -> u64 {
    if percentile <= 0.0 {
        return sorted[0];
    }
    let rank = ((percentile / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}
