//! Circuit breaker types and configuration

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Calls proceed normally
    Closed,
    /// Calls are rejected
    Open,
    /// A limited number of trial calls are allowed
    HalfOpen,
}

impl CircuitState {
    /// Numeric encoding used by gauges: closed 0, open 1, half-open 2
    pub fn as_gauge(&self) -> f64 {
        match self {
            Self::Closed => 0.0,
            Self::Open => 1.0,
            Self::HalfOpen => 2.0,
        }
    }
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before opening the circuit
    pub failure_threshold: u32,
    /// Successes needed in half-open state to close
    pub success_threshold: u32,
    /// Time to wait before moving from open to half-open
    #[serde(with = "humantime_serde")]
    pub reset_timeout: Duration,
    /// Length of the rolling statistics window
    #[serde(with = "humantime_serde")]
    pub window_size: Duration,
    /// Maximum concurrent trial calls in half-open state
    pub half_open_max_requests: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 3,
            reset_timeout: Duration::from_secs(30),
            window_size: Duration::from_secs(10),
            half_open_max_requests: 3,
        }
    }
}

impl CircuitBreakerConfig {
    /// Trip quickly, probe soon
    pub fn aggressive() -> Self {
        Self {
            failure_threshold: 3,
            success_threshold: 2,
            reset_timeout: Duration::from_secs(15),
            window_size: Duration::from_secs(10),
            half_open_max_requests: 1,
        }
    }

    /// Tolerate bursts of failures
    pub fn lenient() -> Self {
        Self {
            failure_threshold: 10,
            success_threshold: 5,
            reset_timeout: Duration::from_secs(60),
            window_size: Duration::from_secs(30),
            half_open_max_requests: 5,
        }
    }
}

/// Error from circuit breaker operations
#[derive(Debug)]
pub enum CircuitBreakerError<E> {
    /// Circuit is open, the operation did not run
    Open { component: String },
    /// Operation ran and failed
    OperationFailed(E),
}

impl<E: std::fmt::Display> std::fmt::Display for CircuitBreakerError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { component } => {
                write!(f, "Circuit breaker open for component: {}", component)
            }
            Self::OperationFailed(e) => write!(f, "Operation failed: {}", e),
        }
    }
}

impl<E: std::error::Error> std::error::Error for CircuitBreakerError<E> {}

/// Outcome counts inside the rolling window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RollingCounts {
    pub successes: u64,
    pub failures: u64,
    pub rejections: u64,
}

impl RollingCounts {
    /// Calls that reached the breaker, including rejected ones
    pub fn requests(&self) -> u64 {
        self.successes + self.failures + self.rejections
    }

    /// Failed and rejected calls
    pub fn errors(&self) -> u64 {
        self.failures + self.rejections
    }

    /// Errors as a whole percentage of requests, 0 when idle
    pub fn error_percentage(&self) -> u32 {
        let requests = self.requests();
        if requests == 0 {
            0
        } else {
            ((self.errors() as f64 / requests as f64) * 100.0).round() as u32
        }
    }
}

/// Latency distribution of executed calls inside the rolling window
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatencySnapshot {
    /// Mean latency in milliseconds
    pub mean_ms: u64,
    /// Percentile label (`"0"`, `"50"`, `"99.5"`, ...) to latency in milliseconds
    pub percentiles: BTreeMap<String, u64>,
}

/// Statistics for a circuit breaker
#[derive(Debug, Clone)]
pub struct CircuitBreakerStats {
    pub name: String,
    pub state: CircuitState,
    pub failure_count: u32,
    pub success_count: u32,
    pub total_calls: u64,
    pub total_failures: u64,
    pub total_rejections: u64,
    pub rolling: RollingCounts,
    pub latency: LatencySnapshot,
    pub last_failure: Option<Instant>,
    pub opened_at: Option<Instant>,
    pub reset_timeout: Duration,
}

impl CircuitBreakerStats {
    /// Lifetime failure rate as a percentage of executed calls
    pub fn failure_rate(&self) -> f64 {
        if self.total_calls == 0 {
            0.0
        } else {
            (self.total_failures as f64 / self.total_calls as f64) * 100.0
        }
    }

    /// Whether calls are currently being rejected
    pub fn is_open(&self) -> bool {
        self.state == CircuitState::Open
    }
}
