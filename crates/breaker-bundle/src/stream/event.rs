//! Stream payload

use std::collections::BTreeMap;

use breaker_core::CircuitBreakerStats;
use serde::Serialize;

/// Event type dashboards expect for command metrics
pub const EVENT_TYPE: &str = "HystrixCommand";

/// One breaker's rolling statistics, serialized as a single `data:` event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakerEvent {
    #[serde(rename = "type")]
    pub event_type: &'static str,
    pub name: String,
    pub group: String,
    /// Milliseconds since the Unix epoch
    pub current_time: i64,
    pub is_circuit_breaker_open: bool,
    pub error_percentage: u32,
    pub error_count: u64,
    pub request_count: u64,
    pub rolling_count_success: u64,
    pub rolling_count_failure: u64,
    pub rolling_count_short_circuited: u64,
    #[serde(rename = "latencyTotal_mean")]
    pub latency_total_mean: u64,
    /// Percentile label to milliseconds
    pub latency_total: BTreeMap<String, u64>,
    #[serde(rename = "propertyValue_circuitBreakerSleepWindowInMilliseconds")]
    pub sleep_window_ms: u64,
    pub reporting_hosts: u32,
}

impl BreakerEvent {
    /// Build the payload from breaker statistics taken at `current_time`
    pub fn from_stats(stats: &CircuitBreakerStats, current_time: i64) -> Self {
        Self {
            event_type: EVENT_TYPE,
            name: stats.name.clone(),
            group: stats.name.clone(),
            current_time,
            is_circuit_breaker_open: stats.is_open(),
            error_percentage: stats.rolling.error_percentage(),
            error_count: stats.rolling.errors(),
            request_count: stats.rolling.requests(),
            rolling_count_success: stats.rolling.successes,
            rolling_count_failure: stats.rolling.failures,
            rolling_count_short_circuited: stats.rolling.rejections,
            latency_total_mean: stats.latency.mean_ms,
            latency_total: stats.latency.percentiles.clone(),
            sleep_window_ms: stats.reset_timeout.as_millis() as u64,
            reporting_hosts: 1,
        }
    }
}
