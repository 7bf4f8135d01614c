//! Circuit breaker pattern for fault tolerance
//!
//! Prevents cascading failures by temporarily rejecting calls to a failing
//! dependency, and keeps the rolling statistics the metrics stream reports.

mod breaker;
mod registry;
mod types;
mod window;


pub use breaker::CircuitBreaker;
pub use registry::CircuitBreakerRegistry;
pub use types::{
    CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerStats, CircuitState,
    LatencySnapshot, RollingCounts,
};
