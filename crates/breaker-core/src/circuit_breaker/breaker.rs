//! Circuit breaker implementation

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::RwLock;

use super::types::{CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerStats, CircuitState};
use super::window::{Outcome, RollingWindow};
use crate::plugins::{BreakerMetrics, NoopBreakerMetrics};

/// Circuit breaker for protecting against failing dependencies
pub struct CircuitBreaker {
    /// Component name (for logging and metrics)
    name: String,
    config: CircuitBreakerConfig,
    state: RwLock<CircuitState>,
    /// Consecutive failures while closed
    failure_count: AtomicU32,
    /// Successes while half-open
    success_count: AtomicU32,
    opened_at: RwLock<Option<Instant>>,
    /// Trial calls in flight while half-open
    half_open_requests: AtomicU32,
    total_calls: AtomicU64,
    total_failures: AtomicU64,
    total_rejections: AtomicU64,
    last_failure: RwLock<Option<Instant>>,
    window: Mutex<RollingWindow>,
    /// Sink bound from the plugin slot at creation
    metrics: Arc<dyn BreakerMetrics>,
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CircuitBreaker {
    /// Create a breaker with default config and no metrics sink
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, CircuitBreakerConfig::default())
    }

    /// Create a breaker with custom config and no metrics sink
    pub fn with_config(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self::with_metrics(name, config, Arc::new(NoopBreakerMetrics))
    }

    /// Create a breaker that reports to `metrics`
    pub fn with_metrics(
        name: impl Into<String>,
        config: CircuitBreakerConfig,
        metrics: Arc<dyn BreakerMetrics>,
    ) -> Self {
        let window = RollingWindow::new(config.window_size);
        Self {
            name: name.into(),
            config,
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicU32::new(0),
            success_count: AtomicU32::new(0),
            opened_at: RwLock::new(None),
            half_open_requests: AtomicU32::new(0),
            total_calls: AtomicU64::new(0),
            total_failures: AtomicU64::new(0),
            total_rejections: AtomicU64::new(0),
            last_failure: RwLock::new(None),
            window: Mutex::new(window),
            metrics,
        }
    }

    /// Component name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Current state; an open circuit whose reset timeout elapsed moves to
    /// half-open here
    pub async fn state(&self) -> CircuitState {
        let state = *self.state.read().await;
        if state == CircuitState::Open {
            if let Some(opened_at) = *self.opened_at.read().await {
                if opened_at.elapsed() >= self.config.reset_timeout {
                    self.transition_to_half_open().await;
                    return CircuitState::HalfOpen;
                }
            }
        }
        state
    }

    /// Whether the circuit allows operations
    pub async fn is_allowed(&self) -> bool {
        match self.state().await {
            CircuitState::Closed => true,
            CircuitState::Open => false,
            CircuitState::HalfOpen => {
                self.half_open_requests.load(Ordering::Acquire)
                    < self.config.half_open_max_requests
            }
        }
    }

    /// Record a successful operation
    pub async fn record_success(&self, latency: Duration) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        self.window.lock().record(Outcome::Success, Some(latency));
        self.metrics.on_success(latency);

        match self.state().await {
            CircuitState::Closed => {
                self.failure_count.store(0, Ordering::Relaxed);
            }
            CircuitState::HalfOpen => {
                self.release_half_open_slot();
                let successes = self.success_count.fetch_add(1, Ordering::SeqCst) + 1;
                if successes >= self.config.success_threshold {
                    self.transition_to_closed().await;
                }
            }
            CircuitState::Open => {}
        }
    }

    /// Record a failed operation
    pub async fn record_failure(&self, latency: Duration) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        self.total_failures.fetch_add(1, Ordering::Relaxed);
        *self.last_failure.write().await = Some(Instant::now());
        self.window.lock().record(Outcome::Failure, Some(latency));
        self.metrics.on_failure(latency);

        match self.state().await {
            CircuitState::Closed => {
                let failures = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
                if failures >= self.config.failure_threshold {
                    self.transition_to_open().await;
                }
            }
            CircuitState::HalfOpen => {
                self.release_half_open_slot();
                // any failure while probing re-opens the circuit
                self.transition_to_open().await;
            }
            CircuitState::Open => {}
        }
    }

    /// Record a call that was short-circuited without running
    pub fn record_rejection(&self) {
        self.total_rejections.fetch_add(1, Ordering::Relaxed);
        self.window.lock().record(Outcome::Rejected, None);
        self.metrics.on_rejection();
    }

    /// Acquire permission to make a request (tracks half-open trial calls)
    pub async fn acquire(&self) -> bool {
        if self.state().await == CircuitState::HalfOpen {
            let current = self.half_open_requests.fetch_add(1, Ordering::AcqRel);
            if current >= self.config.half_open_max_requests {
                self.release_half_open_slot();
                return false;
            }
            return true;
        }
        self.is_allowed().await
    }

    /// Execute an operation with circuit breaker protection
    pub async fn call<T, E, F, Fut>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        if !self.acquire().await {
            self.record_rejection();
            return Err(CircuitBreakerError::Open {
                component: self.name.clone(),
            });
        }

        let started = Instant::now();
        match operation().await {
            Ok(result) => {
                self.record_success(started.elapsed()).await;
                Ok(result)
            }
            Err(e) => {
                self.record_failure(started.elapsed()).await;
                Err(CircuitBreakerError::OperationFailed(e))
            }
        }
    }

    /// Circuit breaker statistics, including the rolling window
    pub async fn stats(&self) -> CircuitBreakerStats {
        let state = self.state().await;
        let (rolling, latency) = {
            let mut window = self.window.lock();
            (window.counts(), window.latency())
        };
        CircuitBreakerStats {
            name: self.name.clone(),
            state,
            failure_count: self.failure_count.load(Ordering::Relaxed),
            success_count: self.success_count.load(Ordering::Relaxed),
            total_calls: self.total_calls.load(Ordering::Relaxed),
            total_failures: self.total_failures.load(Ordering::Relaxed),
            total_rejections: self.total_rejections.load(Ordering::Relaxed),
            rolling,
            latency,
            last_failure: *self.last_failure.read().await,
            opened_at: *self.opened_at.read().await,
            reset_timeout: self.config.reset_timeout,
        }
    }

    /// Manually reset to closed and clear the rolling window
    pub async fn reset(&self) {
        self.window.lock().clear();
        self.transition_to_closed().await;
    }

    /// Manually open the circuit
    pub async fn trip(&self) {
        self.transition_to_open().await;
    }

    fn release_half_open_slot(&self) {
        let _ = self
            .half_open_requests
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }

    async fn transition_to_open(&self) {
        let mut state = self.state.write().await;
        *state = CircuitState::Open;
        *self.opened_at.write().await = Some(Instant::now());
        self.success_count.store(0, Ordering::Relaxed);
        self.half_open_requests.store(0, Ordering::Relaxed);
        self.metrics.on_state_change(CircuitState::Open);

        tracing::warn!(
            circuit = %self.name,
            "Circuit breaker opened after {} failures",
            self.failure_count.load(Ordering::Relaxed)
        );
    }

    async fn transition_to_half_open(&self) {
        let mut state = self.state.write().await;
        // another caller may have moved on already
        if *state != CircuitState::Open {
            return;
        }
        *state = CircuitState::HalfOpen;
        self.success_count.store(0, Ordering::Relaxed);
        self.half_open_requests.store(0, Ordering::Relaxed);
        self.metrics.on_state_change(CircuitState::HalfOpen);

        tracing::info!(circuit = %self.name, "Circuit breaker transitioning to half-open");
    }

    async fn transition_to_closed(&self) {
        let mut state = self.state.write().await;
        *state = CircuitState::Closed;
        self.failure_count.store(0, Ordering::Relaxed);
        self.success_count.store(0, Ordering::Relaxed);
        self.half_open_requests.store(0, Ordering::Relaxed);
        *self.opened_at.write().await = None;
        self.metrics.on_state_change(CircuitState::Closed);

        tracing::info!(circuit = %self.name, "Circuit breaker closed");
    }
}
