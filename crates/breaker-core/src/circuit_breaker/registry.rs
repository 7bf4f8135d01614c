//! Circuit breaker registry for managing multiple circuit breakers

use std::sync::Arc;

use dashmap::DashMap;

use super::breaker::CircuitBreaker;
use super::types::{CircuitBreakerConfig, CircuitBreakerStats};
use crate::plugins::BreakerPlugins;

/// Collection of circuit breakers keyed by component name.
///
/// Breakers are created lazily. On creation each breaker asks the plugin
/// slot for its metrics sink, which fixes the slot's publisher: install the
/// publisher before the first `get`.
pub struct CircuitBreakerRegistry {
    breakers: DashMap<String, Arc<CircuitBreaker>>,
    default_config: CircuitBreakerConfig,
    plugins: Arc<BreakerPlugins>,
}

impl std::fmt::Debug for CircuitBreakerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreakerRegistry")
            .field("breakers", &self.names())
            .field("default_config", &self.default_config)
            .finish()
    }
}

impl CircuitBreakerRegistry {
    /// Registry bound to the process-wide plugin slot
    pub fn new() -> Self {
        Self::with_plugins(BreakerPlugins::global())
    }

    /// Registry bound to an injected plugin slot
    pub fn with_plugins(plugins: Arc<BreakerPlugins>) -> Self {
        Self {
            breakers: DashMap::new(),
            default_config: CircuitBreakerConfig::default(),
            plugins,
        }
    }

    /// Replace the config used for breakers created by [`get`](Self::get)
    pub fn with_default_config(mut self, config: CircuitBreakerConfig) -> Self {
        self.default_config = config;
        self
    }

    /// Plugin slot this registry binds breakers to
    pub fn plugins(&self) -> &Arc<BreakerPlugins> {
        &self.plugins
    }

    /// Get or create a circuit breaker for a component
    pub fn get(&self, name: &str) -> Arc<CircuitBreaker> {
        self.get_with_config(name, self.default_config.clone())
    }

    /// Get or create with custom config; the config is ignored if the
    /// breaker already exists
    pub fn get_with_config(&self, name: &str, config: CircuitBreakerConfig) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(name.to_string())
            .or_insert_with(|| {
                let metrics = self
                    .plugins
                    .metrics_publisher()
                    .breaker_metrics(name, &config);
                tracing::debug!(circuit = %name, "created circuit breaker");
                Arc::new(CircuitBreaker::with_metrics(name, config, metrics))
            })
            .clone()
    }

    /// Existing breaker, without creating one
    pub fn find(&self, name: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// All circuit breaker names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.breakers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Number of breakers
    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    /// Whether no breaker was created yet
    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }

    /// Stats for all circuit breakers, sorted by name
    pub async fn all_stats(&self) -> Vec<CircuitBreakerStats> {
        // no shard lock may be held across an await
        let breakers: Vec<Arc<CircuitBreaker>> =
            self.breakers.iter().map(|e| Arc::clone(e.value())).collect();

        let mut results = Vec::with_capacity(breakers.len());
        for breaker in breakers {
            results.push(breaker.stats().await);
        }
        results.sort_by(|a, b| a.name.cmp(&b.name));
        results
    }

    /// Reset all circuit breakers
    pub async fn reset_all(&self) {
        let breakers: Vec<Arc<CircuitBreaker>> =
            self.breakers.iter().map(|e| Arc::clone(e.value())).collect();
        for breaker in breakers {
            breaker.reset().await;
        }
    }
}

impl Default for CircuitBreakerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
