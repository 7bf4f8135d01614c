//! Runtime environment handed to bundles

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use breaker_core::{BreakerPlugins, CircuitBreakerRegistry, MetricRegistry, SharedMetricRegistry};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::context::{ContextKind, HttpContext};
use crate::error::BundleResult;

/// Admin servlet answering `pong`
pub const PING_SERVLET: &str = "ping";

/// Admin servlet serving the metric registry as JSON; `?name=` narrows the
/// answer to one metric
pub const METRICS_SERVLET: &str = "metrics";

/// Everything a bundle may touch while the host starts: both HTTP contexts,
/// the shared registries, the plugin slot the breaker registry binds to and
/// the token cancelled when the host shuts down.
#[derive(Debug)]
pub struct Environment {
    name: String,
    admin: HttpContext,
    application: HttpContext,
    metrics: SharedMetricRegistry,
    breakers: Arc<CircuitBreakerRegistry>,
    plugins: Arc<BreakerPlugins>,
    shutdown: CancellationToken,
}

impl Environment {
    /// Environment bound to the process-wide plugin slot
    pub fn new(name: impl Into<String>) -> BundleResult<Self> {
        Self::with_plugins(name, BreakerPlugins::global())
    }

    /// Environment bound to an injected plugin slot
    pub fn with_plugins(name: impl Into<String>, plugins: Arc<BreakerPlugins>) -> BundleResult<Self> {
        let metrics: SharedMetricRegistry = Arc::new(MetricRegistry::new());
        let breakers = Arc::new(CircuitBreakerRegistry::with_plugins(Arc::clone(&plugins)));

        let mut admin = HttpContext::new(ContextKind::Admin);
        admin
            .add_servlet(PING_SERVLET, get(|| async { "pong" }))?
            .add_mapping("/ping")?;
        admin
            .add_servlet(
                METRICS_SERVLET,
                get(metrics_snapshot).with_state(Arc::clone(&metrics)),
            )?
            .add_mapping("/metrics")?;

        Ok(Self {
            name: name.into(),
            admin,
            application: HttpContext::new(ContextKind::Application),
            metrics,
            breakers,
            plugins,
            shutdown: CancellationToken::new(),
        })
    }

    /// Application name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn admin(&self) -> &HttpContext {
        &self.admin
    }

    pub fn admin_mut(&mut self) -> &mut HttpContext {
        &mut self.admin
    }

    pub fn application(&self) -> &HttpContext {
        &self.application
    }

    pub fn application_mut(&mut self) -> &mut HttpContext {
        &mut self.application
    }

    /// Context of the given kind
    pub fn context(&self, kind: ContextKind) -> &HttpContext {
        match kind {
            ContextKind::Admin => &self.admin,
            ContextKind::Application => &self.application,
        }
    }

    /// Mutable context of the given kind
    pub fn context_mut(&mut self, kind: ContextKind) -> &mut HttpContext {
        match kind {
            ContextKind::Admin => &mut self.admin,
            ContextKind::Application => &mut self.application,
        }
    }

    /// Metric registry shared with the admin `metrics` servlet
    pub fn metrics(&self) -> &SharedMetricRegistry {
        &self.metrics
    }

    /// Circuit breakers of the application
    pub fn breakers(&self) -> &Arc<CircuitBreakerRegistry> {
        &self.breakers
    }

    /// Plugin slot the breaker registry binds to
    pub fn plugins(&self) -> &Arc<BreakerPlugins> {
        &self.plugins
    }

    /// Cancelled when the host stops serving; long-lived handlers end on it
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }
}

#[derive(Debug, Default, Deserialize)]
struct MetricsQuery {
    name: Option<String>,
}

async fn metrics_snapshot(
    State(registry): State<SharedMetricRegistry>,
    Query(query): Query<MetricsQuery>,
) -> Response {
    let Some(name) = query.name else {
        return Json(registry.snapshot()).into_response();
    };
    match registry.read(&name) {
        Some(reading) => Json(reading).into_response(),
        None => (StatusCode::NOT_FOUND, format!("no metric named '{}'", name)).into_response(),
    }
}
