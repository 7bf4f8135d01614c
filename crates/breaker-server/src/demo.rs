//! Demo route guarded by a circuit breaker

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use breaker_bundle::{BundleResult, Environment};
use breaker_core::{CircuitBreaker, CircuitBreakerError};
use serde::Deserialize;

/// Breaker guarding `/work`
pub const WORK_BREAKER: &str = "demo-work";

#[derive(Debug, Default, Deserialize)]
struct WorkQuery {
    /// Make the simulated call fail
    #[serde(default)]
    fail: bool,
    /// Simulated latency in milliseconds
    #[serde(default)]
    latency_ms: u64,
}

/// Register the `work` servlet on the application context
pub fn register(environment: &mut Environment) -> BundleResult<()> {
    let breaker = environment.breakers().get(WORK_BREAKER);
    environment
        .application_mut()
        .add_servlet("work", get(work).with_state(breaker))?
        .add_mapping("/work")?;
    Ok(())
}

async fn work(
    State(breaker): State<Arc<CircuitBreaker>>,
    Query(query): Query<WorkQuery>,
) -> (StatusCode, String) {
    let outcome = breaker
        .call(|| async {
            tokio::time::sleep(Duration::from_millis(query.latency_ms)).await;
            if query.fail {
                Err("simulated failure")
            } else {
                Ok("done")
            }
        })
        .await;

    match outcome {
        Ok(body) => (StatusCode::OK, body.to_string()),
        Err(CircuitBreakerError::Open { component }) => (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("circuit open for {}", component),
        ),
        Err(CircuitBreakerError::OperationFailed(e)) => {
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use breaker_core::BreakerPlugins;
    use tower::ServiceExt;

    use super::*;

    async fn status(environment: &Environment, uri: &str) -> StatusCode {
        environment
            .application()
            .router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_work_trips_breaker() {
        let mut env = Environment::with_plugins("demo", Arc::new(BreakerPlugins::new())).unwrap();
        register(&mut env).unwrap();

        assert_eq!(status(&env, "/work").await, StatusCode::OK);
        for _ in 0..5 {
            assert_eq!(status(&env, "/work?fail=true").await, StatusCode::INTERNAL_SERVER_ERROR);
        }
        assert_eq!(status(&env, "/work").await, StatusCode::SERVICE_UNAVAILABLE);

        let stats = env.breakers().get(WORK_BREAKER).stats().await;
        assert_eq!(stats.total_rejections, 1);
    }
}
