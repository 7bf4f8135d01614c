use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use breaker_core::{BreakerPlugins, MetricReading, MetricType, MetricsSnapshot};
use futures::StreamExt;
use tower::ServiceExt;

use super::*;

fn environment() -> Environment {
    Environment::with_plugins("test-app", Arc::new(BreakerPlugins::new())).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let mut body = response.into_body().into_data_stream();
    let mut out = Vec::new();
    while let Some(chunk) = body.next().await {
        out.extend_from_slice(&chunk.unwrap());
    }
    String::from_utf8(out).unwrap()
}

#[test]
fn test_admin_ships_default_servlets() {
    let env = environment();

    assert_eq!(env.name(), "test-app");
    assert_eq!(env.admin().servlet_names(), vec![METRICS_SERVLET, PING_SERVLET]);
    assert_eq!(
        env.admin().servlet_registration(PING_SERVLET).unwrap().mappings(),
        ["/ping".to_string()]
    );
    assert!(env.application().servlet_names().is_empty());
}

#[test]
fn test_context_by_kind() {
    let mut env = environment();
    assert_eq!(env.context(ContextKind::Admin).kind(), ContextKind::Admin);
    assert_eq!(
        env.context_mut(ContextKind::Application).kind(),
        ContextKind::Application
    );
}

#[test]
fn test_breakers_bind_to_environment_plugins() {
    let plugins = Arc::new(BreakerPlugins::new());
    let env = Environment::with_plugins("app", Arc::clone(&plugins)).unwrap();

    assert!(Arc::ptr_eq(env.plugins(), &plugins));
    assert!(Arc::ptr_eq(env.breakers().plugins(), &plugins));
}

#[tokio::test]
async fn test_ping_servlet() {
    let env = environment();

    let response = env
        .admin()
        .router()
        .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "pong");
}

#[tokio::test]
async fn test_metrics_servlet_serves_snapshot() {
    let env = environment();
    env.metrics().counter("jobs_total", "Jobs run").inc_by(3);
    env.metrics()
        .histogram("job_seconds", "Job duration")
        .observe_duration(Duration::from_millis(20));

    let response = env
        .admin()
        .router()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let snapshot: MetricsSnapshot = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(snapshot.counters["jobs_total"], 3);
    assert_eq!(snapshot.histograms["job_seconds"].count, 1);
}

#[tokio::test]
async fn test_metrics_servlet_reads_one_metric() {
    let env = environment();
    env.metrics().gauge("breaker.orders.open", "Open").set(1.0);
    let router = env.admin().router();

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics?name=breaker.orders.open")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let reading: MetricReading = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(reading.name, "breaker.orders.open");
    assert_eq!(reading.kind, MetricType::Gauge);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/metrics?name=missing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_application_router_empty_by_default() {
    let env = environment();

    let response = env
        .application()
        .router()
        .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
