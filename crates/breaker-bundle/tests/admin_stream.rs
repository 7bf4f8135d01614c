//! End-to-end tests against bound listeners

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use breaker_bundle::{
    Application, BaseConfiguration, BreakerStreamBundle, DEFAULT_STREAM_PATH, RunningApplication,
    SERVLET_NAME, ServerSettings, StreamSettings,
};
use breaker_core::BreakerPlugins;
use futures::StreamExt;
use reqwest::{Client, Method, StatusCode};

fn local_config() -> BaseConfiguration {
    BaseConfiguration {
        server: ServerSettings {
            admin_address: SocketAddr::from(([127, 0, 0, 1], 0)),
            application_address: SocketAddr::from(([127, 0, 0, 1], 0)),
        },
        ..Default::default()
    }
}

async fn start(bundle: BreakerStreamBundle<BaseConfiguration>) -> RunningApplication {
    Application::new("e2e")
        .with_plugins(Arc::new(BreakerPlugins::new()))
        .add_bundle(bundle)
        .start(local_config())
        .await
        .unwrap()
}

fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{}{}", addr, path)
}

async fn first_event(response: reqwest::Response) -> String {
    let mut body = response.bytes_stream();
    let chunk = tokio::time::timeout(Duration::from_secs(5), body.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    String::from_utf8(chunk.to_vec()).unwrap()
}

#[tokio::test]
async fn test_options_on_admin_stream_path_returns_ok() {
    let running = start(BreakerStreamBundle::new()).await;

    let response = Client::new()
        .request(Method::OPTIONS, url(running.admin_addr(), DEFAULT_STREAM_PATH))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["allow"], "GET, HEAD, OPTIONS");

    running.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_admin_stream_emits_breaker_statistics() {
    let running = start(BreakerStreamBundle::new()).await;
    let breaker = running.environment().breakers().get("checkout");
    breaker.record_success(Duration::from_millis(4)).await;
    breaker.record_failure(Duration::from_millis(9)).await;

    let response = Client::new()
        .get(url(running.admin_addr(), "/hystrix.stream?delay=20"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/event-stream");

    let event = first_event(response).await;
    assert!(event.contains("\"name\":\"checkout\""));
    assert!(event.contains("\"requestCount\":2"));

    running.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_stream_is_not_served_on_application_port_by_default() {
    let running = start(BreakerStreamBundle::new()).await;

    let response = Client::new()
        .get(url(running.application_addr(), DEFAULT_STREAM_PATH))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    running.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_application_only_stream() {
    let config = BreakerStreamBundle::builder()
        .with_application_stream_path("/app/hystrix.stream")
        .disable_stream_servlet_in_admin_context()
        .build()
        .unwrap();
    let running = start(BreakerStreamBundle::from_configuration(config)).await;

    let env = running.environment();
    assert!(env.admin().servlet_registration(SERVLET_NAME).is_none());
    assert!(env.application().servlet_registration(SERVLET_NAME).is_some());

    let client = Client::new();
    let on_admin = client
        .get(url(running.admin_addr(), DEFAULT_STREAM_PATH))
        .send()
        .await
        .unwrap();
    assert_eq!(on_admin.status(), StatusCode::NOT_FOUND);

    let on_application = client
        .request(Method::OPTIONS, url(running.application_addr(), "/app/hystrix.stream"))
        .send()
        .await
        .unwrap();
    assert_eq!(on_application.status(), StatusCode::OK);

    running.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_connections_over_cap_get_503() {
    let config = BreakerStreamBundle::builder()
        .with_stream_settings(StreamSettings {
            max_concurrent_connections: 1,
            ..Default::default()
        })
        .build()
        .unwrap();
    let running = start(BreakerStreamBundle::from_configuration(config)).await;
    let client = Client::new();
    let stream_url = url(running.admin_addr(), DEFAULT_STREAM_PATH);

    let open = client.get(&stream_url).send().await.unwrap();
    assert_eq!(open.status(), StatusCode::OK);

    let rejected = client.get(&stream_url).send().await.unwrap();
    assert_eq!(rejected.status(), StatusCode::SERVICE_UNAVAILABLE);

    drop(open);
    running.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_admin_ping_and_metrics() {
    let running = start(BreakerStreamBundle::new()).await;
    running
        .environment()
        .breakers()
        .get("ledger")
        .record_success(Duration::from_millis(2))
        .await;
    let client = Client::new();

    let ping = client
        .get(url(running.admin_addr(), "/ping"))
        .send()
        .await
        .unwrap();
    assert_eq!(ping.text().await.unwrap(), "pong");

    let metrics: serde_json::Value = client
        .get(url(running.admin_addr(), "/metrics"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(metrics["counters"]["breaker.ledger.success_total"], 1);

    running.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_ends_open_streams() {
    let running = start(BreakerStreamBundle::new()).await;

    let response = Client::new()
        .get(url(running.admin_addr(), DEFAULT_STREAM_PATH))
        .send()
        .await
        .unwrap();
    let mut body = response.bytes_stream();
    assert!(body.next().await.is_some());

    tokio::time::timeout(Duration::from_secs(5), running.shutdown())
        .await
        .unwrap()
        .unwrap();
}
