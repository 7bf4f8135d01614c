//! SSE endpoint streaming circuit-breaker statistics

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodRouter, get};
use breaker_core::CircuitBreakerRegistry;
use futures::{Stream, StreamExt, stream};
use serde::Deserialize;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::StreamSettings;
use super::event::BreakerEvent;

/// Value of the `Allow` header on `OPTIONS`
pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

#[derive(Clone)]
struct StreamState {
    breakers: Arc<CircuitBreakerRegistry>,
    settings: StreamSettings,
    connections: Arc<Semaphore>,
    shutdown: CancellationToken,
}

#[derive(Debug, Default, Deserialize)]
struct StreamQuery {
    /// Milliseconds between emissions
    delay: Option<u64>,
}

/// Handler for the metrics stream: `GET`/`HEAD` open the event stream,
/// `OPTIONS` answers with the allowed methods.
///
/// Connections beyond `settings.max_concurrent_connections` get
/// `503 Service Unavailable`. A connection's slot is released when the
/// client goes away. Open streams end once `shutdown` is cancelled.
pub fn stream_servlet(
    breakers: Arc<CircuitBreakerRegistry>,
    settings: StreamSettings,
    shutdown: CancellationToken,
) -> MethodRouter {
    let state = StreamState {
        breakers,
        settings,
        connections: Arc::new(Semaphore::new(settings.max_concurrent_connections)),
        shutdown,
    };
    get(open_stream).options(allowed_methods).with_state(state)
}

async fn allowed_methods() -> impl IntoResponse {
    (StatusCode::OK, [(header::ALLOW, ALLOWED_METHODS)])
}

async fn open_stream(State(state): State<StreamState>, Query(query): Query<StreamQuery>) -> Response {
    let permit = match Arc::clone(&state.connections).try_acquire_owned() {
        Ok(permit) => permit,
        Err(_) => {
            tracing::warn!(
                max_connections = state.settings.max_concurrent_connections,
                "rejecting metrics stream connection, too many open streams"
            );
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                "MaxConcurrentConnections reached",
            )
                .into_response();
        }
    };

    let delay = state.settings.effective_delay(query.delay);
    tracing::debug!(delay_ms = delay.as_millis() as u64, "metrics stream opened");

    let events = breaker_events(state.breakers, delay, permit)
        .take_until(state.shutdown.cancelled_owned());
    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}

struct Poller {
    breakers: Arc<CircuitBreakerRegistry>,
    ticker: Interval,
    // released when the stream is dropped
    _permit: OwnedSemaphorePermit,
}

fn breaker_events(
    breakers: Arc<CircuitBreakerRegistry>,
    delay: Duration,
    permit: OwnedSemaphorePermit,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let mut ticker = tokio::time::interval(delay);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let poller = Poller {
        breakers,
        ticker,
        _permit: permit,
    };

    stream::unfold(poller, |mut poller| async move {
        poller.ticker.tick().await;
        let events = poll_events(&poller.breakers).await;
        Some((stream::iter(events), poller))
    })
    .flatten()
}

async fn poll_events(breakers: &CircuitBreakerRegistry) -> Vec<Result<Event, Infallible>> {
    let stats = breakers.all_stats().await;
    if stats.is_empty() {
        return vec![Ok(Event::default().comment("ping"))];
    }

    let now = chrono::Utc::now().timestamp_millis();
    stats
        .iter()
        .filter_map(|stats| {
            let payload = BreakerEvent::from_stats(stats, now);
            match Event::default().json_data(&payload) {
                Ok(event) => Some(Ok(event)),
                Err(e) => {
                    tracing::error!(circuit = %stats.name, "failed to encode breaker event: {}", e);
                    None
                }
            }
        })
        .collect()
}
