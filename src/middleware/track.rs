//! Request accounting: one log line and one counter update per request.

use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::info;

use super::request_id::RequestId;
use crate::metrics;
use crate::state::AppState;

pub async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed = start.elapsed();
    state.metrics.record_request(status);
    metrics::record_request(method.as_str(), status, elapsed.as_secs_f64());

    info!(
        method = %method,
        path = %path,
        status = status.as_u16(),
        duration_ms = elapsed.as_millis() as u64,
        request_id = %request_id,
        "Request completed"
    );

    response
}
