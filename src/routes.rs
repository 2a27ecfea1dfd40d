//! Application routing configuration with middleware stack.
//!
//! # Middleware Stack (outermost first)
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────┐
//! │   Request ID     │ ← Echoes or generates X-Request-ID
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │    Deadline      │ ← Stamps RequestDeadline
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │     Tracing      │ ← HTTP span per request
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │   Accounting     │ ← Counters + one log line
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │   Body limit     │ ← 1 MiB
//! └────────┬─────────┘
//!          ▼
//!      Handler
//! ```
//!
//! # Routes
//!
//! - `/health`, `/ready`, `/metrics` - operational endpoints; each handler
//!   checks its own method so a wrong one gets the JSON 405 body
//! - everything else - webhook ingest, topic taken from the path

use axum::Router;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::middleware::from_fn_with_state;
use axum::routing::any;
use tower_http::trace::TraceLayer;
use tracing::info_span;

use crate::handlers;
use crate::handlers::webhook::MAX_BODY_BYTES;
use crate::middleware::{RequestId, RequestIdLayer, stamp_deadline, track_requests};
use crate::state::AppState;

/// Build the application router with all routes and middleware configured.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", any(handlers::health))
        .route("/ready", any(handlers::ready))
        .route("/metrics", any(handlers::metrics))
        .fallback(handlers::ingest)
        // Applied bottom to top: the last layer sees the request first.
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(from_fn_with_state(state.clone(), track_requests))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = request
                .extensions()
                .get::<RequestId>()
                .map(RequestId::as_str)
                .unwrap_or_default();
            info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id,
            )
        }))
        .layer(from_fn_with_state(state.clone(), stamp_deadline))
        .layer(RequestIdLayer::new())
        .with_state(state)
}
