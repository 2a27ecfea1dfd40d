//! Webhook ingest: `POST /{topic}` → one broker message.
//!
//! # Pipeline
//!
//! 1. Only `POST` is accepted
//! 2. Credentials are checked against the configured authenticator
//! 3. The topic is derived from the decoded path (single segment, not reserved)
//! 4. The body is read, bounded by [`MAX_BODY_BYTES`] and the read deadline
//! 5. Request headers are projected, minus [`INTERNAL_HEADERS`]
//! 6. `X-Webhook-Key`, when present, becomes the partition key
//! 7. The message is published under the produce deadline
//!
//! Exactly one publish is attempted per valid request. A failure is
//! returned to the caller, who owns the retry.
//!
//! # Example
//!
//! ```bash
//! curl -X POST http://localhost:8080/github \
//!   -H "X-Webhook-Key: repo-42" \
//!   -H "X-GitHub-Event: push" \
//!   -d '{"ref": "refs/heads/main"}'
//! ```
//!
//! ```json
//! {"status": "accepted", "topic": "github", "request_id": "9b6c…"}
//! ```

use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, FailedToBufferBody};
use axum::extract::{FromRequest, Request, State};
use axum::http::{HeaderMap, Method, StatusCode};
use tokio::time::timeout_at;
use tracing::{error, info, instrument};

use crate::auth::{Authenticate, Challenge};
use crate::broker::OutboundMessage;
use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::middleware::{RequestDeadline, RequestId};
use crate::models::AcceptedResponse;
use crate::state::AppState;
use crate::validation::derive_topic;

/// Maximum accepted request body (1 MiB).
pub const MAX_BODY_BYTES: usize = 1 << 20;

/// Upper bound on a single publish, further capped by the request deadline.
pub const PRODUCE_TIMEOUT: Duration = Duration::from_secs(10);

/// Header whose value becomes the message key.
pub const WEBHOOK_KEY_HEADER: &str = "x-webhook-key";

/// Request headers never forwarded to the broker.
pub const INTERNAL_HEADERS: [&str; 8] = [
    "authorization",
    "content-type",
    "content-length",
    "host",
    "user-agent",
    "accept",
    "accept-encoding",
    "connection",
];

/// Accept a webhook and publish it to the topic named by the path.
///
/// Mounted as the router fallback, so it sees every path not claimed by an
/// operational endpoint.
#[instrument(skip_all, fields(topic = tracing::field::Empty))]
pub async fn ingest(
    State(state): State<AppState>,
    request: Request,
) -> AppResult<(StatusCode, Json<AcceptedResponse>)> {
    if request.method() != Method::POST {
        return Err(AppError::MethodNotAllowed("only POST is allowed"));
    }

    if !state.auth.authenticate(request.headers()) {
        return Err(AppError::Unauthorized(Challenge::for_headers(
            request.headers(),
        )));
    }

    let topic = derive_topic(request.uri().path())?;
    tracing::Span::current().record("topic", topic.as_str());

    let headers = project_headers(request.headers());
    let key = derive_key(request.headers());
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let deadline = request
        .extensions()
        .get::<RequestDeadline>()
        .copied()
        .unwrap_or_else(|| RequestDeadline::after(state.config.request_timeout));

    let body = read_body(request, deadline.cap(state.config.read_timeout)).await?;
    let size = body.len();

    let message = OutboundMessage::new(topic.clone(), key, body, headers);
    let started = Instant::now();

    match timeout_at(deadline.cap(PRODUCE_TIMEOUT), state.publisher.publish(message)).await {
        Ok(Ok(())) => {
            metrics::record_produce(true, started.elapsed().as_secs_f64());
        }
        Ok(Err(e)) => {
            metrics::record_produce(false, started.elapsed().as_secs_f64());
            error!(topic = %topic, error = %e, "Failed to produce message");
            return Err(AppError::ProduceError(topic));
        }
        Err(_) => {
            metrics::record_produce(false, started.elapsed().as_secs_f64());
            error!(topic = %topic, error = "deadline exceeded", "Failed to produce message");
            return Err(AppError::ProduceError(topic));
        }
    }

    state.metrics.record_message_produced();
    info!(topic = %topic, size, request_id = %request_id, "Webhook received");

    Ok((
        StatusCode::ACCEPTED,
        Json(AcceptedResponse::new(topic, request_id)),
    ))
}

/// Buffer the body under `deadline`.
///
/// The size bound comes from the router's `DefaultBodyLimit`; exceeding it
/// surfaces here as a length-limit rejection.
async fn read_body(request: Request, deadline: tokio::time::Instant) -> AppResult<Bytes> {
    let body = match timeout_at(deadline, Bytes::from_request(request, &())).await {
        Ok(Ok(body)) => body,
        Ok(Err(BytesRejection::FailedToBufferBody(FailedToBufferBody::LengthLimitError(_)))) => {
            return Err(AppError::BodyTooLarge);
        }
        Ok(Err(rejection)) => return Err(AppError::ReadError(rejection.body_text())),
        Err(_) => return Err(AppError::ReadError("read deadline exceeded".to_string())),
    };

    if body.len() > MAX_BODY_BYTES {
        return Err(AppError::BodyTooLarge);
    }
    if body.is_empty() {
        return Err(AppError::EmptyBody);
    }

    Ok(body)
}

/// Copy request headers into message headers.
///
/// Internal headers are dropped. Repeated headers keep their first value.
/// Names are lowercase; values that are not valid UTF-8 are converted
/// lossily.
pub fn project_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut projected = HashMap::with_capacity(headers.keys_len());

    for (name, value) in headers {
        if is_internal_header(name.as_str()) {
            continue;
        }
        projected
            .entry(name.as_str().to_owned())
            .or_insert_with(|| String::from_utf8_lossy(value.as_bytes()).into_owned());
    }

    projected
}

/// Whether `name` is on the internal header denylist (case-insensitive).
pub fn is_internal_header(name: &str) -> bool {
    INTERNAL_HEADERS
        .iter()
        .any(|internal| internal.eq_ignore_ascii_case(name))
}

/// The raw bytes of a non-empty `X-Webhook-Key`, if any.
pub fn derive_key(headers: &HeaderMap) -> Option<Bytes> {
    headers
        .get(WEBHOOK_KEY_HEADER)
        .map(|v| v.as_bytes())
        .filter(|v| !v.is_empty())
        .map(Bytes::copy_from_slice)
}
