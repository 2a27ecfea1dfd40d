//! Per-request deadline stamping.
//!
//! Each request gets a [`RequestDeadline`] extension: now plus the server's
//! request timeout, shortened by a client `X-Request-Timeout` header (in
//! milliseconds) when one is given within bounds.
//!
//! ```text
//! X-Request-Timeout: 5000  # 5 seconds
//! ```
//!
//! Handlers derive their own, shorter deadlines from this one with
//! [`RequestDeadline::cap`], so every wait a request performs ends no later
//! than the request itself.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tokio::time::Instant;
use tracing::debug;

use crate::state::AppState;

/// Minimum accepted client timeout (100ms).
pub const MIN_REQUEST_TIMEOUT_MS: u64 = 100;

/// Maximum accepted client timeout (5 minutes).
pub const MAX_REQUEST_TIMEOUT_MS: u64 = 300_000;

/// Header name for client-specified request timeout.
pub const REQUEST_TIMEOUT_HEADER: &str = "x-request-timeout";

/// Instant by which the request must be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDeadline(pub Instant);

impl RequestDeadline {
    /// Deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now() + timeout)
    }

    /// The earlier of `now + bound` and this deadline.
    pub fn cap(self, bound: Duration) -> Instant {
        (Instant::now() + bound).min(self.0)
    }
}

/// Parse a client `X-Request-Timeout` value.
///
/// Returns `None` if the value is not an integer or is outside
/// `MIN_REQUEST_TIMEOUT_MS..=MAX_REQUEST_TIMEOUT_MS`.
pub fn client_timeout(value: &str) -> Option<Duration> {
    let ms = value.trim().parse::<u64>().ok()?;
    (MIN_REQUEST_TIMEOUT_MS..=MAX_REQUEST_TIMEOUT_MS)
        .contains(&ms)
        .then(|| Duration::from_millis(ms))
}

/// Middleware that stamps every request with its [`RequestDeadline`].
pub async fn stamp_deadline(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let server_timeout = state.config.request_timeout;

    let timeout = match request
        .headers()
        .get(REQUEST_TIMEOUT_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        Some(raw) => match client_timeout(raw) {
            Some(client) => client.min(server_timeout),
            None => {
                debug!(
                    value = raw,
                    min = MIN_REQUEST_TIMEOUT_MS,
                    max = MAX_REQUEST_TIMEOUT_MS,
                    "Ignoring invalid X-Request-Timeout"
                );
                server_timeout
            }
        },
        None => server_timeout,
    };

    request
        .extensions_mut()
        .insert(RequestDeadline::after(timeout));

    next.run(request).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_timeout_bounds() {
        assert_eq!(client_timeout("5000"), Some(Duration::from_millis(5000)));
        assert_eq!(client_timeout(" 100 "), Some(Duration::from_millis(100)));
        assert_eq!(
            client_timeout("300000"),
            Some(Duration::from_millis(MAX_REQUEST_TIMEOUT_MS))
        );
        assert_eq!(client_timeout("99"), None);
        assert_eq!(client_timeout("300001"), None);
        assert_eq!(client_timeout("0"), None);
        assert_eq!(client_timeout("-5"), None);
        assert_eq!(client_timeout("soon"), None);
    }

    #[test]
    fn test_cap_uses_earlier_instant() {
        let deadline = RequestDeadline::after(Duration::from_secs(15));

        let capped = deadline.cap(Duration::from_secs(10));
        assert!(capped < deadline.0);
        assert!(capped > Instant::now() + Duration::from_secs(9));

        assert_eq!(deadline.cap(Duration::from_secs(60)), deadline.0);
    }

    #[test]
    fn test_short_request_deadline_wins() {
        // A request with 200ms left never gets the full produce bound.
        let deadline = RequestDeadline::after(Duration::from_millis(200));

        assert_eq!(deadline.cap(Duration::from_secs(10)), deadline.0);
    }
}
