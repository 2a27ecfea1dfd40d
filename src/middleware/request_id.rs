//! Request ID middleware for cross-system tracing.
//!
//! Every request leaves with an `X-Request-ID` header: the caller's own value
//! when it sent a non-empty one, otherwise a fresh UUIDv4. The resolved ID is
//! stored in the [`RequestId`] extension for handlers and the trace span.
//! Request headers are left as the caller sent them, so a generated ID is
//! never forwarded as if the caller had supplied it.
//!
//! ```bash
//! curl -H "X-Request-ID: my-correlation-id" -d '{}' http://localhost:8080/events
//! ```

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::header::HeaderValue;
use axum::http::{Request, Response};
use tower::{Layer, Service};
use uuid::Uuid;

/// Header name for request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The resolved correlation identifier, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Request ID layer for Tower middleware stack.
#[derive(Clone, Default)]
pub struct RequestIdLayer;

impl RequestIdLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Request ID service wrapper.
#[derive(Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestIdService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let (header, id) = resolve_request_id(&req);

        req.extensions_mut().insert(RequestId(id));

        // Take the ready service, leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let mut response = inner.call(req).await?;
            response.headers_mut().insert(REQUEST_ID_HEADER, header);
            Ok(response)
        })
    }
}

/// Echo the caller's request ID or generate a new one.
///
/// Values that are empty or not visible ASCII are replaced.
fn resolve_request_id<B>(req: &Request<B>) -> (HeaderValue, String) {
    if let Some(value) = req.headers().get(REQUEST_ID_HEADER)
        && let Ok(id) = value.to_str()
        && !id.is_empty()
    {
        return (value.clone(), id.to_string());
    }

    let id = Uuid::new_v4().to_string();
    let header = HeaderValue::from_str(&id).unwrap_or_else(|_| HeaderValue::from_static("unknown"));
    (header, id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    #[test]
    fn test_existing_request_id_is_echoed() {
        let req = Request::builder()
            .header("x-request-id", "existing-id-123")
            .body(Body::empty())
            .unwrap();

        let (header, id) = resolve_request_id(&req);
        assert_eq!(id, "existing-id-123");
        assert_eq!(header, "existing-id-123");
    }

    #[test]
    fn test_missing_request_id_is_generated() {
        let req = Request::builder().body(Body::empty()).unwrap();

        let (header, id) = resolve_request_id(&req);

        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(header.to_str().unwrap(), id);
    }

    #[test]
    fn test_empty_request_id_is_replaced() {
        let req = Request::builder()
            .header("x-request-id", "")
            .body(Body::empty())
            .unwrap();

        let (_, id) = resolve_request_id(&req);
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[tokio::test]
    async fn test_generated_id_stays_out_of_request_headers() {
        let service = RequestIdLayer::new().layer(tower::service_fn(|req: Request<Body>| async move {
            assert!(req.headers().get(REQUEST_ID_HEADER).is_none());
            let id = req.extensions().get::<RequestId>().unwrap().0.clone();
            Ok::<_, std::convert::Infallible>(Response::new(Body::from(id)))
        }));

        let response = service
            .oneshot(Request::builder().body(Body::empty()).unwrap())
            .await
            .unwrap();

        let header = response.headers().get(REQUEST_ID_HEADER).unwrap().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(header.as_bytes(), &body[..]);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let req = Request::builder().body(Body::empty()).unwrap();

        let (_, a) = resolve_request_id(&req);
        let (_, b) = resolve_request_id(&req);
        assert_ne!(a, b);
    }
}
