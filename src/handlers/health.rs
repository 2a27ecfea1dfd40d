//! Operational endpoints: liveness, readiness and the metrics snapshot.
//!
//! # Health vs Readiness
//!
//! - **Health** (`/health`): 200 whenever the process can answer
//! - **Readiness** (`/ready`): 503 while the broker is unreachable
//!
//! `/metrics` exposes counters, so it sits behind the same authenticator as
//! the webhook endpoint.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, Method};
use tracing::instrument;

use crate::auth::{Authenticate, Challenge};
use crate::error::{AppError, AppResult};
use crate::models::{MetricsResponse, StatusResponse};
use crate::state::AppState;

/// Liveness probe. Accepts `GET` and `HEAD`.
///
/// # Response Body
///
/// ```json
/// {"status": "healthy"}
/// ```
pub async fn health(method: Method) -> AppResult<Json<StatusResponse>> {
    if method != Method::GET && method != Method::HEAD {
        return Err(AppError::MethodNotAllowed("only GET is allowed"));
    }
    Ok(Json(StatusResponse::HEALTHY))
}

/// Readiness probe for orchestrators.
///
/// Returns 200 once the broker answers a connectivity probe,
/// 503 Service Unavailable otherwise.
///
/// ```yaml
/// readinessProbe:
///   httpGet:
///     path: /ready
///     port: 8080
///   periodSeconds: 10
/// ```
#[instrument(skip_all)]
pub async fn ready(State(state): State<AppState>, method: Method) -> AppResult<Json<StatusResponse>> {
    if method != Method::GET {
        return Err(AppError::MethodNotAllowed("only GET is allowed"));
    }

    if !state.publisher.is_connected().await {
        return Err(AppError::NotReady);
    }

    Ok(Json(StatusResponse::READY))
}

/// Counter and runtime snapshot.
pub async fn metrics(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
) -> AppResult<Json<MetricsResponse>> {
    if method != Method::GET {
        return Err(AppError::MethodNotAllowed("only GET is allowed"));
    }

    if !state.auth.authenticate(&headers) {
        return Err(AppError::Unauthorized(Challenge::for_headers(&headers)));
    }

    Ok(Json(state.metrics.snapshot()))
}
