use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::auth::Challenge;
use crate::handlers::webhook::MAX_BODY_BYTES;

/// Application-wide error types with appropriate HTTP status codes.
///
/// # Client vs Broker Errors
///
/// The request-facing variants (`MethodNotAllowed` through `NotReady`) map
/// one-to-one onto the error kinds in the JSON error body. The broker-facing
/// variants (`ConnectionFailed`, `TopicError`, `SendError`) carry internal
/// detail for logs; the webhook handler
/// folds all of them into `ProduceError` before they reach a client.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(&'static str),

    #[error("Unauthorized")]
    Unauthorized(Challenge),

    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    #[error("Reserved topic: {0}")]
    ReservedTopic(String),

    #[error("Request body exceeds {MAX_BODY_BYTES} bytes")]
    BodyTooLarge,

    #[error("Request body is empty")]
    EmptyBody,

    #[error("Failed to read request body: {0}")]
    ReadError(String),

    #[error("Failed to produce message to topic '{0}'")]
    ProduceError(String),

    #[error("Broker not ready")]
    NotReady,

    #[error("Failed to connect to Iggy server: {0}")]
    ConnectionFailed(String),

    #[error("Topic operation failed: {0}")]
    TopicError(String),

    #[error("Failed to send message: {0}")]
    SendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Error response body for API endpoints.
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl AppError {
    /// The status code and the machine-readable error kind for this error.
    pub fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::MethodNotAllowed(_) => (StatusCode::METHOD_NOT_ALLOWED, "method_not_allowed"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::InvalidTopic(_) => (StatusCode::BAD_REQUEST, "invalid_topic"),
            AppError::ReservedTopic(_) => (StatusCode::BAD_REQUEST, "reserved_topic"),
            AppError::BodyTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "body_too_large"),
            AppError::EmptyBody => (StatusCode::BAD_REQUEST, "empty_body"),
            AppError::ReadError(_) => (StatusCode::BAD_REQUEST, "read_error"),
            AppError::ProduceError(_)
            | AppError::ConnectionFailed(_)
            | AppError::TopicError(_)
            | AppError::SendError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "produce_error"),
            AppError::NotReady => (StatusCode::SERVICE_UNAVAILABLE, "not_ready"),
            AppError::ConfigError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    /// Client-facing message. Never includes broker or internal detail.
    fn public_message(&self) -> String {
        match self {
            AppError::MethodNotAllowed(msg) => (*msg).to_string(),
            AppError::Unauthorized(_) => "invalid or missing credentials".to_string(),
            AppError::InvalidTopic(_) => "topic name must be a single path segment".to_string(),
            AppError::ReservedTopic(_) => "cannot use reserved topic name".to_string(),
            AppError::BodyTooLarge => {
                format!("request body exceeds maximum size of {MAX_BODY_BYTES} bytes")
            }
            AppError::EmptyBody => "request body cannot be empty".to_string(),
            AppError::ReadError(_) => "failed to read request body".to_string(),
            AppError::ProduceError(_)
            | AppError::ConnectionFailed(_)
            | AppError::TopicError(_)
            | AppError::SendError(_) => "failed to send message to broker".to_string(),
            AppError::NotReady => "broker publisher not available".to_string(),
            AppError::ConfigError(_) => "an internal error occurred".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_kind();

        // Auth failures and readiness are expected traffic, not failures.
        match &self {
            AppError::Unauthorized(_) => tracing::debug!(error = %self, "Request rejected"),
            AppError::NotReady => tracing::warn!(error = %self, "Readiness check failed"),
            _ if status.is_server_error() => tracing::error!(error = %self, "Request failed"),
            _ => tracing::debug!(error = %self, "Request rejected"),
        }

        let body = ErrorResponse {
            error,
            message: self.public_message(),
        };

        let mut response = (status, axum::Json(body)).into_response();

        if let AppError::Unauthorized(challenge) = self {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static(challenge.header_value()),
            );
        }

        response
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
