use serde::Serialize;

/// Acknowledgement returned once a webhook has been published.
#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    /// Always `"accepted"`
    pub status: &'static str,
    /// Topic the message was published to
    pub topic: String,
    /// Correlation identifier of the request
    pub request_id: String,
}

impl AcceptedResponse {
    pub fn new(topic: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            status: "accepted",
            topic: topic.into(),
            request_id: request_id.into(),
        }
    }
}

/// Body of the liveness and readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub const HEALTHY: Self = Self { status: "healthy" };
    pub const READY: Self = Self { status: "ready" };
}

/// Point-in-time snapshot served by `/metrics`.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsResponse {
    /// Human-readable uptime, e.g. `1h2m3s`
    pub uptime: String,
    /// Uptime in whole seconds
    pub uptime_seconds: u64,
    pub requests_total: u64,
    /// Requests answered with a status below 400
    pub requests_success: u64,
    /// Requests answered with a status of 400 or above
    pub requests_error: u64,
    pub messages_produced: u64,
    /// Crate version
    pub version: &'static str,
    /// Tokio worker threads (0 outside a runtime)
    pub runtime_workers: usize,
    /// Tasks currently alive on the runtime
    pub runtime_alive_tasks: usize,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_response_serialization() {
        let response = AcceptedResponse::new("events", "req-1");

        let json = serde_json::to_value(&response).expect("Serialization should succeed");
        assert_eq!(
            json,
            serde_json::json!({"status": "accepted", "topic": "events", "request_id": "req-1"})
        );
    }

    #[test]
    fn test_status_response_serialization() {
        let json = serde_json::to_string(&StatusResponse::HEALTHY).unwrap();
        assert_eq!(json, r#"{"status":"healthy"}"#);

        let json = serde_json::to_string(&StatusResponse::READY).unwrap();
        assert_eq!(json, r#"{"status":"ready"}"#);
    }
}
