//! Request counters and Prometheus metrics.
//!
//! Two views of the same numbers:
//!
//! - [`Metrics`]: in-process atomic counters shared through `AppState` and
//!   served as JSON by `/metrics`.
//! - Prometheus series recorded through the `metrics` facade and exposed by
//!   an optional exporter on `METRICS_PORT`. Recording is a no-op until
//!   [`init_metrics`] installs the exporter.
//!
//! # Available Metrics
//!
//! ## Counters
//! - `kahook_requests_total` - Requests handled (with label: status)
//! - `kahook_messages_produced_total` - Messages acknowledged by the broker
//! - `kahook_produce_errors_total` - Failed publish attempts
//!
//! ## Histograms
//! - `kahook_request_duration_seconds` - Request duration (with labels: method, status)
//! - `kahook_produce_duration_seconds` - Publish duration
//!
//! ## Gauges
//! - `kahook_broker_connected` - Broker connectivity (1 = connected, 0 = disconnected)

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info};

use crate::models::MetricsResponse;

/// Metric names as constants for consistency.
pub mod names {
    pub const REQUESTS_TOTAL: &str = "kahook_requests_total";
    pub const MESSAGES_PRODUCED_TOTAL: &str = "kahook_messages_produced_total";
    pub const PRODUCE_ERRORS_TOTAL: &str = "kahook_produce_errors_total";
    pub const REQUEST_DURATION_SECONDS: &str = "kahook_request_duration_seconds";
    pub const PRODUCE_DURATION_SECONDS: &str = "kahook_produce_duration_seconds";
    pub const BROKER_CONNECTED: &str = "kahook_broker_connected";
}

// =============================================================================
// In-process counters
// =============================================================================

/// Monotonic request and message counters.
///
/// Counters are independent of each other, so `Relaxed` is enough; a
/// snapshot may observe them at slightly different instants.
#[derive(Debug)]
pub struct Metrics {
    started_at: Instant,
    requests_total: AtomicU64,
    requests_success: AtomicU64,
    requests_error: AtomicU64,
    messages_produced: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            requests_total: AtomicU64::new(0),
            requests_success: AtomicU64::new(0),
            requests_error: AtomicU64::new(0),
            messages_produced: AtomicU64::new(0),
        }
    }

    /// Count a finished request by its response status.
    pub fn record_request(&self, status: StatusCode) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        if status.as_u16() < 400 {
            self.requests_success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.requests_error.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Count a message acknowledged by the broker.
    pub fn record_message_produced(&self) {
        self.messages_produced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn snapshot(&self) -> MetricsResponse {
        let uptime = self.uptime();
        let (runtime_workers, runtime_alive_tasks) = tokio::runtime::Handle::try_current()
            .map(|handle| {
                let m = handle.metrics();
                (m.num_workers(), m.num_alive_tasks())
            })
            .unwrap_or((0, 0));

        MetricsResponse {
            uptime: format_uptime(uptime),
            uptime_seconds: uptime.as_secs(),
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_success: self.requests_success.load(Ordering::Relaxed),
            requests_error: self.requests_error.load(Ordering::Relaxed),
            messages_produced: self.messages_produced.load(Ordering::Relaxed),
            version: env!("CARGO_PKG_VERSION"),
            runtime_workers,
            runtime_alive_tasks,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a duration as `1h2m3s`, omitting leading zero units.
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

// =============================================================================
// Prometheus exporter
// =============================================================================

/// Initialize the Prometheus metrics exporter.
///
/// This sets up metric descriptions and starts the Prometheus HTTP listener
/// on the specified address.
///
/// # Returns
///
/// `Ok(())` if initialization succeeds, `Err` with message otherwise.
pub fn init_metrics(metrics_addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(names::REQUESTS_TOTAL, "Total number of HTTP requests handled");
    describe_counter!(
        names::MESSAGES_PRODUCED_TOTAL,
        "Total number of webhook messages acknowledged by the broker"
    );
    describe_counter!(
        names::PRODUCE_ERRORS_TOTAL,
        "Total number of failed publish attempts"
    );

    describe_histogram!(
        names::REQUEST_DURATION_SECONDS,
        "HTTP request duration in seconds"
    );
    describe_histogram!(
        names::PRODUCE_DURATION_SECONDS,
        "Publish duration in seconds"
    );

    describe_gauge!(
        names::BROKER_CONNECTED,
        "Broker connectivity (1 = connected, 0 = disconnected)"
    );

    info!(addr = %metrics_addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Try to initialize metrics, logging any errors but not failing.
pub fn try_init_metrics(metrics_addr: SocketAddr) {
    if let Err(e) = init_metrics(metrics_addr) {
        error!(error = %e, "Failed to initialize metrics, continuing without metrics");
    }
}

/// Record a finished HTTP request.
pub fn record_request(method: &str, status: StatusCode, duration_secs: f64) {
    let status = status.as_u16().to_string();
    counter!(names::REQUESTS_TOTAL, "status" => status.clone()).increment(1);
    histogram!(names::REQUEST_DURATION_SECONDS, "method" => method.to_string(), "status" => status)
        .record(duration_secs);
}

/// Record the outcome of one publish attempt.
pub fn record_produce(success: bool, duration_secs: f64) {
    if success {
        counter!(names::MESSAGES_PRODUCED_TOTAL).increment(1);
    } else {
        counter!(names::PRODUCE_ERRORS_TOTAL).increment(1);
    }
    histogram!(names::PRODUCE_DURATION_SECONDS).record(duration_secs);
}

/// Update broker connectivity gauge.
pub fn set_broker_connected(connected: bool) {
    gauge!(names::BROKER_CONNECTED).set(if connected { 1.0 } else { 0.0 });
}
