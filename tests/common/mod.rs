//! Shared fixtures for router-level tests.
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use kahook::{AppError, AppResult, AppState, Config, OutboundMessage, Publisher, build_router};

/// In-memory [`Publisher`] that records every message it accepts.
pub struct MemoryPublisher {
    messages: Mutex<Vec<OutboundMessage>>,
    connected: AtomicBool,
    failing: AtomicBool,
    stalling: AtomicBool,
    closed: AtomicBool,
}

impl MemoryPublisher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            messages: Mutex::new(Vec::new()),
            connected: AtomicBool::new(true),
            failing: AtomicBool::new(false),
            stalling: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        })
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Make every publish fail with a broker error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Make every publish hang until its caller gives up.
    pub fn set_stalling(&self, stalling: bool) {
        self.stalling.store(stalling, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Publisher for MemoryPublisher {
    async fn publish(&self, message: OutboundMessage) -> AppResult<()> {
        if self.stalling.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::SendError("broker unavailable".to_string()));
        }
        self.messages.lock().unwrap().push(message);
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Configuration with background probes effectively disabled.
pub fn test_config() -> Config {
    Config {
        health_check_interval: Duration::from_secs(3600),
        ..Config::default()
    }
}

pub fn app(publisher: &Arc<MemoryPublisher>, config: Config) -> Router {
    build_router(AppState::new(publisher.clone(), config))
}

pub fn post(path: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .body(body.into())
        .unwrap()
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

pub async fn json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
