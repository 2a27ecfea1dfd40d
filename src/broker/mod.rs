//! Broker publishing abstraction.
//!
//! The HTTP layer only ever talks to a [`Publisher`]. Production wiring uses
//! [`IggyPublisher`]; tests inject an in-memory implementation.
//!
//! ```text
//! ┌──────────────┐   OutboundMessage   ┌────────────────┐   send_messages   ┌─────────────┐
//! │ webhook      │ ──────────────────► │ dyn Publisher  │ ────────────────► │ Apache Iggy │
//! │ handler      │ ◄────── Ok/Err ──── │ (IggyPublisher)│ ◄──── ack ─────── │ stream      │
//! └──────────────┘                     └────────────────┘                   └─────────────┘
//! ```
//!
//! # Cancellation
//!
//! Deadlines are applied by the caller with `tokio::time::timeout_at`.
//! Implementations must be cancel-safe in the sense that dropping the
//! `publish` future abandons the send; nothing is buffered for a retry.

mod helpers;
mod iggy;

use std::collections::HashMap;

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::{DateTime, Utc};

use crate::error::AppResult;

pub use helpers::to_identifier;
pub use iggy::{IggyPublisher, READY_PROBE_TIMEOUT};

/// A message derived 1:1 from an accepted webhook request.
///
/// Built per request, handed to the publisher, and dropped once `publish`
/// returns.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    /// Destination topic.
    pub topic: String,
    /// Optional partition key (raw bytes of `X-Webhook-Key`).
    pub key: Option<Bytes>,
    /// Raw request body.
    pub value: Bytes,
    /// Forwarded request headers, internal ones removed.
    pub headers: HashMap<String, String>,
    /// When the message was handed to the publisher.
    pub timestamp: DateTime<Utc>,
}

impl OutboundMessage {
    pub fn new(
        topic: impl Into<String>,
        key: Option<Bytes>,
        value: Bytes,
        headers: HashMap<String, String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            key,
            value,
            headers,
            timestamp: Utc::now(),
        }
    }
}

/// The operations the bridge needs from a message broker.
///
/// Implementations are shared across all in-flight requests and must accept
/// concurrent `publish` calls without external locking.
#[async_trait]
pub trait Publisher: Send + Sync + 'static {
    /// Publish one message and wait for the broker's acknowledgement.
    async fn publish(&self, message: OutboundMessage) -> AppResult<()>;

    /// Lightweight, bounded-latency reachability probe.
    async fn is_connected(&self) -> bool;

    /// Release broker resources on shutdown.
    async fn close(&self);
}
