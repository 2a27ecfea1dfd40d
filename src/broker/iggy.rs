//! Apache Iggy implementation of [`Publisher`].
//!
//! Each webhook topic maps to an Iggy topic inside one configured stream.
//! The stream is ensured at connect time; topics are created on first use
//! when auto-creation is enabled and remembered afterwards so the lookup
//! happens once per topic per process.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use iggy::prelude::{
    Client, HeaderKey, HeaderValue as IggyHeaderValue, IggyClient, IggyExpiry, IggyMessage,
    MaxTopicSize, MessageClient, Partitioning, StreamClient, SystemClient, TopicClient,
};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::{OutboundMessage, Publisher, to_identifier};
use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Upper bound for a single readiness probe.
pub const READY_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Publishes webhook messages to an Iggy stream.
pub struct IggyPublisher {
    client: IggyClient,
    stream: String,
    partitions: u32,
    auto_create_topics: bool,
    known_topics: RwLock<HashSet<String>>,
}

impl IggyPublisher {
    /// Connect to the server and make sure the configured stream exists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConnectionFailed` if the connection string is
    /// invalid or the server is unreachable, and `AppError::TopicError` if
    /// the stream cannot be created.
    #[instrument(skip(config), fields(stream = %config.iggy_stream))]
    pub async fn connect(config: &Config) -> AppResult<Self> {
        info!("Connecting to Iggy");

        let client = IggyClient::from_connection_string(&config.iggy_connection_string)
            .map_err(|e| AppError::ConnectionFailed(e.to_string()))?;

        client
            .connect()
            .await
            .map_err(|e| AppError::ConnectionFailed(e.to_string()))?;

        let publisher = Self {
            client,
            stream: config.iggy_stream.clone(),
            partitions: config.iggy_partitions,
            auto_create_topics: config.iggy_auto_create_topics,
            known_topics: RwLock::new(HashSet::new()),
        };

        publisher.ensure_stream().await?;
        info!("Connected to Iggy");

        Ok(publisher)
    }

    async fn ensure_stream(&self) -> AppResult<()> {
        let stream_id = to_identifier(&self.stream, "stream")?;

        match self.client.get_stream(&stream_id).await {
            Ok(Some(_)) => {
                debug!(stream = %self.stream, "Stream already exists");
                Ok(())
            }
            Ok(None) | Err(_) => {
                info!(stream = %self.stream, "Creating stream");
                self.client
                    .create_stream(&self.stream)
                    .await
                    .map(|_| ())
                    .map_err(|e| AppError::TopicError(e.to_string()))
            }
        }
    }

    /// Create `topic` if it does not exist yet.
    ///
    /// Idempotent. Concurrent first requests for the same topic may both see
    /// it missing; the loser's create error is ignored when a re-read shows
    /// the topic exists.
    async fn ensure_topic(&self, topic: &str) -> AppResult<()> {
        if self.known_topics.read().await.contains(topic) {
            return Ok(());
        }

        let stream_id = to_identifier(&self.stream, "stream")?;
        let topic_id = to_identifier(topic, "topic")?;

        if !matches!(self.client.get_topic(&stream_id, &topic_id).await, Ok(Some(_))) {
            info!(stream = %self.stream, topic, partitions = self.partitions, "Creating topic");
            let created = self
                .client
                .create_topic(
                    &stream_id,
                    topic,
                    self.partitions,
                    Default::default(),
                    None,
                    IggyExpiry::NeverExpire,
                    MaxTopicSize::Unlimited,
                )
                .await;

            if let Err(e) = created {
                if !matches!(self.client.get_topic(&stream_id, &topic_id).await, Ok(Some(_))) {
                    return Err(AppError::TopicError(e.to_string()));
                }
                debug!(topic, "Topic created concurrently");
            }
        }

        self.known_topics.write().await.insert(topic.to_string());
        Ok(())
    }
}

/// Convert forwarded headers into Iggy user headers.
///
/// Iggy bounds header keys and values to 1..=255 bytes; anything outside
/// that range is dropped with a warning rather than failing the message.
fn user_headers(headers: &HashMap<String, String>) -> HashMap<HeaderKey, IggyHeaderValue> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let key = name.parse::<HeaderKey>();
            let val = value.parse::<IggyHeaderValue>();
            match (key, val) {
                (Ok(key), Ok(val)) => Some((key, val)),
                _ => {
                    warn!(header = %name, "Dropping header not representable as an Iggy user header");
                    None
                }
            }
        })
        .collect()
}

fn build_message(message: &OutboundMessage) -> AppResult<IggyMessage> {
    let headers = user_headers(&message.headers);
    let builder = IggyMessage::builder().payload(message.value.clone());

    let built = if headers.is_empty() {
        builder.build()
    } else {
        builder.user_headers(headers).build()
    };

    built.map_err(|e| AppError::SendError(e.to_string()))
}

#[async_trait]
impl Publisher for IggyPublisher {
    #[instrument(skip(self, message), fields(topic = %message.topic, bytes = message.value.len()))]
    async fn publish(&self, message: OutboundMessage) -> AppResult<()> {
        if self.auto_create_topics {
            self.ensure_topic(&message.topic).await?;
        }

        let stream_id = to_identifier(&self.stream, "stream")?;
        let topic_id = to_identifier(&message.topic, "topic")?;

        let partitioning = match &message.key {
            Some(key) => Partitioning::messages_key(key)
                .map_err(|e| AppError::SendError(e.to_string()))?,
            None => Partitioning::balanced(),
        };

        let mut messages = vec![build_message(&message)?];
        self.client
            .send_messages(&stream_id, &topic_id, &partitioning, &mut messages)
            .await
            .map_err(|e| AppError::SendError(e.to_string()))?;

        debug!("Message sent");
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        match tokio::time::timeout(READY_PROBE_TIMEOUT, self.client.ping()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                debug!(error = %e, "Iggy ping failed");
                false
            }
            Err(_) => {
                debug!("Iggy ping timed out");
                false
            }
        }
    }

    async fn close(&self) {
        if let Err(e) = self.client.disconnect().await {
            warn!(error = %e, "Error disconnecting from Iggy");
        } else {
            info!("Disconnected from Iggy");
        }
    }
}
