//! Shared application state for Axum handlers.
//!
//! - **Publisher**: broker handle shared by every in-flight request
//! - **Auth**: immutable authenticator built once from configuration
//! - **Metrics**: atomic request/message counters
//! - **Configuration**: runtime configuration access
//!
//! # Structured Concurrency
//!
//! Background tasks are managed using `tokio_util::task::TaskTracker` and
//! `CancellationToken`. Call `shutdown()` to stop them and release the
//! broker before exit.

use std::sync::Arc;

use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, trace, warn};

use crate::auth::MultiAuth;
use crate::broker::Publisher;
use crate::config::Config;
use crate::metrics::{Metrics, set_broker_connected};

/// Shared application state for Axum handlers.
///
/// Cloned for each request; all fields are cheap `Arc` clones.
///
/// # Lifecycle
///
/// The broker health check task is spawned when the state is created, so
/// construction must happen inside a Tokio runtime.
///
/// ```rust,ignore
/// let state = AppState::new(publisher, config);
/// // ... serve ...
/// state.shutdown().await;
/// ```
#[derive(Clone)]
pub struct AppState {
    /// Broker publisher
    pub publisher: Arc<dyn Publisher>,
    /// Request authenticator
    pub auth: Arc<MultiAuth>,
    /// Request and message counters
    pub metrics: Arc<Metrics>,
    /// Application configuration
    pub config: Arc<Config>,
    task_tracker: TaskTracker,
    cancellation_token: CancellationToken,
}

impl AppState {
    /// Create application state and start background tasks.
    ///
    /// The authenticator is built from whatever users and tokens the
    /// configuration carries; `auth_type` plays no part here.
    pub fn new(publisher: Arc<dyn Publisher>, config: Config) -> Self {
        let auth = MultiAuth::new(config.auth_users.clone(), config.auth_tokens.clone());

        let state = Self {
            publisher,
            auth: Arc::new(auth),
            metrics: Arc::new(Metrics::new()),
            config: Arc::new(config),
            task_tracker: TaskTracker::new(),
            cancellation_token: CancellationToken::new(),
        };

        state.spawn_health_check_task();

        state
    }

    /// Spawn the periodic broker connectivity probe.
    ///
    /// Logs transitions between connected and disconnected and keeps the
    /// `kahook_broker_connected` gauge current.
    fn spawn_health_check_task(&self) {
        let publisher = self.publisher.clone();
        let interval_duration = self.config.health_check_interval;
        let cancel = self.cancellation_token.clone();

        self.task_tracker.spawn(async move {
            let mut ticker = interval(interval_duration);
            ticker.tick().await; // Skip first immediate tick
            let mut was_connected = true;

            loop {
                tokio::select! {
                    biased;

                    _ = cancel.cancelled() => {
                        debug!("Health check task received cancellation signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        let connected = publisher.is_connected().await;
                        set_broker_connected(connected);

                        match (was_connected, connected) {
                            (true, false) => warn!("Health check: broker connection is down"),
                            (false, true) => info!("Health check: broker connection restored"),
                            _ => trace!(connected, "Health check"),
                        }
                        was_connected = connected;
                    }
                }
            }

            debug!("Health check task shutting down");
        });
    }

    /// Stop background tasks, then close the publisher.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown of background tasks");

        self.cancellation_token.cancel();
        self.task_tracker.close();
        self.task_tracker.wait().await;

        info!("All background tasks have completed");

        self.publisher.close().await;
    }
}
