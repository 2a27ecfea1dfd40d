//! # kahook
//!
//! Accepts webhook POSTs on arbitrary paths and republishes each body as a
//! message on the Apache Iggy topic named by the path.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum HTTP Server                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Middleware (Request ID → Deadline → Trace → Accounting)    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Handlers (webhook ingest, health, ready, metrics)          │
//! │    └─ auth::MultiAuth (Basic / Bearer, constant time)       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  broker::Publisher  (IggyPublisher)                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Apache Iggy Server                                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kahook::{AppState, Config, IggyPublisher, build_router};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let publisher = IggyPublisher::connect(&config).await?;
//!
//!     let state = AppState::new(Arc::new(publisher), config);
//!     let app = build_router(state);
//!
//!     // Start the server...
//!     Ok(())
//! }
//! ```
//!
//! ## Authentication
//!
//! ```bash
//! AUTH_USERS=github:s3cret AUTH_TOKENS=ci-token cargo run
//! ```

pub mod auth;
pub mod broker;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;
pub mod validation;
pub mod version;

// Re-exports for convenience
pub use broker::{IggyPublisher, OutboundMessage, Publisher};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use routes::build_router;
pub use state::AppState;
