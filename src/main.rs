use std::future::IntoFuture;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use kahook::config::LogFormat;
use kahook::{AppState, Config, IggyPublisher, build_router, metrics, utils, version};

/// How long in-flight requests may run after a shutdown signal.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> ExitCode {
    if std::env::args().skip(1).any(|arg| arg == "--version" || arg == "-V") {
        println!("{}", version::version_string());
        return ExitCode::from(exitcode::OK as u8);
    }

    let _ = dotenvy::dotenv();

    // Logging is configured from the loaded settings; a config error is
    // still reported through a default subscriber.
    let config = match Config::from_env() {
        Ok(config) => {
            utils::init_tracing(&config.log_level, config.log_format);
            config
        }
        Err(e) => {
            utils::init_tracing("info", LogFormat::default());
            error!("Configuration error: {e}");
            return ExitCode::from(exitcode::CONFIG as u8);
        }
    };

    info!(
        version = version::VERSION,
        commit = version::GIT_COMMIT,
        built = version::BUILD_TIME,
        "Starting kahook"
    );

    match run(config).await {
        Ok(()) => ExitCode::from(exitcode::OK as u8),
        Err(exit_code) => ExitCode::from(exit_code as u8),
    }
}

/// Run the application, returning an exit code on error.
async fn run(config: Config) -> Result<(), exitcode::ExitCode> {
    info!(
        host = %config.host,
        port = config.port,
        stream = %config.iggy_stream,
        auto_create_topics = config.iggy_auto_create_topics,
        "Configuration loaded"
    );

    log_auth_mode(&config);

    // Connect to Iggy
    let publisher = IggyPublisher::connect(&config).await.map_err(|e| {
        error!("Failed to connect to Iggy server: {e}");
        exitcode::UNAVAILABLE
    })?;

    if let Some(addr) = config.metrics_addr() {
        metrics::try_init_metrics(addr);
    }

    // Build application state and router
    let state = AppState::new(Arc::new(publisher), config.clone());
    let app = build_router(state.clone());

    // Start server
    let addr: SocketAddr = config.server_addr().parse().map_err(|e| {
        error!("Invalid server address: {e}");
        exitcode::CONFIG
    })?;
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind to {addr}: {e}");
        exitcode::UNAVAILABLE
    })?;

    info!("Server listening on http://{addr}");
    info!("  POST /{{topic}}  - Publish webhook");
    info!("  GET  /health   - Liveness check");
    info!("  GET  /ready    - Readiness check");
    info!("  GET  /metrics  - Counters snapshot");

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            utils::shutdown_signal().await;
            shutdown.cancel();
        }
    });

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .into_future();

    let drain_deadline = async {
        shutdown.cancelled().await;
        tokio::time::sleep(DRAIN_TIMEOUT).await;
    };

    let served = tokio::select! {
        result = server => result.map_err(|e| {
            error!("Server error: {e}");
            exitcode::SOFTWARE
        }),
        () = drain_deadline => {
            warn!(timeout_secs = DRAIN_TIMEOUT.as_secs(), "Drain timeout reached, dropping in-flight requests");
            Ok(())
        }
    };

    info!("HTTP server stopped, shutting down background tasks...");
    state.shutdown().await;

    info!("Server shutdown complete");
    served
}

fn log_auth_mode(config: &Config) {
    match (config.auth_users.is_empty(), config.auth_tokens.is_empty()) {
        (true, true) => warn!("Authentication disabled: no AUTH_USERS or AUTH_TOKENS configured"),
        (false, true) => info!(users = config.auth_users.len(), "Basic authentication enabled"),
        (true, false) => info!(tokens = config.auth_tokens.len(), "Bearer authentication enabled"),
        (false, false) => info!(
            users = config.auth_users.len(),
            tokens = config.auth_tokens.len(),
            "Basic and Bearer authentication enabled"
        ),
    }
}
