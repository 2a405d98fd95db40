//! Server initialization and routing
//!
//! Axum setup: the webhook route, the probe routes, the middleware stack
//! and graceful shutdown handling.

use crate::config::RelayConfig;
use crate::middleware::{log_requests, request_id};
use crate::routes::{health, not_found, webhook};
use crate::state::RelayState;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router.
///
/// Only three paths exist: the webhook, the liveness probe and (when
/// enabled) the metrics exposition. Everything else falls through to 404.
pub fn build_router(state: Arc<RelayState>) -> Router {
    Router::new()
        .route("/stripe-webhook", post(webhook::receive).fallback(not_found))
        .route("/health", get(health::health_check).fallback(not_found))
        .route("/metrics", get(health::metrics).fallback(not_found))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(state.config.timeout_secs),
        ))
        .layer(from_fn(request_id))
        .layer(from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the relay HTTP server.
///
/// Initializes structured logging, builds shared state (outbound client,
/// channel registry, metrics recorder), binds the listener and serves until
/// SIGTERM or Ctrl+C.
pub async fn start_server(config: RelayConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .json()
        .init();

    let enabled: Vec<&str> = [
        ("email", config.email.is_enabled()),
        ("telegram", config.telegram.is_enabled()),
        ("dingtalk", config.dingtalk.is_enabled()),
        ("bark", config.bark.is_enabled()),
    ]
    .iter()
    .filter(|(_, on)| *on)
    .map(|(name, _)| *name)
    .collect();

    let state = Arc::new(RelayState::new(config.clone())?);
    let app = build_router(state);

    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        "Starting hookrelay on {} (tolerance {}s, channels: [{}])",
        addr,
        config.stripe.tolerance_secs,
        enabled.join(", ")
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
