// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use anyhow::Context;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_controller::DashboardController;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::http_relay_client::HttpRelayClient;
use crate::infrastructure::ws_transport::WsTransport;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_app_config().context("Failed to load configuration")?;

    // Create relay adapters (infrastructure layer)
    let relay = Arc::new(HttpRelayClient::new(&config.relay));
    let transport = Arc::new(WsTransport::new(config.relay.stream_url()));

    // Mount the dashboard (application layer)
    let dashboard = Arc::new(DashboardController::mount(
        &config.dashboard.to_settings(),
        relay,
        transport,
    ));

    // Build router (presentation layer)
    let state = Arc::new(AppState {
        dashboard: dashboard.clone(),
    });
    let app = router(state).layer(TraceLayer::new_for_http());

    // Start server
    let listener = tokio::net::TcpListener::bind(config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    tracing::info!(
        "Dashboard for relay {} listening on http://{}",
        config.relay.base_url(),
        config.server.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    dashboard.teardown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
