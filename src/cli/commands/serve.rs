use anyhow::Context;

use crate::app::{self, AppState};
use crate::config::config;

pub async fn handle(port: Option<u16>) -> anyhow::Result<()> {
    let config = config();
    tracing::info!("Starting Marketplace API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        if crate::is_production!() {
            anyhow::bail!("JWT_SECRET must be set in production");
        }
        tracing::warn!("JWT_SECRET is empty; token issuance will fail until it is set");
    }

    let store = app::build_store(&config.database).await?;
    let state = AppState::new(store, config);
    tracing::info!(
        "Notification dispatcher {} with {} observers",
        if state.dispatcher.is_enabled() { "enabled" } else { "disabled" },
        state.dispatcher.observer_count()
    );

    let router = app::router(state, config);

    let port = port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Marketplace API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
