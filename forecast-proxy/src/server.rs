use anyhow::{Context, Result};
use axum::http::HeaderValue;
use forecast_core::{Config, ForecastService};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};

use crate::routes::{AppState, create_router};

/// Bind and serve until Ctrl-C.
pub async fn serve(config: &Config) -> Result<()> {
    let service = ForecastService::from_config(config)?;
    if !service.has_credential() {
        warn!(
            "No WeatherAPI.com API key configured; forecast requests will fail until one is set \
             (run `forecast-proxy configure` or export {})",
            forecast_core::config::API_KEY_ENV
        );
    }

    let origin = HeaderValue::from_str(&config.server.allowed_origin).with_context(|| {
        format!("Invalid allowed_origin in config: {:?}", config.server.allowed_origin)
    })?;

    let app = create_router(AppState::new(service), origin);

    let listener = TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_address))?;

    info!(
        address = %config.server.bind_address,
        origin = %config.server.allowed_origin,
        "forecast proxy listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated unexpectedly")?;

    info!("forecast proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C; shutting down");
    }
}
