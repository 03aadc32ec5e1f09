//! Ledger Backend binary

use std::sync::Arc;

use anyhow::Context;
use ledger_backend::{app, types::Config};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ledger_backend=info,strategy_ledger=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env());

    info!(port = config.port, "Starting Ledger Backend");
    info!(
        cors_origins = ?config.cors_origins,
        api_keys_configured = !config.api_keys.is_empty(),
        max_strategies = config.max_strategies,
        "Configuration loaded"
    );
    if config.api_keys.is_empty() {
        warn!("No API keys configured - running in development mode");
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(address = %addr, "Server listening");

    axum::serve(listener, app(config))
        .await
        .context("server terminated")?;

    Ok(())
}
