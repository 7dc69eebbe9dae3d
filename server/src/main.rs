use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use items_core::config::{database_url_from_env, redact_dsn};
use items_server::{AppState, ServerConfig, SimulatedAnalyzer, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = ServerConfig::parse();

    let filter = if config.verbose {
        EnvFilter::new("items_server=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    config.validate().map_err(anyhow::Error::msg)?;

    let dsn = database_url_from_env().context("database configuration")?;
    info!(dsn = %redact_dsn(&dsn), "connecting to store");
    let store = Store::connect(&dsn, &config.connect_opts())
        .await
        .context("connecting to store")?;

    let analyzer = Arc::new(SimulatedAnalyzer::new(config.analysis_failure_rate));
    let state = AppState::new(store.clone(), analyzer);

    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("binding {}:{}", config.host, config.port))?;
    info!(addr = %listener.local_addr()?, "listening");

    items_server::run(listener, state, shutdown_signal()).await?;
    store.close().await;
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
