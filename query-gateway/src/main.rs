//! Query gateway service entry point.
//!
//! Loads configuration from the environment (with optional `.env`
//! file), builds the router, and serves until shutdown.

use std::sync::Arc;

use anyhow::Context;
use common::config::AppConfig;
use query_gateway::db::MySqlProvider;
use query_gateway::routes;
use query_gateway::state::AppState;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SERVICE_NAME: &str = "query-gateway";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Optional .env file for local development
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    info!(
        service = SERVICE_NAME,
        sources = config.registry.len(),
        "configuration loaded"
    );

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config.registry, Arc::new(MySqlProvider));
    let app = routes::create_router(state);

    info!(service = SERVICE_NAME, address = %addr, "starting server");
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
