use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use villa_direct::models::PropertyRegistry;
use villa_direct::server::{create_router, AppState};
use villa_direct::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🏝️  Villa Direct - booking proxy");

    let config = Config::from_env().context("Failed to read configuration")?;
    if config.smoobu_api_key.is_none() {
        warn!("SMOOBU_API_KEY is not set; rates and reservations will answer 500");
    }

    let registry = PropertyRegistry::default_fleet();
    for villa in registry.properties() {
        info!("   {} -> apartment {}", villa.slug, villa.external_id);
    }

    let state = Arc::new(AppState::from_config(&config, registry)?);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
