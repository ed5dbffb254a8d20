use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wayfarer_api::{build_router, AppState};
use wayfarer_common::Config;
use wayfarer_planner::{EnvModelResolver, TripPlanner};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = Config::from_env()?;

    info!(
        provider = %config.model_provider,
        model = config.model_name(),
        "Starting wayfarer-api"
    );
    if config.model_credential().is_none() {
        warn!(
            credential = config.model_provider.credential_var(),
            "No model credential set; /api/generate will serve the mock itinerary"
        );
    }

    let planner = TripPlanner::new(Arc::new(EnvModelResolver::new(config.clone())));
    let state = Arc::new(AppState { planner });
    let app = build_router(state, &config);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Wayfarer API listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
