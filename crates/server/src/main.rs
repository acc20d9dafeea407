mod config;
mod error;
mod extract;
mod routes;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use portfolio_tracker_core::PortfolioTracker;

use crate::config::ServerConfig;
use crate::routes::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::load()?;
    let tracker = PortfolioTracker::new(config.settings)?;

    let state = AppState {
        tracker: Arc::new(tracker),
        expose_reset_token: config.expose_reset_token,
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    tracing::info!(address = %config.bind_address, "Listening");
    axum::serve(listener, routes::router(state)).await?;
    Ok(())
}
