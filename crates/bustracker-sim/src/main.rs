//! Bus simulator entry point.
//!
//! Loads configuration from the environment, reads the route files, and
//! streams fake bus positions to the server until every bus has stopped.

use bustracker_sim::{SimConfig, run_simulation};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("bustracker-sim starting");

    let config = SimConfig::from_env()?;
    info!(
        server_url = config.server_url,
        routes_dir = %config.routes_dir.display(),
        buses_per_route = config.buses_per_route,
        refresh_timeout_ms = config.refresh_timeout.as_millis(),
        "Configuration loaded"
    );

    run_simulation(&config).await?;

    Ok(())
}
