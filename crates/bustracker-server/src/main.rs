//! Bus tracker server binary.
//!
//! Wires together configuration, logging, the shared registry, and both
//! `WebSocket` endpoints, then serves until the process is stopped.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `bustracker.yaml` (or `BUSTRACKER_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Create the shared registry
//! 4. Bind the bus and browser endpoints
//! 5. Serve both endpoints

use std::path::PathBuf;
use std::sync::Arc;

use bustracker_server::config::{LogFormat, LoggingConfig};
use bustracker_server::{AppState, ConfigError, TrackerConfig, TrackerServer};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, an endpoint cannot
/// be bound, or serving fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        bus_host = config.bus_endpoint.host,
        bus_port = config.bus_endpoint.port,
        browser_host = config.browser_endpoint.host,
        browser_port = config.browser_endpoint.port,
        listen_timeout_ms = config.browser.listen_timeout_ms,
        "Configuration loaded"
    );

    // 3. Create the shared registry.
    let state = Arc::new(AppState::new(config.browser.listen_timeout()));

    // 4. Bind both endpoints.
    let server = TrackerServer::bind(&config, state).await?;

    // 5. Serve.
    server.serve().await?;

    info!("bustracker-server shutdown complete");
    Ok(())
}

/// Load `bustracker.yaml` from the working directory, or the file named by
/// `BUSTRACKER_CONFIG`. Falls back to defaults (plus env overrides) when
/// the file does not exist.
fn load_config() -> Result<TrackerConfig, ConfigError> {
    let config_path = std::env::var("BUSTRACKER_CONFIG")
        .map_or_else(|_| PathBuf::from("bustracker.yaml"), PathBuf::from);
    if config_path.exists() {
        TrackerConfig::from_file(&config_path)
    } else {
        let mut config = TrackerConfig::default();
        config.apply_env_overrides()?;
        Ok(config)
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    match logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}
