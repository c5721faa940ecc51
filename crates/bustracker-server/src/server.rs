//! Server lifecycle: bind both endpoints, then serve them together.
//!
//! Binding is split from serving so callers (and tests binding port 0)
//! can learn the real addresses before any connection is accepted.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::{EndpointConfig, TrackerConfig};
use crate::router::{build_browser_router, build_bus_router};
use crate::state::AppState;

/// Both endpoint listeners, bound and ready to serve.
#[derive(Debug)]
pub struct TrackerServer {
    bus_listener: TcpListener,
    browser_listener: TcpListener,
    state: Arc<AppState>,
}

impl TrackerServer {
    /// Bind the ingestion and broadcast listeners.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if either address cannot be bound.
    pub async fn bind(config: &TrackerConfig, state: Arc<AppState>) -> Result<Self, ServerError> {
        let bus_listener = bind_endpoint(&config.bus_endpoint).await?;
        let browser_listener = bind_endpoint(&config.browser_endpoint).await?;
        Ok(Self {
            bus_listener,
            browser_listener,
            state,
        })
    }

    /// Address the ingestion endpoint is listening on.
    pub fn bus_addr(&self) -> Result<SocketAddr, ServerError> {
        self.bus_listener
            .local_addr()
            .map_err(|e| ServerError::Bind(format!("bus endpoint address: {e}")))
    }

    /// Address the broadcast endpoint is listening on.
    pub fn browser_addr(&self) -> Result<SocketAddr, ServerError> {
        self.browser_listener
            .local_addr()
            .map_err(|e| ServerError::Bind(format!("browser endpoint address: {e}")))
    }

    /// Serve both endpoints until either fails.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Serve`] if either server hits a fatal I/O error.
    pub async fn serve(self) -> Result<(), ServerError> {
        let bus_addr = self.bus_addr()?;
        let browser_addr = self.browser_addr()?;

        let bus = axum::serve(self.bus_listener, build_bus_router(Arc::clone(&self.state)));
        let browser = axum::serve(self.browser_listener, build_browser_router(self.state));

        info!(%bus_addr, "Bus endpoint listening");
        info!(%browser_addr, "Browser endpoint listening");

        tokio::try_join!(
            async move {
                bus.await
                    .map_err(|e| ServerError::Serve(format!("bus endpoint: {e}")))
            },
            async move {
                browser
                    .await
                    .map_err(|e| ServerError::Serve(format!("browser endpoint: {e}")))
            },
        )?;

        Ok(())
    }
}

async fn bind_endpoint(endpoint: &EndpointConfig) -> Result<TcpListener, ServerError> {
    TcpListener::bind((endpoint.host.as_str(), endpoint.port))
        .await
        .map_err(|e| {
            ServerError::Bind(format!(
                "bind failed on {}:{}: {e}",
                endpoint.host, endpoint.port
            ))
        })
}

/// Errors that can occur when starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}
