//! Axum router construction for both endpoints.
//!
//! Producers and browsers connect to the root path of their own port
//! (`ws://host:port`), so each endpoint gets its own [`Router`].

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the ingestion endpoint router.
///
/// - `GET /` -- `WebSocket` bus producer session
pub fn build_bus_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(ws::bus::ws_bus))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the broadcast endpoint router.
///
/// - `GET /` -- `WebSocket` browser session
/// - `GET /health` -- registry size
pub fn build_browser_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(ws::browser::ws_browser))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
