//! Plain HTTP handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::state::AppState;

/// Liveness check reporting how many buses the registry holds.
///
/// # Route
///
/// `GET /health` on the broadcast endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "buses": state.registry.len().await,
    }))
}
