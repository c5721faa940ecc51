//! Ingestion endpoint: one session per bus producer.
//!
//! Every inbound frame is decoded as a bus report. Valid reports overwrite
//! the bus's registry entry; invalid ones get a single `Errors` response and
//! the session keeps reading. Only the transport closing ends a session, and
//! entries written by it stay in the registry afterwards.

use std::sync::Arc;

use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use bustracker_types::decode_bus_report;
use tracing::{debug, trace, warn};

use crate::state::{AppState, Registry};
use crate::transport::Connection;
use crate::ws::send_error;

/// Upgrade an HTTP request to a bus producer session.
///
/// # Route
///
/// `GET /` on the ingestion endpoint
pub async fn ws_bus(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move { run_bus_session(socket, &state.registry).await })
}

/// Read bus reports from `conn` into `registry` until the connection closes.
pub async fn run_bus_session<C: Connection>(mut conn: C, registry: &Registry) {
    debug!("Bus producer connected");

    loop {
        let frame = match conn.recv().await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                debug!("Bus producer disconnected");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Bus connection failed");
                return;
            }
        };

        match decode_bus_report(&frame) {
            Ok(position) => {
                trace!(
                    bus_id = %position.bus_id,
                    route = %position.route,
                    lat = position.lat,
                    lng = position.lng,
                    "Bus position updated"
                );
                registry.put(position).await;
            }
            Err(e) => {
                debug!(error = ?e, "Rejected bus report");
                if let Err(e) = send_error(&mut conn, &e).await {
                    debug!(error = %e, "Bus producer disconnected (error reply failed)");
                    return;
                }
            }
        }
    }
}
