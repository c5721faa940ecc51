//! Broadcast endpoint: one session per browser.
//!
//! A single connection has to both take viewport updates from the browser
//! and push snapshots to it. Each cycle therefore has two phases:
//!
//! 1. Listen for up to `listen_timeout` for one inbound message. A valid
//!    message with bounds replaces the viewport; an invalid one gets an
//!    `Errors` response. Silence leaves the viewport alone.
//! 2. Send a `Buses` snapshot of every registry entry inside the viewport.
//!
//! The listen window is the only pacing; the next cycle starts as soon as
//! the snapshot is sent.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use bustracker_types::{Viewport, decode_browser_message, encode_snapshot};
use tracing::{debug, info, warn};

use crate::state::{AppState, Registry};
use crate::transport::{Connection, TransportError};
use crate::ws::send_error;

/// Upgrade an HTTP request to a browser session.
///
/// # Route
///
/// `GET /` on the broadcast endpoint
pub async fn ws_browser(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        run_browser_session(socket, &state.registry, state.listen_timeout).await;
    })
}

/// Result of one listen phase.
enum Listen {
    Open,
    Closed,
}

/// Serve snapshots to one browser until its connection closes.
///
/// The viewport starts unset and lives only as long as this session.
pub async fn run_browser_session<C: Connection>(
    mut conn: C,
    registry: &Registry,
    listen_timeout: Duration,
) {
    debug!("Browser connected");

    let mut viewport = Viewport::Unset;

    loop {
        match listen_browser(&mut conn, &mut viewport, listen_timeout).await {
            Ok(Listen::Open) => {}
            Ok(Listen::Closed) => {
                debug!("Browser disconnected");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Browser connection failed");
                return;
            }
        }

        let buses = registry
            .snapshot(|bus| viewport.is_inside(bus.lat, bus.lng))
            .await;
        debug!(buses = buses.len(), "Buses inside bounds");

        let json = match encode_snapshot(&buses) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize snapshot: {e}");
                continue;
            }
        };
        if let Err(e) = conn.send(json).await {
            debug!(error = %e, "Browser disconnected (send failed)");
            return;
        }
    }
}

/// Wait up to `wait` for one browser message and apply it.
async fn listen_browser<C: Connection>(
    conn: &mut C,
    viewport: &mut Viewport,
    wait: Duration,
) -> Result<Listen, TransportError> {
    let frame = match tokio::time::timeout(wait, conn.recv()).await {
        Err(_elapsed) => return Ok(Listen::Open),
        Ok(Ok(Some(frame))) => frame,
        Ok(Ok(None)) => return Ok(Listen::Closed),
        Ok(Err(e)) => return Err(e),
    };

    let decoded = decode_browser_message(&frame)
        .and_then(|message| message.bounds().map(|bounds| (message, bounds)));

    match decoded {
        Ok((message, Some(bounds))) => {
            viewport.update(bounds);
            info!(
                msg_type = %message.msg_type,
                south_lat = bounds.south_lat,
                north_lat = bounds.north_lat,
                west_lng = bounds.west_lng,
                east_lng = bounds.east_lng,
                "Viewport updated"
            );
        }
        Ok((message, None)) => {
            debug!(msg_type = %message.msg_type, "Browser message without bounds");
        }
        Err(e) => {
            debug!(error = ?e, "Rejected browser message");
            send_error(conn, &e).await?;
        }
    }

    Ok(Listen::Open)
}

#[cfg(test)]
mod tests {
    use bustracker_types::{BusPosition, ServerMessage};
    use tokio::task::JoinHandle;

    use super::*;
    use crate::transport::memory::{self, Inbound, Peer};

    const LISTEN: Duration = Duration::from_millis(10);

    const BOUNDS: &str = r#"{"msgType":"newBounds","data":{
        "south_lat":55.7,"north_lat":55.8,"west_lng":37.5,"east_lng":37.7}}"#;

    async fn seeded_state() -> Arc<AppState> {
        let state = Arc::new(AppState::new(LISTEN));
        state
            .registry
            .put(BusPosition::new("inside", 55.75, 37.6, "120"))
            .await;
        state
            .registry
            .put(BusPosition::new("outside", 56.5, 38.0, "670"))
            .await;
        state
    }

    fn spawn_session(state: &Arc<AppState>, conn: memory::MemoryConnection) -> JoinHandle<()> {
        let state = Arc::clone(state);
        tokio::spawn(async move {
            run_browser_session(conn, &state.registry, state.listen_timeout).await;
        })
    }

    async fn next_message(peer: &mut Peer) -> Option<ServerMessage> {
        let text = tokio::time::timeout(Duration::from_secs(1), peer.rx.recv())
            .await
            .ok()
            .flatten()?;
        serde_json::from_str(&text).ok()
    }

    fn sorted_ids(message: Option<ServerMessage>) -> Vec<String> {
        let mut ids: Vec<String> = match message {
            Some(ServerMessage::Buses { buses }) => buses.into_iter().map(|b| b.bus_id).collect(),
            _ => Vec::new(),
        };
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn unset_viewport_sends_everything() {
        let state = seeded_state().await;
        let (conn, mut peer) = memory::pair();
        let _handle = spawn_session(&state, conn);

        assert_eq!(
            sorted_ids(next_message(&mut peer).await),
            vec!["inside".to_owned(), "outside".to_owned()]
        );
    }

    #[tokio::test]
    async fn bounds_filter_snapshot() {
        let state = seeded_state().await;
        let (conn, mut peer) = memory::pair();
        peer.send(BOUNDS);
        let _handle = spawn_session(&state, conn);

        assert_eq!(
            sorted_ids(next_message(&mut peer).await),
            vec!["inside".to_owned()]
        );
        assert_eq!(
            sorted_ids(next_message(&mut peer).await),
            vec!["inside".to_owned()]
        );
    }

    #[tokio::test]
    async fn bounds_with_extra_keys_filter_snapshot() {
        let state = seeded_state().await;
        let (conn, mut peer) = memory::pair();
        peer.send(
            r#"{"msgType":"newBounds","data":{
                "south_lat":55.7,"north_lat":55.8,"west_lng":37.5,"east_lng":37.7,"zoom":12}}"#,
        );
        let _handle = spawn_session(&state, conn);

        assert_eq!(
            sorted_ids(next_message(&mut peer).await),
            vec!["inside".to_owned()]
        );
    }

    #[tokio::test]
    async fn empty_data_keeps_viewport() {
        let state = seeded_state().await;
        let (conn, mut peer) = memory::pair();
        peer.send(BOUNDS);
        peer.send(r#"{"msgType":"newBounds","data":{}}"#);
        let _handle = spawn_session(&state, conn);

        assert_eq!(sorted_ids(next_message(&mut peer).await).len(), 1);
        assert_eq!(sorted_ids(next_message(&mut peer).await).len(), 1);
    }

    #[tokio::test]
    async fn invalid_json_gets_error_then_snapshot() {
        let state = seeded_state().await;
        let (conn, mut peer) = memory::pair();
        peer.send("hello world!");
        let _handle = spawn_session(&state, conn);

        assert_eq!(
            next_message(&mut peer).await,
            Some(ServerMessage::Errors {
                errors: vec!["Requires valid JSON".to_owned()]
            })
        );
        assert_eq!(sorted_ids(next_message(&mut peer).await).len(), 2);
    }

    #[tokio::test]
    async fn missing_msg_type_gets_error() {
        let state = seeded_state().await;
        let (conn, mut peer) = memory::pair();
        peer.send(r#"{"data":{}}"#);
        let _handle = spawn_session(&state, conn);

        assert_eq!(
            next_message(&mut peer).await,
            Some(ServerMessage::Errors {
                errors: vec!["Requires msgType specified".to_owned()]
            })
        );
    }

    #[tokio::test]
    async fn partial_bounds_leave_viewport_unchanged() {
        let state = seeded_state().await;
        let (conn, mut peer) = memory::pair();
        peer.send(r#"{"msgType":"newBounds","data":{"south_lat":55.7}}"#);
        let _handle = spawn_session(&state, conn);

        assert!(matches!(
            next_message(&mut peer).await,
            Some(ServerMessage::Errors { .. })
        ));
        assert_eq!(sorted_ids(next_message(&mut peer).await).len(), 2);
    }

    #[tokio::test]
    async fn inverted_bounds_yield_empty_snapshot() {
        let state = seeded_state().await;
        let (conn, mut peer) = memory::pair();
        peer.send(
            r#"{"msgType":"newBounds","data":{
                "south_lat":55.8,"north_lat":55.7,"west_lng":37.5,"east_lng":37.7}}"#,
        );
        let _handle = spawn_session(&state, conn);

        assert_eq!(
            next_message(&mut peer).await,
            Some(ServerMessage::Buses { buses: Vec::new() })
        );
    }

    #[tokio::test]
    async fn new_positions_appear_on_next_cycle() {
        let state = Arc::new(AppState::new(LISTEN));
        let (conn, mut peer) = memory::pair();
        let _handle = spawn_session(&state, conn);

        assert_eq!(
            next_message(&mut peer).await,
            Some(ServerMessage::Buses { buses: Vec::new() })
        );

        state
            .registry
            .put(BusPosition::new("late", 1.0, 2.0, "9"))
            .await;

        let mut seen = false;
        for _ in 0..20 {
            if sorted_ids(next_message(&mut peer).await) == vec!["late".to_owned()] {
                seen = true;
                break;
            }
        }
        assert!(seen);
    }

    #[tokio::test]
    async fn close_ends_session() {
        let state = seeded_state().await;
        let (conn, peer) = memory::pair();
        let handle = spawn_session(&state, conn);
        drop(peer);

        assert!(
            tokio::time::timeout(Duration::from_secs(1), handle)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn transport_failure_ends_session() {
        let state = seeded_state().await;
        let (conn, peer) = memory::pair();
        let _ = peer.tx.send(Inbound::Fail);
        let handle = spawn_session(&state, conn);

        assert!(
            tokio::time::timeout(Duration::from_secs(1), handle)
                .await
                .is_ok()
        );
        assert!(peer.rx.is_empty());
    }
}
