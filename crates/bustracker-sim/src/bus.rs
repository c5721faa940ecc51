//! A single simulated bus streaming its position to the server.

use std::sync::Arc;
use std::time::Duration;

use bustracker_types::BusPosition;
use futures::SinkExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use crate::error::SimError;
use crate::routes::{Coordinate, CoordinateCycle};

/// Static description of one simulated bus.
#[derive(Debug, Clone)]
pub struct SimulatedBus {
    /// Unique id, `"{route}-{index}"`.
    pub bus_id: String,
    /// Route label sent with every report.
    pub route: String,
    /// Points the bus drives along.
    pub points: Arc<[Coordinate]>,
}

/// Connect to `url` and send one report per point every `refresh`.
///
/// Each connection starts at a random point on the route. Only returns
/// early on a connection or send failure.
pub async fn run_bus(url: String, bus: Arc<SimulatedBus>, refresh: Duration) -> Result<(), SimError> {
    let (mut ws, _) = connect_async(url.as_str()).await?;
    debug!(bus_id = %bus.bus_id, url, "Bus connected");

    for [lat, lng] in CoordinateCycle::random(Arc::clone(&bus.points)) {
        let report = BusPosition::new(bus.bus_id.as_str(), lat, lng, bus.route.as_str());
        let json = serde_json::to_string(&report)?;
        ws.send(Message::text(json)).await?;
        tokio::time::sleep(refresh).await;
    }

    Ok(())
}
