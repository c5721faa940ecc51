//! Fake bus producer for the bus tracker.
//!
//! Replays route files as live traffic: every route gets a handful of
//! buses, each on its own task, each starting at a random point and
//! reporting its position to the server's ingestion endpoint at a fixed
//! interval. Dropped connections are retried according to a
//! [`RetryPolicy`].
//!
//! # Architecture
//!
//! ```text
//! routes/*.json --> load_routes --> SimulatedBus x N --> run_bus --> ws://server
//! ```

pub mod bus;
pub mod config;
pub mod error;
pub mod retry;
pub mod routes;

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{error, info, warn};

pub use bus::{SimulatedBus, run_bus};
pub use config::SimConfig;
pub use error::SimError;
pub use retry::RetryPolicy;
pub use routes::{CoordinateCycle, Route, bus_id, load_routes};

/// Build the buses for a set of routes. Routes with no points are skipped.
pub fn plan_buses(routes: Vec<Route>, buses_per_route: usize) -> Vec<SimulatedBus> {
    let mut buses = Vec::new();
    for route in routes {
        if route.coordinates.is_empty() {
            warn!(route = route.name, "Route has no coordinates, skipping");
            continue;
        }
        let points: Arc<[routes::Coordinate]> = Arc::from(route.coordinates);
        for index in 0..buses_per_route {
            buses.push(SimulatedBus {
                bus_id: bus_id(&route.name, index),
                route: route.name.clone(),
                points: Arc::clone(&points),
            });
        }
    }
    buses
}

/// Load routes and run every bus until all of them have stopped.
///
/// With an unbounded retry policy this runs until the process is killed.
pub async fn run_simulation(config: &SimConfig) -> Result<(), SimError> {
    let routes = load_routes(&config.routes_dir, config.routes_limit)?;
    info!(
        routes = routes.len(),
        routes_dir = %config.routes_dir.display(),
        "Routes loaded"
    );

    let mut tasks = JoinSet::new();
    for bus in plan_buses(routes, config.buses_per_route) {
        let bus = Arc::new(bus);
        let url = config.server_url.clone();
        let retry = config.retry;
        let refresh = config.refresh_timeout;
        tasks.spawn(async move {
            let result = retry
                .run(&bus.bus_id, || {
                    run_bus(url.clone(), Arc::clone(&bus), refresh)
                })
                .await;
            (bus.bus_id.clone(), result)
        });
    }
    info!(buses = tasks.len(), url = config.server_url, "Buses started");

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(()))) => {}
            Ok((bus_id, Err(e))) => error!(bus_id, error = %e, "Bus stopped"),
            Err(e) => error!(error = %e, "Bus task panicked or was cancelled"),
        }
    }

    info!("All buses stopped");
    Ok(())
}
