//! Bus position relay server.
//!
//! This crate provides two Axum `WebSocket` endpoints sharing one
//! in-memory [`Registry`]:
//!
//! - **Ingestion endpoint** -- bus producers stream position reports; each
//!   valid report overwrites that bus's entry in the registry
//! - **Broadcast endpoint** -- browsers optionally report their viewport and
//!   receive a continuous stream of snapshots filtered to it
//!
//! # Architecture
//!
//! ```text
//! buses --> ws::bus --> Registry --> ws::browser --> browsers
//! ```
//!
//! The two handler types never talk to each other; the registry is the
//! only shared state. Each accepted connection runs on its own Tokio task
//! for as long as the connection stays open.

pub mod config;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod transport;
pub mod ws;

// Re-export primary types for convenience.
pub use config::{ConfigError, TrackerConfig};
pub use router::{build_browser_router, build_bus_router};
pub use server::{ServerError, TrackerServer};
pub use state::{AppState, Registry};
pub use transport::{Connection, TransportError};
