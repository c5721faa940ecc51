//! Shared type definitions for the bus tracker.
//!
//! This crate is the single source of truth for everything that crosses a
//! connection: the report a bus producer sends, the viewport update a browser
//! sends, and the snapshot/error responses the server sends back.
//!
//! # Modules
//!
//! - [`position`] -- Bus position reports
//! - [`viewport`] -- Browser viewport bounds and the containment predicate
//! - [`messages`] -- Inbound browser message and outbound server messages
//! - [`codec`] -- Validating decoders and encoders for all wire shapes

pub mod codec;
pub mod messages;
pub mod position;
pub mod viewport;

// Re-export all public types at crate root for convenience.
pub use codec::{
    CodecError, decode_browser_message, decode_bus_report, encode_error, encode_snapshot,
};
pub use messages::{InboundBrowserMessage, ServerMessage};
pub use position::BusPosition;
pub use viewport::{Bounds, Viewport};
