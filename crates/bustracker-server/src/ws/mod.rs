//! `WebSocket` session handlers.
//!
//! - [`bus`] -- ingestion: bus producer reports into the registry
//! - [`browser`] -- broadcast: registry snapshots out to a browser, filtered
//!   by that browser's viewport

pub mod browser;
pub mod bus;

use bustracker_types::{CodecError, encode_error};
use tracing::warn;

use crate::transport::{Connection, TransportError};

/// Report a decoding failure back to the sender as a one-element
/// `Errors` response.
pub(crate) async fn send_error<C: Connection>(
    conn: &mut C,
    error: &CodecError,
) -> Result<(), TransportError> {
    match encode_error(&[error.to_string()]) {
        Ok(json) => conn.send(json).await,
        Err(e) => {
            warn!("Failed to serialize error response: {e}");
            Ok(())
        }
    }
}
