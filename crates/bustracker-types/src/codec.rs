//! Message codec for both endpoints.
//!
//! Decoders take raw frame bytes and return a validated message or a
//! [`CodecError`] whose `Display` text is exactly what goes back to the
//! sender inside an `Errors` response. Encoders produce compact JSON text.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::messages::InboundBrowserMessage;
use crate::position::BusPosition;

/// Field carrying the bus identifier in a bus report.
const BUS_ID_FIELD: &str = "busId";

/// Field carrying the message kind in a browser message.
const MSG_TYPE_FIELD: &str = "msgType";

/// Per-message decoding failures.
///
/// None of these are fatal to a connection; the handler reports the error
/// text back and keeps reading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The payload is not a well-formed JSON document. Carries the parser
    /// detail for logging; the wire text is fixed.
    #[error("Requires valid JSON")]
    InvalidEncoding(String),

    /// A required field is absent, `null`, or an empty string.
    #[error("Requires {0} specified")]
    MissingField(&'static str),

    /// The document has the required key but cannot be built into the
    /// message (unknown field, wrong type, missing coordinate).
    #[error("Invalid message: {0}")]
    InvalidField(String),
}

/// Decode a bus report.
///
/// Exactly `busId`, `lat`, `lng` and `route` are accepted.
pub fn decode_bus_report(bytes: &[u8]) -> Result<BusPosition, CodecError> {
    let document = parse_document(bytes)?;
    require_non_empty_str(&document, BUS_ID_FIELD)?;
    serde_json::from_value(document).map_err(|e| CodecError::InvalidField(e.to_string()))
}

/// Decode a browser message.
///
/// `data` may be absent or `null`, both treated as an empty payload.
pub fn decode_browser_message(bytes: &[u8]) -> Result<InboundBrowserMessage, CodecError> {
    let document = parse_document(bytes)?;
    let msg_type = require_non_empty_str(&document, MSG_TYPE_FIELD)?;
    let data = match document.get("data") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(other) => {
            return Err(CodecError::InvalidField(format!(
                "`data` must be an object, got {other}"
            )));
        }
    };
    Ok(InboundBrowserMessage { msg_type, data })
}

/// Borrowed view of an outbound message, so encoding never clones positions.
/// Must stay in step with [`ServerMessage`](crate::messages::ServerMessage).
#[derive(Serialize)]
#[serde(tag = "msgType")]
enum Outbound<'a> {
    Buses { buses: &'a [BusPosition] },
    Errors { errors: &'a [String] },
}

/// Encode an `Errors` response.
pub fn encode_error(messages: &[String]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Outbound::Errors { errors: messages })
}

/// Encode a `Buses` snapshot.
pub fn encode_snapshot(positions: &[BusPosition]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Outbound::Buses { buses: positions })
}

fn parse_document(bytes: &[u8]) -> Result<Value, CodecError> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::InvalidEncoding(e.to_string()))
}

/// Non-object documents have no fields at all, so they report the field
/// as missing.
fn require_non_empty_str(document: &Value, field: &'static str) -> Result<String, CodecError> {
    match document.get(field) {
        None | Some(Value::Null) => Err(CodecError::MissingField(field)),
        Some(Value::String(s)) if s.is_empty() => Err(CodecError::MissingField(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(CodecError::InvalidField(format!(
            "`{field}` must be a string, got {other}"
        ))),
    }
}
