//! Inbound browser messages and outbound server messages.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::codec::CodecError;
use crate::position::BusPosition;
use crate::viewport::Bounds;

/// A message sent by a browser over the broadcast endpoint.
///
/// `data` is kept untyped until [`InboundBrowserMessage::bounds`] is asked
/// for; an empty map means "no viewport change".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundBrowserMessage {
    /// Message kind, e.g. `"newBounds"`. Never empty once decoded.
    pub msg_type: String,
    /// Payload; the four bound fields when the viewport moved.
    pub data: Map<String, Value>,
}

impl InboundBrowserMessage {
    /// Extract the viewport bounds carried in `data`.
    ///
    /// Returns `Ok(None)` for an empty payload. A non-empty payload must
    /// hold numeric `south_lat`, `north_lat`, `west_lng` and `east_lng`;
    /// any other keys are ignored.
    pub fn bounds(&self) -> Result<Option<Bounds>, CodecError> {
        if self.data.is_empty() {
            return Ok(None);
        }
        serde_json::from_value(Value::Object(self.data.clone()))
            .map(Some)
            .map_err(|e| CodecError::InvalidField(format!("bad bounds: {e}")))
    }
}

/// A message sent by the server to a bus producer or a browser, as read
/// by a client.
///
/// Decode-only: the server writes these shapes through
/// [`encode_snapshot`](crate::codec::encode_snapshot) and
/// [`encode_error`](crate::codec::encode_error), which borrow their input
/// instead of building this owned value. Tagged with `msgType`:
/// `{"msgType":"Buses","buses":[...]}` or `{"msgType":"Errors","errors":[...]}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "msgType")]
pub enum ServerMessage {
    /// Snapshot of the buses inside a browser's viewport.
    Buses {
        /// Positions in registry iteration order (unordered).
        buses: Vec<BusPosition>,
    },
    /// Per-message protocol errors.
    Errors {
        /// Human-readable error descriptions.
        errors: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(data: Value) -> InboundBrowserMessage {
        let data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        InboundBrowserMessage {
            msg_type: "newBounds".to_owned(),
            data,
        }
    }

    #[test]
    fn empty_data_has_no_bounds() {
        assert_eq!(message(serde_json::json!({})).bounds(), Ok(None));
    }

    #[test]
    fn full_data_yields_bounds() {
        let msg = message(serde_json::json!({
            "south_lat": 55.7,
            "north_lat": 55.8,
            "west_lng": 37.5,
            "east_lng": 37.7
        }));
        assert_eq!(
            msg.bounds(),
            Ok(Some(Bounds {
                south_lat: 55.7,
                north_lat: 55.8,
                west_lng: 37.5,
                east_lng: 37.7,
            }))
        );
    }

    #[test]
    fn extra_keys_alongside_bounds_are_ignored() {
        let msg = message(serde_json::json!({
            "south_lat": 55.7,
            "north_lat": 55.8,
            "west_lng": 37.5,
            "east_lng": 37.7,
            "zoom": 12
        }));
        assert_eq!(
            msg.bounds(),
            Ok(Some(Bounds {
                south_lat: 55.7,
                north_lat: 55.8,
                west_lng: 37.5,
                east_lng: 37.7,
            }))
        );
    }

    #[test]
    fn non_numeric_bound_is_rejected() {
        let msg = message(serde_json::json!({
            "south_lat": "south",
            "north_lat": 55.8,
            "west_lng": 37.5,
            "east_lng": 37.7
        }));
        assert!(matches!(msg.bounds(), Err(CodecError::InvalidField(_))));
    }

    #[test]
    fn partial_data_is_rejected() {
        let msg = message(serde_json::json!({"south_lat": 55.7}));
        assert!(matches!(msg.bounds(), Err(CodecError::InvalidField(_))));
    }

    #[test]
    fn server_message_round_trips_through_tag() {
        let parsed: Result<ServerMessage, _> =
            serde_json::from_str(r#"{"msgType":"Errors","errors":["boom"]}"#);
        assert_eq!(
            parsed.ok(),
            Some(ServerMessage::Errors {
                errors: vec!["boom".to_owned()]
            })
        );
    }
}
