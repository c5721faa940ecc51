//! Bus position reports.

use serde::{Deserialize, Serialize};

/// Latest reported position of a single bus.
///
/// This is both the ingestion payload (`{"busId", "lat", "lng", "route"}`)
/// and the element type of the `buses` array in a snapshot. Decoding is
/// strict: unknown fields are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BusPosition {
    /// Unique bus identifier. Never empty once decoded.
    pub bus_id: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Free-form route label (e.g. `"156"`).
    pub route: String,
}

impl BusPosition {
    /// Create a position report.
    pub fn new(bus_id: impl Into<String>, lat: f64, lng: f64, route: impl Into<String>) -> Self {
        Self {
            bus_id: bus_id.into(),
            lat,
            lng,
            route: route.into(),
        }
    }
}
