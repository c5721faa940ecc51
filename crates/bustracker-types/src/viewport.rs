//! Browser viewport bounds.
//!
//! A browser starts with an [`Viewport::Unset`] viewport, which lets every
//! bus through. Once it reports its visible map region the viewport holds
//! [`Bounds`] and only positions inside that rectangle are sent.
//!
//! Bounds are taken as reported. A rectangle with `south_lat > north_lat`
//! (or `west_lng > east_lng`) is kept as-is and simply matches nothing.

use serde::{Deserialize, Serialize};

/// A rectangular geographic region, edges inclusive.
///
/// Browsers may send extra keys alongside the four edges; they are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Southern edge latitude.
    pub south_lat: f64,
    /// Northern edge latitude.
    pub north_lat: f64,
    /// Western edge longitude.
    pub west_lng: f64,
    /// Eastern edge longitude.
    pub east_lng: f64,
}

impl Bounds {
    /// Whether `(lat, lng)` lies inside the rectangle, all four edges included.
    pub const fn contains(&self, lat: f64, lng: f64) -> bool {
        self.south_lat <= lat
            && lat <= self.north_lat
            && self.west_lng <= lng
            && lng <= self.east_lng
    }
}

/// Per-connection viewport state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Viewport {
    /// No bounds reported yet. Nothing is filtered.
    #[default]
    Unset,
    /// The most recently reported bounds.
    Bounds(Bounds),
}

impl Viewport {
    /// Whether a position should be shown to this browser.
    ///
    /// Always `true` while the viewport is unset.
    pub const fn is_inside(&self, lat: f64, lng: f64) -> bool {
        match self {
            Self::Unset => true,
            Self::Bounds(bounds) => bounds.contains(lat, lng),
        }
    }

    /// Replace the current bounds.
    pub const fn update(&mut self, bounds: Bounds) {
        *self = Self::Bounds(bounds);
    }
}
