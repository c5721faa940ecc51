//! Route files and the coordinates buses drive along.
//!
//! A route file is a JSON document with at least a `name` and a list of
//! `[lat, lng]` points. Any other keys (stations, colours) are ignored.

use std::path::Path;
use std::sync::Arc;

use rand::Rng;
use serde::Deserialize;

use crate::error::SimError;

/// A `[lat, lng]` pair.
pub type Coordinate = [f64; 2];

/// One route as loaded from disk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Route {
    /// Route label, also used as the bus id prefix.
    pub name: String,
    /// Points along the route, in driving order.
    pub coordinates: Vec<Coordinate>,
}

/// Load every `*.json` route in `dir`, sorted by file name.
///
/// When `limit` is set, only the first `limit` files are read.
pub fn load_routes(dir: &Path, limit: Option<usize>) -> Result<Vec<Route>, SimError> {
    let io_err = |source| SimError::Io {
        path: dir.display().to_string(),
        source,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();
    if let Some(limit) = limit {
        paths.truncate(limit);
    }

    paths
        .iter()
        .map(|path| {
            let contents = std::fs::read_to_string(path).map_err(|source| SimError::Io {
                path: path.display().to_string(),
                source,
            })?;
            serde_json::from_str(&contents).map_err(|source| SimError::RouteFormat {
                path: path.display().to_string(),
                source,
            })
        })
        .collect()
}

/// Identifier of the `index`-th bus on a route.
pub fn bus_id(route_name: &str, index: usize) -> String {
    format!("{route_name}-{index}")
}

/// Endless walk along a route, wrapping back to the first point after the
/// last. Ends immediately for a route with no points.
#[derive(Debug, Clone)]
pub struct CoordinateCycle {
    points: Arc<[Coordinate]>,
    next: usize,
}

impl CoordinateCycle {
    /// Start at a specific point; out-of-range offsets start at the beginning.
    pub fn starting_at(points: Arc<[Coordinate]>, start: usize) -> Self {
        let next = if start < points.len() { start } else { 0 };
        Self { points, next }
    }

    /// Start at a random point, so buses on the same route spread out.
    pub fn random(points: Arc<[Coordinate]>) -> Self {
        let start = if points.is_empty() {
            0
        } else {
            rand::rng().random_range(0..points.len())
        };
        Self::starting_at(points, start)
    }
}

impl Iterator for CoordinateCycle {
    type Item = Coordinate;

    fn next(&mut self) -> Option<Self::Item> {
        let point = *self.points.get(self.next)?;
        let following = self.next.saturating_add(1);
        self.next = if following < self.points.len() { following } else { 0 };
        Some(point)
    }
}
