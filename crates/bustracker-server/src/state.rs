//! Shared state for both endpoints.
//!
//! [`Registry`] holds the latest position of every bus that has ever
//! reported. It is the only datum written by more than one task, so all
//! access goes through its async API; callers never see the map itself.

use std::collections::HashMap;
use std::time::Duration;

use bustracker_types::BusPosition;
use tokio::sync::RwLock;

/// Latest known position per bus, keyed by `busId`.
///
/// Writes replace the whole entry (last write wins). Entries are never
/// evicted: a bus that stops reporting stays at its last position for the
/// lifetime of the process.
#[derive(Debug, Default)]
pub struct Registry {
    positions: RwLock<HashMap<String, BusPosition>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a position, returning the one it replaced.
    pub async fn put(&self, position: BusPosition) -> Option<BusPosition> {
        let mut positions = self.positions.write().await;
        positions.insert(position.bus_id.clone(), position)
    }

    /// Clone every position matching `predicate`.
    ///
    /// The whole scan runs under one read guard, so no entry is observed
    /// half-written. Order is unspecified.
    pub async fn snapshot<F>(&self, predicate: F) -> Vec<BusPosition>
    where
        F: Fn(&BusPosition) -> bool,
    {
        let positions = self.positions.read().await;
        positions
            .values()
            .filter(|position| predicate(position))
            .cloned()
            .collect()
    }

    /// Look up a single bus.
    pub async fn get(&self, bus_id: &str) -> Option<BusPosition> {
        self.positions.read().await.get(bus_id).cloned()
    }

    /// Number of buses known.
    pub async fn len(&self) -> usize {
        self.positions.read().await.len()
    }

    /// Whether no bus has reported yet.
    pub async fn is_empty(&self) -> bool {
        self.positions.read().await.is_empty()
    }
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected into both routers via
/// Axum's `State` extractor.
#[derive(Debug)]
pub struct AppState {
    /// Positions written by bus sessions and read by browser sessions.
    pub registry: Registry,
    /// How long a browser session waits for a viewport update each cycle.
    pub listen_timeout: Duration,
}

impl AppState {
    /// Create application state with an empty registry.
    pub fn new(listen_timeout: Duration) -> Self {
        Self {
            registry: Registry::new(),
            listen_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_snapshot_contains_position() {
        let registry = Registry::new();
        let bus = BusPosition::new("156-0", 55.75, 37.6, "156");
        assert_eq!(registry.put(bus.clone()).await, None);

        let all = registry.snapshot(|_| true).await;
        assert_eq!(all, vec![bus]);
    }

    #[tokio::test]
    async fn same_id_is_last_write_wins() {
        let registry = Registry::new();
        let first = BusPosition::new("156-0", 55.75, 37.6, "156");
        let second = BusPosition::new("156-0", 55.76, 37.61, "156");

        registry.put(first.clone()).await;
        let replaced = registry.put(second.clone()).await;

        assert_eq!(replaced, Some(first));
        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.get("156-0").await, Some(second));
    }

    #[tokio::test]
    async fn snapshot_applies_predicate() {
        let registry = Registry::new();
        registry.put(BusPosition::new("a", 10.0, 10.0, "1")).await;
        registry.put(BusPosition::new("b", 20.0, 20.0, "1")).await;
        registry.put(BusPosition::new("c", 30.0, 30.0, "2")).await;

        let mut ids: Vec<String> = registry
            .snapshot(|bus| bus.lat >= 20.0)
            .await
            .into_iter()
            .map(|bus| bus.bus_id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["b".to_owned(), "c".to_owned()]);
    }

    #[tokio::test]
    async fn empty_registry() {
        let registry = Registry::new();
        assert!(registry.is_empty().await);
        assert!(registry.snapshot(|_| true).await.is_empty());
        assert_eq!(registry.get("missing").await, None);
    }

    #[tokio::test]
    async fn concurrent_writers_for_distinct_ids() {
        let state = std::sync::Arc::new(AppState::new(Duration::from_millis(10)));
        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..32_u32 {
            let state = std::sync::Arc::clone(&state);
            tasks.spawn(async move {
                let position = BusPosition::new(format!("bus-{i}"), f64::from(i), 0.0, "r");
                state.registry.put(position).await;
            });
        }
        while tasks.join_next().await.is_some() {}
        assert_eq!(state.registry.len().await, 32);
    }
}
