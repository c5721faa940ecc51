//! Configuration types for the bus simulator.
//!
//! All configuration is loaded from environment variables. The simulator
//! needs to know where the server's ingestion endpoint is, where the route
//! files live, how many buses to run, and how to reconnect.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::SimError;
use crate::retry::RetryPolicy;

/// Complete simulator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Ingestion endpoint URL (e.g. `ws://127.0.0.1:8080`).
    pub server_url: String,
    /// Directory holding `*.json` route files.
    pub routes_dir: PathBuf,
    /// Buses started per route.
    pub buses_per_route: usize,
    /// Cap on the number of route files loaded.
    pub routes_limit: Option<usize>,
    /// Pause between two reports from the same bus.
    pub refresh_timeout: Duration,
    /// Reconnect policy for each bus.
    pub retry: RetryPolicy,
}

impl SimConfig {
    /// Load configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `SERVER_URL` -- ingestion endpoint (default `ws://127.0.0.1:8080`)
    /// - `ROUTES_DIR` -- route directory (default `routes`)
    /// - `BUSES_PER_ROUTE` -- buses per route (default 5)
    /// - `ROUTES_LIMIT` -- maximum routes loaded (default unlimited)
    /// - `REFRESH_TIMEOUT_MS` -- delay between reports (default 100)
    /// - `RECONNECT_MAX_ATTEMPTS` -- attempts per bus (default unlimited)
    /// - `RECONNECT_BACKOFF_MS` -- delay between attempts (default 1000)
    pub fn from_env() -> Result<Self, SimError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SimError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_url = lookup("SERVER_URL").unwrap_or_else(|| "ws://127.0.0.1:8080".to_owned());
        let routes_dir = PathBuf::from(lookup("ROUTES_DIR").unwrap_or_else(|| "routes".to_owned()));

        let buses_per_route: usize = parse_or(&lookup, "BUSES_PER_ROUTE", 5)?;
        let routes_limit: Option<usize> = parse_optional(&lookup, "ROUTES_LIMIT")?;
        let refresh_timeout_ms: u64 = parse_or(&lookup, "REFRESH_TIMEOUT_MS", 100)?;
        let max_attempts: Option<u32> = parse_optional(&lookup, "RECONNECT_MAX_ATTEMPTS")?;
        let backoff_ms: u64 = parse_or(&lookup, "RECONNECT_BACKOFF_MS", 1000)?;

        if max_attempts == Some(0) {
            return Err(SimError::Config(
                "RECONNECT_MAX_ATTEMPTS must be at least 1".to_owned(),
            ));
        }

        Ok(Self {
            server_url,
            routes_dir,
            buses_per_route,
            routes_limit,
            refresh_timeout: Duration::from_millis(refresh_timeout_ms),
            retry: RetryPolicy {
                max_attempts,
                backoff: Duration::from_millis(backoff_ms),
            },
        })
    }
}

fn parse_optional<F, T>(lookup: &F, name: &str) -> Result<Option<T>, SimError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(name)
        .map(|raw| {
            raw.parse()
                .map_err(|e| SimError::Config(format!("invalid {name}: {e}")))
        })
        .transpose()
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, SimError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_optional(lookup, name)?.unwrap_or(default))
}
