//! Configuration loading and typed config structures for the server.
//!
//! Configuration lives in `bustracker.yaml`. Every field has a default, so
//! a missing file or a partial file is fine. Environment variables override
//! the endpoint addresses, the listen timeout, and the log level.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level server configuration.
///
/// Mirrors the structure of `bustracker.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrackerConfig {
    /// Where bus producers connect.
    #[serde(default = "default_bus_endpoint")]
    pub bus_endpoint: EndpointConfig,

    /// Where browsers connect.
    #[serde(default = "default_browser_endpoint")]
    pub browser_endpoint: EndpointConfig,

    /// Browser session tuning.
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            bus_endpoint: default_bus_endpoint(),
            browser_endpoint: default_browser_endpoint(),
            browser: BrowserConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Load configuration from a YAML file, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if an override or value is unusable.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No overrides are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is unusable.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment:
    ///
    /// - `BUS_HOST`, `BUS_PORT` -- ingestion endpoint
    /// - `BROWSER_HOST`, `BROWSER_PORT` -- broadcast endpoint
    /// - `LISTEN_TIMEOUT_MS` -- browser listen window
    /// - `LOG_LEVEL` -- default log filter
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("BUS_HOST") {
            self.bus_endpoint.host = val;
        }
        if let Some(val) = lookup("BUS_PORT") {
            self.bus_endpoint.port = parse_var("BUS_PORT", &val)?;
        }
        if let Some(val) = lookup("BROWSER_HOST") {
            self.browser_endpoint.host = val;
        }
        if let Some(val) = lookup("BROWSER_PORT") {
            self.browser_endpoint.port = parse_var("BROWSER_PORT", &val)?;
        }
        if let Some(val) = lookup("LISTEN_TIMEOUT_MS") {
            self.browser.listen_timeout_ms = parse_var("LISTEN_TIMEOUT_MS", &val)?;
        }
        if let Some(val) = lookup("LOG_LEVEL") {
            self.logging.level = val;
        }
        self.validate()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.browser.listen_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "browser.listen_timeout_ms must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| ConfigError::Invalid(format!("invalid {name}: {e}")))
}

/// A host/port pair to listen on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EndpointConfig {
    /// Host or IP address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to bind. `0` picks a free port.
    pub port: u16,
}

/// Browser session tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BrowserConfig {
    /// Milliseconds each cycle waits for a viewport update before sending
    /// the next snapshot.
    #[serde(default = "default_listen_timeout_ms")]
    pub listen_timeout_ms: u64,
}

impl BrowserConfig {
    /// The listen window as a [`Duration`].
    pub const fn listen_timeout(&self) -> Duration {
        Duration::from_millis(self.listen_timeout_ms)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            listen_timeout_ms: default_listen_timeout_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins if set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

fn default_bus_endpoint() -> EndpointConfig {
    EndpointConfig {
        host: default_host(),
        port: 8080,
    }
}

fn default_browser_endpoint() -> EndpointConfig {
    EndpointConfig {
        host: default_host(),
        port: 8000,
    }
}

const fn default_listen_timeout_ms() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = TrackerConfig::default();
        assert_eq!(config.bus_endpoint.port, 8080);
        assert_eq!(config.browser_endpoint.port, 8000);
        assert_eq!(config.bus_endpoint.host, "127.0.0.1");
        assert_eq!(config.browser.listen_timeout(), Duration::from_millis(100));
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = TrackerConfig::parse("{}").ok();
        assert_eq!(config, Some(TrackerConfig::default()));
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
bus_endpoint:
  host: "0.0.0.0"
  port: 9080
browser_endpoint:
  port: 9000
browser:
  listen_timeout_ms: 250
logging:
  level: "debug"
  format: json
"#;
        let config = TrackerConfig::parse(yaml).ok();
        let config = config.unwrap_or_default();
        assert_eq!(config.bus_endpoint.host, "0.0.0.0");
        assert_eq!(config.bus_endpoint.port, 9080);
        assert_eq!(config.browser_endpoint.host, "127.0.0.1");
        assert_eq!(config.browser_endpoint.port, 9000);
        assert_eq!(config.browser.listen_timeout_ms, 250);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn zero_listen_timeout_is_rejected() {
        let result = TrackerConfig::parse("browser:\n  listen_timeout_ms: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        let result = TrackerConfig::parse("bus_endpoint: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn overrides_replace_values() {
        let mut config = TrackerConfig::default();
        let result = config.apply_overrides(lookup(&[
            ("BUS_HOST", "0.0.0.0"),
            ("BUS_PORT", "7080"),
            ("BROWSER_PORT", "7000"),
            ("LISTEN_TIMEOUT_MS", "50"),
            ("LOG_LEVEL", "warn"),
        ]));
        assert!(result.is_ok());
        assert_eq!(config.bus_endpoint.host, "0.0.0.0");
        assert_eq!(config.bus_endpoint.port, 7080);
        assert_eq!(config.browser_endpoint.port, 7000);
        assert_eq!(config.browser.listen_timeout_ms, 50);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn bad_port_override_is_rejected() {
        let mut config = TrackerConfig::default();
        let result = config.apply_overrides(lookup(&[("BROWSER_PORT", "eighty")]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn no_overrides_is_a_no_op() {
        let mut config = TrackerConfig::default();
        assert!(config.apply_overrides(lookup(&[])).is_ok());
        assert_eq!(config, TrackerConfig::default());
    }
}
