//! Error types for the bus simulator.

/// Errors that can occur while loading routes or streaming positions.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A route directory or file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path being read.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A route file is not a valid route document.
    #[error("invalid route file {path}: {source}")]
    RouteFormat {
        /// The offending file.
        path: String,
        /// The underlying parse error.
        source: serde_json::Error,
    },

    /// Connecting to or sending over the `WebSocket` failed.
    #[error("websocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    /// A bus report could not be serialized.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for SimError {
    fn from(source: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(source))
    }
}
