//! Message transport seen by the session handlers.
//!
//! Sessions are written against [`Connection`] rather than Axum's
//! `WebSocket` directly, so the same loop runs over a real socket in
//! production and over an in-memory channel in tests.

use std::future::Future;

use axum::extract::ws::{Message, WebSocket};

/// A transport failure other than a clean close.
#[derive(Debug, thiserror::Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

/// A long-lived, bidirectional message connection.
pub trait Connection: Send {
    /// Wait for the next inbound payload.
    ///
    /// Returns `Ok(None)` once the peer has closed the connection. Must be
    /// cancel-safe: the broadcast session drops this future when its listen
    /// window elapses.
    fn recv(&mut self) -> impl Future<Output = Result<Option<Vec<u8>>, TransportError>> + Send;

    /// Send one text message.
    fn send(&mut self, text: String) -> impl Future<Output = Result<(), TransportError>> + Send;
}

impl Connection for WebSocket {
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        loop {
            match Self::recv(self).await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.as_str().as_bytes().to_vec())),
                Some(Ok(Message::Binary(data))) => return Ok(Some(data.to_vec())),
                Some(Ok(Message::Ping(data))) => {
                    Self::send(self, Message::Pong(data))
                        .await
                        .map_err(|e| TransportError(format!("pong failed: {e}")))?;
                }
                Some(Ok(Message::Pong(_))) => {}
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Err(e)) => return Err(TransportError(e.to_string())),
            }
        }
    }

    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        Self::send(self, Message::Text(text.into()))
            .await
            .map_err(|e| TransportError(e.to_string()))
    }
}
