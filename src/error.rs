use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Failure to establish or configure a connection.
///
/// Never fatal: the reconnect supervisor retries these with backoff.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("websocket connect failed: {0}")]
    Transport(#[from] tungstenite::Error),

    #[error("session handshake failed: {0}")]
    Handshake(String),
}

/// Failure to transmit an audio chunk on the current session.
#[derive(Debug, Error)]
pub enum SendError {
    /// The session is not in a sendable state. The chunk is dropped;
    /// sending resumes once the supervisor has replaced the session.
    #[error("connection is closed")]
    Closed,

    #[error("failed to encode client event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("websocket send failed: {0}")]
    Transport(#[from] tungstenite::Error),
}

/// Failure to receive the next server event.
#[derive(Debug, Error)]
pub enum RecvError {
    /// The transport closed. The session is faulted; the receiving path
    /// triggers a reconnect.
    #[error("connection closed")]
    Closed,

    /// Undecodable payload. The connection stays open; the event is
    /// logged and skipped.
    #[error("malformed server event: {0}")]
    Malformed(#[source] serde_json::Error),
}
