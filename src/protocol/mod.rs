//! Wire protocol for the realtime transcription service.
//!
//! One `ProtocolSession` owns one websocket connection: it sends the
//! transcription-only handshake, forwards base64 PCM append events, and
//! decodes inbound server events. A faulted session is terminal; the
//! reconnect supervisor builds a fresh one.

pub mod events;
pub mod session;

pub use events::{ClientEvent, ServerEvent, SessionConfig};
pub use session::{ConnectionState, ProtocolSession};
