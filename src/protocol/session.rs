use crate::audio::AudioChunk;
use crate::error::{ConnectError, RecvError, SendError};
use crate::protocol::events::{ClientEvent, ServerEvent, SessionConfig};
use base64::Engine;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Lifecycle of one connection.
///
/// `Faulted` is terminal for the session object: reconnecting always
/// constructs a fresh `ProtocolSession`, so no handshake state survives
/// a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Disconnected = 0,
    Connecting = 1,
    Configured = 2,
    Streaming = 3,
    Closing = 4,
    Closed = 5,
    Faulted = 6,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ConnectionState::Disconnected,
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Configured,
            3 => ConnectionState::Streaming,
            4 => ConnectionState::Closing,
            5 => ConnectionState::Closed,
            _ => ConnectionState::Faulted,
        }
    }
}

/// One logical connection to the transcription service.
///
/// The websocket is split so the forwarding and receiving paths can run
/// concurrently: sends serialize on the sink half, receives on the
/// stream half, and neither blocks the other.
pub struct ProtocolSession {
    sender: Mutex<SplitSink<WsStream, Message>>,
    receiver: Mutex<SplitStream<WsStream>>,
    state: AtomicU8,
}

impl ProtocolSession {
    /// Open the transport and send the transcription-only handshake.
    pub async fn connect(endpoint: &str, config: &SessionConfig) -> Result<Self, ConnectError> {
        let url = format!("{}?model={}&intent=transcription", endpoint, config.model);
        info!("Connecting to transcription service: {}", url);

        let (ws, _response) = connect_async(&url).await?;
        let (sender, receiver) = ws.split();

        let session = Self {
            sender: Mutex::new(sender),
            receiver: Mutex::new(receiver),
            state: AtomicU8::new(ConnectionState::Connecting as u8),
        };

        session
            .send_event(&config.session_update())
            .await
            .map_err(|e| ConnectError::Handshake(e.to_string()))?;
        session.set_state(ConnectionState::Configured);

        info!("Session configured for transcription");
        Ok(session)
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Encode and transmit one audio chunk as an append event.
    pub async fn send_audio(&self, chunk: &AudioChunk) -> Result<(), SendError> {
        if !matches!(
            self.state(),
            ConnectionState::Configured | ConnectionState::Streaming
        ) {
            return Err(SendError::Closed);
        }

        let audio = base64::engine::general_purpose::STANDARD.encode(&chunk.pcm);
        match self.send_event(&ClientEvent::AppendAudio { audio }).await {
            Ok(()) => {
                self.mark_streaming();
                Ok(())
            }
            Err(err) => {
                if matches!(err, SendError::Transport(_)) {
                    self.set_state(ConnectionState::Faulted);
                }
                Err(err)
            }
        }
    }

    /// Block until the next decodable inbound event.
    ///
    /// Ping/pong/binary frames are skipped. A malformed text payload is
    /// an error but leaves the connection open; transport close or
    /// failure faults the session.
    pub async fn receive_event(&self) -> Result<ServerEvent, RecvError> {
        let mut receiver = self.receiver.lock().await;

        loop {
            match receiver.next().await {
                Some(Ok(Message::Text(text))) => {
                    return match serde_json::from_str::<ServerEvent>(&text) {
                        Ok(event) => {
                            self.mark_streaming();
                            Ok(event)
                        }
                        Err(err) => Err(RecvError::Malformed(err)),
                    };
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!("Server sent close frame: {:?}", frame);
                    self.set_state(ConnectionState::Faulted);
                    return Err(RecvError::Closed);
                }
                Some(Ok(_)) => continue,
                Some(Err(err)) => {
                    warn!("Websocket receive failed: {}", err);
                    self.set_state(ConnectionState::Faulted);
                    return Err(RecvError::Closed);
                }
                None => {
                    self.set_state(ConnectionState::Faulted);
                    return Err(RecvError::Closed);
                }
            }
        }
    }

    /// Best-effort graceful shutdown. Always safe to call.
    pub async fn close(&self) {
        self.set_state(ConnectionState::Closing);

        let mut sender = self.sender.lock().await;
        if let Err(err) = sender.send(Message::Close(None)).await {
            debug!("Close frame not sent: {}", err);
        }
        if let Err(err) = sender.close().await {
            debug!("Websocket close failed: {}", err);
        }

        self.set_state(ConnectionState::Closed);
    }

    async fn send_event(&self, event: &ClientEvent) -> Result<(), SendError> {
        let payload = serde_json::to_string(event)?;
        let mut sender = self.sender.lock().await;
        sender.send(Message::Text(payload)).await?;
        Ok(())
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    /// First successful exchange moves `Configured` to `Streaming`.
    fn mark_streaming(&self) {
        let _ = self.state.compare_exchange(
            ConnectionState::Configured as u8,
            ConnectionState::Streaming as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }
}
