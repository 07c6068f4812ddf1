use crate::audio::AudioSource;
use crate::error::RecvError;
use crate::protocol::{ServerEvent, SessionConfig};
use crate::sink::TranscriptSink;
use crate::stream::supervisor::{BackoffPolicy, ReconnectSupervisor};
use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

/// Top-level orchestrator for one streaming transcription run.
///
/// Two concurrent paths share the supervisor's current session: the
/// forwarding path pushes audio chunks out, the receiving path turns
/// inbound transcription events into sink writes. A slow or blocked
/// audio read never stalls transcript reception and vice versa.
pub struct StreamingClient {
    supervisor: Arc<ReconnectSupervisor>,
    sink: Arc<Mutex<TranscriptSink>>,
    stop_tx: watch::Sender<bool>,
    stop_rx: watch::Receiver<bool>,
    shutdown: watch::Receiver<bool>,
}

impl StreamingClient {
    pub fn new(
        endpoint: String,
        session_config: SessionConfig,
        backoff: BackoffPolicy,
        sink: TranscriptSink,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        let supervisor = Arc::new(ReconnectSupervisor::new(
            endpoint,
            session_config,
            backoff,
            stop_rx.clone(),
        ));

        Self {
            supervisor,
            sink: Arc::new(Mutex::new(sink)),
            stop_tx,
            stop_rx,
            shutdown,
        }
    }

    /// Run until the audio source ends, shutdown is signalled, or
    /// persistence fails.
    ///
    /// Whatever the outcome, the active session is closed and the
    /// workspace is closed exactly once on the way out. Network trouble
    /// never ends the run; a persistence failure does, with an error.
    pub async fn run(self, audio: Box<dyn AudioSource>) -> Result<()> {
        // External shutdown fans into the internal stop signal the paths
        // and the supervisor observe at every suspension point.
        {
            let stop_tx = self.stop_tx.clone();
            let mut shutdown = self.shutdown.clone();
            tokio::spawn(async move {
                let _ = shutdown.changed().await;
                let _ = stop_tx.send(true);
            });
        }

        let mut forward_result = Ok(());
        let mut receive_result = Ok(());

        if self.supervisor.start().await.is_some() {
            let forward = {
                let supervisor = self.supervisor.clone();
                let stop_tx = self.stop_tx.clone();
                let stop_rx = self.stop_rx.clone();
                tokio::spawn(async move {
                    let result = forward_audio(supervisor, audio, stop_rx).await;
                    // Either path ending winds down the whole client
                    let _ = stop_tx.send(true);
                    result
                })
            };

            let receive = {
                let supervisor = self.supervisor.clone();
                let sink = self.sink.clone();
                let stop_tx = self.stop_tx.clone();
                let stop_rx = self.stop_rx.clone();
                tokio::spawn(async move {
                    let result = receive_transcripts(supervisor, sink, stop_rx).await;
                    let _ = stop_tx.send(true);
                    result
                })
            };

            forward_result = match forward.await {
                Ok(result) => result,
                Err(err) => Err(anyhow!("Audio forwarding task panicked: {err}")),
            };
            receive_result = match receive.await {
                Ok(result) => result,
                Err(err) => Err(anyhow!("Transcript receiving task panicked: {err}")),
            };
        }

        if let Some((_generation, session)) = self.supervisor.current().await {
            session.close().await;
        }
        let close_result = self.sink.lock().await.close();

        info!("Transcriber stopped");

        receive_result?;
        forward_result?;
        close_result?;
        Ok(())
    }
}

/// Forwarding path: audio source -> current session.
///
/// On a send failure this path does not reconnect; it drops chunks until
/// the supervisor has published a newer session, then resumes. Ends on
/// end-of-stream or stop signal.
async fn forward_audio(
    supervisor: Arc<ReconnectSupervisor>,
    mut audio: Box<dyn AudioSource>,
    mut stop: watch::Receiver<bool>,
) -> Result<()> {
    let mut failed_generation: Option<u64> = None;

    loop {
        if *stop.borrow() {
            break;
        }

        let chunk = tokio::select! {
            chunk = audio.next_chunk() => chunk?,
            _ = stop.changed() => continue,
        };

        let Some(chunk) = chunk else {
            info!("Audio stream ended");
            break;
        };

        match supervisor.current().await {
            Some((generation, session)) if Some(generation) != failed_generation => {
                if let Err(err) = session.send_audio(&chunk).await {
                    warn!("Websocket closed while sending: {}", err);
                    failed_generation = Some(generation);
                }
            }
            _ => {
                // Outage: drop the chunk, keep draining the source
                debug!("No live session; dropped {} byte chunk", chunk.len());
            }
        }
    }

    Ok(())
}

/// Receiving path: current session -> transcript sink.
///
/// Malformed payloads, service error events and unknown event types are
/// logged and skipped. A closed connection triggers the supervisor's
/// reconnect; a sink failure is fatal and propagates.
async fn receive_transcripts(
    supervisor: Arc<ReconnectSupervisor>,
    sink: Arc<Mutex<TranscriptSink>>,
    mut stop: watch::Receiver<bool>,
) -> Result<()> {
    let mut current = supervisor.current().await;

    loop {
        if *stop.borrow() {
            break;
        }

        let Some((generation, session)) = current.clone() else {
            break;
        };

        let event = tokio::select! {
            event = session.receive_event() => event,
            _ = stop.changed() => continue,
        };

        match event {
            Ok(ServerEvent::TranscriptionCompleted { transcript }) => {
                let text = transcript.trim();
                if !text.is_empty() {
                    sink.lock().await.write(text)?;
                }
            }
            Ok(ServerEvent::SpeechStarted) => debug!("Speech started"),
            Ok(ServerEvent::SpeechStopped) => debug!("Speech stopped"),
            Ok(ServerEvent::Error { error }) => warn!("Service error event: {}", error),
            Ok(ServerEvent::Unknown) => {}
            Err(RecvError::Malformed(err)) => {
                warn!("Ignoring malformed server event: {}", err);
            }
            Err(RecvError::Closed) => {
                warn!("Websocket connection closed");
                current = supervisor.reconnect(generation).await;
            }
        }
    }

    Ok(())
}
