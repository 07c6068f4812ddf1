use serde::{Deserialize, Serialize};

/// Static handshake parameters, sent once per connection.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub model: String,
    pub language: String,
    pub vad_threshold: f64,
    pub vad_silence_ms: u64,
}

impl SessionConfig {
    /// Build the `session.update` handshake event.
    ///
    /// Always text-only with `create_response: false` — these are
    /// transcription sessions, never generative ones.
    pub fn session_update(&self) -> ClientEvent {
        ClientEvent::SessionUpdate {
            session: SessionUpdate {
                modalities: vec!["text".to_string()],
                input_audio_transcription: TranscriptionParams {
                    model: self.model.clone(),
                    language: self.language.clone(),
                },
                turn_detection: TurnDetection {
                    kind: "server_vad".to_string(),
                    threshold: self.vad_threshold,
                    silence_duration_ms: self.vad_silence_ms,
                    create_response: false,
                },
            },
        }
    }
}

/// Events sent to the transcription service.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "session.update")]
    SessionUpdate { session: SessionUpdate },

    /// One chunk of base64-encoded PCM audio.
    #[serde(rename = "input_audio_buffer.append")]
    AppendAudio { audio: String },
}

#[derive(Debug, Serialize)]
pub struct SessionUpdate {
    pub modalities: Vec<String>,
    pub input_audio_transcription: TranscriptionParams,
    pub turn_detection: TurnDetection,
}

#[derive(Debug, Serialize)]
pub struct TranscriptionParams {
    pub model: String,
    pub language: String,
}

#[derive(Debug, Serialize)]
pub struct TurnDetection {
    #[serde(rename = "type")]
    pub kind: String,
    pub threshold: f64,
    pub silence_duration_ms: u64,
    pub create_response: bool,
}

/// Events received from the transcription service.
///
/// Unknown event types decode to `Unknown` so new server events never
/// break the receive loop.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "conversation.item.input_audio_transcription.completed")]
    TranscriptionCompleted { transcript: String },

    #[serde(rename = "input_audio_buffer.speech_started")]
    SpeechStarted,

    #[serde(rename = "input_audio_buffer.speech_stopped")]
    SpeechStopped,

    #[serde(rename = "error")]
    Error { error: serde_json::Value },

    #[serde(other)]
    Unknown,
}
