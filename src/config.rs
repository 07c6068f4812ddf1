use crate::workspace::TranscriptMode;
use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

/// Runtime configuration, constructed once at startup and never mutated.
///
/// Values come from an optional user config file (default
/// `~/.meeting-recorder`) overlaid with environment variables
/// (`SAMPLE_RATE`, `SERVICE_URL`, `TRANSCRIPTION_MODEL`, ...).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input PCM sample rate in Hz
    pub sample_rate: u32,

    /// Seconds of audio per forwarded chunk
    pub chunk_seconds: f64,

    /// Realtime transcription service endpoint
    pub service_url: String,

    /// Transcription model identifier
    pub transcription_model: String,

    /// Transcription language
    pub language: String,

    /// Root directory for per-meeting workspaces
    pub meetings_dir: PathBuf,

    /// Name recorded in meeting metadata
    pub participant_name: String,

    /// Keywords flagged in the mentions log
    pub mention_keywords: Vec<String>,

    /// Truncate or preserve transcript files on (re)start
    pub transcript_mode: TranscriptMode,

    pub vad: VadConfig,
    pub reconnect: ReconnectConfig,
}

/// Server-side voice activity detection parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VadConfig {
    pub threshold: f64,
    pub silence_duration_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    pub initial_delay_secs: u64,
    pub max_delay_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_rate: 24000,
            chunk_seconds: 1.0,
            service_url: "ws://localhost:8000/v1/realtime".to_string(),
            transcription_model: "Systran/faster-distil-whisper-small.en".to_string(),
            language: "en".to_string(),
            meetings_dir: PathBuf::from("/tmp/meetings"),
            participant_name: "Claude Assistant".to_string(),
            mention_keywords: vec![
                "claude".to_string(),
                "assistant".to_string(),
                "ai".to_string(),
            ],
            transcript_mode: TranscriptMode::Truncate,
            vad: VadConfig::default(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            silence_duration_ms: 500,
        }
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_secs: 1,
            max_delay_secs: 30,
        }
    }
}

impl Config {
    /// Load from `path` (or the default user config file) with
    /// environment variables taking precedence. Missing file and missing
    /// keys fall back to defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        let file = path
            .map(str::to_string)
            .or_else(default_config_path);
        if let Some(file) = file {
            builder = builder.add_source(config::File::with_name(&file).required(false));
        }

        let settings = builder
            .add_source(config::Environment::default().try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Bytes per forwarded audio chunk (16-bit mono).
    pub fn chunk_bytes(&self) -> usize {
        (self.sample_rate as f64 * self.chunk_seconds) as usize * 2
    }
}

fn default_config_path() -> Option<String> {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".meeting-recorder").display().to_string())
}
