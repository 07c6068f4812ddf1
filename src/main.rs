use anyhow::Result;
use clap::Parser;
use meeting_transcriber::{
    audio, extract_meeting_id, BackoffPolicy, Config, MentionDetector, MeetingWorkspace,
    SessionConfig, StreamingClient, TranscriptMode, TranscriptSink,
};
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

/// Streams raw PCM audio from stdin to a realtime transcription service
/// and writes meeting artifacts (transcript, mentions, metadata).
#[derive(Parser, Debug)]
#[command(name = "meeting-transcriber", version)]
struct Args {
    /// Meeting id or meeting URL
    meeting: String,

    /// Meeting URL (defaults to a Google Meet URL built from the id)
    url: Option<String>,

    /// Keep existing transcript/mentions files instead of truncating
    #[arg(long)]
    preserve: bool,

    /// Path to the user config file
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cfg = Config::load(args.config.as_deref())?;

    let meeting_id = extract_meeting_id(&args.meeting);
    let url = args.url.clone().unwrap_or_else(|| {
        if args.meeting.contains("://") {
            args.meeting.clone()
        } else {
            format!("https://meet.google.com/{meeting_id}")
        }
    });

    info!("Meeting: {} ({})", meeting_id, url);

    let mode = if args.preserve {
        TranscriptMode::Preserve
    } else {
        cfg.transcript_mode
    };

    let workspace = MeetingWorkspace::open(
        &cfg.meetings_dir,
        &meeting_id,
        &url,
        &cfg.participant_name,
        mode,
    )?;
    let detector = MentionDetector::new(cfg.mention_keywords.clone());
    let sink = TranscriptSink::new(workspace, detector);

    let session_config = SessionConfig {
        model: cfg.transcription_model.clone(),
        language: cfg.language.clone(),
        vad_threshold: cfg.vad.threshold,
        vad_silence_ms: cfg.vad.silence_duration_ms,
    };
    let backoff = BackoffPolicy {
        initial: Duration::from_secs(cfg.reconnect.initial_delay_secs),
        max: Duration::from_secs(cfg.reconnect.max_delay_secs),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutting down");
        let _ = shutdown_tx.send(true);
    });

    let client = StreamingClient::new(
        cfg.service_url.clone(),
        session_config,
        backoff,
        sink,
        shutdown_rx,
    );
    let source = audio::stdin_source(cfg.sample_rate, cfg.chunk_seconds);

    client.run(Box::new(source)).await
}

/// Resolves on SIGINT or, on unix, SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
