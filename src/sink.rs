use crate::mentions::MentionDetector;
use crate::workspace::MeetingWorkspace;
use anyhow::Result;
use chrono::Local;
use tracing::info;

/// Persists finalized transcript text and derives mention records from it.
///
/// Persistence and mention detection are atomic from the caller's point
/// of view: classification only runs after the transcript line has been
/// durably appended.
pub struct TranscriptSink {
    workspace: MeetingWorkspace,
    detector: MentionDetector,
}

impl TranscriptSink {
    pub fn new(workspace: MeetingWorkspace, detector: MentionDetector) -> Self {
        Self {
            workspace,
            detector,
        }
    }

    /// Append one finalized utterance, then flag it if it names a keyword.
    ///
    /// Errors here are persistence failures and are fatal to the client.
    pub fn write(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        let timestamp = Local::now().format("%H:%M:%S").to_string();
        self.workspace
            .append_transcript(&format!("[{timestamp}] {text}"))?;
        info!("[{}] {}", timestamp, text);

        if let Some(found) = self.detector.classify(text) {
            self.workspace
                .append_mention(&format!("[{timestamp}] {}: {text}", found.kind.label()))?;
            info!("Mention detected ({}): {}", found.keyword, text);
        }

        Ok(())
    }

    /// Close the underlying workspace. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        self.workspace.close()
    }

    pub fn workspace(&self) -> &MeetingWorkspace {
        &self.workspace
    }
}
