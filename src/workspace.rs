use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Lifecycle record for one meeting, persisted as `metadata.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingMetadata {
    pub meeting_id: String,
    pub url: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub participant_name: String,
    pub status: MeetingStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingStatus {
    Active,
    Ended,
}

/// Whether transcript/mentions files are cleared when a workspace opens.
///
/// `Truncate` starts every run with empty files; `Preserve` appends
/// across runs, which is what you want when re-joining the same meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptMode {
    #[default]
    Truncate,
    Preserve,
}

/// On-disk artifacts for one meeting: the meeting directory, the
/// transcript and mentions logs, the metadata record, and the
/// directory-level `current` pointer.
///
/// Filesystem only; the network layer never reads any of this back.
pub struct MeetingWorkspace {
    meetings_dir: PathBuf,
    meeting_dir: PathBuf,
    transcript_path: PathBuf,
    mentions_path: PathBuf,
    metadata_path: PathBuf,
    closed: bool,
}

impl MeetingWorkspace {
    /// Create the meeting directory tree and mark the meeting active.
    ///
    /// Existing transcript/mentions files are truncated or preserved per
    /// `mode`. The `current` pointer is replaced so this workspace is the
    /// only "current" meeting.
    pub fn open(
        meetings_dir: &Path,
        meeting_id: &str,
        url: &str,
        participant_name: &str,
        mode: TranscriptMode,
    ) -> Result<Self> {
        let meeting_dir = meetings_dir.join(meeting_id);
        fs::create_dir_all(&meeting_dir)
            .with_context(|| format!("Failed to create meeting directory {:?}", meeting_dir))?;

        let transcript_path = meeting_dir.join("transcript.txt");
        let mentions_path = meeting_dir.join("mentions.txt");
        let metadata_path = meeting_dir.join("metadata.json");

        match mode {
            TranscriptMode::Truncate => {
                File::create(&transcript_path).context("Failed to initialize transcript file")?;
                File::create(&mentions_path).context("Failed to initialize mentions file")?;
            }
            TranscriptMode::Preserve => {
                touch(&transcript_path).context("Failed to initialize transcript file")?;
                touch(&mentions_path).context("Failed to initialize mentions file")?;
            }
        }

        let metadata = MeetingMetadata {
            meeting_id: meeting_id.to_string(),
            url: url.to_string(),
            started_at: Utc::now(),
            ended_at: None,
            participant_name: participant_name.to_string(),
            status: MeetingStatus::Active,
        };
        write_metadata(&metadata_path, &metadata)?;

        replace_current_pointer(meetings_dir, &meeting_dir)?;

        info!("Meeting directory: {}", meeting_dir.display());

        Ok(Self {
            meetings_dir: meetings_dir.to_path_buf(),
            meeting_dir,
            transcript_path,
            mentions_path,
            metadata_path,
            closed: false,
        })
    }

    pub fn meeting_dir(&self) -> &Path {
        &self.meeting_dir
    }

    pub fn transcript_path(&self) -> &Path {
        &self.transcript_path
    }

    pub fn mentions_path(&self) -> &Path {
        &self.mentions_path
    }

    /// Read the metadata record back from disk.
    pub fn metadata(&self) -> Result<MeetingMetadata> {
        let raw = fs::read_to_string(&self.metadata_path)
            .with_context(|| format!("Failed to read {:?}", self.metadata_path))?;
        serde_json::from_str(&raw).context("Failed to parse meeting metadata")
    }

    /// Durable, ordered append of one transcript line.
    pub fn append_transcript(&self, line: &str) -> Result<()> {
        append_line(&self.transcript_path, line)
    }

    /// Durable, ordered append of one mention record line.
    pub fn append_mention(&self, line: &str) -> Result<()> {
        append_line(&self.mentions_path, line)
    }

    /// Mark the meeting ended and drop the `current` pointer.
    ///
    /// Idempotent: only the first call mutates the metadata.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        let mut metadata = self.metadata()?;
        if metadata.status != MeetingStatus::Ended {
            metadata.status = MeetingStatus::Ended;
            metadata.ended_at = Some(Utc::now());
            write_metadata(&self.metadata_path, &metadata)?;
        }

        let pointer = self.meetings_dir.join("current");
        if fs::symlink_metadata(&pointer).is_ok() {
            if let Err(e) = fs::remove_file(&pointer) {
                warn!("Failed to remove current-meeting pointer: {}", e);
            }
        }

        self.closed = true;
        info!("Meeting {} ended", metadata.meeting_id);
        Ok(())
    }
}

fn touch(path: &Path) -> Result<()> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {:?}", path))?;
    Ok(())
}

fn append_line(path: &Path, line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {:?}", path))?;
    file.write_all(line.as_bytes())
        .and_then(|_| file.write_all(b"\n"))
        .and_then(|_| file.flush())
        .with_context(|| format!("Failed to append to {:?}", path))?;
    Ok(())
}

fn write_metadata(path: &Path, metadata: &MeetingMetadata) -> Result<()> {
    let payload =
        serde_json::to_string_pretty(metadata).context("Failed to serialize meeting metadata")?;
    fs::write(path, payload).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}

/// Remove-then-recreate the `current` pointer so exactly one workspace is
/// "current" at a time.
fn replace_current_pointer(meetings_dir: &Path, meeting_dir: &Path) -> Result<()> {
    let pointer = meetings_dir.join("current");

    if fs::symlink_metadata(&pointer).is_ok() {
        fs::remove_file(&pointer).context("Failed to remove stale current-meeting pointer")?;
    }

    #[cfg(unix)]
    std::os::unix::fs::symlink(meeting_dir, &pointer)
        .context("Failed to link current-meeting pointer")?;

    #[cfg(not(unix))]
    fs::write(&pointer, meeting_dir.display().to_string())
        .context("Failed to write current-meeting pointer")?;

    Ok(())
}

/// Derive a meeting id from a meeting URL or a raw id.
///
/// A `meet.google.com/xxx-yyyy-zzz` URL yields the `xxx-yyyy-zzz` code;
/// any other URL falls back to its last path segment; a non-URL argument
/// is taken as the id itself. Generates a `meeting-<uuid>` id when
/// nothing usable remains.
pub fn extract_meeting_id(input: &str) -> String {
    let lower = input.to_lowercase();

    if let Some(rest) = lower.split("meet.google.com/").nth(1) {
        let code = rest
            .split(|c: char| c == '/' || c == '?' || c == '#')
            .next()
            .unwrap_or("");
        if is_meet_code(code) {
            return code.to_string();
        }
    }

    if input.contains("://") {
        if let Some(segment) = input
            .trim_end_matches('/')
            .rsplit('/')
            .find(|s| !s.is_empty() && !s.contains(':'))
        {
            return segment.to_string();
        }
        return generated_id();
    }

    if input.is_empty() {
        generated_id()
    } else {
        input.to_string()
    }
}

fn is_meet_code(code: &str) -> bool {
    let parts: Vec<&str> = code.split('-').collect();
    parts.len() == 3
        && parts[0].len() == 3
        && parts[1].len() == 4
        && parts[2].len() == 3
        && parts
            .iter()
            .all(|p| p.chars().all(|c| c.is_ascii_lowercase()))
}

fn generated_id() -> String {
    format!("meeting-{}", uuid::Uuid::new_v4())
}
