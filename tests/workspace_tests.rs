// Integration tests for the meeting workspace lifecycle.
//
// These verify the on-disk artifacts: directory layout, metadata
// transitions, append ordering, and the current-meeting pointer.

use anyhow::Result;
use meeting_transcriber::{MeetingStatus, MeetingWorkspace, TranscriptMode};
use std::fs;
use tempfile::TempDir;

#[test]
fn open_creates_directory_files_and_current_pointer() -> Result<()> {
    let temp = TempDir::new()?;
    let workspace = MeetingWorkspace::open(
        temp.path(),
        "abc-defg-hij",
        "https://meet.google.com/abc-defg-hij",
        "Claude Assistant",
        TranscriptMode::Truncate,
    )?;

    assert!(workspace.meeting_dir().is_dir());
    assert!(workspace.transcript_path().exists());
    assert!(workspace.mentions_path().exists());

    let metadata = workspace.metadata()?;
    assert_eq!(metadata.meeting_id, "abc-defg-hij");
    assert_eq!(metadata.url, "https://meet.google.com/abc-defg-hij");
    assert_eq!(metadata.participant_name, "Claude Assistant");
    assert_eq!(metadata.status, MeetingStatus::Active);
    assert!(metadata.ended_at.is_none());

    let pointer = temp.path().join("current");
    assert!(fs::symlink_metadata(&pointer).is_ok());
    #[cfg(unix)]
    assert_eq!(fs::read_link(&pointer)?, workspace.meeting_dir());

    Ok(())
}

#[test]
fn appends_preserve_order() -> Result<()> {
    let temp = TempDir::new()?;
    let workspace = MeetingWorkspace::open(
        temp.path(),
        "order-test",
        "https://meet.google.com/order-test",
        "Claude Assistant",
        TranscriptMode::Truncate,
    )?;

    workspace.append_transcript("[10:00:00] first")?;
    workspace.append_transcript("[10:00:01] second")?;
    workspace.append_mention("[10:00:01] MENTION: second")?;

    let transcript = fs::read_to_string(workspace.transcript_path())?;
    assert_eq!(transcript, "[10:00:00] first\n[10:00:01] second\n");

    let mentions = fs::read_to_string(workspace.mentions_path())?;
    assert_eq!(mentions, "[10:00:01] MENTION: second\n");

    Ok(())
}

#[test]
fn close_marks_ended_and_is_idempotent() -> Result<()> {
    let temp = TempDir::new()?;
    let mut workspace = MeetingWorkspace::open(
        temp.path(),
        "close-test",
        "https://meet.google.com/close-test",
        "Claude Assistant",
        TranscriptMode::Truncate,
    )?;

    workspace.close()?;

    let first = workspace.metadata()?;
    assert_eq!(first.status, MeetingStatus::Ended);
    let ended_at = first.ended_at.expect("ended_at set on close");
    assert!(ended_at >= first.started_at);
    assert!(
        fs::symlink_metadata(temp.path().join("current")).is_err(),
        "current pointer removed on close"
    );

    // Second close leaves the record untouched
    workspace.close()?;
    let second = workspace.metadata()?;
    assert_eq!(second.ended_at, first.ended_at);
    assert_eq!(second.status, MeetingStatus::Ended);

    Ok(())
}

#[test]
fn truncate_mode_clears_files_from_a_previous_run() -> Result<()> {
    let temp = TempDir::new()?;

    {
        let workspace = MeetingWorkspace::open(
            temp.path(),
            "rerun-test",
            "https://meet.google.com/rerun-test",
            "Claude Assistant",
            TranscriptMode::Truncate,
        )?;
        workspace.append_transcript("[09:00:00] stale line")?;
    }

    let workspace = MeetingWorkspace::open(
        temp.path(),
        "rerun-test",
        "https://meet.google.com/rerun-test",
        "Claude Assistant",
        TranscriptMode::Truncate,
    )?;

    assert_eq!(fs::read_to_string(workspace.transcript_path())?, "");
    Ok(())
}

#[test]
fn preserve_mode_keeps_files_from_a_previous_run() -> Result<()> {
    let temp = TempDir::new()?;

    {
        let workspace = MeetingWorkspace::open(
            temp.path(),
            "rejoin-test",
            "https://meet.google.com/rejoin-test",
            "Claude Assistant",
            TranscriptMode::Truncate,
        )?;
        workspace.append_transcript("[09:00:00] earlier line")?;
    }

    let workspace = MeetingWorkspace::open(
        temp.path(),
        "rejoin-test",
        "https://meet.google.com/rejoin-test",
        "Claude Assistant",
        TranscriptMode::Preserve,
    )?;
    workspace.append_transcript("[09:30:00] later line")?;

    let transcript = fs::read_to_string(workspace.transcript_path())?;
    assert_eq!(transcript, "[09:00:00] earlier line\n[09:30:00] later line\n");
    Ok(())
}

#[test]
fn reopening_repoints_current_to_the_new_meeting() -> Result<()> {
    let temp = TempDir::new()?;

    let _first = MeetingWorkspace::open(
        temp.path(),
        "meeting-a",
        "https://meet.google.com/meeting-a",
        "Claude Assistant",
        TranscriptMode::Truncate,
    )?;
    let second = MeetingWorkspace::open(
        temp.path(),
        "meeting-b",
        "https://meet.google.com/meeting-b",
        "Claude Assistant",
        TranscriptMode::Truncate,
    )?;

    let pointer = temp.path().join("current");
    assert!(fs::symlink_metadata(&pointer).is_ok());
    #[cfg(unix)]
    assert_eq!(fs::read_link(&pointer)?, second.meeting_dir());

    Ok(())
}
