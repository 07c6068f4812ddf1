pub mod audio;
pub mod config;
pub mod error;
pub mod mentions;
pub mod protocol;
pub mod sink;
pub mod stream;
pub mod workspace;

pub use audio::{AudioChunk, AudioSource, PcmChunkReader};
pub use config::Config;
pub use error::{ConnectError, RecvError, SendError};
pub use mentions::{MentionDetector, MentionKind, MentionMatch};
pub use protocol::{ConnectionState, ProtocolSession, ServerEvent, SessionConfig};
pub use sink::TranscriptSink;
pub use stream::{BackoffPolicy, ReconnectSupervisor, StreamingClient};
pub use workspace::{
    extract_meeting_id, MeetingMetadata, MeetingStatus, MeetingWorkspace, TranscriptMode,
};
