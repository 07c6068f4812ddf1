//! Streaming orchestration.
//!
//! This module keeps one logical transcription stream alive:
//! - `ReconnectSupervisor` owns the current session slot and replaces
//!   faulted sessions with capped exponential backoff
//! - `StreamingClient` runs the audio-forwarding and transcript-receiving
//!   paths concurrently and owns shutdown

mod client;
mod supervisor;

pub use client::StreamingClient;
pub use supervisor::{BackoffPolicy, ReconnectSupervisor};
