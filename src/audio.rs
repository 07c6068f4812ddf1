use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

/// A fixed-size buffer of raw 16-bit little-endian mono PCM audio.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    pub pcm: Vec<u8>,
}

impl AudioChunk {
    pub fn len(&self) -> usize {
        self.pcm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pcm.is_empty()
    }
}

/// Source of raw PCM audio chunks.
///
/// Production reads from stdin (piped from the capture process);
/// tests substitute an in-memory source.
#[async_trait]
pub trait AudioSource: Send {
    /// Read the next chunk. Returns `None` at end of stream.
    async fn next_chunk(&mut self) -> Result<Option<AudioChunk>>;
}

/// Reads fixed-size PCM chunks from any async byte stream.
///
/// Chunk size is `sample_rate * chunk_seconds * 2` bytes (16-bit mono).
/// A short final chunk is forwarded as-is before end of stream.
pub struct PcmChunkReader<R> {
    reader: R,
    chunk_bytes: usize,
}

impl<R: AsyncRead + Unpin + Send> PcmChunkReader<R> {
    pub fn new(reader: R, sample_rate: u32, chunk_seconds: f64) -> Self {
        let chunk_bytes = (sample_rate as f64 * chunk_seconds) as usize * 2;
        Self {
            reader,
            chunk_bytes,
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> AudioSource for PcmChunkReader<R> {
    async fn next_chunk(&mut self) -> Result<Option<AudioChunk>> {
        let mut buf = vec![0u8; self.chunk_bytes];
        let mut filled = 0;

        while filled < buf.len() {
            let n = self
                .reader
                .read(&mut buf[filled..])
                .await
                .context("Failed to read audio stream")?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        if filled == 0 {
            return Ok(None);
        }

        buf.truncate(filled);
        Ok(Some(AudioChunk { pcm: buf }))
    }
}

/// Audio source reading from the process's stdin.
pub fn stdin_source(sample_rate: u32, chunk_seconds: f64) -> PcmChunkReader<tokio::io::Stdin> {
    PcmChunkReader::new(tokio::io::stdin(), sample_rate, chunk_seconds)
}
