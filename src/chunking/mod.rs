
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHUNK_SIZE: usize = 512;
pub const DEFAULT_OVERLAP: usize = 50;

/// Configuration for splitting document text into overlapping word windows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Window size in whitespace-delimited words
    pub chunk_size: usize,
    /// Number of words shared between adjacent windows
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl ChunkingConfig {
    /// Window advance between adjacent chunks, in words.
    ///
    /// Clamped to at least 1 so that a misconfigured `overlap >= chunk_size`
    /// never produces a non-advancing window.
    #[inline]
    pub fn stride(&self) -> usize {
        self.chunk_size.saturating_sub(self.overlap).max(1)
    }
}

/// Split `text` into overlapping word windows.
///
/// Words are whitespace-delimited; each window holds up to `chunk_size` words
/// and the next window starts `stride()` words later. Windows are re-joined
/// with single spaces, so runs of whitespace in the input collapse. Windows
/// that end up empty are discarded. Deterministic, order-preserving, no
/// sentence or paragraph awareness.
#[inline]
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() || config.chunk_size == 0 {
        return Vec::new();
    }

    let stride = config.stride();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < words.len() {
        let end = (start + config.chunk_size).min(words.len());
        let chunk = words[start..end].join(" ");
        if !chunk.trim().is_empty() {
            chunks.push(chunk);
        }
        start += stride;
    }

    chunks
}
