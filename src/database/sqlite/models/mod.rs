#[cfg(test)]
mod tests;

use anyhow::{Result, bail};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

/// One row of the `chunks` table, embedding still in its raw blob form.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ChunkRow {
    pub id: i64,
    pub filename: String,
    pub content: String,
    pub chunk_index: i64,
    pub embedding: Vec<u8>,
    pub metadata: String,
    pub created_at: NaiveDateTime,
}

/// A chunk with its embedding and metadata decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredChunk {
    pub id: i64,
    pub filename: String,
    pub content: String,
    pub chunk_index: i64,
    pub embedding: Vec<f32>,
    pub metadata: Map<String, Value>,
    pub created_at: NaiveDateTime,
}

/// Insert payload for a chunk; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewChunk {
    pub filename: String,
    pub content: String,
    pub chunk_index: i64,
    pub embedding: Vec<f32>,
    pub metadata: Map<String, Value>,
}

impl ChunkRow {
    /// Decode the embedding blob and metadata JSON.
    #[inline]
    pub fn into_stored(self) -> Result<StoredChunk> {
        let embedding = decode_embedding(&self.embedding)?;
        let metadata = decode_metadata(&self.metadata)?;

        Ok(StoredChunk {
            id: self.id,
            filename: self.filename,
            content: self.content,
            chunk_index: self.chunk_index,
            embedding,
            metadata,
            created_at: self.created_at,
        })
    }
}

/// Serialize an embedding as concatenated little-endian f32 bytes.
///
/// No length prefix: the element type and count are implicit, so decoding
/// only needs the blob itself.
#[inline]
pub fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Reverse of [`encode_embedding`]; exact within f32 representation.
#[inline]
pub fn decode_embedding(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        bail!(
            "Embedding blob length {} is not a multiple of 4 bytes",
            bytes.len()
        );
    }

    let mut vector = Vec::with_capacity(bytes.len() / 4);
    for quad in bytes.chunks_exact(4) {
        let array: [u8; 4] = quad.try_into()?;
        vector.push(f32::from_le_bytes(array));
    }
    Ok(vector)
}

/// Serialize metadata as a JSON object string.
#[inline]
pub fn encode_metadata(metadata: &Map<String, Value>) -> Result<String> {
    Ok(serde_json::to_string(metadata)?)
}

/// Decode a metadata column value; empty or null decodes to an empty map.
#[inline]
pub fn decode_metadata(raw: &str) -> Result<Map<String, Value>> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => bail!("Metadata is not a JSON object: {other}"),
    }
}
