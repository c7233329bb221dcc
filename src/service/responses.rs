//! Serializable outcomes of the retrieval service operations. These are the
//! payloads the MCP tools and the CLI render, so every shape carries a
//! human-readable `message` where the operation has one.

use serde::{Deserialize, Serialize};

/// One search hit with its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: i64,
    pub filename: String,
    pub content: String,
    pub chunk_index: i64,
    pub similarity: f32,
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub created_at: String,
}

/// One stored chunk without a similarity score, as returned by direct lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkDetail {
    pub id: i64,
    pub filename: String,
    pub content: String,
    pub chunk_index: i64,
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedReport {
    pub filename: String,
    pub chunks_added: usize,
    pub total_characters: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    pub results: Vec<SearchHit>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileBreakdown {
    pub filename: String,
    pub chunk_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub total_chunks: i64,
    pub unique_files: i64,
    pub embedding_model: String,
    pub database_path: String,
    pub files: Vec<FileBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteReport {
    pub filename: String,
    pub chunks_deleted: u64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentListing {
    pub total_documents: usize,
    pub files: Vec<FileBreakdown>,
    pub message: String,
}

/// Answer assembled from retrieved context. The answer text is a formatted
/// digest of the top hits; wiring in a language model is a later concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
    pub context_chunks: Vec<SearchHit>,
    pub sources: Vec<String>,
    pub confidence: f32,
}
