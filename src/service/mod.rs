
pub mod responses;

use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::chunking::chunk_text;
use crate::config::Config;
use crate::database::Database;
use crate::database::sqlite::models::{NewChunk, StoredChunk};
use crate::embeddings::Embedder;
use crate::extractor::extract_text;
use crate::search::{ScoredChunk, rank_chunks};
use crate::{RagError, Result};

pub use responses::{
    ChunkDetail, DatabaseStats, DeleteReport, DocumentListing, EmbedReport, FileBreakdown,
    QuestionAnswer, SearchHit, SearchReport,
};

/// How many of the top hits feed the answer digest and confidence score.
const ANSWER_CONTEXT_HITS: usize = 3;
/// Character budget per quoted snippet in an answer digest.
const ANSWER_SNIPPET_CHARS: usize = 200;

/// The retrieval engine: extraction, chunking, embedding, storage, and
/// similarity search behind one handle. Constructed once and shared via
/// `Arc`; it holds no mutable state of its own.
pub struct RagService {
    db: Database,
    embedder: Arc<dyn Embedder>,
    config: Config,
}

impl RagService {
    #[inline]
    pub fn new(db: Database, embedder: Arc<dyn Embedder>, config: Config) -> Self {
        Self {
            db,
            embedder,
            config,
        }
    }

    /// The embedding client is synchronous, so calls hop onto the blocking
    /// pool rather than stalling the async executor.
    async fn embed_text(&self, text: String) -> Result<Vec<f32>> {
        let embedder = Arc::clone(&self.embedder);
        tokio::task::spawn_blocking(move || embedder.embed(&text))
            .await
            .map_err(|e| RagError::Other(anyhow!("Embedding task panicked: {e}")))?
    }

    /// Extract `path`, chunk it, and store one embedded row per chunk.
    ///
    /// Chunks are written as their embeddings arrive, so a failure partway
    /// leaves the earlier chunks in place; re-embedding the same file
    /// appends rather than replaces. Callers wanting a clean slate delete
    /// the document first.
    pub async fn embed_document(
        &self,
        path: &Path,
        metadata: Map<String, Value>,
    ) -> Result<EmbedReport> {
        let text = extract_text(path)?;
        let total_characters = text.chars().count();

        let chunks = chunk_text(&text, &self.config.chunking);
        if chunks.is_empty() {
            return Err(RagError::EmptyExtraction);
        }

        let filename = base_name(path);
        info!(
            "Embedding '{}': {} chunks from {} characters",
            filename,
            chunks.len(),
            total_characters
        );

        let mut chunks_added = 0usize;
        for (index, content) in chunks.into_iter().enumerate() {
            let embedding = self.embed_text(content.clone()).await?;
            self.db
                .insert_chunk(NewChunk {
                    filename: filename.clone(),
                    content,
                    chunk_index: index as i64,
                    embedding,
                    metadata: metadata.clone(),
                })
                .await?;
            chunks_added += 1;
        }

        Ok(EmbedReport {
            message: format!(
                "Document '{filename}' embedded: {chunks_added} chunks created from {total_characters} characters"
            ),
            filename,
            chunks_added,
            total_characters,
        })
    }

    /// Embed the query once, scan every stored chunk, and return the best
    /// matches. `None` arguments fall back to the configured defaults.
    pub async fn search_documents(
        &self,
        query: &str,
        top_k: Option<usize>,
        min_similarity: Option<f32>,
    ) -> Result<SearchReport> {
        let hits = self.search_hits(query, top_k, min_similarity).await?;

        let message = if hits.is_empty() {
            "No similar documents found for the query".to_string()
        } else if hits.len() == 1 {
            "Found 1 similar document".to_string()
        } else {
            format!("Found {} similar documents", hits.len())
        };

        Ok(SearchReport {
            results: hits,
            message,
        })
    }

    async fn search_hits(
        &self,
        query: &str,
        top_k: Option<usize>,
        min_similarity: Option<f32>,
    ) -> Result<Vec<SearchHit>> {
        let top_k = top_k.unwrap_or(self.config.search.default_top_k);
        let min_similarity = min_similarity.unwrap_or(self.config.search.min_similarity);

        let query_embedding = self.embed_text(query.to_string()).await?;
        let chunks = self.db.scan_all().await?;
        let ranked = rank_chunks(chunks, &query_embedding, top_k, min_similarity);

        Ok(ranked.into_iter().map(scored_to_hit).collect())
    }

    /// One consistent aggregate over the store.
    pub async fn get_stats(&self) -> Result<DatabaseStats> {
        let total_chunks = self.db.count_chunks().await?;
        let unique_files = self.db.count_distinct_filenames().await?;
        let files = self.file_breakdown().await?;

        Ok(DatabaseStats {
            total_chunks,
            unique_files,
            embedding_model: self.embedder.model_name().to_string(),
            database_path: self.db.path().to_string(),
            files,
        })
    }

    /// Remove every chunk of `filename`. An unknown filename is an error,
    /// not a silent no-op.
    pub async fn delete_document(&self, filename: &str) -> Result<DeleteReport> {
        let chunks_deleted = self.db.delete_by_filename(filename).await?;
        if chunks_deleted == 0 {
            return Err(RagError::DocumentNotFound);
        }

        info!("Deleted '{}' ({} chunks)", filename, chunks_deleted);
        Ok(DeleteReport {
            message: format!("Document '{filename}' deleted: {chunks_deleted} chunks removed"),
            filename: filename.to_string(),
            chunks_deleted,
        })
    }

    pub async fn list_documents(&self) -> Result<DocumentListing> {
        let files = self.file_breakdown().await?;
        let total_documents = files.len();

        let message = if total_documents == 0 {
            "No documents stored yet".to_string()
        } else if total_documents == 1 {
            "1 document stored".to_string()
        } else {
            format!("{total_documents} documents stored")
        };

        Ok(DocumentListing {
            total_documents,
            files,
            message,
        })
    }

    /// Answer a question from retrieved context. The answer text is a
    /// formatted digest of the top hits rather than generated prose.
    ///
    /// This operation never fails: any internal error degrades to a
    /// well-formed answer with empty context and zero confidence.
    pub async fn ask_question(
        &self,
        question: &str,
        context_limit: Option<usize>,
        similarity_threshold: Option<f32>,
    ) -> QuestionAnswer {
        let hits = match self
            .search_hits(question, context_limit, similarity_threshold)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Question answering degraded to empty context: {e}");
                return QuestionAnswer {
                    question: question.to_string(),
                    answer: "I'm sorry, I couldn't process your question due to an error."
                        .to_string(),
                    context_chunks: Vec::new(),
                    sources: Vec::new(),
                    confidence: 0.0,
                };
            }
        };

        if hits.is_empty() {
            return QuestionAnswer {
                question: question.to_string(),
                answer: "I couldn't find any relevant information to answer your question."
                    .to_string(),
                context_chunks: Vec::new(),
                sources: Vec::new(),
                confidence: 0.0,
            };
        }

        let top = &hits[..hits.len().min(ANSWER_CONTEXT_HITS)];
        let confidence =
            (top.iter().map(|h| h.similarity).sum::<f32>() / top.len() as f32).clamp(0.0, 1.0);

        let mut answer = format!(
            "Based on the available documents, here's what I found:\n\n\
             The most relevant information comes from {} source{}. \
             Key points from the top results:\n",
            hits.len(),
            if hits.len() == 1 { "" } else { "s" }
        );
        for hit in top {
            let snippet: String = hit.content.chars().take(ANSWER_SNIPPET_CHARS).collect();
            // Writing to a String cannot fail.
            let _ = write!(answer, "\n- {snippet}...");
        }

        // First occurrence wins, preserving rank order.
        let mut sources: Vec<String> = Vec::new();
        for hit in &hits {
            if !sources.contains(&hit.filename) {
                sources.push(hit.filename.clone());
            }
        }

        QuestionAnswer {
            question: question.to_string(),
            answer,
            context_chunks: hits,
            sources,
            confidence,
        }
    }

    /// Look up a single chunk by its row id.
    pub async fn get_document(&self, id: i64) -> Result<ChunkDetail> {
        let chunk = self
            .db
            .get_chunk(id)
            .await?
            .ok_or(RagError::DocumentNotFound)?;

        Ok(chunk_to_detail(chunk))
    }

    async fn file_breakdown(&self) -> Result<Vec<FileBreakdown>> {
        let rows = self.db.chunks_per_filename().await?;
        Ok(rows
            .into_iter()
            .map(|(filename, chunk_count)| FileBreakdown {
                filename,
                chunk_count,
            })
            .collect())
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn scored_to_hit(scored: ScoredChunk) -> SearchHit {
    let ScoredChunk { chunk, similarity } = scored;
    SearchHit {
        id: chunk.id,
        filename: chunk.filename,
        content: chunk.content,
        chunk_index: chunk.chunk_index,
        similarity,
        metadata: chunk.metadata,
        created_at: chunk.created_at.and_utc().to_rfc3339(),
    }
}

fn chunk_to_detail(chunk: StoredChunk) -> ChunkDetail {
    ChunkDetail {
        id: chunk.id,
        filename: chunk.filename,
        content: chunk.content,
        chunk_index: chunk.chunk_index,
        metadata: chunk.metadata,
        created_at: chunk.created_at.and_utc().to_rfc3339(),
    }
}
