
use serde::Serialize;

use crate::database::sqlite::models::StoredChunk;

/// A stored chunk paired with its similarity to the query embedding.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk: StoredChunk,
    pub similarity: f32,
}

/// Cosine similarity of two vectors, accumulated in f64 to keep long
/// vectors from losing precision. Returns `None` when the vectors have
/// different lengths, are empty, or either norm is zero.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    Some((dot / (norm_a.sqrt() * norm_b.sqrt())) as f32)
}

/// Score every chunk against `query_embedding`, keep those at or above
/// `min_similarity`, and return the best `top_k` in descending order.
///
/// Chunks whose embedding cannot be compared to the query (dimension
/// mismatch, zero norm) are skipped rather than failing the search. Ties
/// keep insertion order.
#[inline]
pub fn rank_chunks(
    chunks: Vec<StoredChunk>,
    query_embedding: &[f32],
    top_k: usize,
    min_similarity: f32,
) -> Vec<ScoredChunk> {
    let mut scored: Vec<ScoredChunk> = chunks
        .into_iter()
        .filter_map(|chunk| {
            let similarity = cosine_similarity(&chunk.embedding, query_embedding)?;
            if similarity.is_nan() || similarity < min_similarity {
                return None;
            }
            Some(ScoredChunk { chunk, similarity })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(top_k);
    scored
}
