
use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::models::{ChunkRow, NewChunk, encode_embedding, encode_metadata};

pub struct ChunkQueries;

impl ChunkQueries {
    /// Append one chunk row. Never overwrites; returns the assigned id.
    #[inline]
    pub async fn insert(pool: &SqlitePool, chunk: NewChunk) -> Result<i64> {
        let embedding = encode_embedding(&chunk.embedding);
        let metadata = encode_metadata(&chunk.metadata)?;
        let now = Utc::now().naive_utc();

        let id = sqlx::query(
            "INSERT INTO chunks (filename, content, chunk_index, embedding, metadata, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&chunk.filename)
        .bind(&chunk.content)
        .bind(chunk.chunk_index)
        .bind(embedding)
        .bind(metadata)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to insert chunk")?
        .last_insert_rowid();

        debug!(
            "Inserted chunk {} of '{}' as row {}",
            chunk.chunk_index, chunk.filename, id
        );
        Ok(id)
    }

    /// Every stored row in insertion (id) order. Full-table scan by design:
    /// similarity search has no index to lean on.
    #[inline]
    pub async fn scan_all(pool: &SqlitePool) -> Result<Vec<ChunkRow>> {
        let rows = sqlx::query_as::<_, ChunkRow>(
            "SELECT id, filename, content, chunk_index, embedding, metadata, created_at
             FROM chunks ORDER BY id",
        )
        .fetch_all(pool)
        .await
        .context("Failed to scan chunks")?;

        Ok(rows)
    }

    #[inline]
    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<ChunkRow>> {
        let row = sqlx::query_as::<_, ChunkRow>(
            "SELECT id, filename, content, chunk_index, embedding, metadata, created_at
             FROM chunks WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get chunk by id")?;

        Ok(row)
    }

    #[inline]
    pub async fn count_chunks(pool: &SqlitePool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(pool)
            .await
            .context("Failed to count chunks")?;

        Ok(count)
    }

    #[inline]
    pub async fn count_distinct_filenames(pool: &SqlitePool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT filename) FROM chunks")
            .fetch_one(pool)
            .await
            .context("Failed to count distinct filenames")?;

        Ok(count)
    }

    /// Chunk counts grouped by filename, ordered by filename.
    #[inline]
    pub async fn chunks_per_filename(pool: &SqlitePool) -> Result<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT filename, COUNT(*) FROM chunks GROUP BY filename ORDER BY filename",
        )
        .fetch_all(pool)
        .await
        .context("Failed to aggregate chunks per filename")?;

        Ok(rows)
    }

    /// Delete every chunk of `filename`; returns the number of rows removed.
    #[inline]
    pub async fn delete_by_filename(pool: &SqlitePool, filename: &str) -> Result<u64> {
        let deleted = sqlx::query("DELETE FROM chunks WHERE filename = ?")
            .bind(filename)
            .execute(pool)
            .await
            .context("Failed to delete chunks by filename")?
            .rows_affected();

        debug!("Deleted {} chunks of '{}'", deleted, filename);
        Ok(deleted)
    }
}
