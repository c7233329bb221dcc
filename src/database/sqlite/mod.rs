#[cfg(test)]
mod tests;

pub mod models;
pub mod queries;

use std::path::Path;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::{debug, info};

use self::models::{NewChunk, StoredChunk};
use self::queries::ChunkQueries;
use crate::{RagError, Result};

pub type DbPool = Pool<Sqlite>;

/// Persistence failures surface as [`RagError::Storage`] with the full
/// context chain flattened into the message.
fn storage_err(e: anyhow::Error) -> RagError {
    RagError::Storage(format!("{e:#}"))
}

/// Handle on the chunk store. Cheap to clone; all clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: DbPool,
    path: String,
}

impl Database {
    /// Open (creating if missing) the store at `database_path` and ensure
    /// the schema exists. There is no migration framework: the schema is a
    /// single table plus one index, created idempotently.
    #[inline]
    pub async fn new<P: AsRef<Path>>(database_path: P) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(&database_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await
            .context("Failed to create database connection pool")
            .map_err(storage_err)?;

        let database = Self {
            pool,
            path: database_path.as_ref().display().to_string(),
        };
        database.init_schema().await?;

        Ok(database)
    }

    #[inline]
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Filesystem path this store was opened with, for the stats report.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    async fn init_schema(&self) -> Result<()> {
        self.create_schema()
            .await
            .map_err(storage_err)
    }

    async fn create_schema(&self) -> anyhow::Result<()> {
        info!("Ensuring chunk store schema");

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS chunks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                content TEXT NOT NULL,
                chunk_index INTEGER NOT NULL,
                embedding BLOB NOT NULL,
                metadata TEXT NOT NULL DEFAULT '{}',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create chunks table")?;

        // Accelerates per-document aggregates and deletes; similarity search
        // deliberately scans every row and never touches it.
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_chunks_filename ON chunks(filename)")
            .execute(&self.pool)
            .await
            .context("Failed to create filename index")?;

        debug!("Chunk store schema ready");
        Ok(())
    }

    #[inline]
    pub async fn insert_chunk(&self, chunk: NewChunk) -> Result<i64> {
        ChunkQueries::insert(&self.pool, chunk)
            .await
            .map_err(storage_err)
    }

    /// Every stored chunk with its embedding decoded, in insertion order.
    #[inline]
    pub async fn scan_all(&self) -> Result<Vec<StoredChunk>> {
        let rows = ChunkQueries::scan_all(&self.pool)
            .await
            .map_err(storage_err)?;
        rows.into_iter()
            .map(|row| row.into_stored().map_err(storage_err))
            .collect()
    }

    #[inline]
    pub async fn get_chunk(&self, id: i64) -> Result<Option<StoredChunk>> {
        match ChunkQueries::get_by_id(&self.pool, id)
            .await
            .map_err(storage_err)?
        {
            Some(row) => Ok(Some(row.into_stored().map_err(storage_err)?)),
            None => Ok(None),
        }
    }

    #[inline]
    pub async fn count_chunks(&self) -> Result<i64> {
        ChunkQueries::count_chunks(&self.pool)
            .await
            .map_err(storage_err)
    }

    #[inline]
    pub async fn count_distinct_filenames(&self) -> Result<i64> {
        ChunkQueries::count_distinct_filenames(&self.pool)
            .await
            .map_err(storage_err)
    }

    #[inline]
    pub async fn chunks_per_filename(&self) -> Result<Vec<(String, i64)>> {
        ChunkQueries::chunks_per_filename(&self.pool)
            .await
            .map_err(storage_err)
    }

    #[inline]
    pub async fn delete_by_filename(&self, filename: &str) -> Result<u64> {
        ChunkQueries::delete_by_filename(&self.pool, filename)
            .await
            .map_err(storage_err)
    }
}
