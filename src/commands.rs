use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::{Config, get_config_dir};
use crate::database::Database;
use crate::embeddings::HfEmbeddingClient;
use crate::mcp::server::McpServer;
use crate::mcp::tools::register_all;
use crate::service::RagService;

/// Resolve the configuration directory: the explicit override wins,
/// otherwise the per-user default.
fn resolve_config_dir(config_dir: Option<PathBuf>) -> Result<PathBuf> {
    match config_dir {
        Some(dir) => Ok(dir),
        None => get_config_dir(),
    }
}

/// Construct the retrieval service from the configuration on disk.
async fn build_service(config_dir: Option<PathBuf>) -> Result<Arc<RagService>> {
    let config_dir = resolve_config_dir(config_dir)?;
    std::fs::create_dir_all(&config_dir).with_context(|| {
        format!("Failed to create config directory: {}", config_dir.display())
    })?;

    let config = Config::load(&config_dir).context("Failed to load configuration")?;

    let database = Database::new(config.database_path())
        .await
        .context("Failed to initialize database")?;

    let embedder = HfEmbeddingClient::new(&config.embedding)
        .context("Failed to construct embedding client")?;

    Ok(Arc::new(RagService::new(
        database,
        Arc::new(embedder),
        config,
    )))
}

/// Start the MCP server on stdio
#[inline]
pub async fn serve_mcp(config_dir: Option<PathBuf>) -> Result<()> {
    info!("Starting MCP server");

    let service = build_service(config_dir).await?;

    let server = Arc::new(McpServer::new(
        env!("CARGO_PKG_NAME").to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    ));
    register_all(&server, service).await;

    server.serve_stdio().await
}

/// Ingest a document from the command line
#[inline]
pub async fn embed_file(
    config_dir: Option<PathBuf>,
    path: &Path,
    metadata: Option<String>,
) -> Result<()> {
    let metadata = match metadata {
        Some(raw) => {
            let value: serde_json::Value =
                serde_json::from_str(&raw).context("Metadata is not valid JSON")?;
            match value {
                serde_json::Value::Object(map) => map,
                other => anyhow::bail!("Metadata must be a JSON object, got: {other}"),
            }
        }
        None => serde_json::Map::new(),
    };

    let service = build_service(config_dir).await?;
    let report = service.embed_document(path, metadata).await?;

    println!("{}", report.message);
    Ok(())
}

/// Search stored documents from the command line
#[inline]
pub async fn search(
    config_dir: Option<PathBuf>,
    query: &str,
    top_k: Option<usize>,
    min_similarity: Option<f32>,
) -> Result<()> {
    let service = build_service(config_dir).await?;
    let report = service.search_documents(query, top_k, min_similarity).await?;

    println!("{}", report.message);
    for hit in &report.results {
        println!();
        println!(
            "#{} {} (chunk {}, similarity {:.3})",
            hit.id, hit.filename, hit.chunk_index, hit.similarity
        );
        println!("   {}", hit.content);
    }

    Ok(())
}

/// List stored documents
#[inline]
pub async fn list_documents(config_dir: Option<PathBuf>) -> Result<()> {
    let service = build_service(config_dir).await?;
    let listing = service.list_documents().await?;

    println!("{}", listing.message);
    for file in &listing.files {
        println!(
            "  {} ({} chunk{})",
            file.filename,
            file.chunk_count,
            if file.chunk_count == 1 { "" } else { "s" }
        );
    }

    Ok(())
}

/// Delete a stored document
#[inline]
pub async fn delete_document(config_dir: Option<PathBuf>, filename: &str) -> Result<()> {
    let service = build_service(config_dir).await?;
    let report = service.delete_document(filename).await?;

    println!("{}", report.message);
    Ok(())
}

/// Show store statistics
#[inline]
pub async fn show_stats(config_dir: Option<PathBuf>) -> Result<()> {
    let service = build_service(config_dir).await?;
    let stats = service.get_stats().await?;

    println!("Database: {}", stats.database_path);
    println!("Embedding model: {}", stats.embedding_model);
    println!("Documents: {}", stats.unique_files);
    println!("Chunks: {}", stats.total_chunks);

    if !stats.files.is_empty() {
        println!();
        for file in &stats.files {
            println!("  {} ({} chunks)", file.filename, file.chunk_count);
        }
    }

    Ok(())
}
