use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rag_mcp::Result;
use rag_mcp::commands::{
    delete_document, embed_file, list_documents, search, serve_mcp, show_stats,
};

#[derive(Parser)]
#[command(name = "rag-mcp")]
#[command(about = "A document ingestion and semantic retrieval system with MCP server")]
#[command(version)]
struct Cli {
    /// Override the configuration directory
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server on stdio
    Serve,
    /// Ingest a document: extract, chunk, embed, store
    Embed {
        /// Path to the document (txt, md, pdf, docx)
        path: PathBuf,
        /// Metadata attached to every chunk, as a JSON object
        #[arg(long)]
        metadata: Option<String>,
    },
    /// Search stored documents by semantic similarity
    Search {
        /// Search query
        query: String,
        /// Maximum number of results
        #[arg(long)]
        top_k: Option<usize>,
        /// Similarity floor between -1.0 and 1.0
        #[arg(long)]
        min_similarity: Option<f32>,
    },
    /// List stored documents with their chunk counts
    List,
    /// Delete every chunk of a stored document
    Delete {
        /// Document filename as stored
        filename: String,
    },
    /// Show store statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            serve_mcp(cli.config_dir).await?;
        }
        Commands::Embed { path, metadata } => {
            embed_file(cli.config_dir, &path, metadata).await?;
        }
        Commands::Search {
            query,
            top_k,
            min_similarity,
        } => {
            search(cli.config_dir, &query, top_k, min_similarity).await?;
        }
        Commands::List => {
            list_documents(cli.config_dir).await?;
        }
        Commands::Delete { filename } => {
            delete_document(cli.config_dir, &filename).await?;
        }
        Commands::Stats => {
            show_stats(cli.config_dir).await?;
        }
    }

    Ok(())
}
