//! Tool registration and concrete tool implementations for document
//! ingestion and retrieval.
//!
//! Every tool returns the service's structured result serialized as pretty
//! JSON text content. Service failures become `is_error` tool results so a
//! misbehaving document or an embedding outage never kills the server.

use crate::mcp::protocol::*;
use crate::mcp::server::ToolHandler;
use crate::service::RagService;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error};

/// Ingest a document: extract, chunk, embed, store.
pub struct EmbedDocumentHandler {
    service: Arc<RagService>,
}

/// Similarity search over stored chunks.
pub struct SearchDocumentsHandler {
    service: Arc<RagService>,
}

/// Aggregate statistics about the store.
pub struct GetDatabaseStatsHandler {
    service: Arc<RagService>,
}

/// Remove every chunk of a document.
pub struct DeleteDocumentHandler {
    service: Arc<RagService>,
}

/// List stored documents with chunk counts.
pub struct ListDocumentsHandler {
    service: Arc<RagService>,
}

/// Retrieval-augmented question answering.
pub struct AskQuestionHandler {
    service: Arc<RagService>,
}

/// Look up one stored chunk by id.
pub struct GetDocumentHandler {
    service: Arc<RagService>,
}

fn success_result<T: Serialize>(value: &T) -> Result<CallToolResult> {
    Ok(CallToolResult {
        content: vec![ToolContent::Text {
            text: serde_json::to_string_pretty(value)?,
        }],
        is_error: Some(false),
    })
}

fn error_result(message: String) -> CallToolResult {
    CallToolResult {
        content: vec![ToolContent::Text { text: message }],
        is_error: Some(true),
    }
}

fn required_str<'a>(args: &'a HashMap<String, Value>, name: &str) -> Result<&'a str> {
    args.get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("Missing required parameter: {name}"))
}

fn optional_usize(args: &HashMap<String, Value>, name: &str) -> Option<usize> {
    args.get(name)
        .and_then(Value::as_u64)
        .map(|v| v.max(1) as usize)
}

fn optional_f32(args: &HashMap<String, Value>, name: &str) -> Option<f32> {
    args.get(name).and_then(Value::as_f64).map(|v| v as f32)
}

impl EmbedDocumentHandler {
    #[inline]
    pub fn new(service: Arc<RagService>) -> Self {
        Self { service }
    }

    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "embed_document".to_string(),
            description: Some(
                "Extract, chunk, embed, and store a document (txt, md, pdf, docx)".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "Path to the document to ingest"
                    },
                    "metadata": {
                        "type": "object",
                        "description": "Optional: metadata attached to every chunk"
                    }
                },
                "required": ["file_path"],
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for EmbedDocumentHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult> {
        let args = params.arguments.unwrap_or_default();
        let file_path = PathBuf::from(required_str(&args, "file_path")?);

        let metadata = match args.get("metadata") {
            Some(Value::Object(map)) => map.clone(),
            Some(other) => {
                return Ok(error_result(format!(
                    "Metadata must be a JSON object, got: {other}"
                )));
            }
            None => serde_json::Map::new(),
        };

        debug!("Embedding document: {}", file_path.display());
        match self.service.embed_document(&file_path, metadata).await {
            Ok(report) => success_result(&report),
            Err(e) => {
                error!("Failed to embed document: {}", e);
                Ok(error_result(format!("Failed to embed document: {e}")))
            }
        }
    }
}

impl SearchDocumentsHandler {
    #[inline]
    pub fn new(service: Arc<RagService>) -> Self {
        Self { service }
    }

    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "search_documents".to_string(),
            description: Some("Search stored documents by semantic similarity".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query"
                    },
                    "top_k": {
                        "type": "integer",
                        "description": "Maximum number of results (default: 5)"
                    },
                    "min_similarity": {
                        "type": "number",
                        "description": "Similarity floor between -1.0 and 1.0 (default: 0.4)"
                    }
                },
                "required": ["query"],
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for SearchDocumentsHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult> {
        let args = params.arguments.unwrap_or_default();
        let query = required_str(&args, "query")?;
        let top_k = optional_usize(&args, "top_k");
        let min_similarity = optional_f32(&args, "min_similarity");

        debug!(
            "Searching documents: query='{}', top_k={:?}, min_similarity={:?}",
            query, top_k, min_similarity
        );
        match self.service.search_documents(query, top_k, min_similarity).await {
            Ok(report) => success_result(&report),
            Err(e) => {
                error!("Search failed: {}", e);
                Ok(error_result(format!("Search failed: {e}")))
            }
        }
    }
}

impl GetDatabaseStatsHandler {
    #[inline]
    pub fn new(service: Arc<RagService>) -> Self {
        Self { service }
    }

    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "get_database_stats".to_string(),
            description: Some("Get statistics about the document store".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for GetDatabaseStatsHandler {
    #[inline]
    async fn handle(&self, _params: CallToolParams) -> Result<CallToolResult> {
        match self.service.get_stats().await {
            Ok(stats) => success_result(&stats),
            Err(e) => {
                error!("Failed to gather stats: {}", e);
                Ok(error_result(format!("Failed to gather stats: {e}")))
            }
        }
    }
}

impl DeleteDocumentHandler {
    #[inline]
    pub fn new(service: Arc<RagService>) -> Self {
        Self { service }
    }

    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "delete_document".to_string(),
            description: Some("Delete every chunk of a stored document".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filename": {
                        "type": "string",
                        "description": "Document filename as stored"
                    }
                },
                "required": ["filename"],
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for DeleteDocumentHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult> {
        let args = params.arguments.unwrap_or_default();
        let filename = required_str(&args, "filename")?;

        match self.service.delete_document(filename).await {
            Ok(report) => success_result(&report),
            Err(e) => {
                error!("Failed to delete document '{}': {}", filename, e);
                Ok(error_result(format!("Failed to delete document: {e}")))
            }
        }
    }
}

impl ListDocumentsHandler {
    #[inline]
    pub fn new(service: Arc<RagService>) -> Self {
        Self { service }
    }

    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "list_documents".to_string(),
            description: Some("List stored documents with their chunk counts".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for ListDocumentsHandler {
    #[inline]
    async fn handle(&self, _params: CallToolParams) -> Result<CallToolResult> {
        match self.service.list_documents().await {
            Ok(listing) => success_result(&listing),
            Err(e) => {
                error!("Failed to list documents: {}", e);
                Ok(error_result(format!("Failed to list documents: {e}")))
            }
        }
    }
}

impl AskQuestionHandler {
    #[inline]
    pub fn new(service: Arc<RagService>) -> Self {
        Self { service }
    }

    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "ask_question".to_string(),
            description: Some(
                "Answer a question from retrieved document context".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "question": {
                        "type": "string",
                        "description": "The question to answer"
                    },
                    "context_limit": {
                        "type": "integer",
                        "description": "Maximum context chunks to retrieve (default: 5)"
                    },
                    "similarity_threshold": {
                        "type": "number",
                        "description": "Optional: similarity floor for context retrieval"
                    }
                },
                "required": ["question"],
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for AskQuestionHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult> {
        let args = params.arguments.unwrap_or_default();
        let question = required_str(&args, "question")?;
        let context_limit = optional_usize(&args, "context_limit");
        let similarity_threshold = optional_f32(&args, "similarity_threshold");

        let answer = self
            .service
            .ask_question(question, context_limit, similarity_threshold)
            .await;
        success_result(&answer)
    }
}

impl GetDocumentHandler {
    #[inline]
    pub fn new(service: Arc<RagService>) -> Self {
        Self { service }
    }

    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "get_document".to_string(),
            description: Some("Get a stored chunk by its id".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "document_id": {
                        "type": "integer",
                        "description": "Chunk row id"
                    }
                },
                "required": ["document_id"],
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for GetDocumentHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult> {
        let args = params.arguments.unwrap_or_default();
        let document_id = args
            .get("document_id")
            .and_then(Value::as_i64)
            .ok_or_else(|| anyhow!("Missing required parameter: document_id"))?;

        match self.service.get_document(document_id).await {
            Ok(detail) => success_result(&detail),
            Err(e) => {
                error!("Failed to get document {}: {}", document_id, e);
                Ok(error_result(format!("Failed to get document: {e}")))
            }
        }
    }
}

/// Register every retrieval tool on `server`, sharing one service handle.
#[inline]
pub async fn register_all(server: &crate::mcp::server::McpServer, service: Arc<RagService>) {
    server
        .register_tool(
            EmbedDocumentHandler::tool_definition(),
            EmbedDocumentHandler::new(Arc::clone(&service)),
        )
        .await;
    server
        .register_tool(
            SearchDocumentsHandler::tool_definition(),
            SearchDocumentsHandler::new(Arc::clone(&service)),
        )
        .await;
    server
        .register_tool(
            GetDatabaseStatsHandler::tool_definition(),
            GetDatabaseStatsHandler::new(Arc::clone(&service)),
        )
        .await;
    server
        .register_tool(
            DeleteDocumentHandler::tool_definition(),
            DeleteDocumentHandler::new(Arc::clone(&service)),
        )
        .await;
    server
        .register_tool(
            ListDocumentsHandler::tool_definition(),
            ListDocumentsHandler::new(Arc::clone(&service)),
        )
        .await;
    server
        .register_tool(
            AskQuestionHandler::tool_definition(),
            AskQuestionHandler::new(Arc::clone(&service)),
        )
        .await;
    server
        .register_tool(
            GetDocumentHandler::tool_definition(),
            GetDocumentHandler::new(service),
        )
        .await;
}
