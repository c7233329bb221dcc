pub mod hf;

pub use hf::HfEmbeddingClient;

use crate::Result;

/// Seam between the retrieval service and the embedding backend.
///
/// One call is one request: implementations do no caching or batching.
pub trait Embedder: Send + Sync {
    /// Embed `text` into a fixed-length f32 vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Name of the underlying model, for the stats report.
    fn model_name(&self) -> &str;
}
