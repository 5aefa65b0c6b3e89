// Embeddings module
// Text chunking and the embedding backends that turn chunks into vectors

pub mod chunking;
pub mod local;
pub mod ollama;

use std::sync::Arc;

use tracing::info;

use crate::config::{EmbeddingBackend, EmbeddingConfig};
use crate::{QaError, Result};

pub use chunking::{ChunkingConfig, chunk_text, estimate_token_count};
pub use local::LocalEmbedder;
pub use ollama::OllamaEmbedder;

/// Maps text to fixed-dimension vectors.
///
/// Implementations must return exactly one vector per input text, in input
/// order, and every vector from one embedder must share the same dimension.
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single search query
    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| QaError::Embedding("model returned no embeddings".to_string()))
    }

    /// Name of the underlying model
    fn model_name(&self) -> &str;
}

/// Build the embedder selected by the configuration
#[inline]
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    let embedder: Arc<dyn Embedder> = match config.backend {
        EmbeddingBackend::Local => Arc::new(LocalEmbedder::new(config)?),
        EmbeddingBackend::Ollama => {
            let embedder = OllamaEmbedder::new(&config.ollama)?;
            embedder.health_check()?;
            Arc::new(embedder)
        }
    };

    info!(
        "Using {:?} embedding backend with model {}",
        config.backend,
        embedder.model_name()
    );
    Ok(embedder)
}
