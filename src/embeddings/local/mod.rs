//! In-process sentence embeddings via fastembed (ONNX runtime).
//!
//! The default model is `all-MiniLM-L6-v2` (384 dimensions). Weights are
//! downloaded on first use into the configured cache directory.

use std::sync::Mutex;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::{debug, info};

use crate::config::EmbeddingConfig;
use crate::embeddings::Embedder;
use crate::{QaError, Result};

pub struct LocalEmbedder {
    model: Mutex<TextEmbedding>,
    model_name: String,
}

impl LocalEmbedder {
    /// Load the configured model, downloading it if it is not cached yet
    #[inline]
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model = resolve_model(&config.model)?;
        let cache_dir = config
            .resolved_cache_dir()
            .map_err(|e| QaError::Configuration(e.to_string()))?;

        info!(
            "Loading embedding model {} (cache: {})",
            config.model,
            cache_dir.display()
        );

        std::fs::create_dir_all(&cache_dir)?;
        let options = InitOptions::new(model)
            .with_cache_dir(cache_dir)
            .with_show_download_progress(config.show_download_progress);

        let model = TextEmbedding::try_new(options)
            .map_err(|e| QaError::Embedding(format!("Failed to load model: {}", e)))?;

        Ok(Self {
            model: Mutex::new(model),
            model_name: config.model.clone(),
        })
    }
}

/// Map a configured model name onto a fastembed model
fn resolve_model(name: &str) -> Result<EmbeddingModel> {
    match name.trim_start_matches("sentence-transformers/") {
        "all-MiniLM-L6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "all-MiniLM-L12-v2" => Ok(EmbeddingModel::AllMiniLML12V2),
        "bge-small-en-v1.5" | "BAAI/bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" | "BAAI/bge-base-en-v1.5" => Ok(EmbeddingModel::BGEBaseENV15),
        other => Err(QaError::Configuration(format!(
            "Unknown local embedding model: {}",
            other
        ))),
    }
}

impl Embedder for LocalEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Embedding {} texts locally", texts.len());
        let mut model = self
            .model
            .lock()
            .map_err(|_| QaError::Embedding("embedding model lock poisoned".to_string()))?;

        model
            .embed(texts.to_vec(), None)
            .map_err(|e| QaError::Embedding(e.to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
