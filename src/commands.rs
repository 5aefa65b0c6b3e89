use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{Config, EmbeddingBackend};
use crate::embeddings::create_embedder;
use crate::knowledge::KnowledgeBase;
use crate::proxy::GenerativeClient;
use crate::server::{self, AppState};

/// Build the shared knowledge base from the configured embedder
#[inline]
pub async fn build_knowledge_base(config: &Config) -> Result<Arc<KnowledgeBase>> {
    let embedding = config.embedding.clone();
    let chunking = config.chunking.clone();

    // Loading a local model may download weights, keep it off the async workers
    let embedder = tokio::task::spawn_blocking(move || create_embedder(&embedding))
        .await
        .context("Embedder initialization task failed")?
        .context("Failed to initialize embedder")?;

    Ok(Arc::new(KnowledgeBase::new(embedder, chunking)))
}

/// Run the HTTP server until interrupted
#[inline]
pub async fn serve(config: &Config) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let knowledge = build_knowledge_base(config).await?;
    let generative = Arc::new(
        GenerativeClient::new(&config.generative)
            .context("Failed to configure generative client")?,
    );

    let key_present = std::env::var(&config.generative.api_key_env)
        .is_ok_and(|key| !key.trim().is_empty());
    if !key_present {
        warn!(
            "{} is not set, /gemini-proxy requests will fail",
            config.generative.api_key_env
        );
    }

    let state = AppState {
        knowledge,
        generative,
        default_k: config.server.default_k,
    };

    server::serve(state, &config.server).await
}

/// Index a single file and print the passages closest to `query`
#[inline]
pub async fn index_file(config: &Config, path: &Path, query: &str, k: usize) -> Result<()> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .context("Path has no file name")?;
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let knowledge = build_knowledge_base(config).await?;

    let query = query.to_string();
    let (summary, results) = tokio::task::spawn_blocking(move || {
        let summary = knowledge.build_named(&filename, &bytes)?;
        let results = knowledge.search(&query, k)?;
        crate::Result::Ok((summary, results))
    })
    .await
    .context("Indexing task failed")??;

    info!("Indexed {} chunks", summary.chunk_count);
    println!(
        "Indexed {} ({} chunks, dimension {})",
        path.display(),
        summary.chunk_count,
        summary.dimension
    );
    println!();

    for (rank, passage) in results.iter().enumerate() {
        println!("{}. {}", rank + 1, passage);
    }

    Ok(())
}

/// Print the effective configuration
#[inline]
pub fn show_config(config: &Config) -> Result<()> {
    eprintln!("Current Configuration");
    eprintln!();

    eprintln!("Server:");
    eprintln!("  Address: {}:{}", config.server.host, config.server.port);
    eprintln!("  Static Directory: {}", config.server.static_dir.display());
    eprintln!("  Results per Search: {}", config.server.default_k);
    eprintln!("  Upload Limit: {} MB", config.server.max_upload_mb);

    eprintln!();
    eprintln!("Embedding:");
    eprintln!("  Backend: {:?}", config.embedding.backend);
    match config.embedding.backend {
        EmbeddingBackend::Local => {
            eprintln!("  Model: {}", config.embedding.model);
            match config.embedding.resolved_cache_dir() {
                Ok(dir) => eprintln!("  Cache Directory: {}", dir.display()),
                Err(e) => eprintln!("  Cache Directory: Invalid ({})", e),
            }
        }
        EmbeddingBackend::Ollama => {
            match config.embedding.ollama.ollama_url() {
                Ok(url) => eprintln!("  Ollama URL: {}", url),
                Err(e) => eprintln!("  Ollama URL: Invalid ({})", e),
            }
            eprintln!("  Model: {}", config.embedding.ollama.model);
            eprintln!("  Batch Size: {}", config.embedding.ollama.batch_size);
        }
    }

    eprintln!();
    eprintln!("Chunking:");
    eprintln!(
        "  Sentence Split Threshold: {} characters",
        config.chunking.sentence_split_threshold
    );

    eprintln!();
    eprintln!("Generative Proxy:");
    eprintln!("  Endpoint: {}", config.generative.endpoint);
    eprintln!("  Model: {}", config.generative.model);
    eprintln!("  API Key Variable: {}", config.generative.api_key_env);
    eprintln!("  Timeout: {}s", config.generative.timeout_seconds);

    eprintln!();
    eprintln!("Config file: {}", config.config_file_path().display());

    Ok(())
}

/// Write the configuration file with current values, creating it if needed
#[inline]
pub fn write_config(config: &Config) -> Result<()> {
    let path = config.config_file_path();
    let existed = path.exists();
    config.save().context("Failed to save configuration")?;

    if existed {
        eprintln!("Configuration rewritten at {}", path.display());
    } else {
        eprintln!("Default configuration written to {}", path.display());
    }
    Ok(())
}
