// Knowledge base module
// Owns the single indexed document and answers similarity queries against it

#[cfg(test)]
mod tests;

use std::str::FromStr;
use std::sync::{Arc, Mutex, RwLock};

use tracing::{debug, info, warn};

use crate::embeddings::{ChunkingConfig, Embedder, chunk_text, estimate_token_count};
use crate::extract::{FileType, extract_text};
use crate::index::{FlatL2Index, VectorIndex};
use crate::{QaError, Result};

/// Chunks and their index, built together and never mutated afterwards
struct Snapshot {
    chunks: Vec<String>,
    index: Box<dyn VectorIndex>,
    source: Option<String>,
}

/// Outcome of a successful build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub chunk_count: usize,
    pub dimension: usize,
}

/// Whether a document is currently searchable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeStatus {
    Empty,
    Ready {
        chunk_count: usize,
        dimension: usize,
        source: Option<String>,
    },
}

/// Single-document store shared by every request handler
pub struct KnowledgeBase {
    embedder: Arc<dyn Embedder>,
    chunking: ChunkingConfig,
    current: RwLock<Option<Arc<Snapshot>>>,
    build_lock: Mutex<()>,
}

impl KnowledgeBase {
    #[inline]
    pub fn new(embedder: Arc<dyn Embedder>, chunking: ChunkingConfig) -> Self {
        Self {
            embedder,
            chunking,
            current: RwLock::new(None),
            build_lock: Mutex::new(()),
        }
    }

    /// Replace the indexed document with `bytes` of the given type ("pdf" or "txt").
    ///
    /// On any failure the previously indexed document stays searchable.
    #[inline]
    pub fn build_index(&self, bytes: &[u8], file_type: &str) -> Result<BuildSummary> {
        let file_type = FileType::from_str(file_type)?;
        self.build(bytes, file_type, None)
    }

    /// Like [`build_index`](Self::build_index), deriving the type from the filename
    #[inline]
    pub fn build_named(&self, filename: &str, bytes: &[u8]) -> Result<BuildSummary> {
        let file_type = FileType::from_filename(filename)?;
        self.build(bytes, file_type, Some(filename.to_string()))
    }

    fn build(
        &self,
        bytes: &[u8],
        file_type: FileType,
        source: Option<String>,
    ) -> Result<BuildSummary> {
        let _guard = self
            .build_lock
            .lock()
            .map_err(|_| QaError::Index("build lock poisoned".to_string()))?;

        info!(
            "Building index from {} bytes of {} ({})",
            bytes.len(),
            file_type,
            source.as_deref().unwrap_or("unnamed document")
        );

        let text = extract_text(bytes, file_type)?;
        let chunks = chunk_text(&text, &self.chunking);
        if chunks.is_empty() {
            warn!("Document produced no chunks, keeping the current index");
            return Err(QaError::EmptyDocument);
        }

        let tokens: usize = chunks.iter().map(|c| estimate_token_count(c)).sum();
        debug!(
            "Embedding {} chunks (~{} tokens) with {}",
            chunks.len(),
            tokens,
            self.embedder.model_name()
        );

        let vectors = self.embedder.embed(&chunks)?;
        if vectors.len() != chunks.len() {
            return Err(QaError::Embedding(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                vectors.len()
            )));
        }

        let index = FlatL2Index::from_vectors(&vectors)?;
        let summary = BuildSummary {
            chunk_count: chunks.len(),
            dimension: index.dimension(),
        };

        let snapshot = Arc::new(Snapshot {
            chunks,
            index: Box::new(index),
            source,
        });

        let mut current = self
            .current
            .write()
            .map_err(|_| QaError::Index("knowledge base lock poisoned".to_string()))?;
        *current = Some(snapshot);
        drop(current);

        info!(
            "Indexed {} chunks with dimension {}",
            summary.chunk_count, summary.dimension
        );
        Ok(summary)
    }

    /// The `k` chunks closest to `query`, nearest first
    #[inline]
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<String>> {
        let snapshot = self.snapshot()?.ok_or(QaError::NotIndexed)?;

        debug!("Searching {} chunks for top {}", snapshot.chunks.len(), k);

        let query_vector = self.embedder.embed_query(query)?;
        let neighbors = snapshot.index.search(&query_vector, k)?;

        neighbors
            .iter()
            .map(|n| {
                snapshot.chunks.get(n.position).cloned().ok_or_else(|| {
                    QaError::Index(format!("index position {} has no chunk", n.position))
                })
            })
            .collect()
    }

    #[inline]
    pub fn status(&self) -> Result<KnowledgeStatus> {
        Ok(match self.snapshot()? {
            None => KnowledgeStatus::Empty,
            Some(snapshot) => KnowledgeStatus::Ready {
                chunk_count: snapshot.chunks.len(),
                dimension: snapshot.index.dimension(),
                source: snapshot.source.clone(),
            },
        })
    }

    fn snapshot(&self) -> Result<Option<Arc<Snapshot>>> {
        self.current
            .read()
            .map(|current| current.clone())
            .map_err(|_| QaError::Index("knowledge base lock poisoned".to_string()))
    }
}
