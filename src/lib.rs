use thiserror::Error;

pub type Result<T> = std::result::Result<T, QaError>;

#[derive(Error, Debug)]
pub enum QaError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Could not extract any text chunks from the document.")]
    EmptyDocument,

    #[error("Index is not built. Please upload a document first.")]
    NotIndexed,

    #[error("Upstream error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Gemini API key not configured on the server.")]
    MissingApiKey,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod commands;
pub mod config;
pub mod embeddings;
pub mod extract;
pub mod index;
pub mod knowledge;
pub mod proxy;
pub mod server;

#[cfg(test)]
mod test_utils;
