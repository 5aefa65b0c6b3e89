use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::AppState;
use super::errors::ApiError;
use crate::extract::FileType;
use crate::knowledge::KnowledgeStatus;

pub const UNSUPPORTED_UPLOAD_MESSAGE: &str = "Please upload a .pdf or .txt file.";
pub const EMPTY_QUERY_MESSAGE: &str = "Query 'q' cannot be empty.";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    pub filename: String,
    pub indexed_chunks: usize,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiRequest {
    pub prompt: String,
}

/// Index the uploaded document, replacing the previous one
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if FileType::from_filename(&filename).is_err() {
            return Err(ApiError::bad_request(UNSUPPORTED_UPLOAD_MESSAGE));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::internal(format!("Error processing file: {}", e)))?;
        info!("Received upload {} ({} bytes)", filename, bytes.len());

        let knowledge = Arc::clone(&state.knowledge);
        let name = filename.clone();
        let summary = tokio::task::spawn_blocking(move || knowledge.build_named(&name, &bytes))
            .await
            .map_err(|e| ApiError::internal(format!("Error processing file: {}", e)))?
            .map_err(|e| ApiError::internal(format!("Error processing file: {}", e)))?;

        return Ok(Json(UploadResponse {
            filename,
            indexed_chunks: summary.chunk_count,
        }));
    }

    Err(ApiError::new(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Missing multipart field 'file'.",
    ))
}

/// Return the passages most similar to `q`
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params
        .q
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request(EMPTY_QUERY_MESSAGE))?;

    debug!("Search request for {:?}", query);

    let knowledge = Arc::clone(&state.knowledge);
    let k = state.default_k;
    let q = query.clone();
    let results = tokio::task::spawn_blocking(move || knowledge.search(&q, k))
        .await
        .map_err(|e| ApiError::internal(format!("Search error: {}", e)))?
        .map_err(|e| ApiError::internal(format!("Search error: {}", e)))?;

    Ok(Json(SearchResponse { query, results }))
}

/// Forward a prompt to the generative model with the server-held key
pub async fn gemini_proxy(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GeminiRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let generative = Arc::clone(&state.generative);
    let response = tokio::task::spawn_blocking(move || generative.generate(&request.prompt))
        .await
        .map_err(|e| ApiError::internal(format!("An internal error occurred: {}", e)))?
        .map_err(ApiError::from_proxy)?;

    Ok(Json(response))
}

/// Report whether a document is indexed
pub async fn status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let status = state
        .knowledge
        .status()
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(match status {
        KnowledgeStatus::Empty => serde_json::json!({ "indexed": false }),
        KnowledgeStatus::Ready {
            chunk_count,
            dimension,
            source,
        } => serde_json::json!({
            "indexed": true,
            "chunk_count": chunk_count,
            "dimension": dimension,
            "source": source,
        }),
    }))
}
