//! # Knowledge Handlers
//!
//! Direct lookups in the knowledge base, and the retrieval step of the RAG flow on
//! its own so callers can inspect which facts a question would be grounded on.

use super::{AppError, AppState};
use crate::types::{ContextRequest, ContextResponse};
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use tracing::info;

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(_) => false,
    }
}

/// `GET /api/knowledge/{crop}`. Missing and empty entries are both reported as 404.
pub async fn crop_knowledge_handler(
    State(app_state): State<AppState>,
    Path(crop): Path<String>,
) -> Result<Json<Value>, AppError> {
    match app_state.knowledge_base.get(&crop) {
        Some(entry) if !is_blank(entry) => Ok(Json(entry.clone())),
        _ => Err(AppError::NotFound("Crop knowledge not found".to_string())),
    }
}

/// `POST /api/context` returns the newline-joined facts nearest to `question`.
pub async fn context_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<ContextRequest>,
) -> Result<Json<ContextResponse>, AppError> {
    let k = payload
        .k
        .unwrap_or(app_state.agronomist.settings().top_k);
    info!(question = %payload.question, k, "Received context request");

    let context = app_state
        .agronomist
        .retriever()
        .retrieve_context(&payload.question, k)
        .await?;
    Ok(Json(ContextResponse { context }))
}
