use agrorag::{AskError, IndexError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// A custom error type for the server application.
///
/// Each variant is converted into an HTTP status and a JSON `{"error": ...}` body.
#[derive(Debug)]
pub enum AppError {
    /// A farm or crop that is not in the loaded data.
    NotFound(String),
    /// Failures of the embedding index or context retrieval.
    Index(IndexError),
    /// Failures of the RAG question-answering flow.
    Ask(AskError),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<IndexError> for AppError {
    fn from(err: IndexError) -> Self {
        AppError::Index(err)
    }
}

impl From<AskError> for AppError {
    fn from(err: AskError) -> Self {
        AppError::Ask(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

fn index_error_response(err: &IndexError) -> (StatusCode, String) {
    match err {
        IndexError::InvalidK(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        IndexError::Embedding(e) => (
            StatusCode::BAD_GATEWAY,
            format!("Embedding service error: {e}"),
        ),
        IndexError::Unavailable(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Knowledge index is unavailable.".to_string(),
        ),
        IndexError::DuplicateId(_) | IndexError::DimensionMismatch { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Knowledge index is inconsistent.".to_string(),
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::Index(err) => {
                error!("IndexError: {:?}", err);
                index_error_response(&err)
            }
            AppError::Ask(err) => {
                error!("AskError: {:?}", err);
                match &err {
                    AskError::Retrieval(e) => index_error_response(e),
                    AskError::Upstream(e) if e.is_timeout() => (
                        StatusCode::GATEWAY_TIMEOUT,
                        format!("LLM service timed out: {e}"),
                    ),
                    AskError::Upstream(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("LLM service unavailable: {e}"),
                    ),
                }
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
