//! # General Route Handlers

use super::AppState;
use crate::types::RootResponse;
use axum::{extract::State, Json};

/// The handler for the root (`/`) endpoint: liveness plus the ids of the loaded farms.
pub async fn root(State(app_state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok".to_string(),
        message: "AgroRAG backend running".to_string(),
        farms_loaded: app_state.farms.ids(),
    })
}

/// The handler for the health check (`/health`) endpoint.
pub async fn health_check() -> &'static str {
    "OK"
}
