//! # API Route Handlers
//!
//! This module organizes all the Axum route handlers for `agrorag-server`, split by
//! the resource they serve.

pub mod chat;
pub mod farms;
pub mod general;
pub mod knowledge;

pub use chat::*;
pub use farms::*;
pub use general::*;
pub use knowledge::*;

// Shared items used by multiple handler modules.
use super::{
    errors::AppError,
    state::AppState,
    types::{ApiResponse, DebugParams},
};
use axum::{
    extract::Query,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

/// Returns `result` as-is, or wrapped in `ApiResponse` together with `debug_info`
/// when the caller asked for `?debug=true`.
pub(crate) fn wrap_response<T: Serialize>(
    result: T,
    debug_params: Query<DebugParams>,
    debug_info: Option<Value>,
) -> Response {
    if debug_params.debug.unwrap_or(false) {
        Json(ApiResponse {
            debug: debug_info,
            result,
        })
        .into_response()
    } else {
        Json(result).into_response()
    }
}

pub(crate) fn farm_not_found() -> AppError {
    AppError::NotFound("Farm not found".to_string())
}
