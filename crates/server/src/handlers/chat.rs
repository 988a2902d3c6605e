//! # Chat Handler
//!
//! With a `farm_id` the reply comes from the sensor threshold rules; without one the
//! message goes through the RAG agronomist.

use super::{farm_not_found, wrap_response, AppError, AppState, DebugParams};
use crate::types::{ChatParams, ChatQuery, ChatRequest, ChatResponse};
use agrorag::diagnosis::check_sensors;
use axum::{
    extract::{Query, State},
    response::Response,
    Json,
};
use serde_json::json;
use tracing::info;

/// `POST /api/chat?farm_id=`
pub async fn chat_handler(
    State(app_state): State<AppState>,
    Query(params): Query<ChatParams>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<ChatRequest>,
) -> Result<Response, AppError> {
    match ChatQuery::resolve(params, payload) {
        ChatQuery::SensorDiagnosis { farm_id } => {
            info!(%farm_id, "Chat routed to sensor diagnosis");
            let farm = app_state.farms.get(&farm_id).ok_or_else(farm_not_found)?;
            let report = check_sensors(&farm.sensors);
            let debug_info = Some(json!({ "issues": report.issues }));
            let response = ChatResponse {
                reply: report.reply,
                source: report.source,
            };
            Ok(wrap_response(response, debug_params, debug_info))
        }
        ChatQuery::OpenQuestion { message } => {
            info!("Chat routed to agronomist");
            let answer = app_state.agronomist.ask(&message).await?;
            let debug_info = Some(json!({ "context": answer.context }));
            let response = ChatResponse {
                reply: answer.text,
                source: app_state.config.llm.source_label.clone(),
            };
            Ok(wrap_response(response, debug_params, debug_info))
        }
    }
}
