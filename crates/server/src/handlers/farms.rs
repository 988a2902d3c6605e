//! # Farm Handlers
//!
//! Read-only views of the sensor snapshot and the rule-based diagnosis.

use super::{farm_not_found, AppError, AppState};
use agrorag::diagnosis::{diagnose_farm, Diagnosis, Farm, Sensors};
use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

/// `GET /api/farms/{farm_id}/sensors`
pub async fn farm_sensors_handler(
    State(app_state): State<AppState>,
    Path(farm_id): Path<String>,
) -> Result<Json<Sensors>, AppError> {
    let farm = app_state.farms.get(&farm_id).ok_or_else(farm_not_found)?;
    Ok(Json(farm.sensors.clone()))
}

/// `GET /api/farms/{farm_id}/history` returns the whole farm record.
pub async fn farm_history_handler(
    State(app_state): State<AppState>,
    Path(farm_id): Path<String>,
) -> Result<Json<Farm>, AppError> {
    let farm = app_state.farms.get(&farm_id).ok_or_else(farm_not_found)?;
    Ok(Json(farm.clone()))
}

/// `POST /api/diagnose/{farm_id}`
pub async fn diagnose_handler(
    State(app_state): State<AppState>,
    Path(farm_id): Path<String>,
) -> Result<Json<Diagnosis>, AppError> {
    let farm = app_state.farms.get(&farm_id).ok_or_else(farm_not_found)?;
    let diagnosis = diagnose_farm(farm, &app_state.rules, &app_state.farms.issue_impacts);
    info!(%farm_id, healthy = matches!(diagnosis, Diagnosis::Healthy { .. }), "Diagnosed farm");
    Ok(Json(diagnosis))
}
