//! HTTP request handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::api::{error::ApiError, AppState};
use crate::types::{ConflictReport, PlanResult};
use crate::validation::{PlanRequestInput, ValidateAppointmentRequest};

/// POST /api/appointments/validate
pub async fn validate_appointment(
    State(state): State<AppState>,
    payload: Result<Json<ValidateAppointmentRequest>, JsonRejection>,
) -> Result<Json<ConflictReport>, ApiError> {
    let Json(request) = payload?;
    let report = state.scheduler.check_appointment(request)?;

    info!(
        "Validated appointment: {} conflict(s), blocking={}",
        report.conflicts.len(),
        report.has_blocking_conflict
    );

    Ok(Json(report))
}

/// POST /api/planning/day
pub async fn plan_day(
    State(state): State<AppState>,
    payload: Result<Json<PlanRequestInput>, JsonRejection>,
) -> Result<Json<PlanResult>, ApiError> {
    let Json(request) = payload?;
    let result = state.scheduler.plan_day(request)?;

    info!(
        "Planned day: {} stop(s), {} warning(s)",
        result.plan.len(),
        result.warnings.len()
    );

    Ok(Json(result))
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
