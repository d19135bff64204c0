use crate::{error::AppError, AppState};
use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    Json,
};
use core_types::Report;
use database::{report_for_year, PoolStatus};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub pool: PoolStatus,
}

/// # GET /api/report/:year
/// Caregivers and the patients they visited during `year`.
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    year: Result<Path<i32>, PathRejection>,
) -> Result<Json<Report>, AppError> {
    let Path(year) = year.map_err(|rejection| {
        AppError::BadRequest(format!("year must be an integer: {}", rejection.body_text()))
    })?;

    let report = report_for_year(state.store.as_ref(), year).await?;
    tracing::info!(year, caregivers = report.caregivers.len(), "Report built.");
    Ok(Json(report))
}

/// # GET /api/health
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<HealthResponse>), AppError> {
    let pool = state.store.health().await?;
    Ok((StatusCode::OK, Json(HealthResponse { status: "ok", pool })))
}
