//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use chrono::Utc;

use super::AppState;
use super::types::{
    AcknowledgeRequest, AcknowledgeResponse, ApiError, HealthResponse, QuotaResponse,
    UnitsResponse, UpdateResponse, api_error, ledger_error,
};
use crate::io::export::write_report_csv;
use crate::ledger::{BuildingOverview, TenantSummary, TenantUsage};
use crate::model::QuotaUpdate;

/// `GET /health` → 200
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Recomputes every unit and syncs tenant rewards.
///
/// `POST /api/update` → 200 + `UpdateResponse` JSON
pub async fn post_update(State(state): State<Arc<AppState>>) -> Json<UpdateResponse> {
    let summary = state.ledger().recompute();
    Json(UpdateResponse {
        success: true,
        message: "Data updated",
        summary,
    })
}

/// `GET /api/landlord/{building_id}/overview` → 200 + `BuildingOverview` JSON
pub async fn get_overview(
    State(state): State<Arc<AppState>>,
    Path(building_id): Path<String>,
) -> Json<BuildingOverview> {
    let overview = state.ledger().building_overview(&building_id);
    Json(overview)
}

/// `GET /api/landlord/{building_id}/units` → 200 + `UnitsResponse` JSON
pub async fn get_units(
    State(state): State<Arc<AppState>>,
    Path(building_id): Path<String>,
) -> Json<UnitsResponse> {
    let units = state.ledger().unit_rows(&building_id);
    Json(UnitsResponse { units })
}

/// Applies a quota or medical-accommodation edit.
///
/// `PATCH /api/landlord/unit/{unit_id}/quota` → 200 + `QuotaResponse` JSON,
/// 404 for an unknown unit, 400 for a negative or non-finite quota.
pub async fn patch_quota(
    State(state): State<Arc<AppState>>,
    Path(unit_id): Path<String>,
    Json(update): Json<QuotaUpdate>,
) -> Result<Json<QuotaResponse>, ApiError> {
    let unit = state
        .ledger()
        .update_quota(&unit_id, &update)
        .map_err(ledger_error)?;
    Ok(Json(QuotaResponse {
        success: true,
        unit,
    }))
}

/// Landlord report as a CSV attachment.
///
/// `GET /api/landlord/{building_id}/export` → 200 + `text/csv`
pub async fn get_export(
    State(state): State<Arc<AppState>>,
    Path(building_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.ledger().unit_rows(&building_id);
    let mut body = Vec::new();
    write_report_csv(&rows, &mut body)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let disposition = format!(
        "attachment; filename=\"verdant-report-{building_id}-{}.csv\"",
        Utc::now().format("%Y-%m-%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// `GET /api/tenant/{id}/summary` → 200 + `TenantSummary` JSON, or 404
pub async fn get_tenant_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TenantSummary>, ApiError> {
    let summary = state.ledger().tenant_summary(&id).map_err(ledger_error)?;
    Ok(Json(summary))
}

/// `GET /api/tenant/{id}/usage` → 200 + `TenantUsage` JSON, or 404
pub async fn get_tenant_usage(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TenantUsage>, ApiError> {
    let usage = state.ledger().tenant_usage(&id).map_err(ledger_error)?;
    Ok(Json(usage))
}

/// `POST /api/tenant/{id}/acknowledge` → 200 + `AcknowledgeResponse` JSON, or 404
pub async fn post_acknowledge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AcknowledgeRequest>,
) -> Result<Json<AcknowledgeResponse>, ApiError> {
    let ids = state
        .ledger()
        .acknowledge_suggestion(&id, &req.suggestion_id)
        .map_err(ledger_error)?;
    Ok(Json(AcknowledgeResponse {
        success: true,
        acknowledged_suggestion_ids: ids,
    }))
}
