//! API request and response bodies.

use axum::Json;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::cpi::batch::RecomputeSummary;
use crate::cpi::report::UnitRow;
use crate::error::LedgerError;

/// Liveness probe body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Result of a full recompute triggered over the API.
#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub message: &'static str,
    pub summary: RecomputeSummary,
}

/// Landlord unit table.
#[derive(Debug, Serialize)]
pub struct UnitsResponse {
    pub units: Vec<UnitRow>,
}

/// Result of a quota edit: the rescored unit row.
#[derive(Debug, Serialize)]
pub struct QuotaResponse {
    pub success: bool,
    pub unit: UnitRow,
}

/// Body of `POST /api/tenant/{id}/acknowledge`.
#[derive(Debug, Deserialize)]
pub struct AcknowledgeRequest {
    #[serde(alias = "tipId")]
    pub suggestion_id: String,
}

#[derive(Debug, Serialize)]
pub struct AcknowledgeResponse {
    pub success: bool,
    pub acknowledged_suggestion_ids: Vec<String>,
}

/// Error response body for 4xx/5xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// Status code and JSON body returned by failing handlers.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Builds an error response with the given status.
pub fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Maps ledger failures onto HTTP statuses: lookups to 404, rejected input to 400.
pub fn ledger_error(err: LedgerError) -> ApiError {
    let status = match err {
        LedgerError::UnitNotFound(_) | LedgerError::TenantNotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::InvalidInput(_) | LedgerError::Ingest(_) => StatusCode::BAD_REQUEST,
    };
    api_error(status, err.to_string())
}
