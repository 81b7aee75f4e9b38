//! REST API over the carbon ledger.
//!
//! - `GET /health`
//! - `POST /api/update`: full recompute and reward sync
//! - `GET /api/landlord/{building_id}/overview|units|export`
//! - `PATCH /api/landlord/unit/{unit_id}/quota`
//! - `GET /api/tenant/{id}/summary|usage`, `POST /api/tenant/{id}/acknowledge`

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::Router;
use axum::routing::{get, patch, post};
use tracing::info;

use crate::ledger::CarbonLedger;
use crate::store::InMemoryStore;

/// Application state shared across all request handlers.
///
/// The ledger sits behind one mutex held for each whole operation, so a
/// reader never observes a partially recomputed building.
pub struct AppState {
    ledger: Mutex<CarbonLedger<InMemoryStore>>,
}

impl AppState {
    pub fn new(ledger: CarbonLedger<InMemoryStore>) -> Self {
        Self {
            ledger: Mutex::new(ledger),
        }
    }

    /// Locks the ledger. A poisoned lock is recovered since every ledger
    /// operation leaves units consistent before returning.
    pub fn ledger(&self) -> MutexGuard<'_, CarbonLedger<InMemoryStore>> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/update", post(handlers::post_update))
        .route(
            "/api/landlord/{building_id}/overview",
            get(handlers::get_overview),
        )
        .route("/api/landlord/{building_id}/units", get(handlers::get_units))
        .route(
            "/api/landlord/{building_id}/export",
            get(handlers::get_export),
        )
        .route(
            "/api/landlord/unit/{unit_id}/quota",
            patch(handlers::patch_quota),
        )
        .route("/api/tenant/{id}/summary", get(handlers::get_tenant_summary))
        .route("/api/tenant/{id}/usage", get(handlers::get_tenant_usage))
        .route(
            "/api/tenant/{id}/acknowledge",
            post(handlers::post_acknowledge),
        )
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
