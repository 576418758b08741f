//! Health probes, mounted outside the auth middleware.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use sanctions_engine::RegionCatalog;

use crate::state::AppState;

/// Build the health router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
}

/// Liveness probe: 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 once the region catalog is readable.
async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.store.list_regions().await {
        Ok(_) => (StatusCode::OK, "ready"),
        Err(e) => {
            tracing::warn!(backend = state.store.backend(), error = %e, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "catalog unavailable")
        }
    }
}
