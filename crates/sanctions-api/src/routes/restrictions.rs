//! # Restrictions API
//!
//! - `POST /restrictions/check-sanction-status` answers whether a point lies
//!   in any cataloged region. It is a pure geofence test and does **not**
//!   consult the reverse geocoder, so it may disagree with the daily job
//!   near borders. It never requires a bearer token.
//! - `GET /restrictions/regions` lists the catalog without coordinates.
//! - `POST /restrictions/reconcile` runs a pass now.
//! - `GET /restrictions/last-run` returns the most recent pass report.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use sanctions_core::{GeoPoint, RegionSummary, ValidationError};
use sanctions_engine::{PassReport, RegionCatalog};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Fast-path status check request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckStatusRequest {
    /// Degrees, in [-90, 90].
    pub latitude: f64,
    /// Degrees, in [-180, 180].
    pub longitude: f64,
}

impl CheckStatusRequest {
    fn point(&self) -> Result<GeoPoint, ValidationError> {
        GeoPoint::from_lat_lon(self.latitude, self.longitude)
    }
}

impl Validate for CheckStatusRequest {
    fn validate(&self) -> Result<(), String> {
        self.point().map(|_| ()).map_err(|e| e.to_string())
    }
}

/// Fast-path status check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckStatusResponse {
    pub is_sanctioned: bool,
}

/// A cataloged region, without coordinates.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegionResponse {
    /// Jurisdiction name, e.g. `north_korea`.
    pub location: String,
    /// `Polygon` or `MultiPolygon`.
    pub geometry_type: String,
    pub polygon_count: usize,
    pub vertex_count: usize,
}

impl From<RegionSummary> for RegionResponse {
    fn from(s: RegionSummary) -> Self {
        Self {
            location: s.location.as_str().to_string(),
            geometry_type: s.geometry_type,
            polygon_count: s.polygon_count,
            vertex_count: s.vertex_count,
        }
    }
}

/// The onboarding fast path. Mounted without authentication.
pub fn public_router() -> Router<AppState> {
    Router::new().route("/restrictions/check-sanction-status", post(check_sanction_status))
}

/// Catalog and reconciliation administration.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/restrictions/regions", get(list_regions))
        .route("/restrictions/reconcile", post(reconcile))
        .route("/restrictions/last-run", get(last_run))
}

/// POST /restrictions/check-sanction-status: Geofence test for a point.
#[utoipa::path(
    post,
    path = "/restrictions/check-sanction-status",
    request_body = CheckStatusRequest,
    responses(
        (status = 200, description = "Whether the point is in a sanctioned region", body = CheckStatusResponse),
        (status = 400, description = "Non-numeric or out-of-range coordinates", body = crate::error::ErrorBody),
        (status = 500, description = "Region store failure", body = crate::error::ErrorBody),
    ),
    tag = "restrictions"
)]
pub(crate) async fn check_sanction_status(
    State(state): State<AppState>,
    body: Result<Json<CheckStatusRequest>, JsonRejection>,
) -> Result<Json<CheckStatusResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let point = req.point()?;
    let is_sanctioned = state.store.intersects_any(point).await?;
    tracing::debug!(%point, is_sanctioned, "sanction status checked");
    Ok(Json(CheckStatusResponse { is_sanctioned }))
}

/// GET /restrictions/regions: Catalog summary in catalog order.
#[utoipa::path(
    get,
    path = "/restrictions/regions",
    responses(
        (status = 200, description = "Cataloged regions", body = Vec<RegionResponse>),
    ),
    tag = "restrictions"
)]
pub(crate) async fn list_regions(
    State(state): State<AppState>,
) -> Result<Json<Vec<RegionResponse>>, AppError> {
    let regions = state.store.list_regions().await?;
    Ok(Json(regions.iter().map(|r| r.summary().into()).collect()))
}

/// POST /restrictions/reconcile: Run a reconciliation pass now.
///
/// The pass runs on its own task and completes even if the client goes away.
#[utoipa::path(
    post,
    path = "/restrictions/reconcile",
    responses(
        (status = 200, description = "Pass report", body = serde_json::Value),
        (status = 409, description = "A pass is already running", body = crate::error::ErrorBody),
        (status = 503, description = "No geocoder configured, or catalog unavailable", body = crate::error::ErrorBody),
    ),
    tag = "restrictions"
)]
pub(crate) async fn reconcile(State(state): State<AppState>) -> Result<Json<PassReport>, AppError> {
    let reconciler = state.reconciler.clone().ok_or_else(|| {
        AppError::ServiceUnavailable("reverse geocoder is not configured".into())
    })?;
    if reconciler.is_running() {
        return Err(AppError::Conflict("a reconciliation pass is already running".into()));
    }

    tracing::info!("manual reconciliation pass requested");
    let report = tokio::spawn(async move { reconciler.run_pass().await })
        .await
        .map_err(|e| AppError::Internal(format!("reconciliation task failed: {e}")))??;
    Ok(Json(report))
}

/// GET /restrictions/last-run: Report of the most recent pass.
#[utoipa::path(
    get,
    path = "/restrictions/last-run",
    responses(
        (status = 200, description = "Most recent pass report", body = serde_json::Value),
        (status = 404, description = "No pass has run yet", body = crate::error::ErrorBody),
    ),
    tag = "restrictions"
)]
pub(crate) async fn last_run(State(state): State<AppState>) -> Result<Json<PassReport>, AppError> {
    state
        .reconciler
        .as_ref()
        .and_then(|r| r.last_report())
        .map(Json)
        .ok_or_else(|| AppError::NotFound("no reconciliation pass has run yet".into()))
}
