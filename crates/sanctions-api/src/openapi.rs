//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into one OpenAPI document served
//! at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sanctioned-Region Compliance API",
        version = "0.3.0",
        description = "Fast-path sanction status checks and reconciliation administration for marketplace sellers.",
        license(name = "BUSL-1.1")
    ),
    paths(
        crate::routes::restrictions::check_sanction_status,
        crate::routes::restrictions::list_regions,
        crate::routes::restrictions::reconcile,
        crate::routes::restrictions::last_run,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::restrictions::CheckStatusRequest,
        crate::routes::restrictions::CheckStatusResponse,
        crate::routes::restrictions::RegionResponse,
    )),
    tags(
        (name = "restrictions", description = "Sanctioned-region restrictions"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_lists_every_restrictions_path() {
        let spec = ApiDoc::openapi();
        let paths: Vec<&String> = spec.paths.paths.keys().collect();
        for p in [
            "/restrictions/check-sanction-status",
            "/restrictions/regions",
            "/restrictions/reconcile",
            "/restrictions/last-run",
        ] {
            assert!(paths.iter().any(|k| k.as_str() == p), "missing {p}");
        }
    }
}
