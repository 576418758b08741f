//! # Integration Tests for sanctions-api
//!
//! Exercises the router end to end against the in-memory store: the
//! fast-path status check, catalog listing, manual reconciliation and its
//! report, authentication, and the OpenAPI document.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use sanctions_api::state::{AppConfig, AppState, ComplianceStore, ServiceReconciler};
use sanctions_core::{GeoPoint, SellerId};
use sanctions_engine::{MemoryStore, ReconcileConfig, Reconciler, SellerStore};
use sanctions_geocoder::{GeocoderClient, GeocoderConfig};
use sanctions_state::{SellerRecord, VisibleType};

fn seeded_store() -> MemoryStore {
    MemoryStore::seeded().unwrap()
}

/// Helper: build the test app with auth disabled and no geocoder.
fn test_app() -> axum::Router {
    sanctions_api::app(AppState::new(AppConfig::default(), seeded_store()))
}

/// Helper: build the test app with auth enabled.
fn test_app_with_auth(token: &str) -> axum::Router {
    let config = AppConfig {
        auth_token: Some(token.to_string()),
        ..AppConfig::default()
    };
    sanctions_api::app(AppState::new(config, seeded_store()))
}

/// Helper: app with a reconciliation job. The geocoder points at a closed
/// port; the tests only use sellers that never reach it.
fn test_app_with_reconciler(store: MemoryStore) -> axum::Router {
    let geocoder = GeocoderClient::new(
        GeocoderConfig::new("http://127.0.0.1:9", "sanctions-api-tests/0.1").unwrap(),
    )
    .unwrap();
    let reconciler: ServiceReconciler =
        Reconciler::new(ComplianceStore::from(store.clone()), geocoder, ReconcileConfig::default());
    let state = AppState::new(AppConfig::default(), store).with_reconciler(Arc::new(reconciler));
    sanctions_api::app(state)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Helper: read response body as JSON.
async fn body_json(response: axum::http::Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let response = test_app().oneshot(get("/health/liveness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_probe() {
    let response = test_app().oneshot(get("/health/readiness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_bypasses_auth() {
    let response = test_app_with_auth("secret")
        .oneshot(get("/health/liveness"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Fast-Path Status Check ---------------------------------------------------

#[tokio::test]
async fn test_point_in_north_korea_is_sanctioned() {
    let response = test_app()
        .oneshot(post_json(
            "/restrictions/check-sanction-status",
            r#"{"latitude": 37.5, "longitude": 123.5}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({"isSanctioned": true}));
}

#[tokio::test]
async fn test_null_island_is_not_sanctioned() {
    let response = test_app()
        .oneshot(post_json(
            "/restrictions/check-sanction-status",
            r#"{"latitude": 0, "longitude": 0}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["isSanctioned"], false);
}

#[tokio::test]
async fn test_non_numeric_coordinates_rejected() {
    let response = test_app()
        .oneshot(post_json(
            "/restrictions/check-sanction-status",
            r#"{"latitude": "bad", "longitude": null}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_out_of_range_coordinates_rejected() {
    let response = test_app()
        .oneshot(post_json(
            "/restrictions/check-sanction-status",
            r#"{"latitude": 91.0, "longitude": 10.0}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"]["message"].as_str().unwrap().contains("latitude"));
}

#[tokio::test]
async fn test_missing_fields_rejected() {
    let response = test_app()
        .oneshot(post_json("/restrictions/check-sanction-status", r#"{"latitude": 10}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_catalog_sanctions_nothing() {
    let app = sanctions_api::app(AppState::new(AppConfig::default(), MemoryStore::new()));
    let response = app
        .oneshot(post_json(
            "/restrictions/check-sanction-status",
            r#"{"latitude": 37.5, "longitude": 123.5}"#,
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["isSanctioned"], false);
}

// -- Catalog ------------------------------------------------------------------

#[tokio::test]
async fn test_regions_listed_in_catalog_order() {
    let response = test_app().oneshot(get("/restrictions/regions")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let regions = body.as_array().unwrap();
    assert_eq!(regions.first().unwrap()["location"], "cuba");
    let last = regions.last().unwrap();
    assert_eq!(last["location"], "russia");
    assert_eq!(last["geometry_type"], "MultiPolygon");
    assert_eq!(last["polygon_count"], 2);
}

// -- Reconciliation -----------------------------------------------------------

#[tokio::test]
async fn test_reconcile_without_geocoder_unavailable() {
    let response = test_app()
        .oneshot(post_empty("/restrictions/reconcile"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_last_run_not_found_before_first_pass() {
    let response = test_app_with_reconciler(seeded_store())
        .oneshot(get("/restrictions/last-run"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_manual_pass_restores_seller_outside_catalog() {
    let store = seeded_store();
    let mut moved = SellerRecord::new(
        SellerId::new("moved-away").unwrap(),
        VisibleType::Test,
        GeoPoint::from_lat_lon(48.85, 2.35).unwrap(),
    );
    moved.seller_type = sanctions_state::SellerType::Restricted;
    moved.pre_restriction_seller_type = Some(VisibleType::Test);
    store.insert_seller(moved);
    store.insert_seller(SellerRecord::new(
        SellerId::new("bystander").unwrap(),
        VisibleType::Active,
        GeoPoint::from_lat_lon(0.0, 0.0).unwrap(),
    ));

    let app = test_app_with_reconciler(store.clone());
    let response = app
        .clone()
        .oneshot(post_empty("/restrictions/reconcile"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["outcome"]["status"], "completed");
    assert_eq!(report["candidates"], 1);
    assert_eq!(report["unsanctioned"], 1);

    let restored = store
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.seller_id.as_str() == "moved-away")
        .unwrap();
    assert_eq!(restored.seller_type, sanctions_state::SellerType::Test);
    assert_eq!(restored.pre_restriction_seller_type, None);

    let last = app.oneshot(get("/restrictions/last-run")).await.unwrap();
    assert_eq!(last.status(), StatusCode::OK);
    assert_eq!(body_json(last).await["run_id"], report["run_id"]);
}

#[tokio::test]
async fn test_manual_pass_on_empty_catalog_reports_failure() {
    let response = test_app_with_reconciler(MemoryStore::new())
        .oneshot(post_empty("/restrictions/reconcile"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"]["message"], "An internal error occurred");
}

// -- Authentication -----------------------------------------------------------

#[tokio::test]
async fn test_auth_required_when_configured() {
    let response = test_app_with_auth("secret")
        .oneshot(get("/restrictions/regions"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_check_sanction_status_needs_no_token() {
    let response = test_app_with_auth("secret")
        .oneshot(post_json(
            "/restrictions/check-sanction-status",
            r#"{"latitude": 37.5, "longitude": 123.5}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["isSanctioned"], true);
}

#[tokio::test]
async fn test_auth_accepts_valid_token() {
    let request = Request::builder()
        .uri("/restrictions/regions")
        .header("Authorization", "Bearer secret")
        .body(Body::empty())
        .unwrap();
    let response = test_app_with_auth("secret").oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_document_served() {
    let response = test_app().oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"]["/restrictions/check-sanction-status"].is_object());
}
