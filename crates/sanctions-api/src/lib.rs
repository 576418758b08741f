//! # sanctions-api: Axum Service for Sanctioned-Region Compliance
//!
//! Serves the fast-path sanction status check used by the marketplace at
//! listing time, administrative endpoints around the daily reconciliation
//! job, and health probes. Persistence is Postgres + PostGIS when
//! `DATABASE_URL` is set and in-memory otherwise.
//!
//! ## API Surface
//!
//! | Route                                      | Module                     |
//! |--------------------------------------------|----------------------------|
//! | `POST /restrictions/check-sanction-status` | [`routes::restrictions`]   |
//! | `GET /restrictions/regions`                | [`routes::restrictions`]   |
//! | `POST /restrictions/reconcile`             | [`routes::restrictions`]   |
//! | `GET /restrictions/last-run`               | [`routes::restrictions`]   |
//! | `GET /health/*`                            | [`routes::health`]         |
//! | `GET /openapi.json`                        | [`openapi`]                |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → admin handlers
//! TraceLayer → MetricsMiddleware → check-sanction-status
//! ```

pub mod auth;
pub mod bootstrap;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) and the onboarding fast path are mounted
/// outside the auth middleware so they remain accessible without
/// credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = match &state.config.auth_token {
        Some(token) => AuthConfig::with_token(token.clone()),
        None => AuthConfig::default(),
    };
    let metrics = state.metrics.clone();

    let admin = Router::new()
        .merge(routes::restrictions::admin_router())
        .merge(openapi::router())
        .layer(from_fn(auth::auth_middleware));

    let api = Router::new()
        .merge(routes::restrictions::public_router())
        .merge(admin)
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .layer(axum::Extension(metrics))
        .with_state(state.clone());

    let health = routes::health::router().with_state(state);

    Router::new().merge(health).merge(api)
}
