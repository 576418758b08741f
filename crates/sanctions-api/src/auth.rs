//! # Authentication Middleware
//!
//! Static bearer-token authentication. Every route except the health probes
//! requires `Authorization: Bearer <AUTH_TOKEN>` when a token is configured;
//! with no token configured the middleware lets everything through.

use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::{ErrorBody, ErrorDetail};

/// Auth configuration injected into request extensions.
///
/// The token is wiped from memory on drop, and `Debug` redacts it.
#[derive(Clone, Default)]
pub struct AuthConfig {
    pub token: Option<Zeroizing<String>>,
}

impl AuthConfig {
    /// Require the given bearer token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(Zeroizing::new(token.into())),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Constant-time comparison of bearer tokens.
///
/// A length mismatch still performs a comparison so timing does not reveal
/// the expected length.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Validate the `Authorization` header against [`AuthConfig`] in the request
/// extensions.
pub async fn auth_middleware(request: Request, next: Next) -> Response {
    let expected = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|c| c.token.clone());

    let Some(expected) = expected else {
        return next.run(request).await;
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let rejection = match auth_header.map(|h| h.strip_prefix("Bearer ")) {
        Some(Some(provided)) if constant_time_token_eq(provided, &expected) => None,
        Some(Some(_)) => Some("invalid bearer token"),
        Some(None) => Some("authorization header must use Bearer scheme"),
        None => Some("missing authorization header"),
    };

    match rejection {
        None => next.run(request).await,
        Some(reason) => {
            tracing::warn!(reason, "authentication failed");
            unauthorized_response(reason)
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            details: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn test_app(auth: AuthConfig) -> Router {
        Router::new()
            .route("/test", get(|| async { "ok" }))
            .layer(from_fn(auth_middleware))
            .layer(axum::Extension(auth))
    }

    async fn status_with(auth: AuthConfig, header_value: Option<&str>) -> StatusCode {
        let mut builder = Request::builder().uri("/test");
        if let Some(v) = header_value {
            builder = builder.header("Authorization", v);
        }
        test_app(auth)
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn valid_bearer_token_accepted() {
        let status = status_with(AuthConfig::with_token("my-secret"), Some("Bearer my-secret")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn wrong_token_rejected() {
        let status = status_with(AuthConfig::with_token("my-secret"), Some("Bearer nope")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_header_rejected() {
        let status = status_with(AuthConfig::with_token("my-secret"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn basic_scheme_rejected() {
        let status = status_with(AuthConfig::with_token("my-secret"), Some("Basic bXk6c2VjcmV0")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn no_token_configured_allows_all() {
        let status = status_with(AuthConfig::default(), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn constant_time_eq_handles_length_mismatch() {
        assert!(constant_time_token_eq("abc", "abc"));
        assert!(!constant_time_token_eq("abc", "abcd"));
        assert!(!constant_time_token_eq("abd", "abc"));
    }

    #[test]
    fn debug_redacts_token() {
        let rendered = format!("{:?}", AuthConfig::with_token("super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
