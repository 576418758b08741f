//! # Middleware
//!
//! Request metrics. Authentication lives in [`crate::auth`]; request tracing
//! is `tower_http::trace::TraceLayer`, installed in [`crate::app`].

pub mod metrics;
