//! # sanctions-geocoder: Reverse Geocoding Client
//!
//! Typed client for a Nominatim-compatible reverse geocoding API. The
//! compliance engine asks one question of it: "what is the place name at
//! this point?", and matches the answer against known jurisdiction names.
//!
//! ## Rate limiting
//!
//! Public geocoders enforce strict usage policies (Nominatim: at most one
//! request per second, with an identifying `User-Agent`). Every clone of a
//! [`GeocoderClient`] shares one [`RateLimiter`], so the whole process
//! issues at most one request at a time, spaced by the configured interval.
//! Retries go through the limiter too.
//!
//! ## API
//!
//! `GET {base_url}/reverse?format=jsonv2&lat={lat}&lon={lon}&zoom={zoom}&accept-language={lang}`
//!
//! Response: `{"display_name": "..."}` on success, `{"error": "..."}` when
//! the provider cannot resolve the point.

pub mod client;
pub mod config;
pub mod error;
pub mod rate_limit;
pub(crate) mod retry;

pub use client::GeocoderClient;
pub use config::{ConfigError, GeocoderConfig};
pub use error::GeocodeError;
pub use rate_limit::RateLimiter;

use std::future::Future;

/// Anything that can turn a point into a place name.
///
/// Implemented by [`GeocoderClient`]; the reconciliation engine is generic
/// over it so tests can substitute a scripted geocoder.
pub trait ReverseGeocoder: Send + Sync {
    /// Resolve `(lat, lon)` to a human-readable place name.
    fn reverse_geocode(
        &self,
        lat: f64,
        lon: f64,
    ) -> impl Future<Output = Result<String, GeocodeError>> + Send;
}
