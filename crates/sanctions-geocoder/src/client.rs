//! Typed client for the Nominatim `reverse` endpoint.

use std::time::Duration;

use serde::Deserialize;

use crate::config::{ConfigError, GeocoderConfig};
use crate::error::GeocodeError;
use crate::rate_limit::RateLimiter;
use crate::ReverseGeocoder;

/// Output format requested from the provider.
const FORMAT: &str = "jsonv2";

/// The subset of the reverse response the engine reads. Nominatim returns
/// many more fields; they are ignored.
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Rate-limited reverse geocoding client.
#[derive(Debug, Clone)]
pub struct GeocoderClient {
    http: reqwest::Client,
    reverse_url: url::Url,
    zoom: u8,
    language: String,
    limiter: RateLimiter,
}

impl GeocoderClient {
    /// Create a client with its own limiter, spaced by `config.min_interval`.
    pub fn new(config: GeocoderConfig) -> Result<Self, GeocodeError> {
        let limiter = RateLimiter::new(config.min_interval);
        Self::with_limiter(config, limiter)
    }

    /// Create a client that shares an existing limiter.
    pub fn with_limiter(config: GeocoderConfig, limiter: RateLimiter) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(GeocodeError::Http)?;
        let reverse_url = config
            .base_url
            .join("reverse")
            .map_err(|e| ConfigError::InvalidUrl("base_url".into(), e.to_string()))?;

        Ok(Self {
            http,
            reverse_url,
            zoom: config.zoom,
            language: config.language,
            limiter,
        })
    }

    /// The limiter governing this client (shared by its clones).
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Resolve `(lat, lon)` to the provider's `display_name`.
    ///
    /// Calls `GET {base_url}/reverse?format=jsonv2&lat=..&lon=..&zoom=..&accept-language=..`.
    pub async fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<String, GeocodeError> {
        let zoom = self.zoom.to_string();
        let (lat_s, lon_s) = (lat.to_string(), lon.to_string());
        let query = [
            ("format", FORMAT),
            ("lat", lat_s.as_str()),
            ("lon", lon_s.as_str()),
            ("zoom", zoom.as_str()),
            ("accept-language", self.language.as_str()),
        ];

        let resp = crate::retry::retry_send(|| {
            self.limiter
                .run(|| self.http.get(self.reverse_url.clone()).query(&query).send())
        })
        .await
        .map_err(GeocodeError::Http)?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!(lat, lon, status, "geocoder returned non-success status");
            return Err(GeocodeError::Status { status, body });
        }

        let parsed: ReverseResponse = resp.json().await.map_err(GeocodeError::Deserialization)?;
        match (parsed.display_name, parsed.error) {
            (_, Some(error)) => Err(GeocodeError::Provider(error)),
            (Some(name), None) if !name.trim().is_empty() => {
                tracing::debug!(lat, lon, place_name = %name, "reverse geocoded");
                Ok(name)
            }
            _ => Err(GeocodeError::MissingDisplayName),
        }
    }
}

impl ReverseGeocoder for GeocoderClient {
    fn reverse_geocode(
        &self,
        lat: f64,
        lon: f64,
    ) -> impl std::future::Future<Output = Result<String, GeocodeError>> + Send {
        GeocoderClient::reverse_geocode(self, lat, lon)
    }
}
