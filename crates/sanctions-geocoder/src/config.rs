//! Geocoder client configuration.
//!
//! Defaults point at the public Nominatim instance. Override via environment
//! variables or explicit construction for self-hosted instances and tests.

use std::time::Duration;

use url::Url;

/// Default public endpoint.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Configuration for the reverse geocoder.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Base URL; always ends with `/`.
    pub base_url: Url,
    /// Descriptive `User-Agent` identifying this deployment to the provider.
    pub user_agent: String,
    /// Minimum spacing between consecutive requests.
    pub min_interval: Duration,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Nominatim zoom level; 5 resolves to state/province granularity.
    pub zoom: u8,
    /// Preferred result language (`accept-language`).
    pub language: String,
}

impl GeocoderConfig {
    /// Configuration with defaults for everything but the base URL and
    /// user agent.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if `base_url` does not parse, or
    /// `ConfigError::MissingUserAgent` if `user_agent` is blank.
    pub fn new(base_url: &str, user_agent: impl Into<String>) -> Result<Self, ConfigError> {
        let user_agent = user_agent.into();
        if user_agent.trim().is_empty() {
            return Err(ConfigError::MissingUserAgent);
        }
        Ok(Self {
            base_url: parse_base_url("base_url", base_url)?,
            user_agent,
            min_interval: Duration::from_millis(1000),
            timeout_secs: 10,
            zoom: 5,
            language: "en".to_string(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `GEOCODER_BASE_URL` (default: `https://nominatim.openstreetmap.org`)
    /// - `GEOCODER_USER_AGENT` (required)
    /// - `GEOCODER_MIN_INTERVAL_MS` (default: 1000)
    /// - `GEOCODER_TIMEOUT_SECS` (default: 10)
    /// - `GEOCODER_ZOOM` (default: 5)
    /// - `GEOCODER_LANGUAGE` (default: `en`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let user_agent =
            std::env::var("GEOCODER_USER_AGENT").map_err(|_| ConfigError::MissingUserAgent)?;
        let base = std::env::var("GEOCODER_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        if user_agent.trim().is_empty() {
            return Err(ConfigError::MissingUserAgent);
        }
        Ok(Self {
            base_url: parse_base_url("GEOCODER_BASE_URL", &base)?,
            user_agent,
            min_interval: Duration::from_millis(env_parse("GEOCODER_MIN_INTERVAL_MS", 1000)?),
            timeout_secs: env_parse("GEOCODER_TIMEOUT_SECS", 10)?,
            zoom: env_parse("GEOCODER_ZOOM", 5)?,
            language: std::env::var("GEOCODER_LANGUAGE").unwrap_or_else(|_| "en".into()),
        })
    }

    /// Whether `GEOCODER_USER_AGENT` is set, i.e. whether [`from_env`]
    /// can succeed at all. Services use this to run without a geocoder.
    ///
    /// [`from_env`]: Self::from_env
    pub fn is_configured() -> bool {
        std::env::var("GEOCODER_USER_AGENT").is_ok_and(|v| !v.trim().is_empty())
    }
}

fn parse_base_url(var: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn env_parse<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber(var.to_string(), raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GEOCODER_USER_AGENT environment variable is required")]
    MissingUserAgent,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid numeric value for {0}: {1:?}")]
    InvalidNumber(String, String),
}
