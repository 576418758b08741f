//! Reverse geocoder error types.

/// Errors from a reverse geocoding call. Every variant is local to one
/// lookup; none is fatal to the caller.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// HTTP transport error (after retries).
    #[error("HTTP error calling geocoder: {0}")]
    Http(#[source] reqwest::Error),
    /// The geocoder returned a non-2xx status.
    #[error("geocoder returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },
    /// The geocoder answered, but reported that it could not resolve the point.
    #[error("geocoder could not resolve point: {0}")]
    Provider(String),
    /// Response body was not the expected JSON.
    #[error("failed to deserialize geocoder response: {0}")]
    Deserialization(#[source] reqwest::Error),
    /// The response had neither `display_name` nor `error`.
    #[error("geocoder response has no display_name")]
    MissingDisplayName,
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}
