//! Unified error type for moodmap.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("API Key is missing")]
    MissingApiKey,

    #[error("Gemini API error: {0}")]
    Gemini(String),

    #[error("Gemini API error (status={status}): {message}")]
    GeminiApi { status: u16, message: String },

    #[error("Location error: {0}")]
    Location(#[from] LocationFailure),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for failures of the recommendation call (network, auth, quota).
    /// These are reported with a retry hint and never retried automatically.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::MissingApiKey | Error::Gemini(_) | Error::GeminiApi { .. }
        )
    }
}

/// Why a location fix could not be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationFailure {
    #[error("Location permission denied.")]
    PermissionDenied,

    #[error("Location unavailable.")]
    Unavailable,

    #[error("Location request timed out.")]
    Timeout,

    #[error("Geolocation is not supported. Pass --lat/--lon or set MOODMAP_LATITUDE/MOODMAP_LONGITUDE.")]
    Unsupported,
}
