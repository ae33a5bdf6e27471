//! Application configuration types.

use serde::{Deserialize, Serialize};

use crate::types::{FilterConfig, GeoLocation};

/// Top-level moodmap configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini API key.
    #[serde(default)]
    pub gemini_api_key: String,

    /// Recommendation provider parameters.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Where the user is and how long to wait for a fix.
    #[serde(default)]
    pub location: LocationConfig,

    /// Result cache parameters.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Filters applied when none are given on the command line.
    #[serde(default)]
    pub filters: FilterConfig,
}

/// Gemini endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Model id; must support the Google Maps grounding tool.
    #[serde(default = "default_model")]
    pub model: String,

    /// API root, without the `/v1beta` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Location settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,

    /// Bounded wait for a location fix (seconds).
    #[serde(default = "default_location_timeout")]
    pub timeout_secs: u64,
}

/// Cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// JSON file backing the key-value store.
    #[serde(default = "default_cache_path")]
    pub path: String,

    /// Optional cap on stored bytes; writes beyond it are dropped.
    #[serde(default)]
    pub max_bytes: Option<usize>,
}

impl LocationConfig {
    /// The configured fix, if both coordinates are set.
    pub fn fixed(&self) -> Option<GeoLocation> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GeoLocation::new(lat, lon)),
            _ => None,
        }
    }
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn default_request_timeout() -> u64 {
    60
}

fn default_location_timeout() -> u64 {
    10
}

fn default_cache_path() -> String {
    "moodmap-cache.json".into()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            timeout_secs: default_location_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_cache_path(),
            max_bytes: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            gemini: GeminiConfig::default(),
            location: LocationConfig::default(),
            cache: CacheConfig::default(),
            filters: FilterConfig::default(),
        }
    }
}
