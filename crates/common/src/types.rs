//! Domain types shared across moodmap.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Location ──────────────────────────────────────────────────────────

/// A latitude/longitude fix in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when both coordinates are finite and inside WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.latitude, self.longitude)
    }
}

// ── Place Types ───────────────────────────────────────────────────────

/// A recommended place. Only `id`, `title` and `intelligence_score` are
/// guaranteed; the provider may omit everything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_rating_count: Option<u32>,
    /// Free-form status from the provider, e.g. "Open now" or "Closed".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "googleMapsUri")]
    pub map_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// "$" through "$$$$", or the Google `PRICE_LEVEL_*` spelling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Relevance assigned by the provider's ranking. Default ordering key.
    #[serde(default)]
    pub intelligence_score: f64,
}

impl Place {
    /// A place with only the required fields set.
    pub fn new(id: impl Into<String>, title: impl Into<String>, intelligence_score: f64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            address: None,
            rating: None,
            user_rating_count: None,
            open_status: None,
            map_uri: None,
            distance_km: None,
            image_url: None,
            description: None,
            price_level: None,
            tags: Vec::new(),
            intelligence_score,
        }
    }

    /// Whether the provider marked this place as currently open.
    /// Missing status counts as not open.
    pub fn is_open_now(&self) -> bool {
        let Some(status) = self.open_status.as_deref() else {
            return false;
        };
        let status = status.trim().to_ascii_lowercase();
        status == "open"
            || status == "open_now"
            || status.starts_with("open ")
            || status.starts_with("open,")
    }

    /// The price bucket this place falls into, if its price level is known.
    pub fn price_tier(&self) -> Option<PriceLevel> {
        let raw = self.price_level.as_deref()?.trim();
        match raw.to_ascii_uppercase().as_str() {
            "$" | "PRICE_LEVEL_INEXPENSIVE" | "INEXPENSIVE" | "BUDGET" | "CHEAP" => {
                Some(PriceLevel::Budget)
            }
            "$$" | "PRICE_LEVEL_MODERATE" | "MODERATE" => Some(PriceLevel::Moderate),
            "$$$" | "$$$$" | "PRICE_LEVEL_EXPENSIVE" | "PRICE_LEVEL_VERY_EXPENSIVE"
            | "EXPENSIVE" | "VERY_EXPENSIVE" => Some(PriceLevel::Expensive),
            _ => None,
        }
    }
}

/// The provider's answer: a free-text summary plus grounded places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub summary_text: String,
    pub places: Vec<Place>,
}

// ── Filter Types ──────────────────────────────────────────────────────

/// Ordering applied to results after filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum SortBy {
    #[default]
    Relevance,
    Rating,
    Distance,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::Rating => "rating",
            SortBy::Distance => "distance",
        }
    }
}

/// Unrecognized values fall back to relevance.
impl From<&str> for SortBy {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "rating" => SortBy::Rating,
            "distance" => SortBy::Distance,
            _ => SortBy::Relevance,
        }
    }
}

impl From<String> for SortBy {
    fn from(raw: String) -> Self {
        SortBy::from(raw.as_str())
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price bucket selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceLevel {
    #[default]
    Any,
    Budget,
    Moderate,
    Expensive,
}

impl PriceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceLevel::Any => "any",
            PriceLevel::Budget => "budget",
            PriceLevel::Moderate => "moderate",
            PriceLevel::Expensive => "expensive",
        }
    }
}

impl FromStr for PriceLevel {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(PriceLevel::Any),
            "budget" | "$" => Ok(PriceLevel::Budget),
            "moderate" | "$$" => Ok(PriceLevel::Moderate),
            "expensive" | "$$$" | "$$$$" => Ok(PriceLevel::Expensive),
            other => Err(format!(
                "unknown price level '{other}' (expected any, budget, moderate, expensive)"
            )),
        }
    }
}

impl fmt::Display for PriceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-selected filters and ordering. Both filter shapes the app has used
/// (`minRating`/`maxDistanceKm`/`onlyOpenNow` and `topRated`/`priceLevel`/
/// `openNow`) are covered by this one struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterConfig {
    /// Minimum rating; 0 disables the filter.
    pub min_rating: f64,
    /// Upper bound on distance. Places without a distance are kept.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_distance_km: Option<f64>,
    pub sort_by: SortBy,
    #[serde(alias = "openNow")]
    pub only_open_now: bool,
    /// Keep only places rated 4.5 or higher.
    pub top_rated: bool,
    pub price_level: PriceLevel,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_rating: 0.0,
            max_distance_km: None,
            sort_by: SortBy::Relevance,
            only_open_now: false,
            top_rated: false,
            price_level: PriceLevel::Any,
        }
    }
}
