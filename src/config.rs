//! Configuration loader. Merges the .env file, config.toml and env vars.

use common::config::AppConfig;
use common::{Error, GeoLocation};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn parse_f64(raw: &str, env_name: &str) -> Result<f64, Error> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| Error::Config(format!("{env_name} must be a number")))
}

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn parse_bool(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    lowered != "0" && lowered != "false" && lowered != "no" && lowered != "off"
}

pub fn validate_config(config: &AppConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.gemini.model.trim().is_empty() {
        issues.push("gemini.model must not be empty".into());
    }
    if config.gemini.base_url.trim().is_empty() {
        issues.push("gemini.base_url must not be empty".into());
    }
    if config.gemini.request_timeout_secs == 0 {
        issues.push("gemini.request_timeout_secs must be > 0".into());
    }

    if config.location.timeout_secs == 0 {
        issues.push("location.timeout_secs must be > 0".into());
    }
    match (config.location.latitude, config.location.longitude) {
        (Some(lat), Some(lon)) => {
            if !GeoLocation::new(lat, lon).is_valid() {
                issues.push(
                    "location must have latitude in [-90,90] and longitude in [-180,180]".into(),
                );
            }
        }
        (None, None) => {}
        _ => issues.push("location.latitude and location.longitude must be set together".into()),
    }

    if config.cache.enabled && config.cache.path.trim().is_empty() {
        issues.push("cache.path must not be empty when the cache is enabled".into());
    }
    if config.cache.max_bytes == Some(0) {
        issues.push("cache.max_bytes must be > 0 when set".into());
    }

    let filters = &config.filters;
    if !filters.min_rating.is_finite() || filters.min_rating < 0.0 || filters.min_rating > 5.0 {
        issues.push("filters.minRating must be in [0,5]".into());
    }
    if let Some(max_km) = filters.max_distance_km {
        if !max_km.is_finite() || max_km <= 0.0 {
            issues.push("filters.maxDistanceKm must be > 0".into());
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Apply environment overrides. `lookup` is `std::env::var` in production.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), Error>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup("GEMINI_API_KEY").or_else(|| lookup("API_KEY")) {
        config.gemini_api_key = key.trim().to_string();
    }
    if let Some(model) = lookup("MOODMAP_MODEL") {
        config.gemini.model = model.trim().to_string();
    }
    if let Some(raw) = lookup("MOODMAP_LATITUDE") {
        config.location.latitude = Some(parse_f64(&raw, "MOODMAP_LATITUDE")?);
    }
    if let Some(raw) = lookup("MOODMAP_LONGITUDE") {
        config.location.longitude = Some(parse_f64(&raw, "MOODMAP_LONGITUDE")?);
    }
    if let Some(raw) = lookup("MOODMAP_LOCATION_TIMEOUT_SECS") {
        config.location.timeout_secs = parse_positive_u64(&raw, "MOODMAP_LOCATION_TIMEOUT_SECS")?;
    }
    if let Some(path) = lookup("MOODMAP_CACHE_PATH") {
        config.cache.path = path.trim().to_string();
    }
    if let Some(raw) = lookup("MOODMAP_CACHE_ENABLED") {
        config.cache.enabled = parse_bool(&raw);
    }
    Ok(())
}

/// Load configuration from .env, an optional TOML file and the environment.
/// Validation runs separately, after CLI overrides.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = AppConfig::default();

    // 3. Config file. An explicit path must exist; the default one is optional.
    let explicit = path.is_some();
    let config_path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", config_path.display(), e))
        })?;
        config = toml::from_str(&contents).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", config_path.display(), e))
        })?;
    } else if explicit {
        return Err(Error::Config(format!(
            "Config file {} not found",
            config_path.display()
        )));
    }

    // 4. Environment variables (highest priority short of CLI flags).
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        validate_config(&AppConfig::default()).expect("defaults should validate");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("API_KEY", "fallback"),
                ("GEMINI_API_KEY", " primary "),
                ("MOODMAP_LATITUDE", "40.7128"),
                ("MOODMAP_LONGITUDE", "-74.006"),
                ("MOODMAP_CACHE_ENABLED", "off"),
                ("MOODMAP_LOCATION_TIMEOUT_SECS", "3"),
            ]),
        )
        .unwrap();

        assert_eq!(config.gemini_api_key, "primary");
        assert_eq!(config.location.fixed(), Some(GeoLocation::new(40.7128, -74.006)));
        assert!(!config.cache.enabled);
        assert_eq!(config.location.timeout_secs, 3);
    }

    #[test]
    fn test_env_override_rejects_bad_numbers() {
        let mut config = AppConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("MOODMAP_LATITUDE", "north")]))
            .unwrap_err();
        assert!(err.to_string().contains("MOODMAP_LATITUDE"));

        let err = apply_env_overrides(
            &mut config,
            env(&[("MOODMAP_LOCATION_TIMEOUT_SECS", "0")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("MOODMAP_LOCATION_TIMEOUT_SECS"));
    }

    #[test]
    fn test_validate_collects_all_issues() {
        let mut config = AppConfig::default();
        config.filters.min_rating = -1.0;
        config.location.latitude = Some(120.0);
        config.location.longitude = Some(0.0);
        config.location.timeout_secs = 0;

        let msg = validate_config(&config).unwrap_err().to_string();
        assert!(msg.contains("filters.minRating"));
        assert!(msg.contains("latitude in [-90,90]"));
        assert!(msg.contains("location.timeout_secs"));
    }

    #[test]
    fn test_validate_requires_both_coordinates() {
        let mut config = AppConfig::default();
        config.location.latitude = Some(10.0);

        let msg = validate_config(&config).unwrap_err().to_string();
        assert!(msg.contains("must be set together"));
    }

    #[test]
    fn test_toml_round_trip_of_filters() {
        let config: AppConfig = toml::from_str(
            r#"
            gemini_api_key = "abc"

            [location]
            latitude = 51.5072
            longitude = -0.1276

            [filters]
            minRating = 4.0
            sortBy = "rating"
            openNow = true
            priceLevel = "moderate"
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.location.timeout_secs, 10);
        assert_eq!(config.filters.min_rating, 4.0);
        assert_eq!(config.filters.sort_by, common::SortBy::Rating);
        assert!(config.filters.only_open_now);
        assert_eq!(config.filters.price_level, common::PriceLevel::Moderate);
        validate_config(&config).unwrap();
    }
}
