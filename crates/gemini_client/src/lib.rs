//! Gemini recommendation client.
//!
//! Asks `generateContent` for places matching a mood, with the Google Maps
//! grounding tool pinned to the user's location, and turns the grounded
//! map chunks into `Place` records.
//!
//! Requests are sent exactly once. Retrying is left to the user.

pub mod prompt;
pub mod response;

use async_trait::async_trait;
use common::config::GeminiConfig;
use common::{Error, FilterConfig, GeoLocation, Recommendation};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

pub use prompt::build_prompt;
pub use response::{GenerateContentResponse, EMPTY_SUMMARY};

/// Max characters of an error body kept in error messages.
const ERROR_BODY_LIMIT: usize = 500;

/// Source of place recommendations for a mood near a location.
#[async_trait]
pub trait RecommendationProvider: Send + Sync {
    async fn fetch_recommendations(
        &self,
        mood: &str,
        location: GeoLocation,
        filters: &FilterConfig,
    ) -> Result<Recommendation, Error>;
}

#[async_trait]
impl<P: RecommendationProvider + ?Sized> RecommendationProvider for Arc<P> {
    async fn fetch_recommendations(
        &self,
        mood: &str,
        location: GeoLocation,
        filters: &FilterConfig,
    ) -> Result<Recommendation, Error> {
        (**self).fetch_recommendations(mood, location, filters).await
    }
}

/// Gemini API client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, config: &GeminiConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent("moodmap/0.1")
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Http(format!("failed to build Gemini HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Request body for one recommendation call.
    pub fn request_body(
        mood: &str,
        location: GeoLocation,
        filters: &FilterConfig,
    ) -> serde_json::Value {
        json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": build_prompt(mood, location, filters) }]
                }
            ],
            "tools": [{ "googleMaps": {} }],
            "toolConfig": {
                "retrievalConfig": {
                    "latLng": {
                        "latitude": location.latitude,
                        "longitude": location.longitude
                    }
                }
            }
        })
    }

    #[instrument(skip(self, filters), fields(model = %self.model))]
    pub async fn generate(
        &self,
        mood: &str,
        location: GeoLocation,
        filters: &FilterConfig,
    ) -> Result<Recommendation, Error> {
        if self.api_key.trim().is_empty() {
            return Err(Error::MissingApiKey);
        }

        let payload = Self::request_body(mood, location, filters);
        debug!("POST {} at {}", self.endpoint(), location);

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Http(format!("Gemini request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::GeminiApi {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let parsed: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| Error::Gemini(format!("response parse error: {e}")))?;

        let recommendation = parsed.into_recommendation(mood);
        info!(
            "Gemini returned {} grounded places for \"{}\"",
            recommendation.places.len(),
            mood
        );
        Ok(recommendation)
    }
}

#[async_trait]
impl RecommendationProvider for GeminiClient {
    async fn fetch_recommendations(
        &self,
        mood: &str,
        location: GeoLocation,
        filters: &FilterConfig,
    ) -> Result<Recommendation, Error> {
        self.generate(mood, location, filters).await
    }
}

/// Pull the message out of a Gemini error envelope, or fall back to the
/// truncated raw body.
fn error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<response::ApiErrorResponse>(body) {
        return match parsed.error.status {
            Some(status) => format!("{status}: {}", parsed.error.message),
            None => parsed.error.message,
        };
    }
    body.chars().take(ERROR_BODY_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_pins_location_and_tool() {
        let body = GeminiClient::request_body(
            "Quick Bite",
            GeoLocation::new(52.52, 13.405),
            &FilterConfig::default(),
        );

        assert_eq!(body["tools"][0]["googleMaps"], json!({}));
        assert_eq!(
            body["toolConfig"]["retrievalConfig"]["latLng"]["latitude"],
            json!(52.52)
        );
        assert_eq!(
            body["toolConfig"]["retrievalConfig"]["latLng"]["longitude"],
            json!(13.405)
        );
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("\"Quick Bite\""));
    }

    #[test]
    fn test_endpoint_uses_model_and_trims_base_url() {
        let config = GeminiConfig {
            model: "gemini-2.5-flash".into(),
            base_url: "http://localhost:9999/".into(),
            request_timeout_secs: 5,
        };
        let client = GeminiClient::new("key".into(), &config).unwrap();

        assert_eq!(
            client.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_error_message_prefers_envelope() {
        assert_eq!(
            error_message(r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#),
            "PERMISSION_DENIED: API key not valid"
        );
        let long = "x".repeat(2000);
        assert_eq!(error_message(&long).len(), ERROR_BODY_LIMIT);
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let config = GeminiConfig {
            base_url: "http://127.0.0.1:1".into(),
            ..GeminiConfig::default()
        };
        let client = GeminiClient::new("  ".into(), &config).unwrap();

        let err = client
            .fetch_recommendations("Work", GeoLocation::new(0.0, 0.0), &FilterConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingApiKey));
        assert!(err.is_provider_failure());
    }
}
