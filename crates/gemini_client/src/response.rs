//! `generateContent` response types and their mapping to places.

use common::{Place, Recommendation};
use serde::Deserialize;
use std::collections::HashSet;

/// Summary used when the model returns no text.
pub const EMPTY_SUMMARY: &str = "No specific details found.";

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(rename = "groundingMetadata", default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GroundingMetadata {
    #[serde(rename = "groundingChunks", default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
pub struct GroundingChunk {
    #[serde(default)]
    pub maps: Option<MapsChunk>,
}

/// A grounded Google Maps place.
#[derive(Debug, Clone, Deserialize)]
pub struct MapsChunk {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "placeId", default)]
    pub place_id: Option<String>,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    pub fn summary_text(&self) -> String {
        let text: String = self
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            EMPTY_SUMMARY.to_string()
        } else {
            text
        }
    }

    /// Map chunks of the first candidate that carry a title.
    pub fn map_chunks(&self) -> Vec<&MapsChunk> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|meta| {
                meta.grounding_chunks
                    .iter()
                    .filter_map(|chunk| chunk.maps.as_ref())
                    .filter(|maps| maps.title.as_deref().is_some_and(|t| !t.trim().is_empty()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Convert into places. Provider order becomes the relevance score
    /// (first = highest); a repeated id keeps its first occurrence.
    pub fn into_recommendation(self, mood: &str) -> Recommendation {
        let summary_text = self.summary_text();
        let chunks = self.map_chunks();
        let total = chunks.len();

        let mut seen = HashSet::new();
        let mut places = Vec::with_capacity(total);
        for (rank, chunk) in chunks.into_iter().enumerate() {
            let id = chunk
                .place_id
                .clone()
                .or_else(|| chunk.uri.clone())
                .unwrap_or_else(|| format!("place-{}", rank + 1));
            if !seen.insert(id.clone()) {
                continue;
            }

            let mut place = Place::new(
                id,
                chunk.title.clone().unwrap_or_default().trim(),
                (total - rank) as f64,
            );
            place.map_uri = chunk.uri.clone();
            place.tags = vec![mood.to_string()];
            places.push(place);
        }

        Recommendation {
            summary_text,
            places,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_response() -> &'static str {
        r#"{
            "candidates": [
                {
                    "content": {
                        "role": "model",
                        "parts": [
                            {"text": "Here are some cozy cafes nearby. "},
                            {"text": "Sightglass is a favourite."}
                        ]
                    },
                    "groundingMetadata": {
                        "groundingChunks": [
                            {"maps": {"uri": "https://maps.google.com/?cid=1", "title": "Sightglass Coffee", "placeId": "places/ChIJ1"}},
                            {"web": {"uri": "https://example.com", "title": "A blog"}},
                            {"maps": {"uri": "https://maps.google.com/?cid=2", "title": "Blue Bottle"}},
                            {"maps": {"uri": "https://maps.google.com/?cid=3", "title": ""}},
                            {"maps": {"uri": "https://maps.google.com/?cid=1", "title": "Sightglass Coffee", "placeId": "places/ChIJ1"}},
                            {"maps": {"title": "Ritual Coffee"}}
                        ]
                    }
                }
            ]
        }"#
    }

    #[test]
    fn test_deserialize_generate_content_response() {
        let parsed: GenerateContentResponse =
            serde_json::from_str(sample_response()).expect("response should deserialize");

        assert_eq!(parsed.candidates.len(), 1);
        assert_eq!(
            parsed.summary_text(),
            "Here are some cozy cafes nearby. Sightglass is a favourite."
        );
        // web chunk and untitled map chunk are dropped
        assert_eq!(parsed.map_chunks().len(), 4);
    }

    #[test]
    fn test_into_recommendation_maps_places() {
        let parsed: GenerateContentResponse =
            serde_json::from_str(sample_response()).expect("response should deserialize");

        let rec = parsed.into_recommendation("Great Coffee");

        let ids: Vec<&str> = rec.places.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["places/ChIJ1", "https://maps.google.com/?cid=2", "place-4"]
        );
        assert_eq!(rec.places[0].title, "Sightglass Coffee");
        assert_eq!(
            rec.places[0].map_uri.as_deref(),
            Some("https://maps.google.com/?cid=1")
        );
        assert_eq!(rec.places[0].tags, vec!["Great Coffee".to_string()]);
        assert!(rec.places[2].map_uri.is_none());

        let scores: Vec<f64> = rec.places.iter().map(|p| p.intelligence_score).collect();
        assert_eq!(scores, vec![4.0, 3.0, 1.0]);
    }

    #[test]
    fn test_response_without_places_keeps_summary() {
        let parsed: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Nothing grounded."}]}}]}"#,
        )
        .unwrap();

        let rec = parsed.into_recommendation("Work");
        assert_eq!(rec.summary_text, "Nothing grounded.");
        assert!(rec.places.is_empty());
    }

    #[test]
    fn test_empty_response_uses_default_summary() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();

        let rec = parsed.into_recommendation("Work");
        assert_eq!(rec.summary_text, EMPTY_SUMMARY);
        assert!(rec.places.is_empty());
    }

    #[test]
    fn test_deserialize_api_error() {
        let parsed: ApiErrorResponse = serde_json::from_str(
            r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#,
        )
        .unwrap();

        assert_eq!(parsed.error.message, "Resource has been exhausted");
        assert_eq!(parsed.error.status.as_deref(), Some("RESOURCE_EXHAUSTED"));
    }
}
