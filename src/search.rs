//! One mood search: cache lookup, provider call on a miss, cache fill.

use common::{Error, FilterConfig, GeoLocation, Place};
use gemini_client::RecommendationProvider;
use geo_cache::{Clock, GeoCache, KeyValueStore, SystemClock};
use serde::Serialize;
use tracing::{info, instrument};

/// Raw result of a search, before the client-side pipeline runs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    /// Provider summary. Cache hits carry no summary.
    pub summary_text: Option<String>,
    pub places: Vec<Place>,
    pub from_cache: bool,
}

pub struct MoodSearch<P, S, C = SystemClock> {
    provider: P,
    cache: Option<GeoCache<S, C>>,
}

impl<P, S, C> MoodSearch<P, S, C>
where
    P: RecommendationProvider,
    S: KeyValueStore,
    C: Clock,
{
    pub fn new(provider: P, cache: Option<GeoCache<S, C>>) -> Self {
        Self { provider, cache }
    }

    pub fn cache(&self) -> Option<&GeoCache<S, C>> {
        self.cache.as_ref()
    }

    /// Search for `mood` near `location`. `refresh` skips the cache read but
    /// still stores the fresh result. Provider errors are returned as-is and
    /// nothing is cached for them.
    #[instrument(skip(self, filters), fields(cached = self.cache.is_some()))]
    pub async fn search(
        &self,
        mood: &str,
        location: GeoLocation,
        filters: &FilterConfig,
        refresh: bool,
    ) -> Result<SearchOutcome, Error> {
        if let Some(cache) = &self.cache {
            if !refresh {
                if let Some(places) = cache.get(mood, location.latitude, location.longitude) {
                    return Ok(SearchOutcome {
                        summary_text: None,
                        places,
                        from_cache: true,
                    });
                }
            }
        }

        info!("Fetching recommendations for \"{}\" at {}", mood, location);
        let recommendation = self
            .provider
            .fetch_recommendations(mood, location, filters)
            .await?;

        if let Some(cache) = &self.cache {
            cache.set(
                mood,
                location.latitude,
                location.longitude,
                &recommendation.places,
            );
        }

        Ok(SearchOutcome {
            summary_text: Some(recommendation.summary_text),
            places: recommendation.places,
            from_cache: false,
        })
    }
}
