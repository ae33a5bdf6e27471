//! Client-side filter and sort over provider results.
//!
//! The pipeline borrows its input and always returns a fresh `Vec`, so the
//! raw (possibly cached) result list is never reordered or modified.

pub mod filters;

use common::{FilterConfig, Place, SortBy};
use std::cmp::Ordering;
use tracing::debug;

/// Filter-and-sort configured once, applied to any number of result lists.
#[derive(Debug, Clone, Default)]
pub struct ResultPipeline {
    config: FilterConfig,
}

impl ResultPipeline {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn apply(&self, places: &[Place]) -> Vec<Place> {
        apply(places, &self.config)
    }
}

fn compare(a: &Place, b: &Place, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::Rating => b
            .rating
            .unwrap_or(0.0)
            .total_cmp(&a.rating.unwrap_or(0.0)),
        SortBy::Distance => a
            .distance_km
            .unwrap_or(0.0)
            .total_cmp(&b.distance_km.unwrap_or(0.0)),
        SortBy::Relevance => b.intelligence_score.total_cmp(&a.intelligence_score),
    }
}

/// Keep the places passing every active filter, then stable-sort them by
/// the selected key. Equal keys keep their provider order.
pub fn apply(places: &[Place], config: &FilterConfig) -> Vec<Place> {
    let mut result: Vec<Place> = places
        .iter()
        .filter(|place| filters::passes(place, config))
        .cloned()
        .collect();

    // `sort_by` is stable.
    result.sort_by(|a, b| compare(a, b, config.sort_by));

    debug!(
        "Pipeline kept {}/{} places (sort_by={})",
        result.len(),
        places.len(),
        config.sort_by
    );
    result
}
