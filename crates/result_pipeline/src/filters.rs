//! Per-place filter predicates.
//!
//! Absent optional fields take fixed defaults: a
//! missing rating counts as 0, a missing open status counts as closed, and
//! a missing distance cannot violate a distance bound.

use common::{FilterConfig, Place, PriceLevel};

/// Rating a place must reach to pass the top-rated filter.
pub const TOP_RATED_MIN: f64 = 4.5;

fn rating_or_zero(place: &Place) -> f64 {
    place.rating.unwrap_or(0.0)
}

pub fn meets_min_rating(place: &Place, min_rating: f64) -> bool {
    min_rating <= 0.0 || rating_or_zero(place) >= min_rating
}

pub fn meets_open_now(place: &Place, only_open_now: bool) -> bool {
    !only_open_now || place.is_open_now()
}

pub fn meets_top_rated(place: &Place, top_rated: bool) -> bool {
    !top_rated || rating_or_zero(place) >= TOP_RATED_MIN
}

pub fn meets_price_level(place: &Place, price_level: PriceLevel) -> bool {
    price_level == PriceLevel::Any || place.price_tier() == Some(price_level)
}

pub fn meets_max_distance(place: &Place, max_distance_km: Option<f64>) -> bool {
    match (max_distance_km, place.distance_km) {
        (Some(max), Some(distance)) => distance <= max,
        _ => true,
    }
}

/// All active filters, conjunctively.
pub fn passes(place: &Place, config: &FilterConfig) -> bool {
    meets_min_rating(place, config.min_rating)
        && meets_open_now(place, config.only_open_now)
        && meets_top_rated(place, config.top_rated)
        && meets_price_level(place, config.price_level)
        && meets_max_distance(place, config.max_distance_km)
}
