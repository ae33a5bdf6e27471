//! Prompt text sent with each recommendation request.

use common::{find_preset, FilterConfig, GeoLocation, PriceLevel, SortBy};
use std::fmt::Write;

fn filter_instructions(filters: &FilterConfig) -> Vec<String> {
    let mut lines = Vec::new();

    if filters.only_open_now {
        lines.push("Strictly find places that are currently OPEN.".to_string());
    }
    if filters.top_rated {
        lines.push("Strictly find places with a rating of 4.5 or higher.".to_string());
    } else if filters.min_rating > 0.0 {
        lines.push(format!(
            "Strictly find places with a rating of {:.1} or higher.",
            filters.min_rating
        ));
    }
    match filters.price_level {
        PriceLevel::Any => {}
        PriceLevel::Budget => {
            lines.push("Look for budget-friendly / cheap options (Price level $).".to_string())
        }
        PriceLevel::Moderate => {
            lines.push("Look for moderately priced options (Price level $$).".to_string())
        }
        PriceLevel::Expensive => lines.push(
            "Look for expensive / high-end options (Price level $$$ or $$$$).".to_string(),
        ),
    }
    if let Some(max_km) = filters.max_distance_km {
        lines.push(format!("Only include places within {max_km} km of my location."));
    }

    lines
}

fn sort_instruction(sort_by: SortBy) -> &'static str {
    match sort_by {
        SortBy::Relevance => "Sort the suggestions by relevance to the mood.",
        SortBy::Rating => "Sort the suggestions strictly by highest rating first.",
        SortBy::Distance => {
            "Sort the suggestions strictly by closest distance to my location first."
        }
    }
}

/// Build the user prompt for `mood` at `location`.
pub fn build_prompt(mood: &str, location: GeoLocation, filters: &FilterConfig) -> String {
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "I am currently at latitude: {}, longitude: {}.",
        location.latitude, location.longitude
    );
    let _ = writeln!(prompt, "My current mood/intent is: \"{mood}\".");
    if let Some(preset) = find_preset(mood) {
        let _ = writeln!(prompt, "In other words, I am looking for {}.", preset.prompt);
    }
    prompt.push_str("\nPlease find 4-6 specific places near me that perfectly match this mood.\n\n");

    prompt.push_str("APPLY THESE FILTERS STRICTLY:\n");
    let instructions = filter_instructions(filters);
    if instructions.is_empty() {
        prompt.push_str("- No additional filters.\n");
    }
    for line in &instructions {
        let _ = writeln!(prompt, "- {line}");
    }

    let _ = writeln!(prompt, "\nSORTING ORDER:\n{}\n", sort_instruction(filters.sort_by));

    prompt.push_str(
        "For each place, provide a brief, engaging reason why it fits the mood, \
         mention its rating if available, and its general vibe.\n\n\
         Crucial: ensure you use the Google Maps tool to ground your response so I get real locations.\n\
         Structure the text response to be a helpful summary of the options.\n",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn here() -> GeoLocation {
        GeoLocation::new(37.7749, -122.4194)
    }

    #[test]
    fn test_prompt_contains_location_and_mood() {
        let prompt = build_prompt("rooftop drinks", here(), &FilterConfig::default());

        assert!(prompt.contains("latitude: 37.7749, longitude: -122.4194"));
        assert!(prompt.contains("\"rooftop drinks\""));
        assert!(prompt.contains("- No additional filters."));
        assert!(prompt.contains("Sort the suggestions by relevance to the mood."));
        assert!(!prompt.contains("In other words"));
    }

    #[test]
    fn test_prompt_expands_preset_moods() {
        let prompt = build_prompt("Great Coffee", here(), &FilterConfig::default());
        assert!(prompt.contains("In other words, I am looking for cafes known for excellent coffee."));
    }

    #[test]
    fn test_prompt_lists_active_filters() {
        let filters = FilterConfig {
            only_open_now: true,
            top_rated: true,
            min_rating: 3.5,
            price_level: PriceLevel::Expensive,
            max_distance_km: Some(2.5),
            sort_by: SortBy::Distance,
        };
        let prompt = build_prompt("Fine Dining", here(), &filters);

        assert!(prompt.contains("- Strictly find places that are currently OPEN."));
        assert!(prompt.contains("rating of 4.5 or higher"));
        // top-rated supersedes the looser minimum
        assert!(!prompt.contains("rating of 3.5"));
        assert!(prompt.contains("Price level $$$ or $$$$"));
        assert!(prompt.contains("within 2.5 km"));
        assert!(prompt.contains("closest distance to my location first"));
        assert!(!prompt.contains("No additional filters"));
    }

    #[test]
    fn test_prompt_min_rating_without_top_rated() {
        let filters = FilterConfig {
            min_rating: 4.0,
            sort_by: SortBy::Rating,
            ..FilterConfig::default()
        };
        let prompt = build_prompt("Quick Bite", here(), &filters);

        assert!(prompt.contains("rating of 4.0 or higher"));
        assert!(prompt.contains("highest rating first"));
    }
}
