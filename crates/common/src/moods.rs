//! Built-in mood presets.

/// A selectable mood with the intent text sent to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodPreset {
    /// Intent text; also the cache fingerprint's mood component.
    pub id: &'static str,
    /// Short label shown in listings.
    pub label: &'static str,
    pub prompt: &'static str,
}

pub const MOOD_PRESETS: &[MoodPreset] = &[
    MoodPreset {
        id: "Productive Work",
        label: "Work",
        prompt: "quiet spots with wifi and power outlets where I can focus for a few hours",
    },
    MoodPreset {
        id: "Romantic Date",
        label: "Date Night",
        prompt: "intimate places with good atmosphere for a date",
    },
    MoodPreset {
        id: "Quick Bite",
        label: "Quick Bite",
        prompt: "fast, casual food I can grab without waiting long",
    },
    MoodPreset {
        id: "Budget Friendly",
        label: "Budget",
        prompt: "cheap places that are still good value",
    },
    MoodPreset {
        id: "Great Coffee",
        label: "Coffee",
        prompt: "cafes known for excellent coffee",
    },
    MoodPreset {
        id: "Fine Dining",
        label: "Fancy",
        prompt: "upscale restaurants for a special occasion",
    },
    MoodPreset {
        id: "Quiet & Cozy",
        label: "Quiet",
        prompt: "calm, cozy places where it is easy to talk or read",
    },
    MoodPreset {
        id: "Outdoorsy",
        label: "Outdoors",
        prompt: "parks, terraces and places to enjoy being outside",
    },
];

/// Look up a preset by label or id, ignoring case.
pub fn find_preset(input: &str) -> Option<&'static MoodPreset> {
    let needle = input.trim();
    MOOD_PRESETS
        .iter()
        .find(|p| p.label.eq_ignore_ascii_case(needle) || p.id.eq_ignore_ascii_case(needle))
}

/// Map user input to the mood text used for search and caching.
/// Presets resolve to their id; anything else is a custom mood.
pub fn resolve_mood(input: &str) -> String {
    match find_preset(input) {
        Some(preset) => preset.id.to_string(),
        None => input.trim().to_string(),
    }
}
