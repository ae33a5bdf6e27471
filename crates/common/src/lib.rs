//! Shared types, config, and error definitions for moodmap.

pub mod config;
pub mod error;
pub mod moods;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, LocationFailure};
pub use moods::{find_preset, resolve_mood, MoodPreset, MOOD_PRESETS};
pub use types::*;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
