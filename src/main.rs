//! MoodMap: mood-driven place recommendations near you.
//!
//! Single-binary Tokio application that:
//! 1. Resolves the mood (preset or free text) and the user's location
//! 2. Serves results from the geo-bucketed cache when fresh
//! 3. Otherwise asks Gemini, grounded on Google Maps, and caches the answer
//! 4. Filters and sorts the places locally before printing them

mod config;
mod location;
mod output;
mod search;

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing::{error, info, warn};

use common::{resolve_mood, AppConfig, GeoLocation, PriceLevel, SortBy, MOOD_PRESETS};
use gemini_client::GeminiClient;
use geo_cache::{FileStore, GeoCache};
use location::{locate, ConfiguredLocation};
use output::Report;
use result_pipeline::ResultPipeline;
use search::MoodSearch;

/// Find places that match your mood.
#[derive(Parser, Debug)]
#[command(name = "moodmap", about = "Mood-driven place recommendations")]
struct Cli {
    /// Mood preset (label or id) or any free-text intent.
    #[arg(long)]
    mood: Option<String>,

    /// Latitude of the search location.
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude of the search location.
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    min_rating: Option<f64>,

    #[arg(long)]
    max_distance_km: Option<f64>,

    /// relevance, rating or distance.
    #[arg(long)]
    sort_by: Option<String>,

    #[arg(long)]
    open_now: bool,

    /// Only places rated 4.5 or higher.
    #[arg(long)]
    top_rated: bool,

    /// any, budget, moderate or expensive.
    #[arg(long)]
    price_level: Option<String>,

    /// Skip the cache read and fetch fresh results.
    #[arg(long)]
    refresh: bool,

    /// Neither read nor write the cache.
    #[arg(long)]
    no_cache: bool,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,

    /// Print the mood presets and exit.
    #[arg(long)]
    list_moods: bool,

    /// Remove expired cache entries and exit.
    #[arg(long)]
    prune_cache: bool,

    /// Path to a TOML config file (default: ./config.toml if present).
    #[arg(long)]
    config: Option<PathBuf>,
}

const EXIT_PROVIDER_FAILURE: u8 = 1;
const EXIT_LOCATION_FAILURE: u8 = 2;
const EXIT_CANCELLED: u8 = 130;

fn apply_cli_overrides(cfg: &mut AppConfig, cli: &Cli) -> anyhow::Result<()> {
    if let Some(lat) = cli.lat {
        cfg.location.latitude = Some(lat);
    }
    if let Some(lon) = cli.lon {
        cfg.location.longitude = Some(lon);
    }
    if let Some(min_rating) = cli.min_rating {
        cfg.filters.min_rating = min_rating;
    }
    if let Some(max_km) = cli.max_distance_km {
        cfg.filters.max_distance_km = Some(max_km);
    }
    if let Some(sort_by) = &cli.sort_by {
        cfg.filters.sort_by = SortBy::from(sort_by.as_str());
    }
    if cli.open_now {
        cfg.filters.only_open_now = true;
    }
    if cli.top_rated {
        cfg.filters.top_rated = true;
    }
    if let Some(raw) = &cli.price_level {
        cfg.filters.price_level = PriceLevel::from_str(raw)
            .map_err(|msg| anyhow!(common::Error::Config(msg)))?;
    }
    if cli.no_cache {
        cfg.cache.enabled = false;
    }
    Ok(())
}

fn print_moods() {
    for preset in MOOD_PRESETS {
        println!("{:<12} {:<18} {}", preset.label, preset.id, preset.prompt);
    }
}

fn prune_cache(cfg: &AppConfig) {
    let store = FileStore::open(&cfg.cache.path, cfg.cache.max_bytes);
    let removed = GeoCache::new(store).prune();
    println!("Pruned {removed} cache entries from {}", cfg.cache.path);
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    if cli.list_moods {
        print_moods();
        return Ok(ExitCode::SUCCESS);
    }

    let mut cfg = config::load_config(cli.config.as_deref())?;
    apply_cli_overrides(&mut cfg, &cli)?;
    config::validate_config(&cfg)?;

    if cli.prune_cache {
        prune_cache(&cfg);
        return Ok(ExitCode::SUCCESS);
    }

    let mood = cli
        .mood
        .as_deref()
        .map(resolve_mood)
        .filter(|m| !m.is_empty())
        .context("--mood is required (see --list-moods for presets)")?;

    // No search without a location fix.
    let provider = ConfiguredLocation(cfg.location.fixed());
    let timeout = Duration::from_secs(cfg.location.timeout_secs);
    let here: GeoLocation = match locate(&provider, timeout).await {
        Ok(loc) => loc,
        Err(failure) => {
            eprintln!("{failure}");
            eprintln!("Location is required to find places near you.");
            return Ok(ExitCode::from(EXIT_LOCATION_FAILURE));
        }
    };

    let client = GeminiClient::new(cfg.gemini_api_key.clone(), &cfg.gemini)?;
    let cache = if cfg.cache.enabled {
        info!("Using cache at {}", cfg.cache.path);
        Some(GeoCache::new(FileStore::open(
            &cfg.cache.path,
            cfg.cache.max_bytes,
        )))
    } else {
        info!("Cache disabled");
        None
    };
    let search = MoodSearch::new(client, cache);

    let outcome = tokio::select! {
        result = search.search(&mood, here, &cfg.filters, cli.refresh) => result?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Search cancelled");
            return Ok(ExitCode::from(EXIT_CANCELLED));
        }
    };

    let pipeline = ResultPipeline::new(cfg.filters.clone());
    let places = pipeline.apply(&outcome.places);

    let report = Report {
        mood: &mood,
        location: here,
        from_cache: outcome.from_cache,
        summary_text: outcome.summary_text.as_deref(),
        filters: pipeline.config(),
        total_places: outcome.places.len(),
        places: &places,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", output::render_text(&report));
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging. stdout is reserved for results.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "moodmap=info,geo_cache=info,gemini_client=info,result_pipeline=info".into()
            }),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            if let Some(err) = e.downcast_ref::<common::Error>() {
                if err.is_provider_failure() {
                    error!("Recommendation request failed: {}", err);
                    eprintln!("Failed to get recommendations: {err}");
                    eprintln!("Please try again by re-running the command.");
                    return ExitCode::from(EXIT_PROVIDER_FAILURE);
                }
            }
            error!("{:#}", e);
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
