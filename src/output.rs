//! Rendering of search results to stdout.

use common::{FilterConfig, GeoLocation, Place};
use serde::Serialize;
use std::fmt::Write;

/// JSON document printed with `--json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report<'a> {
    pub mood: &'a str,
    pub location: GeoLocation,
    pub from_cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_text: Option<&'a str>,
    pub filters: &'a FilterConfig,
    /// Places returned before filtering.
    pub total_places: usize,
    pub places: &'a [Place],
}

fn place_line(rank: usize, place: &Place) -> String {
    let mut line = format!("{rank}. {}", place.title);
    if let Some(rating) = place.rating {
        let _ = write!(line, "  ★ {rating:.1}");
        if let Some(count) = place.user_rating_count {
            let _ = write!(line, " ({count})");
        }
    }
    if let Some(price) = &place.price_level {
        let _ = write!(line, "  {price}");
    }
    if let Some(status) = &place.open_status {
        let _ = write!(line, "  {status}");
    }
    if let Some(km) = place.distance_km {
        let _ = write!(line, "  {km:.1} km");
    }
    line
}

/// Plain-text rendering of a report.
pub fn render_text(report: &Report<'_>) -> String {
    let mut out = String::new();

    let source = if report.from_cache { " [cached]" } else { "" };
    let _ = writeln!(out, "{} near {}{}", report.mood, report.location, source);
    if let Some(summary) = report.summary_text {
        let _ = writeln!(out, "\n{}", summary.trim());
    }
    out.push('\n');

    if report.places.is_empty() {
        if report.total_places > 0 {
            let _ = writeln!(
                out,
                "No places match the current filters ({} hidden).",
                report.total_places
            );
        } else {
            out.push_str("No places found.\n");
        }
        return out;
    }

    for (i, place) in report.places.iter().enumerate() {
        let _ = writeln!(out, "{}", place_line(i + 1, place));
        if let Some(address) = &place.address {
            let _ = writeln!(out, "   {address}");
        }
        if let Some(description) = &place.description {
            let _ = writeln!(out, "   {description}");
        }
        if let Some(uri) = &place.map_uri {
            let _ = writeln!(out, "   {uri}");
        }
    }

    let hidden = report.total_places.saturating_sub(report.places.len());
    if hidden > 0 {
        let _ = writeln!(out, "\n({hidden} more hidden by filters)");
    }
    out
}
