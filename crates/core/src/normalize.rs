// ABOUTME: Record normalization: state synonym tables, rating rescale, URL absolutization,
// ABOUTME: chapter ordering and the shared chapter-number-from-title rule.

//! Pure normalization functions mapping raw extracted values onto the
//! canonical record shape. These are shared by every source; per-site
//! behavior enters only through data (extra synonyms, scales, flags).

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::model::{CatalogState, Chapter, ContentRating, RATING_UNKNOWN};

/// Known publication-state synonyms across sources and locales.
///
/// Lookup is case-insensitive. Sites contribute additional localized
/// synonyms through their config; unmatched input yields `None`, never an
/// invented state.
static STATE_SYNONYMS: &[(&str, CatalogState)] = &[
    ("ongoing", CatalogState::Ongoing),
    ("publishing", CatalogState::Ongoing),
    ("releasing", CatalogState::Ongoing),
    ("en cours", CatalogState::Ongoing),
    ("مستمر", CatalogState::Ongoing),
    ("مستمرة", CatalogState::Ongoing),
    ("completed", CatalogState::Finished),
    ("complete", CatalogState::Finished),
    ("finished", CatalogState::Finished),
    ("terminé", CatalogState::Finished),
    ("مكتمل", CatalogState::Finished),
    ("مكتملة", CatalogState::Finished),
    ("hiatus", CatalogState::Paused),
    ("on hold", CatalogState::Paused),
    ("paused", CatalogState::Paused),
    ("en pause", CatalogState::Paused),
    ("متوقف", CatalogState::Paused),
    ("cancelled", CatalogState::Abandoned),
    ("canceled", CatalogState::Abandoned),
    ("dropped", CatalogState::Abandoned),
    ("abandoned", CatalogState::Abandoned),
    ("abandonné", CatalogState::Abandoned),
    ("ملغي", CatalogState::Abandoned),
];

/// Map a raw status string to a canonical state.
///
/// `extra` carries per-site synonyms (checked first so a site can override
/// an ambiguous word for its own locale).
pub fn parse_state(raw: &str, extra: &HashMap<String, CatalogState>) -> Option<CatalogState> {
    let needle = raw.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    if let Some(state) = extra
        .iter()
        .find(|(k, _)| k.to_lowercase() == needle)
        .map(|(_, v)| *v)
    {
        return Some(state);
    }
    STATE_SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == needle)
        .map(|(_, state)| *state)
}

/// Map a raw content-rating string to the canonical classification.
pub fn parse_content_rating(raw: &str) -> Option<ContentRating> {
    match raw.trim().to_lowercase().as_str() {
        "safe" | "sfw" => Some(ContentRating::Safe),
        "suggestive" | "ecchi" => Some(ContentRating::Suggestive),
        "adult" | "nsfw" | "erotica" | "pornographic" | "mature" => Some(ContentRating::Adult),
        _ => None,
    }
}

/// Linear rescale of a source-native rating onto the canonical 0..=1 scale.
///
/// A non-positive or missing source rating yields [`RATING_UNKNOWN`] — a
/// source that reports 0 almost always means "no votes yet", which must stay
/// distinguishable from a genuine rating.
pub fn rating(raw: Option<f64>, scale: f32) -> f32 {
    match raw {
        Some(value) if value > 0.0 && scale > 0.0 => (value as f32 / scale).clamp(0.0, 1.0),
        _ => RATING_UNKNOWN,
    }
}

/// Resolve a possibly relative reference against a source's base domain.
/// Already-absolute URLs pass through unchanged.
pub fn absolutize(domain: &str, reference: &str) -> String {
    let reference = reference.trim();
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return reference.to_string();
    }
    if let Some(rest) = reference.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    let base = format!("https://{}/", domain);
    match Url::parse(&base).and_then(|b| b.join(reference)) {
        Ok(joined) => joined.to_string(),
        Err(_) => format!("https://{}/{}", domain, reference.trim_start_matches('/')),
    }
}

/// Reduce a URL to the site-relative reference used for identity.
///
/// Absolute URLs keep their path and query; relative references lose their
/// leading slash. Identity derivation must see the same string no matter
/// which strategy produced the record.
pub fn site_path(reference: &str) -> String {
    let reference = reference.trim();
    if let Ok(url) = Url::parse(reference) {
        if url.has_host() {
            let mut path = url.path().trim_start_matches('/').to_string();
            if let Some(query) = url.query() {
                path.push('?');
                path.push_str(query);
            }
            return path;
        }
    }
    reference.trim_start_matches('/').to_string()
}

/// Derive a tag key from a raw value. Slug-like values pass through; URLs
/// and paths reduce to their last non-empty segment.
pub fn tag_key(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    let segment = trimmed.rsplit('/').next().unwrap_or(trimmed);
    segment.to_lowercase()
}

static CHAPTER_ANCHORED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)ch(?:apter)?\.?\s*(\d+(?:\.\d+)?)").unwrap());
static FIRST_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

/// The shared chapter-number rule: a `Ch./Chapter` anchored number when
/// present, otherwise the first decimal number occurring in the title.
pub fn chapter_number_from_title(title: &str) -> Option<f32> {
    if let Some(cap) = CHAPTER_ANCHORED_RE.captures(title) {
        return cap.get(1)?.as_str().parse().ok();
    }
    FIRST_NUMBER_RE
        .find(title)
        .and_then(|m| m.as_str().parse().ok())
}

/// Put a chapter list into canonical oldest-first order.
///
/// Sources that list newest-first are reversed exactly once per fetch;
/// the list is never re-sorted, so source-declared order breaks number ties.
pub fn oldest_first(chapters: &mut Vec<Chapter>, newest_first: bool) {
    if newest_first {
        chapters.reverse();
    }
}
