// ABOUTME: Typed coercion of raw extracted strings: numbers, dates, booleans.
// ABOUTME: Every function returns None on failure so callers treat it as a candidate miss.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Coerce a string to a number. Accepts both integer and fractional forms.
pub fn number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Coerce a string to a boolean.
pub fn boolean(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Parse a date string into epoch milliseconds using a prioritized pattern
/// list.
///
/// RFC3339 and RFC2822 are tried first as fast paths, then each supplied
/// chrono pattern — with a timezone offset, as a naive datetime (assumed
/// UTC), then as a bare date at midnight UTC. All-digit strings are treated
/// as epoch seconds or milliseconds. Returns `None` when nothing matches;
/// the caller decides between the unknown sentinel and a documented
/// fetch-time substitution.
pub fn date_millis(s: &str, patterns: &[String]) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc).timestamp_millis());
    }

    for pattern in patterns {
        if let Ok(dt) = DateTime::parse_from_str(s, pattern) {
            return Some(dt.with_timezone(&Utc).timestamp_millis());
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, pattern) {
            return Some(Utc.from_utc_datetime(&naive).timestamp_millis());
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, pattern) {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return Some(Utc.from_utc_datetime(&naive).timestamp_millis());
        }
    }

    // Epoch seconds or milliseconds delivered as a bare number.
    if s.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(n) = s.parse::<i64>() {
            return Some(epoch_to_millis(n));
        }
    }

    None
}

/// Interpret an epoch number as seconds or milliseconds by magnitude.
pub fn epoch_to_millis(n: i64) -> i64 {
    if n >= 1_000_000_000_000 {
        n
    } else {
        n * 1000
    }
}
