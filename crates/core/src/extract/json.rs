// ABOUTME: Dot-path candidate access over serde_json trees for structured API payloads.
// ABOUTME: First candidate resolving to a non-null, non-blank value wins; coercion failure continues.

//! Structured-payload field extraction.
//!
//! Candidate paths are dot-separated (`attributes.title.en`); numeric
//! segments index into arrays. An empty path refers to the value itself,
//! which is how strategies address arrays of bare strings (page lists).

use serde_json::Value;

use super::coerce;
use super::Candidate;

/// Resolve a dot-path against a JSON value.
pub fn resolve<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn candidate_path(candidate: &Candidate) -> Option<&str> {
    match candidate {
        Candidate::Path(path) => Some(path),
        // The attribute form has no meaning for structured payloads; fall
        // back to treating the first element as a plain path.
        Candidate::PathAttr(parts) => parts.first().map(String::as_str),
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First candidate resolving to a non-blank scalar, as a string.
pub fn first_string(value: &Value, candidates: &[Candidate]) -> Option<String> {
    candidates
        .iter()
        .filter_map(candidate_path)
        .filter_map(|path| resolve(value, path))
        .find_map(value_to_string)
}

/// First candidate coercible to a number. JSON numbers pass through;
/// numeric strings are parsed; anything else is a miss.
pub fn first_number(value: &Value, candidates: &[Candidate]) -> Option<f64> {
    candidates
        .iter()
        .filter_map(candidate_path)
        .filter_map(|path| resolve(value, path))
        .find_map(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => coerce::number(s),
            _ => None,
        })
}

/// First candidate coercible to an epoch-millisecond date.
pub fn first_date(value: &Value, candidates: &[Candidate], patterns: &[String]) -> Option<i64> {
    candidates
        .iter()
        .filter_map(candidate_path)
        .filter_map(|path| resolve(value, path))
        .find_map(|v| match v {
            Value::String(s) => coerce::date_millis(s, patterns),
            Value::Number(n) => n.as_i64().map(coerce::epoch_to_millis),
            _ => None,
        })
}

/// First candidate resolving to an array, even an empty one.
///
/// The distinction matters to strategies: no candidate resolving at all
/// means the expected container is absent (structural mismatch), while an
/// empty array is a well-formed zero-result response.
pub fn first_array<'a>(value: &'a Value, paths: &[String]) -> Option<&'a Vec<Value>> {
    paths
        .iter()
        .filter_map(|path| resolve(value, path))
        .find_map(|v| v.as_array())
}

/// All string values from the first candidate yielding a non-empty set.
/// Arrays collect their scalar members; a bare scalar becomes a singleton.
pub fn all_strings(value: &Value, candidates: &[Candidate]) -> Vec<String> {
    for path in candidates.iter().filter_map(candidate_path) {
        let Some(resolved) = resolve(value, path) else {
            continue;
        };
        let collected: Vec<String> = match resolved {
            Value::Array(items) => items.iter().filter_map(value_to_string).collect(),
            other => value_to_string(other).into_iter().collect(),
        };
        if !collected.is_empty() {
            return collected;
        }
    }
    Vec::new()
}
