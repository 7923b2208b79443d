// ABOUTME: The field extractor: ordered candidate paths/selectors with typed coercion.
// ABOUTME: Scope unifies structured (JSON) and markup (HTML) payloads behind one access surface.

//! Field extraction over heterogeneous payloads.
//!
//! A field is described by an ordered list of [`Candidate`]s. Extraction
//! tries each candidate against the payload in order and returns the first
//! non-null, non-blank value, coerced to the requested type. A coercion
//! failure is a candidate miss, not an error — extraction continues with the
//! next candidate. When every candidate misses, the result is an explicit
//! `None`; callers decide the fallback.

pub mod coerce;
pub mod json;
pub mod select;

use scraper::ElementRef;
use serde_json::Value;

/// One candidate access path for a field.
///
/// For structured payloads the string is a dot-path (`attributes.title.en`);
/// for markup it is a CSS selector. The two-element array form selects an
/// attribute instead of text, e.g. `["img.cover", "src"]`. An empty path
/// refers to the current scope itself (the row value or row element).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Candidate {
    /// A dot-path or CSS selector yielding text content.
    Path(String),
    /// A selector plus attribute name, e.g. `["img", "data-src"]`.
    PathAttr(Vec<String>),
}

/// A uniform view over one extraction scope: either a JSON value or a
/// markup element. List strategies produce one scope per result row.
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    Json(&'a Value),
    Node(ElementRef<'a>),
}

impl<'a> Scope<'a> {
    /// First candidate resolving to a non-blank string.
    pub fn first_string(&self, candidates: &[Candidate]) -> Option<String> {
        match *self {
            Scope::Json(value) => json::first_string(value, candidates),
            Scope::Node(el) => select::first_text(el, candidates),
        }
    }

    /// All values from the first candidate yielding a non-empty set.
    pub fn all_strings(&self, candidates: &[Candidate]) -> Vec<String> {
        match *self {
            Scope::Json(value) => json::all_strings(value, candidates),
            Scope::Node(el) => select::all_texts(el, candidates),
        }
    }

    /// First candidate coercible to a number.
    pub fn first_number(&self, candidates: &[Candidate]) -> Option<f64> {
        match *self {
            Scope::Json(value) => json::first_number(value, candidates),
            Scope::Node(el) => select::texts(el, candidates).find_map(|s| coerce::number(&s)),
        }
    }

    /// First candidate coercible to an epoch-millisecond date via the
    /// prioritized pattern list.
    pub fn first_date(&self, candidates: &[Candidate], patterns: &[String]) -> Option<i64> {
        match *self {
            Scope::Json(value) => json::first_date(value, candidates, patterns),
            Scope::Node(el) => {
                select::texts(el, candidates).find_map(|s| coerce::date_millis(&s, patterns))
            }
        }
    }

    /// Resolve the result-row container: the first container candidate that
    /// exists wins. `None` means no known container was present at all;
    /// `Some(vec![])` means a container was found but held zero rows.
    pub fn rows(&self, containers: &[String]) -> Option<Vec<Scope<'a>>> {
        match *self {
            Scope::Json(value) => json::first_array(value, containers)
                .map(|rows| rows.iter().map(Scope::Json).collect()),
            Scope::Node(el) => {
                select::rows(el, containers).map(|els| els.into_iter().map(Scope::Node).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn scope_unifies_json_and_markup() {
        let value: Value = serde_json::from_str(r#"{"title": "Alpha"}"#).unwrap();
        let scope = Scope::Json(&value);
        assert_eq!(
            scope.first_string(&[Candidate::Path("title".to_string())]),
            Some("Alpha".to_string())
        );

        let doc = Html::parse_document("<html><body><h1>Alpha</h1></body></html>");
        let scope = Scope::Node(doc.root_element());
        assert_eq!(
            scope.first_string(&[Candidate::Path("h1".to_string())]),
            Some("Alpha".to_string())
        );
    }

    #[test]
    fn rows_distinguish_absent_from_empty() {
        let value: Value = serde_json::from_str(r#"{"data": []}"#).unwrap();
        let scope = Scope::Json(&value);
        assert!(scope.rows(&["mangas".to_string()]).is_none());
        assert_eq!(scope.rows(&["data".to_string()]).unwrap().len(), 0);
    }
}
