// ABOUTME: Declarative extraction-strategy data model: source kind, URL template, field maps.
// ABOUTME: One strategy is one self-contained way to obtain a logical result from one source kind.

//! Strategy configuration.
//!
//! A strategy declares everything needed to attempt one logical request
//! against one kind of source: the URL template, where the result rows live
//! (container candidates), and which candidate paths/selectors fill each
//! attribute of the target record. Per-site adapters are lists of these,
//! tried in order by the chain executor — typically a structured API first,
//! markup fallbacks after.

use serde::{Deserialize, Serialize};

use crate::extract::Candidate;
use crate::query::SearchSpec;

/// The kind of source a strategy reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A structured JSON API.
    Api,
    /// A markup document addressed by URL.
    Markup,
}

/// What to substitute for a genuinely absent upload date.
///
/// `FetchTime` stamps undated chapters with the time of fetch so
/// "recently seen" ordering still works downstream. It is a deliberate
/// per-strategy policy choice, opt-in; the default is the unknown
/// sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFallback {
    #[default]
    Unknown,
    FetchTime,
}

/// Candidate map for a catalog-item record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemFields {
    #[serde(default)]
    pub url: Vec<Candidate>,
    #[serde(default)]
    pub title: Vec<Candidate>,
    #[serde(default)]
    pub alt_titles: Vec<Candidate>,
    #[serde(default)]
    pub cover: Vec<Candidate>,
    #[serde(default)]
    pub description: Vec<Candidate>,
    #[serde(default)]
    pub authors: Vec<Candidate>,
    #[serde(default)]
    pub state: Vec<Candidate>,
    #[serde(default)]
    pub rating: Vec<Candidate>,
    /// The source's native rating scale, e.g. 5 or 10.
    #[serde(default = "default_rating_scale")]
    pub rating_scale: f32,
    /// Path prefix to strip from extracted item references so every
    /// strategy of a source yields the same canonical reference (and thus
    /// the same identity) for the same item.
    #[serde(default)]
    pub url_strip_prefix: Option<String>,
    #[serde(default)]
    pub content_rating: Vec<Candidate>,
    #[serde(default)]
    pub tags: Option<TagFields>,
}

fn default_rating_scale() -> f32 {
    10.0
}

/// Candidate map for tags, either embedded in an item payload or fetched
/// by a dedicated tag strategy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagFields {
    /// Where the tag rows live, relative to the enclosing scope.
    #[serde(default)]
    pub containers: Vec<String>,
    #[serde(default)]
    pub title: Vec<Candidate>,
    #[serde(default)]
    pub key: Vec<Candidate>,
}

/// Candidate map for a chapter record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChapterFields {
    #[serde(default)]
    pub url: Vec<Candidate>,
    #[serde(default)]
    pub title: Vec<Candidate>,
    #[serde(default)]
    pub number: Vec<Candidate>,
    #[serde(default)]
    pub volume: Vec<Candidate>,
    #[serde(default)]
    pub date: Vec<Candidate>,
    /// Prioritized chrono patterns for date coercion.
    #[serde(default)]
    pub date_patterns: Vec<String>,
    #[serde(default)]
    pub date_fallback: DateFallback,
    #[serde(default)]
    pub scanlator: Vec<Candidate>,
    #[serde(default)]
    pub branch: Vec<Candidate>,
    /// True when the source lists chapters newest-first; the normalizer
    /// reverses such lists once per fetch.
    #[serde(default)]
    pub newest_first: bool,
}

/// Candidate map for a page record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageFields {
    #[serde(default)]
    pub image: Vec<Candidate>,
    #[serde(default)]
    pub preview: Vec<Candidate>,
}

/// One way to obtain a list page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListStrategy {
    pub name: String,
    pub kind: SourceKind,
    /// URL template; `{domain}` is substituted, compiled query parameters
    /// are appended.
    pub url: String,
    #[serde(default)]
    pub containers: Vec<String>,
    pub item: ItemFields,
    #[serde(default)]
    pub search: SearchSpec,
}

/// One way to obtain a single item's detail record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailStrategy {
    pub name: String,
    pub kind: SourceKind,
    /// URL template; `{domain}` and `{ref}` are substituted.
    pub url: String,
    pub item: ItemFields,
}

/// One way to obtain an item's chapter list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterStrategy {
    pub name: String,
    pub kind: SourceKind,
    pub url: String,
    #[serde(default)]
    pub containers: Vec<String>,
    pub chapter: ChapterFields,
}

/// One way to obtain a chapter's page list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageStrategy {
    pub name: String,
    pub kind: SourceKind,
    pub url: String,
    #[serde(default)]
    pub containers: Vec<String>,
    pub page: PageFields,
}

/// One way to obtain the source's tag list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagStrategy {
    pub name: String,
    pub kind: SourceKind,
    pub url: String,
    #[serde(default)]
    pub containers: Vec<String>,
    pub tag: TagFields,
}

/// Render a URL template: `{domain}` becomes the source domain, `{ref}`
/// becomes the request's item/chapter reference. A reference that is
/// already an absolute URL wins over the template.
pub fn render_url(template: &str, domain: &str, reference: Option<&str>) -> String {
    if let Some(r) = reference {
        let r = r.trim();
        if r.starts_with("http://") || r.starts_with("https://") {
            return r.to_string();
        }
    }
    let mut rendered = template.replace("{domain}", domain);
    if let Some(r) = reference {
        rendered = rendered.replace("{ref}", r.trim().trim_start_matches('/'));
    }
    rendered
}
