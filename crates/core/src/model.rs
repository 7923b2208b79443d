// ABOUTME: Canonical record shapes shared by every source: CatalogItem, Chapter, Page, Tag.
// ABOUTME: Includes the rating/upload-date sentinels and stable identity derivation from canonical URLs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Sentinel for "the source exposes no rating", distinct from a genuine zero.
pub const RATING_UNKNOWN: f32 = -1.0;

/// Sentinel for "the source exposes no upload date" (epoch milliseconds).
pub const UPLOAD_DATE_UNKNOWN: i64 = 0;

/// Publication state of a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogState {
    Ongoing,
    Finished,
    Paused,
    Abandoned,
}

/// Content-rating classification of a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentRating {
    Safe,
    Suggestive,
    Adult,
}

/// A genre/category tag, scoped to one source.
///
/// Equality and ordering include the source id: two tags from different
/// sources are never equal even with identical keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub source: String,
    pub key: String,
    pub title: String,
}

/// A catalog item (one series) in the canonical, source-agnostic shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Stable identity, a pure function of the canonical URL and source id.
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub alt_titles: BTreeSet<String>,
    /// Site-relative reference used to address the item on its source.
    pub url: String,
    /// Absolute URL a human can open.
    pub public_url: String,
    pub cover_url: Option<String>,
    pub description: Option<String>,
    /// Normalized to 0..=1, or [`RATING_UNKNOWN`].
    pub rating: f32,
    pub content_rating: Option<ContentRating>,
    #[serde(default)]
    pub tags: BTreeSet<Tag>,
    pub state: Option<CatalogState>,
    #[serde(default)]
    pub authors: BTreeSet<String>,
    /// `None` means "not fetched" (list results); `Some(vec![])` means
    /// "fetched and the item has no chapters yet".
    pub chapters: Option<Vec<Chapter>>,
    pub source: String,
}

impl CatalogItem {
    /// Returns true if the item carries a known rating.
    pub fn is_rated(&self) -> bool {
        self.rating >= 0.0
    }

    /// Returns true if chapters were fetched for this item (even if empty).
    pub fn has_chapter_list(&self) -> bool {
        self.chapters.is_some()
    }
}

/// A single chapter of a catalog item. Canonical order is oldest-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: u64,
    pub title: Option<String>,
    /// Chapter number; fractional numbers are legal, 0.0 means unknown.
    pub number: f32,
    /// Volume number, 0 when the source declares none.
    pub volume: u32,
    /// Site-relative reference used to address the chapter on its source.
    pub url: String,
    pub scanlator: Option<String>,
    /// Epoch milliseconds, or [`UPLOAD_DATE_UNKNOWN`].
    pub upload_date: i64,
    /// Branch/language marker when the source splits chapter lists.
    pub branch: Option<String>,
    pub source: String,
}

impl Chapter {
    /// Returns true if the source provided an upload date.
    pub fn has_upload_date(&self) -> bool {
        self.upload_date != UPLOAD_DATE_UNKNOWN
    }
}

/// One page image of a chapter. Order within a chapter is positional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: u64,
    /// Absolute image URL.
    pub url: String,
    pub preview: Option<String>,
    pub source: String,
}

/// Reference to a catalog item used by detail/chapter requests.
///
/// `seed_title` carries previously known data (e.g. a title captured from a
/// list response); when every detail strategy misses, it is used to
/// synthesize a minimal record instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    pub url: String,
    pub seed_title: Option<String>,
}

impl ItemRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            seed_title: None,
        }
    }

    pub fn with_seed_title(mut self, title: impl Into<String>) -> Self {
        self.seed_title = Some(title.into());
        self
    }
}

impl From<&CatalogItem> for ItemRef {
    fn from(item: &CatalogItem) -> Self {
        Self {
            url: item.url.clone(),
            seed_title: Some(item.title.clone()),
        }
    }
}

/// Reference to a chapter used by page requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRef {
    pub url: String,
}

impl ChapterRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl From<&Chapter> for ChapterRef {
    fn from(chapter: &Chapter) -> Self {
        Self {
            url: chapter.url.clone(),
        }
    }
}

/// Derive a stable identity from a source id and a canonical URL.
///
/// The same (source, url) pair always yields the same id; the source id is
/// folded in so records from different sources never collide on identical
/// paths.
pub fn stable_id(source: &str, url: &str) -> u64 {
    let mut hi = crc32fast::Hasher::new();
    hi.update(source.as_bytes());
    let mut lo = crc32fast::Hasher::new();
    lo.update(source.as_bytes());
    lo.update(b"/");
    lo.update(url.as_bytes());
    ((hi.finalize() as u64) << 32) | lo.finalize() as u64
}
