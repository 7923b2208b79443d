// ABOUTME: Per-site source configuration and the registry keyed by source id.
// ABOUTME: A source is pure data: capabilities, sort tokens, synonym tables and strategy lists.

//! Source configuration.
//!
//! Everything site-specific lives here as data. A `SourceConfig` carries the
//! declared search capabilities, the sort orders the site understands, any
//! localized state synonyms, static fallback tags, and one ordered strategy
//! list per logical operation. The engine never special-cases a site.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::{CatalogState, Tag};
use crate::query::{Capability, SortOrder};
use crate::strategy::{
    ChapterStrategy, DetailStrategy, ListStrategy, PageStrategy, TagStrategy,
};

/// A static tag, declared in config as the fallback set for sources whose
/// live tag fetch may fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagSeed {
    pub title: String,
    pub key: String,
}

/// The complete declarative configuration of one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Stable source identifier, e.g. `dilartube`.
    pub id: String,
    /// Human-readable name, e.g. `Dilar Tube`.
    pub name: String,
    pub domain: String,
    #[serde(default)]
    pub locale: Option<String>,
    /// Headers sent with every request to this source (Referer etc.).
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub sort_orders: Vec<SortOrder>,
    #[serde(default)]
    pub default_sort: SortOrder,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    /// Localized state synonyms beyond the builtin table.
    #[serde(default)]
    pub states: HashMap<String, CatalogState>,
    #[serde(default)]
    pub list: Vec<ListStrategy>,
    #[serde(default)]
    pub detail: Vec<DetailStrategy>,
    #[serde(default)]
    pub chapters: Vec<ChapterStrategy>,
    #[serde(default)]
    pub pages: Vec<PageStrategy>,
    #[serde(default)]
    pub tags: Vec<TagStrategy>,
    #[serde(default)]
    pub fallback_tags: Vec<TagSeed>,
}

impl SourceConfig {
    /// The declared static tag set, already in canonical form.
    pub fn fallback_tag_set(&self) -> BTreeSet<Tag> {
        self.fallback_tags
            .iter()
            .map(|seed| Tag {
                source: self.id.clone(),
                key: seed.key.clone(),
                title: seed.title.clone(),
            })
            .collect()
    }
}

/// Registry of source configurations keyed by source id.
#[derive(Debug, Default, Clone)]
pub struct SourceRegistry {
    map: HashMap<String, SourceConfig>,
}

impl SourceRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a source configuration under its id.
    pub fn register(&mut self, config: SourceConfig) {
        self.map.insert(config.id.clone(), config);
    }

    /// Looks up a source by id.
    pub fn get(&self, id: &str) -> Option<&SourceConfig> {
        self.map.get(id)
    }

    /// Registered source ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.map.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Returns the number of registered sources.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if no sources are registered.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal(id: &str) -> SourceConfig {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": id,
            "domain": format!("{}.example", id),
            "fallback_tags": [{"title": "Action", "key": "action"}]
        }))
        .unwrap()
    }

    #[test]
    fn registry_lookup() {
        let mut registry = SourceRegistry::new();
        assert!(registry.is_empty());
        registry.register(minimal("alpha"));
        registry.register(minimal("beta"));

        assert_eq!(registry.len(), 2);
        assert!(registry.get("alpha").is_some());
        assert!(registry.get("gamma").is_none());
        assert_eq!(registry.ids(), vec!["alpha", "beta"]);
    }

    #[test]
    fn fallback_tags_are_source_scoped() {
        let config = minimal("alpha");
        let tags = config.fallback_tag_set();
        assert_eq!(tags.len(), 1);
        let tag = tags.iter().next().unwrap();
        assert_eq!(tag.source, "alpha");
        assert_eq!(tag.key, "action");
    }

    #[test]
    fn default_sort_defaults_to_updated() {
        let config = minimal("alpha");
        assert_eq!(config.default_sort, SortOrder::Updated);
    }
}
