// ABOUTME: Main library entry point for the Mangetsu catalog extraction engine.
// ABOUTME: Re-exports the public API: Client, records, queries, strategies and the source registry.

//! Mangetsu - a resilient catalog extraction engine for heterogeneous
//! manga sources.
//!
//! Each source is declarative configuration — ordered strategy lists plus
//! field-candidate tables — run by one shared engine. A request degrades
//! through its source's strategies (structured API first, markup fallbacks
//! after) until one yields usable data; list-shaped operations return empty
//! results rather than errors when everything misses.
//!
//! # Example
//!
//! ```no_run
//! use mangetsu_core::{Client, SearchQuery, SearchableField};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mangetsu_core::ScrapeError> {
//!     let client = Client::builder().build();
//!     let query = SearchQuery::new()
//!         .title("solo")
//!         .include(SearchableField::Tag, ["action"]);
//!     for item in client.list("dilartube", &query).await? {
//!         println!("{} ({})", item.title, item.public_url);
//!     }
//!     Ok(())
//! }
//! ```

mod attempt;
pub mod chain;
pub mod client;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod query;
pub mod source;
pub mod strategy;

pub use crate::client::{Client, ClientBuilder, Options};
pub use crate::error::{ErrorCode, Miss, ScrapeError};
pub use crate::loader::load_builtin_registry;
pub use crate::model::{
    stable_id, CatalogItem, CatalogState, Chapter, ChapterRef, ContentRating, ItemRef, Page,
    Tag, RATING_UNKNOWN, UPLOAD_DATE_UNKNOWN,
};
pub use crate::query::{
    compile, Capability, Criterion, CriterionKind, Pagination, ParamRule, ParamStyle,
    SearchQuery, SearchSpec, SearchableField, SortOrder,
};
pub use crate::source::{SourceConfig, SourceRegistry, TagSeed};
pub use crate::strategy::{
    ChapterFields, ChapterStrategy, DateFallback, DetailStrategy, ItemFields, ListStrategy,
    PageFields, PageStrategy, SourceKind, TagFields, TagStrategy,
};
