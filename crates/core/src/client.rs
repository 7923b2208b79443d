// ABOUTME: The main Client for Mangetsu: options builder plus the five catalog operations.
// ABOUTME: Each operation runs its source's strategy chain and maps all-miss onto the defined EmptyResult.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use crate::attempt;
use crate::chain::resolve_first;
use crate::error::ScrapeError;
use crate::fetch::Fetcher;
use crate::loader::load_builtin_registry;
use crate::model::{
    stable_id, CatalogItem, Chapter, ChapterRef, ItemRef, Page, Tag, RATING_UNKNOWN,
};
use crate::normalize;
use crate::query::{Capability, SearchQuery, SortOrder};
use crate::source::{SourceConfig, SourceRegistry};

/// Configuration options for the Mangetsu client.
#[derive(Debug, Clone)]
pub struct Options {
    pub timeout: Duration,
    pub user_agent: String,
    pub headers: HashMap<String, String>,
    pub http_client: Option<reqwest::Client>,
    pub registry: Option<SourceRegistry>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: "Mangetsu/1.0".to_string(),
            headers: HashMap::new(),
            http_client: None,
            registry: None,
        }
    }
}

/// Builder for constructing Client instances with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    opts: Options,
}

impl ClientBuilder {
    /// Create a new ClientBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Add a header sent with every request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Set a custom source registry.
    pub fn registry(mut self, registry: SourceRegistry) -> Self {
        self.opts.registry = Some(registry);
        self
    }

    /// Build the Client with the configured options.
    pub fn build(self) -> Client {
        Client::new(self.opts)
    }
}

/// The main Mangetsu client.
///
/// Holds no per-request state: every operation constructs its records fresh
/// and concurrent requests share nothing mutable.
pub struct Client {
    fetcher: Fetcher,
    registry: SourceRegistry,
}

impl Client {
    /// Create a new ClientBuilder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new Client with the given options.
    pub fn new(opts: Options) -> Self {
        let http_client = opts.http_client.clone().unwrap_or_else(|| {
            reqwest::Client::builder()
                .user_agent(&opts.user_agent)
                .timeout(opts.timeout)
                .cookie_store(true)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .expect("failed to build HTTP client")
        });

        let registry = opts.registry.clone().unwrap_or_else(load_builtin_registry);

        Self {
            fetcher: Fetcher::new(http_client, opts.headers),
            registry,
        }
    }

    fn config(&self, source: &str, op: &str) -> Result<&SourceConfig, ScrapeError> {
        self.registry
            .get(source)
            .ok_or_else(|| ScrapeError::unknown_source(source, op))
    }

    /// Registered source ids, sorted.
    pub fn sources(&self) -> Vec<&str> {
        self.registry.ids()
    }

    /// The sort orders a source declares.
    pub fn sort_orders(&self, source: &str) -> Result<&[SortOrder], ScrapeError> {
        Ok(&self.config(source, "SortOrders")?.sort_orders)
    }

    /// The search capabilities a source declares.
    pub fn capabilities(&self, source: &str) -> Result<&[Capability], ScrapeError> {
        Ok(&self.config(source, "Capabilities")?.capabilities)
    }

    /// Fetch one page of the source's catalog for a search query.
    ///
    /// Returns an empty sequence, never an error, when every strategy
    /// misses.
    pub async fn list(
        &self,
        source: &str,
        query: &SearchQuery,
    ) -> Result<Vec<CatalogItem>, ScrapeError> {
        let config = self.config(source, "List")?;
        let names: Vec<&str> = config.list.iter().map(|s| s.name.as_str()).collect();
        let result = resolve_first("list", &config.id, &names, |index| {
            attempt::list(&self.fetcher, config, &config.list[index], query)
        })
        .await;
        Ok(result.unwrap_or_default())
    }

    /// Fetch a single item's detail record, chapters included.
    ///
    /// The detail payload and the chapter list are fetched concurrently and
    /// joined; a failing chapter sub-fetch degrades to an empty chapter
    /// list since chapters are independently re-fetchable. Fails with
    /// NotFound only when every strategy missed and the reference carries
    /// no seed data to synthesize a minimal record from.
    pub async fn detail(
        &self,
        source: &str,
        item: &ItemRef,
    ) -> Result<CatalogItem, ScrapeError> {
        let config = self.config(source, "Detail")?;

        let detail_names: Vec<&str> = config.detail.iter().map(|s| s.name.as_str()).collect();
        let chapter_names: Vec<&str> = config.chapters.iter().map(|s| s.name.as_str()).collect();

        let detail_fut = resolve_first("detail", &config.id, &detail_names, |index| {
            attempt::detail(&self.fetcher, config, &config.detail[index], item)
        });
        let chapters_fut = resolve_first("chapters", &config.id, &chapter_names, |index| {
            attempt::chapters(&self.fetcher, config, &config.chapters[index], item)
        });
        let (found, chapters) = tokio::join!(detail_fut, chapters_fut);
        let chapters = chapters.unwrap_or_default();

        match found {
            Some(mut record) => {
                record.chapters = Some(chapters);
                Ok(record)
            }
            None => match &item.seed_title {
                Some(title) => Ok(seed_record(config, item, title, chapters)),
                None => Err(ScrapeError::not_found(&item.url, "Detail")),
            },
        }
    }

    /// Fetch an item's chapter list in canonical oldest-first order.
    /// An empty sequence is a valid result, not an error.
    pub async fn chapters(
        &self,
        source: &str,
        item: &ItemRef,
    ) -> Result<Vec<Chapter>, ScrapeError> {
        let config = self.config(source, "Chapters")?;
        let names: Vec<&str> = config.chapters.iter().map(|s| s.name.as_str()).collect();
        let result = resolve_first("chapters", &config.id, &names, |index| {
            attempt::chapters(&self.fetcher, config, &config.chapters[index], item)
        })
        .await;
        Ok(result.unwrap_or_default())
    }

    /// Fetch a chapter's page list in source document order.
    pub async fn pages(
        &self,
        source: &str,
        chapter: &ChapterRef,
    ) -> Result<Vec<Page>, ScrapeError> {
        let config = self.config(source, "Pages")?;
        let names: Vec<&str> = config.pages.iter().map(|s| s.name.as_str()).collect();
        let result = resolve_first("pages", &config.id, &names, |index| {
            attempt::pages(&self.fetcher, config, &config.pages[index], chapter)
        })
        .await;
        Ok(result.unwrap_or_default())
    }

    /// Fetch the source's tag set, falling back to the source-declared
    /// static set when the live fetch fails — downstream filter UIs are
    /// never left empty.
    pub async fn tags(&self, source: &str) -> Result<BTreeSet<Tag>, ScrapeError> {
        let config = self.config(source, "Tags")?;
        let names: Vec<&str> = config.tags.iter().map(|s| s.name.as_str()).collect();
        let result = resolve_first("tags", &config.id, &names, |index| {
            attempt::tags(&self.fetcher, config, &config.tags[index])
        })
        .await;
        Ok(result.unwrap_or_else(|| config.fallback_tag_set()))
    }
}

/// Synthesize a minimal record from the request's own seed data.
fn seed_record(
    config: &SourceConfig,
    item: &ItemRef,
    title: &str,
    chapters: Vec<Chapter>,
) -> CatalogItem {
    let url = normalize::site_path(&item.url);
    CatalogItem {
        id: stable_id(&config.id, &url),
        title: title.to_string(),
        alt_titles: BTreeSet::new(),
        public_url: normalize::absolutize(&config.domain, &item.url),
        url,
        cover_url: None,
        description: None,
        rating: RATING_UNKNOWN,
        content_rating: None,
        tags: BTreeSet::new(),
        state: None,
        authors: BTreeSet::new(),
        chapters: Some(chapters),
        source: config.id.clone(),
    }
}
