// ABOUTME: Executes one strategy: fetch the payload, locate result rows, map fields onto records.
// ABOUTME: Every outcome short of usable data is a Miss; record-level coercion failures fall back to absent.

use std::collections::BTreeSet;

use scraper::Html;
use url::Url;

use crate::error::Miss;
use crate::extract::Scope;
use crate::fetch::Fetcher;
use crate::model::{
    stable_id, CatalogItem, Chapter, ChapterRef, ItemRef, Page, Tag, UPLOAD_DATE_UNKNOWN,
};
use crate::normalize;
use crate::query::{compile, SearchQuery};
use crate::source::SourceConfig;
use crate::strategy::{
    render_url, ChapterFields, ChapterStrategy, DateFallback, DetailStrategy, ItemFields,
    ListStrategy, PageStrategy, SourceKind, TagFields, TagStrategy,
};

/// A fetched payload in whichever tree the strategy's source kind produces.
enum Payload {
    Json(serde_json::Value),
    Dom(Html),
}

impl Payload {
    fn scope(&self) -> Scope<'_> {
        match self {
            Payload::Json(value) => Scope::Json(value),
            Payload::Dom(doc) => Scope::Node(doc.root_element()),
        }
    }
}

async fn fetch_payload(
    fetcher: &Fetcher,
    config: &SourceConfig,
    kind: SourceKind,
    url: &str,
) -> Result<Payload, Miss> {
    let result = fetcher
        .get(url, &config.headers)
        .await
        .map_err(Miss::Transport)?;
    match kind {
        // A non-JSON body where the strategy expects an API is a structural
        // mismatch, not a transport failure.
        SourceKind::Api => result.json().map(Payload::Json).ok_or(Miss::NoContainer),
        SourceKind::Markup => Ok(Payload::Dom(Html::parse_document(&result.text()))),
    }
}

fn append_params(url: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed
                .query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}

/// Map one result-row scope onto a catalog item.
///
/// URL and title are the only required fields — a row missing either is
/// unusable and skipped. Everything else degrades to absent.
fn extract_item(
    config: &SourceConfig,
    fields: &ItemFields,
    scope: Scope<'_>,
    fallback_url: Option<&str>,
) -> Option<CatalogItem> {
    let raw_url = scope
        .first_string(&fields.url)
        .or_else(|| fallback_url.map(str::to_string))?;
    let title = scope.first_string(&fields.title)?;

    let mut url = normalize::site_path(&raw_url);
    if let Some(prefix) = &fields.url_strip_prefix {
        if let Some(stripped) = url.strip_prefix(prefix) {
            url = stripped.to_string();
        }
    }
    let tags = fields
        .tags
        .as_ref()
        .map(|tag_fields| extract_tag_set(config, tag_fields, scope))
        .unwrap_or_default();

    Some(CatalogItem {
        id: stable_id(&config.id, &url),
        public_url: normalize::absolutize(&config.domain, &raw_url),
        url,
        title,
        alt_titles: scope.all_strings(&fields.alt_titles).into_iter().collect(),
        cover_url: scope
            .first_string(&fields.cover)
            .map(|cover| normalize::absolutize(&config.domain, &cover)),
        description: scope.first_string(&fields.description),
        rating: normalize::rating(scope.first_number(&fields.rating), fields.rating_scale),
        content_rating: scope
            .first_string(&fields.content_rating)
            .and_then(|raw| normalize::parse_content_rating(&raw)),
        tags,
        state: scope
            .first_string(&fields.state)
            .and_then(|raw| normalize::parse_state(&raw, &config.states)),
        authors: scope.all_strings(&fields.authors).into_iter().collect(),
        chapters: None,
        source: config.id.clone(),
    })
}

fn extract_tag_set(config: &SourceConfig, fields: &TagFields, scope: Scope<'_>) -> BTreeSet<Tag> {
    let Some(rows) = scope.rows(&fields.containers) else {
        return BTreeSet::new();
    };
    rows.iter()
        .filter_map(|row| extract_tag(config, fields, *row))
        .collect()
}

fn extract_tag(config: &SourceConfig, fields: &TagFields, row: Scope<'_>) -> Option<Tag> {
    let title = row.first_string(&fields.title)?;
    let key = row
        .first_string(&fields.key)
        .map(|raw| normalize::tag_key(&raw))
        .unwrap_or_else(|| normalize::tag_key(&title));
    Some(Tag {
        source: config.id.clone(),
        key,
        title,
    })
}

fn extract_chapter(
    config: &SourceConfig,
    fields: &ChapterFields,
    row: Scope<'_>,
    fetched_at: i64,
) -> Option<Chapter> {
    let raw_url = row.first_string(&fields.url)?;
    let url = normalize::site_path(&raw_url);
    let title = row.first_string(&fields.title);

    let number = row
        .first_number(&fields.number)
        .map(|n| n as f32)
        .or_else(|| {
            title
                .as_deref()
                .and_then(normalize::chapter_number_from_title)
        })
        .unwrap_or(0.0);

    let upload_date = row
        .first_date(&fields.date, &fields.date_patterns)
        .unwrap_or(match fields.date_fallback {
            DateFallback::Unknown => UPLOAD_DATE_UNKNOWN,
            DateFallback::FetchTime => fetched_at,
        });

    Some(Chapter {
        id: stable_id(&config.id, &url),
        title,
        number,
        volume: row.first_number(&fields.volume).map(|n| n as u32).unwrap_or(0),
        url,
        scanlator: row.first_string(&fields.scanlator),
        upload_date,
        branch: row.first_string(&fields.branch),
        source: config.id.clone(),
    })
}

/// Attempt one list strategy.
pub(crate) async fn list(
    fetcher: &Fetcher,
    config: &SourceConfig,
    strategy: &ListStrategy,
    query: &SearchQuery,
) -> Result<Vec<CatalogItem>, Miss> {
    let params = compile(
        query,
        &config.capabilities,
        &strategy.search,
        config.default_sort,
    );
    let url = append_params(
        &render_url(&strategy.url, &config.domain, None),
        &params,
    );
    let payload = fetch_payload(fetcher, config, strategy.kind, &url).await?;

    let rows = payload
        .scope()
        .rows(&strategy.containers)
        .ok_or(Miss::NoContainer)?;
    let items: Vec<CatalogItem> = rows
        .iter()
        .filter_map(|row| extract_item(config, &strategy.item, *row, None))
        .collect();
    if items.is_empty() {
        return Err(Miss::Empty);
    }
    Ok(items)
}

/// Attempt one detail strategy.
pub(crate) async fn detail(
    fetcher: &Fetcher,
    config: &SourceConfig,
    strategy: &DetailStrategy,
    item: &ItemRef,
) -> Result<CatalogItem, Miss> {
    let url = render_url(&strategy.url, &config.domain, Some(&item.url));
    let payload = fetch_payload(fetcher, config, strategy.kind, &url).await?;
    extract_item(config, &strategy.item, payload.scope(), Some(&item.url)).ok_or(Miss::Empty)
}

/// Attempt one chapter-list strategy.
pub(crate) async fn chapters(
    fetcher: &Fetcher,
    config: &SourceConfig,
    strategy: &ChapterStrategy,
    item: &ItemRef,
) -> Result<Vec<Chapter>, Miss> {
    let url = render_url(&strategy.url, &config.domain, Some(&item.url));
    let payload = fetch_payload(fetcher, config, strategy.kind, &url).await?;

    let fetched_at = chrono::Utc::now().timestamp_millis();
    let rows = payload
        .scope()
        .rows(&strategy.containers)
        .ok_or(Miss::NoContainer)?;
    let mut chapters: Vec<Chapter> = rows
        .iter()
        .filter_map(|row| extract_chapter(config, &strategy.chapter, *row, fetched_at))
        .collect();
    if chapters.is_empty() {
        return Err(Miss::Empty);
    }
    normalize::oldest_first(&mut chapters, strategy.chapter.newest_first);
    Ok(chapters)
}

/// Attempt one page-list strategy. Page order is positional and preserved
/// exactly as the source document declares it.
pub(crate) async fn pages(
    fetcher: &Fetcher,
    config: &SourceConfig,
    strategy: &PageStrategy,
    chapter: &ChapterRef,
) -> Result<Vec<Page>, Miss> {
    let url = render_url(&strategy.url, &config.domain, Some(&chapter.url));
    let payload = fetch_payload(fetcher, config, strategy.kind, &url).await?;

    let rows = payload
        .scope()
        .rows(&strategy.containers)
        .ok_or(Miss::NoContainer)?;
    let pages: Vec<Page> = rows
        .iter()
        .filter_map(|row| {
            let image = row.first_string(&strategy.page.image)?;
            let url = normalize::absolutize(&config.domain, &image);
            Some(Page {
                id: stable_id(&config.id, &url),
                preview: row
                    .first_string(&strategy.page.preview)
                    .map(|p| normalize::absolutize(&config.domain, &p)),
                url,
                source: config.id.clone(),
            })
        })
        .collect();
    if pages.is_empty() {
        return Err(Miss::Empty);
    }
    Ok(pages)
}

/// Attempt one tag-list strategy.
pub(crate) async fn tags(
    fetcher: &Fetcher,
    config: &SourceConfig,
    strategy: &TagStrategy,
) -> Result<BTreeSet<Tag>, Miss> {
    let url = render_url(&strategy.url, &config.domain, None);
    let payload = fetch_payload(fetcher, config, strategy.kind, &url).await?;

    let rows = payload
        .scope()
        .rows(&strategy.containers)
        .ok_or(Miss::NoContainer)?;
    let tags: BTreeSet<Tag> = rows
        .iter()
        .filter_map(|row| extract_tag(config, &strategy.tag, *row))
        .collect();
    if tags.is_empty() {
        return Err(Miss::Empty);
    }
    Ok(tags)
}
