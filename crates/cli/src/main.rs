// ABOUTME: CLI for running one catalog operation against a configured source.
// ABOUTME: Prints canonical records as JSON for verification and scripting.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use mangetsu_core::{ChapterRef, Client, ItemRef, SearchQuery, SearchableField, SortOrder};

/// Run catalog operations against a configured source and print JSON.
#[derive(Parser, Debug)]
#[command(name = "mangetsu")]
#[command(about = "Extract canonical catalog records from a configured source", long_about = None)]
struct Args {
    /// Output compact JSON instead of pretty.
    #[arg(long, global = true, default_value_t = false)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the registered sources and their declared capabilities.
    Sources,
    /// Fetch one page of a source's catalog.
    List {
        /// Source id, e.g. "dilartube".
        source: String,
        /// Title search text.
        #[arg(long)]
        title: Option<String>,
        /// Tag keys to include (repeatable).
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Tag keys to exclude (repeatable).
        #[arg(long = "exclude-tag")]
        exclude_tags: Vec<String>,
        /// Sort order, e.g. "updated", "popularity", "alphabetical".
        #[arg(long)]
        sort: Option<String>,
        /// Pagination offset.
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Fetch a single item's detail record, chapters included.
    Detail {
        source: String,
        /// Item reference (site-relative or absolute URL).
        item: String,
        /// Previously known title, used to synthesize a minimal record
        /// when every strategy misses.
        #[arg(long)]
        seed_title: Option<String>,
    },
    /// Fetch an item's chapter list.
    Chapters { source: String, item: String },
    /// Fetch a chapter's page list.
    Pages { source: String, chapter: String },
    /// Fetch a source's tag set.
    Tags { source: String },
}

fn parse_sort(value: &str) -> Result<SortOrder> {
    let order = match value.to_lowercase().replace('-', "_").as_str() {
        "updated" => SortOrder::Updated,
        "updated_asc" => SortOrder::UpdatedAsc,
        "popularity" => SortOrder::Popularity,
        "popularity_asc" => SortOrder::PopularityAsc,
        "rating" => SortOrder::Rating,
        "rating_asc" => SortOrder::RatingAsc,
        "newest" => SortOrder::Newest,
        "newest_asc" => SortOrder::NewestAsc,
        "alphabetical" => SortOrder::Alphabetical,
        "alphabetical_desc" => SortOrder::AlphabeticalDesc,
        other => bail!("unknown sort order: {}", other),
    };
    Ok(order)
}

fn print_json(value: &serde_json::Value, compact: bool) -> Result<()> {
    if compact {
        println!("{}", serde_json::to_string(value)?);
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let client = Client::builder().build();

    let output = match &args.command {
        Command::Sources => {
            let sources: Vec<serde_json::Value> = client
                .sources()
                .iter()
                .map(|id| {
                    serde_json::json!({
                        "id": id,
                        "sort_orders": client.sort_orders(id).ok(),
                        "capabilities": client.capabilities(id).ok(),
                    })
                })
                .collect();
            serde_json::json!({ "sources": sources })
        }
        Command::List {
            source,
            title,
            tags,
            exclude_tags,
            sort,
            offset,
        } => {
            let mut query = SearchQuery::new().offset(*offset);
            if let Some(title) = title {
                query = query.title(title.clone());
            }
            if !tags.is_empty() {
                query = query.include(SearchableField::Tag, tags.clone());
            }
            if !exclude_tags.is_empty() {
                query = query.exclude(SearchableField::Tag, exclude_tags.clone());
            }
            if let Some(sort) = sort {
                query = query.order(parse_sort(sort)?);
            }
            let items = client.list(source, &query).await?;
            serde_json::json!({ "total": items.len(), "items": items })
        }
        Command::Detail {
            source,
            item,
            seed_title,
        } => {
            let mut item_ref = ItemRef::new(item.clone());
            if let Some(title) = seed_title {
                item_ref = item_ref.with_seed_title(title.clone());
            }
            serde_json::to_value(client.detail(source, &item_ref).await?)?
        }
        Command::Chapters { source, item } => {
            let chapters = client.chapters(source, &ItemRef::new(item.clone())).await?;
            serde_json::json!({ "total": chapters.len(), "chapters": chapters })
        }
        Command::Pages { source, chapter } => {
            let pages = client
                .pages(source, &ChapterRef::new(chapter.clone()))
                .await?;
            serde_json::json!({ "total": pages.len(), "pages": pages })
        }
        Command::Tags { source } => {
            let tags = client.tags(source).await?;
            serde_json::json!({ "total": tags.len(), "tags": tags })
        }
    };

    print_json(&output, args.compact)
}
