// ABOUTME: Transport-level tests of the strategy chain: API-first extraction, markup fallback,
// ABOUTME: all-miss outcomes, concurrent detail joins and record normalization.

use httpmock::prelude::*;
use serde_json::json;

use mangetsu_core::{
    ChapterRef, CatalogState, Client, ItemRef, SearchQuery, SourceConfig, SourceRegistry,
    RATING_UNKNOWN,
};

/// A source whose strategies point at the mock server: a structured API
/// first, markup fallbacks after — the shape every builtin source has.
fn mock_source(base: &str) -> SourceConfig {
    serde_json::from_value(json!({
        "id": "mock",
        "name": "Mock",
        "domain": "mock.example",
        "capabilities": [
            {"field": "title", "kinds": ["match"]},
            {"field": "tag", "kinds": ["include"], "multiple": true}
        ],
        "list": [
            {
                "name": "api",
                "kind": "api",
                "url": format!("{base}/api/mangas"),
                "containers": ["data", "mangas"],
                "item": {
                    "url": ["slug"],
                    "title": ["title"],
                    "cover": ["cover"],
                    "state": ["status"],
                    "rating": ["rating"],
                    "rating_scale": 10.0
                },
                "search": {
                    "params": {"title": {"name": "title"}, "tag": {"name": "genre[]"}},
                    "sort_tokens": {"updated": "updated_desc"},
                    "pagination": {"mode": "offset_limit", "offset": "offset", "limit": "limit"},
                    "page_size": 20
                }
            },
            {
                "name": "html",
                "kind": "markup",
                "url": format!("{base}/mangas"),
                "containers": [".manga-item"],
                "item": {
                    "url": [["a", "href"]],
                    "url_strip_prefix": "manga/",
                    "title": ["h3"],
                    "cover": [["img", "src"], ["img", "data-src"]]
                },
                "search": {
                    "params": {"title": {"name": "search"}},
                    "pagination": {"mode": "page_number", "param": "page"}
                }
            }
        ],
        "detail": [
            {
                "name": "api",
                "kind": "api",
                "url": format!("{base}/api/manga/{{ref}}"),
                "item": {
                    "url": ["slug"],
                    "title": ["title"],
                    "description": ["description"],
                    "state": ["status"],
                    "rating": ["rating"],
                    "rating_scale": 10.0
                }
            },
            {
                "name": "html",
                "kind": "markup",
                "url": format!("{base}/manga/{{ref}}"),
                "item": {
                    "title": ["h1"],
                    "description": [".description"]
                }
            }
        ],
        "chapters": [
            {
                "name": "api",
                "kind": "api",
                "url": format!("{base}/api/manga/{{ref}}/chapters"),
                "containers": ["data"],
                "chapter": {
                    "url": ["id"],
                    "title": ["title"],
                    "number": ["number"],
                    "date": ["created_at"],
                    "date_patterns": ["%Y-%m-%d"],
                    "newest_first": true
                }
            }
        ],
        "pages": [
            {
                "name": "html",
                "kind": "markup",
                "url": format!("{base}/{{ref}}"),
                "containers": ["div.reading-content img"],
                "page": {"image": [["", "src"], ["", "data-src"]]}
            }
        ],
        "tags": [
            {
                "name": "api",
                "kind": "api",
                "url": format!("{base}/api/genres"),
                "containers": ["data"],
                "tag": {"title": ["name"], "key": ["slug"]}
            }
        ],
        "fallback_tags": [
            {"title": "Action", "key": "action"},
            {"title": "Drama", "key": "drama"}
        ]
    }))
    .expect("mock source config")
}

fn client_for(base: &str) -> Client {
    let mut registry = SourceRegistry::new();
    registry.register(mock_source(base));
    Client::builder().registry(registry).build()
}

#[tokio::test]
async fn list_uses_api_strategy_and_never_reaches_fallback() {
    let server = MockServer::start();
    let api = server.mock(|when, then| {
        when.method(GET).path("/api/mangas");
        then.status(200).json_body(json!({
            "data": [
                {"slug": "solo-max", "title": "Solo Max", "status": "Ongoing", "rating": 8},
                {"slug": "second", "title": "Second", "rating": 0}
            ]
        }));
    });
    let html = server.mock(|when, then| {
        when.method(GET).path("/mangas");
        then.status(200).body("<html></html>");
    });

    let client = client_for(&server.base_url());
    let items = client.list("mock", &SearchQuery::new()).await.unwrap();

    api.assert();
    html.assert_hits(0);

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "Solo Max");
    assert_eq!(items[0].state, Some(CatalogState::Ongoing));
    assert_eq!(items[0].rating, 0.8);
    // A zero source rating is "no votes yet", not a genuine 0.0.
    assert_eq!(items[1].rating, RATING_UNKNOWN);
    assert_eq!(items[0].chapters, None);
}

#[tokio::test]
async fn list_compiles_query_into_request_parameters() {
    let server = MockServer::start();
    let api = server.mock(|when, then| {
        when.method(GET)
            .path("/api/mangas")
            .query_param("title", "solo")
            .query_param("genre[]", "action")
            .query_param("sort", "updated_desc")
            .query_param("offset", "20")
            .query_param("limit", "20");
        then.status(200).json_body(json!({
            "data": [{"slug": "solo-max", "title": "Solo Max"}]
        }));
    });

    let client = client_for(&server.base_url());
    let query = SearchQuery::new()
        .title("solo")
        .include(mangetsu_core::SearchableField::Tag, ["action"])
        // State is not a declared capability; it must not reach the wire.
        .include(mangetsu_core::SearchableField::State, ["ongoing"])
        .offset(20);
    let items = client.list("mock", &query).await.unwrap();

    api.assert();
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn list_falls_back_to_markup_when_api_fails() {
    let server = MockServer::start();
    let api = server.mock(|when, then| {
        when.method(GET).path("/api/mangas");
        then.status(500);
    });
    let html = server.mock(|when, then| {
        when.method(GET).path("/mangas");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(
                r#"<html><body>
                    <div class="manga-item">
                        <h3>Solo Max</h3>
                        <a href="/manga/solo-max"><img src="https://cdn.mock.example/solo.jpg"></a>
                    </div>
                </body></html>"#,
            );
    });

    let client = client_for(&server.base_url());
    let items = client.list("mock", &SearchQuery::new()).await.unwrap();

    api.assert();
    html.assert();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Solo Max");
    assert_eq!(items[0].url, "solo-max");
    assert_eq!(
        items[0].cover_url.as_deref(),
        Some("https://cdn.mock.example/solo.jpg")
    );
}

#[tokio::test]
async fn list_degrades_to_empty_when_every_strategy_misses() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/mangas");
        then.status(200).json_body(json!({"unexpected": true}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/mangas");
        then.status(200).body("<html><body><p>maintenance</p></body></html>");
    });

    let client = client_for(&server.base_url());
    let items = client.list("mock", &SearchQuery::new()).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn detail_joins_concurrent_chapter_fetch() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/manga/solo-max");
        then.status(200).json_body(json!({
            "slug": "solo-max",
            "title": "Solo Max",
            "description": "A story.",
            "status": "completed",
            "rating": 9
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/manga/solo-max/chapters");
        then.status(200).json_body(json!({
            "data": [
                {"id": "c/10", "title": "Ch.10", "number": 10, "created_at": "2024-03-01"},
                {"id": "c/9", "title": "Ch.9", "number": 9, "created_at": "2024-02-01"},
                {"id": "c/1", "title": "Ch.1", "number": 1, "created_at": "2023-01-01"}
            ]
        }));
    });

    let client = client_for(&server.base_url());
    let item = client
        .detail("mock", &ItemRef::new("solo-max"))
        .await
        .unwrap();

    assert_eq!(item.title, "Solo Max");
    assert_eq!(item.state, Some(CatalogState::Finished));
    assert_eq!(item.rating, 0.9);

    // Raw newest-first order [10, 9, 1] comes back canonical oldest-first.
    let numbers: Vec<f32> = item
        .chapters
        .as_ref()
        .unwrap()
        .iter()
        .map(|c| c.number)
        .collect();
    assert_eq!(numbers, vec![1.0, 9.0, 10.0]);
    assert!(item.chapters.as_ref().unwrap()[0].has_upload_date());
}

#[tokio::test]
async fn detail_degrades_chapter_failure_to_empty_list() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/manga/solo-max");
        then.status(200)
            .json_body(json!({"slug": "solo-max", "title": "Solo Max"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/manga/solo-max/chapters");
        then.status(500);
    });

    let client = client_for(&server.base_url());
    let item = client
        .detail("mock", &ItemRef::new("solo-max"))
        .await
        .unwrap();

    assert_eq!(item.title, "Solo Max");
    assert_eq!(item.chapters, Some(Vec::new()));
}

#[tokio::test]
async fn detail_without_seed_fails_not_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(404);
    });

    let client = client_for(&server.base_url());
    let err = client
        .detail("mock", &ItemRef::new("gone"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn detail_with_seed_synthesizes_minimal_record() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(404);
    });

    let client = client_for(&server.base_url());
    let item = client
        .detail("mock", &ItemRef::new("gone").with_seed_title("Known Title"))
        .await
        .unwrap();

    assert_eq!(item.title, "Known Title");
    assert_eq!(item.url, "gone");
    assert_eq!(item.rating, RATING_UNKNOWN);
    assert_eq!(item.chapters, Some(Vec::new()));
}

#[tokio::test]
async fn detail_identity_is_idempotent() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/manga/solo-max");
        then.status(200)
            .json_body(json!({"slug": "solo-max", "title": "Solo Max"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/manga/solo-max/chapters");
        then.status(200).json_body(json!({"data": []}));
    });

    let client = client_for(&server.base_url());
    let first = client
        .detail("mock", &ItemRef::new("solo-max"))
        .await
        .unwrap();
    let second = client
        .detail("mock", &ItemRef::new("solo-max"))
        .await
        .unwrap();
    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn pages_preserve_source_document_order() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/read/solo-max/1");
        then.status(200).body(
            r#"<html><body><div class="reading-content">
                <img src="https://cdn.mock.example/p3.jpg">
                <img src="https://cdn.mock.example/p1.jpg">
                <img data-src="https://cdn.mock.example/p2.jpg">
            </div></body></html>"#,
        );
    });

    let client = client_for(&server.base_url());
    let pages = client
        .pages("mock", &ChapterRef::new("read/solo-max/1"))
        .await
        .unwrap();

    let urls: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://cdn.mock.example/p3.jpg",
            "https://cdn.mock.example/p1.jpg",
            "https://cdn.mock.example/p2.jpg"
        ]
    );
}

#[tokio::test]
async fn tags_fall_back_to_declared_static_set() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/genres");
        then.status(500);
    });

    let client = client_for(&server.base_url());
    let tags = client.tags("mock").await.unwrap();

    let keys: Vec<&str> = tags.iter().map(|t| t.key.as_str()).collect();
    assert_eq!(keys, vec!["action", "drama"]);
    assert!(tags.iter().all(|t| t.source == "mock"));
}

#[tokio::test]
async fn tags_prefer_live_fetch() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/genres");
        then.status(200).json_body(json!({
            "data": [{"name": "Isekai", "slug": "isekai"}]
        }));
    });

    let client = client_for(&server.base_url());
    let tags = client.tags("mock").await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags.iter().next().unwrap().key, "isekai");
}
