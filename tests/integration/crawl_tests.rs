//! Integration tests for the crawler
//!
//! These tests use wiremock to stand up both the crawled site and the index
//! store's bulk endpoint, and run full crawl passes end-to-end.

use page_indexer::config::{load_config, Config};
use page_indexer::crawler::Crawler;
use page_indexer::{ConfigError, IndexerError};
use std::collections::HashSet;
use std::io::Write;
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Writes a YAML configuration to a temp file and loads it
fn load_test_config(site: &str, elastic: &str, max_depth: u32, bulk_size: u32) -> Config {
    let yaml = format!(
        r#"
elastic:
  uri: "{elastic}"
  indexName: "pages"
  bulkSize: {bulk_size}
logLevel: Debug
urlList:
  - "{site}/"
numberOfConcurrentTasks: 4
maximumSearchDepth: {max_depth}
maxFetchAttempts: 3
retryBackoffMillis: 1
fetchTimeoutSeconds: 5
"#
    );

    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(yaml.as_bytes())
        .expect("Failed to write config");
    load_config(file.path()).expect("Test config should be valid")
}

/// Starts an index store that accepts every bulk request
async fn start_store() -> MockServer {
    let store = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"name":"test"}"#))
        .mount(&store)
        .await;

    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"took":1,"errors":false,"items":[]}"#),
        )
        .mount(&store)
        .await;

    store
}

fn html_page(title: &str, links: &[&str]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>{}</title></head><body><h1>{}</h1><p>Body text</p>{}</body></html>",
            title, title, anchors
        ))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, route: &str, title: &str, links: &[&str]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_page(title, links))
        .mount(server)
        .await;
}

/// Document ids from every bulk request the store accepted, in order
async fn indexed_ids(store: &MockServer) -> Vec<String> {
    let requests = store.received_requests().await.unwrap_or_default();
    let mut ids = Vec::new();

    for request in requests.iter().filter(|r| r.url.path() == "/_bulk") {
        let body = String::from_utf8_lossy(&request.body);
        for line in body.lines().step_by(2) {
            let action: serde_json::Value =
                serde_json::from_str(line).expect("Action line should be JSON");
            ids.push(
                action["index"]["_id"]
                    .as_str()
                    .expect("Action should carry an _id")
                    .to_string(),
            );
        }
    }

    ids
}

/// Number of requests the site received for `route`
async fn hits(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == route)
        .count()
}

#[tokio::test]
async fn test_full_pass_indexes_every_reachable_page_once() {
    let site = MockServer::start().await;
    let store = start_store().await;

    mount_page(&site, "/", "Home", &["/page1", "/page2"]).await;
    mount_page(&site, "/page1", "Page 1", &["/", "/page2"]).await;
    mount_page(&site, "/page2", "Page 2", &["/page1#section"]).await;

    let config = load_test_config(&site.uri(), &store.uri(), 5, 2);
    let crawler = Crawler::from_config(&config)
        .await
        .expect("Crawler should start");
    let stats = crawler.run_pass(&CancellationToken::new()).await;

    assert_eq!(stats.pages_scraped, 3);
    assert_eq!(stats.pages_indexed, 3);
    assert_eq!(stats.pages_pending, 0);

    for route in ["/", "/page1", "/page2"] {
        assert_eq!(hits(&site, route).await, 1, "{} fetched more than once", route);
    }

    let ids: HashSet<String> = indexed_ids(&store).await.into_iter().collect();
    let expected: HashSet<String> = ["/", "/page1", "/page2"]
        .iter()
        .map(|route| format!("{}{}", site.uri(), route))
        .collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_bulk_document_carries_page_fields() {
    let site = MockServer::start().await;
    let store = start_store().await;
    mount_page(&site, "/", "Home", &[]).await;

    let config = load_test_config(&site.uri(), &store.uri(), 0, 1);
    let crawler = Crawler::from_config(&config).await.unwrap();
    crawler.run_pass(&CancellationToken::new()).await;

    let requests = store.received_requests().await.unwrap_or_default();
    let bulk = requests
        .iter()
        .find(|r| r.url.path() == "/_bulk")
        .expect("A bulk request should have been sent");
    let body = String::from_utf8_lossy(&bulk.body);
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 2);

    let doc: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(doc["title"], "Home");
    assert_eq!(doc["headings"][0], "Home");
    assert_eq!(doc["paragraphs"][0], "Body text");
    assert!(doc["rawContent"].as_str().unwrap().contains("<h1>Home</h1>"));
    assert!(doc["scrapedAt"].is_string());
}

#[tokio::test]
async fn test_depth_limit_prevents_deeper_fetches() {
    let site = MockServer::start().await;
    let store = start_store().await;

    mount_page(&site, "/", "Root", &["/a"]).await;
    mount_page(&site, "/a", "A", &["/b"]).await;
    mount_page(&site, "/b", "B", &[]).await;

    let config = load_test_config(&site.uri(), &store.uri(), 1, 10);
    let crawler = Crawler::from_config(&config).await.unwrap();
    let stats = crawler.run_pass(&CancellationToken::new()).await;

    assert_eq!(hits(&site, "/b").await, 0);
    assert_eq!(stats.depth_drops, 1);
    assert_eq!(stats.pages_scraped, 2);

    // Below the threshold, the end-of-pass flush delivers the tail
    assert_eq!(indexed_ids(&store).await.len(), 2);
}

#[tokio::test]
async fn test_flaky_page_is_retried_then_indexed() {
    let site = MockServer::start().await;
    let store = start_store().await;

    mount_page(&site, "/", "Root", &["/flaky"]).await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&site)
        .await;
    mount_page(&site, "/flaky", "Recovered", &[]).await;

    let config = load_test_config(&site.uri(), &store.uri(), 2, 10);
    let crawler = Crawler::from_config(&config).await.unwrap();
    let stats = crawler.run_pass(&CancellationToken::new()).await;

    assert_eq!(hits(&site, "/flaky").await, 2);
    assert_eq!(stats.retries, 1);
    assert_eq!(stats.abandoned, 0);
    assert!(indexed_ids(&store)
        .await
        .contains(&format!("{}/flaky", site.uri())));
}

#[tokio::test]
async fn test_missing_page_is_abandoned_without_retry() {
    let site = MockServer::start().await;
    let store = start_store().await;

    mount_page(&site, "/", "Root", &["/gone"]).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&site)
        .await;

    let config = load_test_config(&site.uri(), &store.uri(), 2, 10);
    let crawler = Crawler::from_config(&config).await.unwrap();
    let stats = crawler.run_pass(&CancellationToken::new()).await;

    assert_eq!(hits(&site, "/gone").await, 1);
    assert_eq!(stats.abandoned, 1);
    assert_eq!(indexed_ids(&store).await.len(), 1);
}

#[tokio::test]
async fn test_failed_flush_is_retried_with_retained_pages() {
    let site = MockServer::start().await;
    let store = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&store)
        .await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&store)
        .await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"errors":false,"items":[]}"#))
        .mount(&store)
        .await;

    mount_page(&site, "/", "Root", &["/next"]).await;
    mount_page(&site, "/next", "Next", &[]).await;

    let config = load_test_config(&site.uri(), &store.uri(), 1, 1);
    let crawler = Crawler::from_config(&config).await.unwrap();
    let stats = crawler.run_pass(&CancellationToken::new()).await;

    assert_eq!(stats.pages_indexed, 2);
    assert_eq!(stats.pages_pending, 0);

    // The second wave's flush is rejected; the end-of-pass flush resends both pages
    let ids = indexed_ids(&store).await;
    assert_eq!(ids.len(), 4);
    let root = format!("{}/", site.uri());
    assert_eq!(ids.iter().filter(|id| **id == root).count(), 2);
}

#[tokio::test]
async fn test_unreachable_store_fails_startup() {
    let site = MockServer::start().await;
    let config = load_test_config(&site.uri(), "http://127.0.0.1:9", 1, 1);

    match Crawler::from_config(&config).await {
        Err(IndexerError::Config(ConfigError::StoreUnreachable { .. })) => {}
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("startup should fail without a reachable store"),
    }
    assert_eq!(hits(&site, "/").await, 0);
}

#[tokio::test]
async fn test_invalid_config_file_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"elastic:\n  uri: \"not a url\"\n  indexName: pages\nurlList: []\n")
        .unwrap();

    assert!(load_config(file.path()).is_err());
}
