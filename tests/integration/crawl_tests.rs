//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use ripple_crawl::config::{CrawlSettings, FetcherConfig};
use ripple_crawl::crawler::{crawl, Coordinator, CrawlOutcome};
use ripple_crawl::output::render_report;
use ripple_crawl::state::UnitState;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An HTML page linking to each of `links`
fn html_page(links: &[&str]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();

    // set_body_string would force "text/plain" over an inserted
    // content-type header, so the mime type is passed with the body
    ResponseTemplate::new(200).set_body_raw(
        format!(
            "<html><head><title>Test</title></head><body>{}</body></html>",
            anchors
        ),
        "text/html; charset=utf-8",
    )
}

/// Mounts a page that must be requested exactly once
async fn mount_once(server: &MockServer, page_path: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

/// Normalized key of a path on the mock server
fn key(server: &MockServer, page_path: &str) -> String {
    let host = server.uri().trim_start_matches("http://").to_string();
    format!("{}{}", host, page_path.trim_end_matches('/'))
}

fn test_fetcher_config() -> FetcherConfig {
    FetcherConfig {
        timeout_ms: 300,
        user_agent: "ripple-crawl-tests/1.0".to_string(),
    }
}

async fn run(seed: &str, max_concurrency: usize, max_pages: usize) -> CrawlOutcome {
    let settings = CrawlSettings::new(seed, max_concurrency, max_pages);
    let coordinator =
        Coordinator::with_http(settings, &test_fetcher_config()).expect("Failed to set up crawl");

    tokio::time::timeout(Duration::from_secs(20), coordinator.run())
        .await
        .expect("Crawl did not terminate")
}

#[tokio::test]
async fn test_crawl_stays_on_seed_host() {
    let server = MockServer::start().await;

    mount_once(
        &server,
        "/",
        html_page(&["/hello", "/world", "http://other.com/x"]),
    )
    .await;
    mount_once(&server, "/hello", html_page(&[])).await;
    mount_once(&server, "/world", html_page(&[])).await;

    let outcome = run(&server.uri(), 1, 20).await;

    assert!(!outcome.cancelled);
    assert_eq!(outcome.pages_fetched(), 3);

    let mut keys: Vec<_> = outcome.ledger.visits.keys().map(|k| k.to_string()).collect();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            key(&server, ""),
            key(&server, "/hello"),
            key(&server, "/world"),
        ]
    );
    assert!(!outcome.ledger.visits.contains_key("other.com/x"));
    assert_eq!(outcome.count(UnitState::OutOfScope), 1);
}

#[tokio::test]
async fn test_trailing_slash_variants_fetched_once() {
    let server = MockServer::start().await;

    mount_once(&server, "/", html_page(&["/a", "/a/"])).await;
    mount_once(&server, "/a", html_page(&[])).await;

    let outcome = run(&server.uri(), 2, 20).await;

    assert_eq!(outcome.pages_fetched(), 2);
    assert_eq!(outcome.ledger.visits_of(&key(&server, "/a")), Some(2));
    assert_eq!(outcome.count(UnitState::Duplicate), 1);
}

#[tokio::test]
async fn test_page_budget_of_one() {
    let server = MockServer::start().await;

    mount_once(
        &server,
        "/",
        html_page(&["/one", "/two", "/three", "/four", "/five"]),
    )
    .await;
    // siblings must never be requested
    Mock::given(method("GET"))
        .and(path("/one"))
        .respond_with(html_page(&[]))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = run(&server.uri(), 4, 1).await;

    assert_eq!(outcome.pages_fetched(), 1);
    assert_eq!(outcome.count(UnitState::OverBudget), 5);

    let report = render_report(&outcome.ledger);
    let (fetched_section, skipped_section) = report
        .split_once("Not fetched")
        .expect("over-budget section missing");

    let fetched_lines: Vec<_> = fetched_section
        .lines()
        .filter(|line| line.starts_with("Found"))
        .collect();
    assert_eq!(
        fetched_lines,
        vec![format!("Found 1 link to {}", key(&server, ""))]
    );
    assert!(skipped_section.contains(&key(&server, "/five")));
}

#[tokio::test]
async fn test_failures_do_not_block_siblings() {
    let server = MockServer::start().await;

    mount_once(
        &server,
        "/",
        html_page(&["/broken", "/missing", "/slow", "/good"]),
    )
    .await;
    mount_once(&server, "/broken", ResponseTemplate::new(500)).await;
    mount_once(&server, "/missing", ResponseTemplate::new(404)).await;
    mount_once(
        &server,
        "/slow",
        html_page(&["/never"]).set_delay(Duration::from_secs(3)),
    )
    .await;
    mount_once(&server, "/good", html_page(&["/good/child"])).await;
    mount_once(&server, "/good/child", html_page(&[])).await;

    let outcome = run(&server.uri(), 2, 20).await;

    assert!(!outcome.cancelled);
    assert_eq!(outcome.count(UnitState::ServerError), 1);
    assert_eq!(outcome.count(UnitState::ClientError), 1);
    assert_eq!(outcome.count(UnitState::TimedOut), 1);
    assert_eq!(outcome.count(UnitState::Processed), 3);

    // failed pages still consumed their budget slot and are never retried
    assert_eq!(outcome.pages_fetched(), 6);
    assert!(outcome.ledger.visits.contains_key(key(&server, "/good/child").as_str()));
    assert!(!outcome.ledger.visits.contains_key(key(&server, "/never").as_str()));
}

#[tokio::test]
async fn test_content_type_handling() {
    let server = MockServer::start().await;

    mount_once(&server, "/", html_page(&["/data.json", "/image.png", "/page"])).await;
    mount_once(
        &server,
        "/data.json",
        ResponseTemplate::new(200)
            .set_body_string(r#"{"href": "/hidden"}"#)
            .insert_header("content-type", "application/json"),
    )
    .await;
    mount_once(
        &server,
        "/image.png",
        ResponseTemplate::new(200)
            .set_body_bytes(vec![0x89, b'P', b'N', b'G'])
            .insert_header("content-type", "image/png"),
    )
    .await;
    mount_once(&server, "/page", html_page(&[])).await;

    let outcome = run(&server.uri(), 3, 20).await;

    assert_eq!(outcome.count(UnitState::WrongContentType), 2);
    assert_eq!(outcome.count(UnitState::Processed), 2);
    assert!(!outcome.ledger.visits.contains_key(key(&server, "/hidden").as_str()));
}

#[tokio::test]
async fn test_link_cycle_terminates() {
    let server = MockServer::start().await;

    mount_once(&server, "/", html_page(&["/a"])).await;
    mount_once(&server, "/a", html_page(&["/b", "/"])).await;
    mount_once(&server, "/b", html_page(&["/a", "/"])).await;

    let outcome = run(&server.uri(), 3, 50).await;

    assert_eq!(outcome.pages_fetched(), 3);
    assert_eq!(outcome.ledger.visits_of(&key(&server, "")), Some(3));
    assert_eq!(outcome.ledger.visits_of(&key(&server, "/a")), Some(2));
    assert_eq!(outcome.ledger.visits_of(&key(&server, "/b")), Some(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_budget_exact_under_concurrency() {
    let server = MockServer::start().await;

    let children: Vec<String> = (0..30).map(|i| format!("/p{}", i)).collect();
    let refs: Vec<&str> = children.iter().map(String::as_str).collect();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&refs))
        .mount(&server)
        .await;
    // every child links to every other child
    Mock::given(method("GET"))
        .respond_with(html_page(&refs).set_delay(Duration::from_millis(10)))
        .mount(&server)
        .await;

    let outcome = run(&server.uri(), 8, 12).await;

    assert_eq!(outcome.pages_fetched(), 12);
    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 12);

    let mut paths: Vec<_> = requests.iter().map(|r| r.url.path().to_string()).collect();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), 12, "a page was requested twice");
}

#[tokio::test]
async fn test_crawl_entry_point() {
    let server = MockServer::start().await;

    mount_once(&server, "/", html_page(&["/docs"])).await;
    mount_once(&server, "/docs", html_page(&["/"])).await;

    let outcome = crawl(&server.uri(), 2, 10).await.expect("crawl failed");

    assert_eq!(outcome.pages_fetched(), 2);
    assert!(outcome.finished_at >= outcome.started_at);
}

#[tokio::test]
async fn test_unreachable_seed_is_reported_not_fatal() {
    // nothing listens on port 9 on loopback in the test environment
    let outcome = run("http://127.0.0.1:9/", 1, 5).await;

    assert_eq!(outcome.pages_fetched(), 1);
    let failed = outcome.count(UnitState::Unreachable) + outcome.count(UnitState::TimedOut);
    assert_eq!(failed, 1);
}
