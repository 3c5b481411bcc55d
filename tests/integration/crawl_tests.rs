//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use blackscout::config::Config;
use blackscout::crawler::{crawl, CrawlSettings, Crawler, FixedDelay, FixedIdentity};
use std::collections::HashSet;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Settings with no pause and a fixed identity, so runs are fast and predictable
fn quick_settings(threads: usize) -> CrawlSettings {
    CrawlSettings::new(threads, 0)
        .with_delay(FixedDelay(Duration::ZERO))
        .with_identity(FixedIdentity("BlackScoutTest/1.0".to_string()))
}

/// Mounts an HTML page at `route`
async fn page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

fn as_set(results: &[String]) -> HashSet<String> {
    results.iter().cloned().collect()
}

#[tokio::test]
async fn test_crawl_stays_on_host() {
    let server = MockServer::start().await;
    let elsewhere = MockServer::start().await;
    let base = server.uri();

    page(
        &server,
        "/",
        &format!(
            r#"<a href="/about">About</a><a href="{}/secret">Elsewhere</a>"#,
            elsewhere.uri()
        ),
    )
    .await;
    page(&server, "/about", "<p>about us</p>").await;

    // Same IP, different port: never contacted
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&elsewhere)
        .await;

    let crawler = Crawler::new(&base, quick_settings(4)).unwrap();
    let report = crawler.run().await;

    let expected: HashSet<String> = [format!("{}/", base), format!("{}/about", base)]
        .into_iter()
        .collect();
    assert_eq!(as_set(&report.results), expected);
    assert_eq!(report.results[0], format!("{}/", base));
    assert_eq!(report.total_requests, 2);
    assert!(!report.cancelled);
}

#[tokio::test]
async fn test_self_link_listed_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"<a href="/">home</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    let report = Crawler::new(&base, quick_settings(4)).unwrap().run().await;

    assert_eq!(report.results, vec![format!("{}/", base)]);
    assert_eq!(report.total_requests, 1);
}

#[tokio::test]
async fn test_error_status_page_listed_without_links() {
    let server = MockServer::start().await;
    let base = server.uri();

    page(&server, "/", r#"<a href="/gone">gone</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string(r#"<a href="/hidden">hidden</a>"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let report = Crawler::new(&base, quick_settings(4)).unwrap().run().await;

    let expected: HashSet<String> = [format!("{}/", base), format!("{}/gone", base)]
        .into_iter()
        .collect();
    assert_eq!(as_set(&report.results), expected);
    assert_eq!(report.results.len(), 2);
    assert_eq!(report.failed_fetches, 0);
}

#[tokio::test]
async fn test_redirect_not_followed() {
    let server = MockServer::start().await;
    let base = server.uri();

    page(&server, "/", r#"<a href="/old">old</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let report = Crawler::new(&base, quick_settings(4)).unwrap().run().await;
    assert_eq!(report.results.len(), 2);
    assert!(!report.results.contains(&format!("{}/new", base)));
}

#[tokio::test]
async fn test_cyclic_graph_terminates() {
    let server = MockServer::start().await;
    let base = server.uri();

    page(&server, "/", r#"<a href="/a">a</a>"#).await;
    page(&server, "/a", r#"<a href="/b">b</a><a href="/">home</a>"#).await;
    page(&server, "/b", r#"<a href="/a">a</a><a href="/c">c</a>"#).await;
    page(&server, "/c", r#"<a href="/">home</a><a href="/b">b</a>"#).await;

    let report = tokio::time::timeout(
        Duration::from_secs(10),
        Crawler::new(&base, quick_settings(3)).unwrap().run(),
    )
    .await
    .expect("crawl of a cyclic site should finish");

    assert_eq!(report.results.len(), 4);
    assert_eq!(as_set(&report.results).len(), report.results.len());
    assert_eq!(report.total_requests, 4);
}

#[tokio::test]
async fn test_each_url_fetched_once_under_contention() {
    let server = MockServer::start().await;
    let base = server.uri();

    // Every page links to every other page
    let links: String = (0..20)
        .map(|i| format!(r#"<a href="/p{}">p{}</a>"#, i, i))
        .collect();
    page(&server, "/", &links).await;
    for i in 0..20 {
        Mock::given(method("GET"))
            .and(path(format!("/p{}", i)))
            .respond_with(ResponseTemplate::new(200).set_body_string(links.clone()))
            .expect(1)
            .mount(&server)
            .await;
    }

    let report = Crawler::new(&base, quick_settings(16)).unwrap().run().await;

    assert_eq!(report.results.len(), 21);
    assert_eq!(as_set(&report.results).len(), 21);
    assert_eq!(report.total_requests, 21);
    assert!(report.peak_in_flight <= 16);
}

#[tokio::test]
async fn test_src_and_action_followed() {
    let server = MockServer::start().await;
    let base = server.uri();

    page(
        &server,
        "/",
        r#"<img src="/logo.png"><form action="/search"></form><script src="app.js"></script>"#,
    )
    .await;
    page(&server, "/logo.png", "").await;
    page(&server, "/search", "").await;
    page(&server, "/app.js", "").await;

    let report = Crawler::new(&base, quick_settings(4)).unwrap().run().await;

    let expected: HashSet<String> = ["/", "/logo.png", "/search", "/app.js"]
        .iter()
        .map(|p| format!("{}{}", base, p))
        .collect();
    assert_eq!(as_set(&report.results), expected);
}

#[tokio::test]
async fn test_relative_links_resolve_against_target() {
    let server = MockServer::start().await;
    let base = server.uri();

    page(&server, "/", r#"<a href="/docs/intro">intro</a>"#).await;
    page(&server, "/docs/intro", r#"<a href="next">next</a>"#).await;
    page(&server, "/next", "").await;
    Mock::given(method("GET"))
        .and(path("/docs/next"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let report = Crawler::new(&base, quick_settings(2)).unwrap().run().await;
    assert!(report.results.contains(&format!("{}/next", base)));
    assert!(!report.results.contains(&format!("{}/docs/next", base)));
    assert_eq!(report.results.len(), 3);
}

#[tokio::test]
async fn test_network_failure_does_not_stop_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    page(&server, "/", r#"<a href="/slow">slow</a><a href="/fine">fine</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    page(&server, "/fine", r#"<a href="/deeper">deeper</a>"#).await;
    page(&server, "/deeper", "").await;

    let settings = quick_settings(4).with_request_timeout(Duration::from_millis(300));
    let report = Crawler::new(&base, settings).unwrap().run().await;

    assert_eq!(report.failed_fetches, 1);
    assert_eq!(report.results.len(), 4);
    assert_eq!(report.total_requests, 4);
    assert!(report.results.contains(&format!("{}/slow", base)));
}

#[tokio::test]
async fn test_single_slot_with_fixed_delay() {
    let server = MockServer::start().await;
    let base = server.uri();

    page(&server, "/", r#"<a href="/one">1</a><a href="/two">2</a>"#).await;
    page(&server, "/one", "").await;
    page(&server, "/two", "").await;

    let settings = CrawlSettings::new(1, 0)
        .with_delay(FixedDelay(Duration::from_millis(100)))
        .with_identity(FixedIdentity("BlackScoutTest/1.0".to_string()));
    let report = Crawler::new(&base, settings).unwrap().run().await;

    assert_eq!(report.results.len(), 3);
    assert_eq!(report.peak_in_flight, 1);
    // The pause is taken while holding the only slot, so pauses never overlap
    assert!(report.elapsed >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_spare_slots_overlap_fetches() {
    const PAGES: usize = 4;
    let server = MockServer::start().await;
    let base = server.uri();

    let links: String = (0..PAGES)
        .map(|i| format!(r#"<a href="/slow{}">slow</a>"#, i))
        .collect();
    page(&server, "/", &links).await;
    for i in 0..PAGES {
        Mock::given(method("GET"))
            .and(path(format!("/slow{}", i)))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let report = Crawler::new(&base, quick_settings(PAGES + 1))
        .unwrap()
        .run()
        .await;

    assert_eq!(report.results.len(), PAGES + 1);
    assert!(report.peak_in_flight > 1);
    // Run back to back the slow pages alone would take PAGES * 300ms
    assert!(report.elapsed < Duration::from_millis(300 * PAGES as u64 - 300));
}

#[tokio::test]
async fn test_identity_sent_on_every_request() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(header("user-agent", "BlackScoutTest/1.0"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"<a href="/x">x</a>"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("user-agent", "BlackScoutTest/1.0"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let report = Crawler::new(&base, quick_settings(2)).unwrap().run().await;
    assert_eq!(report.total_requests, 2);
}

#[tokio::test]
async fn test_time_limit_stops_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();
    page(&server, "/", "").await;

    let settings = quick_settings(2)
        .with_delay(FixedDelay(Duration::from_secs(30)))
        .with_max_duration(Duration::from_millis(200));
    let report = tokio::time::timeout(
        Duration::from_secs(5),
        Crawler::new(&base, settings).unwrap().run(),
    )
    .await
    .expect("time limit should end the crawl");

    assert!(report.cancelled);
    assert_eq!(report.total_requests, 0);
    assert_eq!(report.results, vec![format!("{}/", base)]);
}

#[tokio::test]
async fn test_external_cancellation() {
    let server = MockServer::start().await;
    let base = server.uri();
    page(&server, "/", "").await;

    let settings = quick_settings(2).with_delay(FixedDelay(Duration::from_secs(30)));
    let crawler = Crawler::new(&base, settings).unwrap();
    let token = crawler.cancellation_token();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
    });

    let report = tokio::time::timeout(Duration::from_secs(5), crawler.run())
        .await
        .expect("cancellation should end the crawl");
    assert!(report.cancelled);
}

#[tokio::test]
async fn test_crawl_from_config() {
    let server = MockServer::start().await;
    let base = server.uri();
    page(&server, "/", r#"<a href="/about">About</a>"#).await;
    page(&server, "/about", "").await;

    let mut config = Config::default();
    config.crawler.target = base.clone();
    config.crawler.threads = 2;
    config.crawler.delay_ms = 0;

    let report = crawl(&config).await.unwrap();
    assert_eq!(report.unique_urls(), 2);
    assert_eq!(report.target.as_str(), format!("{}/", base));
}
