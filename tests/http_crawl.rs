// tests/http_crawl.rs
// =============================================================================
// End-to-end crawl of a small site served by a local mock HTTP server.
// =============================================================================

use httpmock::{Method::GET, MockServer};
use link_crawler::{Crawler, FetchError, HttpFetcher};
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn crawls_mock_site_once_per_page() {
    let server = MockServer::start_async().await;

    let index = server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200).body(
                r#"<a href="/pkg/">pkg</a> <a href="/cmd/">cmd</a> <a href="https://elsewhere.test/">out</a>"#,
            );
        })
        .await;
    let pkg = server
        .mock_async(|when, then| {
            when.method(GET).path("/pkg/");
            then.status(200).body(
                r#"<a href="/">home</a> <a href="/cmd/">cmd</a> <a href="/pkg/fmt/">fmt</a> <a href="/pkg/os/">os</a>"#,
            );
        })
        .await;
    let fmt = server
        .mock_async(|when, then| {
            when.method(GET).path("/pkg/fmt/");
            then.status(200).body(r#"<a href="/">home</a> <a href="/pkg/">pkg</a>"#);
        })
        .await;
    let os = server
        .mock_async(|when, then| {
            when.method(GET).path("/pkg/os/");
            then.status(200).body(r#"<a href="/">home</a> <a href="/pkg/">pkg</a>"#);
        })
        .await;
    let cmd = server
        .mock_async(|when, then| {
            when.method(GET).path("/cmd/");
            then.status(404);
        })
        .await;

    let fetcher = HttpFetcher::new(Duration::from_secs(5))
        .unwrap()
        .with_allowed_domain(server.host());
    let report = Crawler::new(fetcher)
        .with_concurrency(4)
        .run(&server.url("/"), 4)
        .await
        .unwrap();

    assert_eq!(report.succeeded().count(), 4);
    assert_eq!(report.failed().count(), 1);

    let failed = report.failed().next().unwrap();
    assert_eq!(failed.url, server.url("/cmd/"));
    assert_eq!(failed.error(), Some(&FetchError::Status(404)));

    for mock in [&index, &pkg, &fmt, &os, &cmd] {
        assert_eq!(mock.hits_async().await, 1);
    }
}
