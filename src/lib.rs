//! Bounded-depth concurrent web crawler.
//!
//! Given a seed URL, a [`Fetcher`] and a maximum depth, the [`Crawler`]
//! visits every reachable page at most once, fetching pages in parallel,
//! and returns a [`CrawlReport`] with one entry per visited URL.
//!
//! ```rust,ignore
//! use link_crawler::{crawl, StaticFetcher};
//!
//! let fetcher = StaticFetcher::new()
//!     .with_page("https://golang.org/", "The Go Programming Language", ["https://golang.org/pkg/"]);
//! let report = crawl("https://golang.org/", 4, fetcher).await?;
//! for page in &report.pages {
//!     println!("{} [depth {}] ok={}", page.url, page.depth, page.is_ok());
//! }
//! ```
//!
//! Fetching is delegated entirely to the [`Fetcher`] trait. [`HttpFetcher`]
//! issues HTTP GETs and extracts anchor links; [`StaticFetcher`] serves
//! pages from an in-memory table.

pub mod crawl;
pub mod error;
pub mod fetch;
pub mod logging;

pub use crawl::{
    crawl, CrawlReport, CrawlSummary, Crawler, PageOutcome, PageReport, VisitRecord, VisitState,
    VisitedSet, DEFAULT_CONCURRENCY,
};
pub use error::{CrawlError, FetchError};
pub use fetch::{extract_html_links, FetchedPage, Fetcher, HttpFetcher, StaticFetcher};
pub use tokio_util::sync::CancellationToken;
