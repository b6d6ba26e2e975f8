// src/fetch/http.rs
// =============================================================================
// The production Fetcher: downloads a page over HTTP and lists its links.
//
// Key functionality:
// - One reqwest Client shared by every fetch (connection pooling)
// - Per-request timeout and a redirect limit
// - Non-2xx responses and network failures become FetchError values
// - Links are pulled from the body with extract_html_links
// - Optionally keeps only links on one domain, so a crawl stays on a site
//
// Rust concepts:
// - async/await: the fetch suspends while waiting for the network
// - Builder methods that take and return `self`
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::html::{extract_html_links, retain_same_domain};
use super::{FetchedPage, Fetcher};
use crate::error::FetchError;

const USER_AGENT: &str = concat!("link-crawler/", env!("CARGO_PKG_VERSION"));

/// Fetches pages with HTTP GET and extracts their anchor links.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    allowed_domain: Option<String>,
}

impl HttpFetcher {
    /// Creates a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Request(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client))
    }

    /// Wraps an already configured client.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            allowed_domain: None,
        }
    }

    /// Only report links whose host equals `domain`.
    pub fn with_allowed_domain(mut self, domain: impl Into<String>) -> Self {
        self.allowed_domain = Some(domain.into());
        self
    }

    async fn fetch_body(&self, url: &str) -> Result<String, FetchError> {
        // `?` converts reqwest::Error into FetchError via the From impl
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let content = self.fetch_body(url).await?;

        // Relative links are resolved against the URL we actually requested
        let mut links = extract_html_links(&content, url);
        if let Some(domain) = &self.allowed_domain {
            links = retain_same_domain(links, domain);
        }

        if links.is_empty() {
            tracing::debug!("found zero links on {}", url);
        }

        Ok(FetchedPage { content, links })
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why one Client for every fetch?
//    - The crawler wraps the whole HttpFetcher in an Arc and hands it to
//      every task; reqwest's Client is itself reference counted inside
//
// 2. What is #[async_trait]?
//    - Lets a trait have async fn methods and still be used as dyn Fetcher
//    - It boxes the returned future behind the scenes
//
// 3. Why return FetchError instead of panicking on a 404?
//    - A broken page is normal on the web; the crawler records it and moves on
// -----------------------------------------------------------------------------
