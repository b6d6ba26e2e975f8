// src/fetch/mod.rs
// =============================================================================
// This module defines how the crawler gets pages.
//
// The crawler never talks to the network itself. It calls a Fetcher, which
// returns a page's content plus every outbound link on it, or an error.
//
// Submodules:
// - http: the real fetcher (reqwest GET + anchor extraction)
// - html: pulls <a href> links out of an HTML document
// - table: an in-memory fetcher backed by a lookup table (tests, demos)
//
// Rust concepts:
// - Traits: the crawler is generic over anything that implements Fetcher
// - async-trait: async methods in a trait that is used as `dyn Fetcher`
// - Send + Sync: the crawler calls the fetcher from many tasks at once
// =============================================================================

mod html;
mod http;
mod table;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

pub use html::extract_html_links;
pub use http::HttpFetcher;
pub use table::StaticFetcher;

/// A successfully fetched page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedPage {
    /// The page body
    pub content: String,
    /// Every outbound URL found on the page
    pub links: Vec<String>,
}

impl FetchedPage {
    pub fn new(content: impl Into<String>, links: Vec<String>) -> Self {
        Self {
            content: content.into(),
            links,
        }
    }
}

/// Something that can retrieve a page and list the links on it.
///
/// Implementations are called concurrently with different URLs, so they
/// must be safe to share between tasks. A fetch either returns the complete
/// link list for the page or an error; partial results are not a thing.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

#[async_trait]
impl<F: Fetcher + ?Sized> Fetcher for Arc<F> {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        (**self).fetch(url).await
    }
}

#[async_trait]
impl<F: Fetcher + ?Sized> Fetcher for Box<F> {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        (**self).fetch(url).await
    }
}
