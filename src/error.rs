// src/error.rs
// =============================================================================
// Error types for the crawler library.
//
// Two kinds of failure exist:
// - CrawlError: the caller misused the API (bad seed, bad settings).
//   Returned from Crawler::run before anything is fetched.
// - FetchError: one page could not be fetched. These never abort a crawl;
//   they are stored next to the URL in the report.
//
// Rust concepts:
// - thiserror: derive std::error::Error and Display from attributes
// - serde tagged enums: so fetch errors show up nicely in JSON output
// =============================================================================

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned to the caller of a crawl.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrawlError {
    /// The crawl could not start because an argument is invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Why a single page could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FetchError {
    /// The fetcher has no page for this URL
    #[error("not found: {0}")]
    NotFound(String),
    /// Server answered with a non-success status
    #[error("HTTP {0}")]
    Status(u16),
    #[error("request timed out")]
    Timeout,
    #[error("too many redirects")]
    TooManyRedirects,
    #[error("could not resolve hostname")]
    Dns,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("SSL certificate error")]
    Tls,
    /// The response body could not be read
    #[error("failed to read body: {0}")]
    Body(String),
    #[error("request failed: {0}")]
    Request(String),
    /// The crawl was cancelled while this fetch was in flight
    #[error("cancelled before the fetch completed")]
    Cancelled,
    /// The fetcher panicked; the message is the panic payload if it was a string
    #[error("fetcher panicked: {0}")]
    Panicked(String),
}

impl From<reqwest::Error> for FetchError {
    // Same buckets the link checker used for HEAD requests
    fn from(error: reqwest::Error) -> Self {
        let error_string = error.to_string();

        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_redirect() {
            FetchError::TooManyRedirects
        } else if error.is_connect() {
            if error_string.contains("dns") {
                FetchError::Dns
            } else {
                FetchError::Connect(error_string)
            }
        } else if error_string.contains("certificate") || error_string.contains("ssl") {
            FetchError::Tls
        } else if error.is_body() || error.is_decode() {
            FetchError::Body(error_string)
        } else if let Some(status) = error.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Request(error_string)
        }
    }
}
