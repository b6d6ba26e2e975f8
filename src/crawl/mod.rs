// src/crawl/mod.rs
// =============================================================================
// This module holds the crawler core.
//
// Features:
// - Depth-bounded traversal starting from one seed URL
// - Many fetches in flight at once, capped by a semaphore
// - Each URL fetched at most once, even when found by several pages at once
// - Cancellation and an overall deadline, returning partial results
//
// Submodules:
// - crawler: the Crawler and its dispatch loop
// - visited: the shared set of claimed URLs
// - report: what a crawl returns
// =============================================================================

mod crawler;
mod report;
mod visited;

pub use crawler::{crawl, Crawler, DEFAULT_CONCURRENCY};
pub use report::{CrawlReport, CrawlSummary, PageOutcome, PageReport};
pub use visited::{VisitRecord, VisitState, VisitedSet};
