// src/crawl/report.rs
// =============================================================================
// What a crawl hands back to its caller.
//
// A CrawlReport lists one PageReport per page whose fetch finished, in the
// order the fetches completed. A failed page is a normal entry with an
// error, not a reason to stop. If the crawl was cancelled, `cancelled` is
// set and the URLs that were still being fetched are listed in `abandoned`.
// =============================================================================

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// The result of fetching one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageOutcome {
    Fetched { content: String, links: Vec<String> },
    Failed { error: FetchError },
}

/// One visited URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageReport {
    pub url: String,
    /// Link hops from the seed (seed = 0)
    pub depth: usize,
    #[serde(flatten)]
    pub outcome: PageOutcome,
}

impl PageReport {
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, PageOutcome::Fetched { .. })
    }

    pub fn content(&self) -> Option<&str> {
        match &self.outcome {
            PageOutcome::Fetched { content, .. } => Some(content),
            PageOutcome::Failed { .. } => None,
        }
    }

    pub fn links(&self) -> &[String] {
        match &self.outcome {
            PageOutcome::Fetched { links, .. } => links,
            PageOutcome::Failed { .. } => &[],
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match &self.outcome {
            PageOutcome::Fetched { .. } => None,
            PageOutcome::Failed { error } => Some(error),
        }
    }
}

/// Everything one crawl produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlReport {
    pub seed: String,
    pub max_depth: usize,
    /// Finished pages, in completion order
    pub pages: Vec<PageReport>,
    /// True when a cancellation or deadline stopped the crawl early
    pub cancelled: bool,
    /// URLs whose fetch was still running when the crawl was cancelled
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub abandoned: Vec<String>,
    #[serde(with = "duration_millis", rename = "elapsed_ms")]
    pub elapsed: Duration,
}

impl CrawlReport {
    pub(crate) fn new(seed: &str, max_depth: usize) -> Self {
        Self {
            seed: seed.to_string(),
            max_depth,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &PageReport> {
        self.pages.iter().filter(|page| page.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &PageReport> {
        self.pages.iter().filter(|page| !page.is_ok())
    }

    pub fn get(&self, url: &str) -> Option<&PageReport> {
        self.pages.iter().find(|page| page.url == url)
    }

    /// Visited URLs in completion order.
    pub fn urls(&self) -> Vec<&str> {
        self.pages.iter().map(|page| page.url.as_str()).collect()
    }

    /// True when every page was fetched and nothing was cut short.
    pub fn is_complete_success(&self) -> bool {
        !self.cancelled && self.pages.iter().all(PageReport::is_ok)
    }

    pub fn summary(&self) -> CrawlSummary {
        let succeeded = self.succeeded().count();
        CrawlSummary {
            succeeded,
            failed: self.pages.len() - succeeded,
            abandoned: self.abandoned.len(),
            links_discovered: self.pages.iter().map(|page| page.links().len()).sum(),
            cancelled: self.cancelled,
            elapsed: self.elapsed,
        }
    }
}

/// Counts for printing at the end of a crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub abandoned: usize,
    pub links_discovered: usize,
    pub cancelled: bool,
    pub elapsed: Duration,
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CrawlReport {
        let mut report = CrawlReport::new("https://golang.org/", 2);
        report.pages.push(PageReport {
            url: "https://golang.org/".to_string(),
            depth: 0,
            outcome: PageOutcome::Fetched {
                content: "The Go Programming Language".to_string(),
                links: vec![
                    "https://golang.org/pkg/".to_string(),
                    "https://golang.org/cmd/".to_string(),
                ],
            },
        });
        report.pages.push(PageReport {
            url: "https://golang.org/cmd/".to_string(),
            depth: 1,
            outcome: PageOutcome::Failed {
                error: FetchError::NotFound("https://golang.org/cmd/".to_string()),
            },
        });
        report.elapsed = Duration::from_millis(42);
        report
    }

    #[test]
    fn test_summary_counts() {
        let summary = sample().summary();
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.links_discovered, 2);
        assert!(!summary.cancelled);
    }

    #[test]
    fn test_page_accessors() {
        let report = sample();
        let root = report.get("https://golang.org/").unwrap();
        assert_eq!(root.content(), Some("The Go Programming Language"));
        assert!(root.error().is_none());

        let cmd = report.get("https://golang.org/cmd/").unwrap();
        assert!(cmd.links().is_empty());
        assert!(matches!(cmd.error(), Some(FetchError::NotFound(_))));
        assert!(!report.is_complete_success());
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["elapsed_ms"], 42);
        assert_eq!(json["pages"][0]["status"], "fetched");
        assert_eq!(json["pages"][1]["status"], "failed");
        assert_eq!(json["pages"][1]["error"]["kind"], "not_found");
        assert!(json.get("abandoned").is_none());
    }
}
