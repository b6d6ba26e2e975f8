// src/crawl/visited.rs
// =============================================================================
// The visited set: every URL the crawl has ever accepted, and what happened
// to it.
//
// A URL enters the set exactly once, through `claim`. Checking and
// inserting happen under one lock, so when two tasks discover the same URL
// at the same moment only one of them wins and goes on to fetch it.
//
// Each record moves through:
//   Pending -> Succeeded
//   Pending -> Failed
// and never changes again once it has left Pending.
//
// Rust concepts:
// - Arc<Mutex<...>>: shared, mutable state across tasks
// - The lock is never held across an .await, so std::sync::Mutex is enough
// =============================================================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Where a claimed URL is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum VisitState {
    /// Claimed, fetch not finished yet
    Pending,
    Succeeded { links: Vec<String> },
    Failed { error: FetchError },
}

/// One entry per URL ever accepted for visiting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub url: String,
    /// Link hops from the seed when the URL was first claimed (seed = 0)
    pub depth: usize,
    #[serde(flatten)]
    pub state: VisitState,
}

impl VisitRecord {
    pub fn is_pending(&self) -> bool {
        matches!(self.state, VisitState::Pending)
    }
}

/// Shared map of URL -> VisitRecord.
///
/// Cloning gives another handle to the same set. Pass one handle to several
/// crawls to make them skip each other's pages.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    inner: Arc<Mutex<HashMap<String, VisitRecord>>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically checks whether `url` is known and, if not, marks it pending.
    ///
    /// Returns `true` if this call claimed the URL and the caller should
    /// fetch it, `false` if it was already claimed.
    pub fn claim(&self, url: &str, depth: usize) -> bool {
        let mut records = self.lock();
        if records.contains_key(url) {
            return false;
        }

        records.insert(
            url.to_string(),
            VisitRecord {
                url: url.to_string(),
                depth,
                state: VisitState::Pending,
            },
        );
        true
    }

    /// Stores the links of a successful fetch. Ignored unless the URL is pending.
    pub fn record_success(&self, url: &str, links: Vec<String>) -> bool {
        self.finish(url, VisitState::Succeeded { links })
    }

    /// Stores a fetch failure. Ignored unless the URL is pending.
    pub fn record_failure(&self, url: &str, error: FetchError) -> bool {
        self.finish(url, VisitState::Failed { error })
    }

    pub fn get(&self, url: &str) -> Option<VisitRecord> {
        self.lock().get(url).cloned()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// URLs that were claimed but whose fetch has not finished.
    pub fn pending(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .lock()
            .values()
            .filter(|record| record.is_pending())
            .map(|record| record.url.clone())
            .collect();
        urls.sort();
        urls
    }

    /// A copy of every record, sorted by URL.
    pub fn snapshot(&self) -> Vec<VisitRecord> {
        let mut records: Vec<VisitRecord> = self.lock().values().cloned().collect();
        records.sort_by(|a, b| a.url.cmp(&b.url));
        records
    }

    fn finish(&self, url: &str, state: VisitState) -> bool {
        match self.lock().get_mut(url) {
            Some(record) if record.is_pending() => {
                record.state = state;
                true
            }
            _ => false,
        }
    }

    // A panic while holding the lock cannot leave a record half-written,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, VisitRecord>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_once() {
        let visited = VisitedSet::new();
        assert!(visited.claim("https://golang.org/", 0));
        assert!(!visited.claim("https://golang.org/", 0));
        assert!(!visited.claim("https://golang.org/", 3));

        let record = visited.get("https://golang.org/").unwrap();
        assert_eq!(record.depth, 0);
        assert!(record.is_pending());
    }

    #[test]
    fn test_exact_string_match() {
        let visited = VisitedSet::new();
        assert!(visited.claim("https://golang.org/", 0));
        // No normalization: these are different URLs
        assert!(visited.claim("https://golang.org", 0));
        assert!(visited.claim("http://golang.org/", 0));
        assert_eq!(visited.len(), 3);
    }

    #[test]
    fn test_terminal_states_are_final() {
        let visited = VisitedSet::new();
        visited.claim("a", 0);

        assert!(visited.record_success("a", vec!["b".to_string()]));
        assert!(!visited.record_failure("a", FetchError::Timeout));
        assert!(!visited.record_success("a", vec![]));

        assert_eq!(
            visited.get("a").unwrap().state,
            VisitState::Succeeded {
                links: vec!["b".to_string()]
            }
        );
    }

    #[test]
    fn test_record_requires_claim() {
        let visited = VisitedSet::new();
        assert!(!visited.record_success("never-claimed", vec![]));
        assert!(visited.is_empty());
    }

    #[test]
    fn test_pending_lists_unfinished() {
        let visited = VisitedSet::new();
        visited.claim("b", 1);
        visited.claim("a", 0);
        visited.claim("c", 1);
        visited.record_failure("c", FetchError::Status(500));

        assert_eq!(visited.pending(), vec!["a", "b"]);
    }

    #[test]
    fn test_clones_share_state() {
        let visited = VisitedSet::new();
        let other = visited.clone();
        assert!(visited.claim("x", 0));
        assert!(!other.claim("x", 0));
        assert!(other.contains("x"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_claims_have_one_winner() {
        for round in 0..50 {
            let visited = VisitedSet::new();
            let url = format!("https://example.com/{}", round);

            let handles: Vec<_> = (0..16)
                .map(|_| {
                    let visited = visited.clone();
                    let url = url.clone();
                    tokio::spawn(async move { visited.claim(&url, 1) })
                })
                .collect();

            let mut winners = 0;
            for handle in handles {
                if handle.await.unwrap() {
                    winners += 1;
                }
            }
            assert_eq!(winners, 1, "round {}", round);
        }
    }
}
