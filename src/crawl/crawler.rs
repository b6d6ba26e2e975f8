// src/crawl/crawler.rs
// =============================================================================
// The crawler: visits every page reachable from a seed URL within a depth
// limit, fetching many pages at once and never the same page twice.
//
// How it works:
// 1. Claim the seed in the visited set and start a visit task for it
// 2. Each visit task waits for a concurrency permit, then calls the fetcher
// 3. The coordinating loop (in `run_with_visited`) collects finished tasks
//    from a JoinSet, records their outcome, and for a successful page with
//    depth left, claims each link and starts a task for every link it won
// 4. When the JoinSet is empty, no task is running and none can be started
//    any more, so the crawl is done
//
// Depth: a seed crawled with max_depth = k is fetched with k levels left.
// A page fetched with 1 level left does not start any children, so the
// fetched set is exactly the pages within k - 1 link hops of the seed.
//
// Cancellation: a CancellationToken or a deadline stops the loop; running
// tasks are aborted and their URLs reported as abandoned.
//
// Rust concepts:
// - JoinSet: owns a dynamic group of spawned tasks, yields them as they finish
// - Semaphore: caps how many fetches run at the same time
// - tokio::select!: wait for whichever of several events happens first
// =============================================================================

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::report::{CrawlReport, PageOutcome, PageReport};
use super::visited::VisitedSet;
use crate::error::{CrawlError, FetchError};
use crate::fetch::{FetchedPage, Fetcher};

/// In-flight fetch limit used unless `with_concurrency` says otherwise.
pub const DEFAULT_CONCURRENCY: usize = 16;

// A URL waiting to be fetched, with how far it is from the seed and how
// many levels the crawl may still go from it
#[derive(Debug, Clone)]
struct CrawlTask {
    url: String,
    hops: usize,
    remaining: usize,
}

// What a visit task sends back to the coordinating loop
struct Visit {
    task: CrawlTask,
    result: Result<FetchedPage, FetchError>,
}

enum Event {
    Finished(Option<Result<(Id, Visit), JoinError>>),
    Cancelled,
    DeadlineExpired,
}

/// Bounded-depth concurrent crawler over any [`Fetcher`].
pub struct Crawler<F: ?Sized> {
    fetcher: Arc<F>,
    concurrency: usize,
    timeout: Option<Duration>,
}

impl<F: Fetcher + 'static> Crawler<F> {
    pub fn new(fetcher: F) -> Self {
        Self::from_arc(Arc::new(fetcher))
    }
}

impl<F: Fetcher + ?Sized + 'static> Crawler<F> {
    /// Builds a crawler around a fetcher the caller keeps a handle to.
    pub fn from_arc(fetcher: Arc<F>) -> Self {
        Self {
            fetcher,
            concurrency: DEFAULT_CONCURRENCY,
            timeout: None,
        }
    }

    /// At most `limit` fetches run at the same time. Must be at least 1.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit;
        self
    }

    /// The whole crawl stops after `timeout`, returning what it has so far.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn fetcher(&self) -> &Arc<F> {
        &self.fetcher
    }

    /// Crawls from `seed`, following links up to `max_depth` levels.
    ///
    /// `max_depth == 0` fetches nothing and returns an empty report.
    pub async fn run(&self, seed: &str, max_depth: usize) -> Result<CrawlReport, CrawlError> {
        self.run_with_cancellation(seed, max_depth, CancellationToken::new())
            .await
    }

    /// Like [`run`](Self::run), but stops early when `cancel` fires.
    pub async fn run_with_cancellation(
        &self,
        seed: &str,
        max_depth: usize,
        cancel: CancellationToken,
    ) -> Result<CrawlReport, CrawlError> {
        self.run_with_visited(seed, max_depth, &VisitedSet::new(), cancel)
            .await
    }

    /// Crawls using a visited set supplied by the caller.
    ///
    /// URLs already in `visited` are skipped, which lets several seeds share
    /// one set so that no page is fetched twice across all of them.
    pub async fn run_with_visited(
        &self,
        seed: &str,
        max_depth: usize,
        visited: &VisitedSet,
        cancel: CancellationToken,
    ) -> Result<CrawlReport, CrawlError> {
        if seed.trim().is_empty() {
            return Err(CrawlError::InvalidArgument("seed URL is empty".to_string()));
        }
        if self.concurrency == 0 {
            return Err(CrawlError::InvalidArgument(
                "concurrency must be at least 1".to_string(),
            ));
        }

        let started = Instant::now();
        let mut report = CrawlReport::new(seed, max_depth);

        if max_depth == 0 {
            tracing::info!("max depth is 0, nothing to crawl for {}", seed);
            return Ok(finish_report(report, started));
        }

        tracing::info!(
            "Starting crawl of {} (max depth {}, concurrency {})",
            seed,
            max_depth,
            self.concurrency
        );

        let semaphore = Arc::new(Semaphore::new(
            self.concurrency.min(Semaphore::MAX_PERMITS),
        ));
        let mut tasks = JoinSet::new();
        // Task id -> the URL it is fetching, so a lost task can still be reported
        let mut in_flight = HashMap::new();

        if visited.claim(seed, 0) {
            self.spawn_visit(
                &mut tasks,
                &semaphore,
                &mut in_flight,
                CrawlTask {
                    url: seed.to_string(),
                    hops: 0,
                    remaining: max_depth,
                },
            );
        } else {
            tracing::debug!("Seed {} already visited, skipping", seed);
        }

        let deadline = self.timeout.map(|timeout| started + timeout);
        let expired = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(expired);

        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => Event::Cancelled,
                _ = &mut expired => Event::DeadlineExpired,
                joined = tasks.join_next_with_id() => Event::Finished(joined),
            };

            match event {
                Event::Finished(None) => break,
                Event::Finished(Some(Ok((id, visit)))) => {
                    in_flight.remove(&id);
                    self.complete_visit(
                        visit,
                        visited,
                        &mut tasks,
                        &semaphore,
                        &mut in_flight,
                        &mut report,
                    );
                }
                Event::Finished(Some(Err(e))) => match in_flight.remove(&e.id()) {
                    Some(task) => record_lost_task(task, &e, visited, &mut report),
                    None => tracing::error!("Unknown visit task ended unexpectedly: {}", e),
                },
                Event::Cancelled => {
                    abandon_in_flight(
                        seed,
                        "was cancelled",
                        &mut tasks,
                        &mut in_flight,
                        visited,
                        &mut report,
                    );
                    break;
                }
                Event::DeadlineExpired => {
                    abandon_in_flight(
                        seed,
                        "hit its deadline",
                        &mut tasks,
                        &mut in_flight,
                        visited,
                        &mut report,
                    );
                    break;
                }
            }
        }

        Ok(finish_report(report, started))
    }

    // Records one finished fetch and starts tasks for the links it won
    fn complete_visit(
        &self,
        visit: Visit,
        visited: &VisitedSet,
        tasks: &mut JoinSet<Visit>,
        semaphore: &Arc<Semaphore>,
        in_flight: &mut HashMap<Id, CrawlTask>,
        report: &mut CrawlReport,
    ) {
        let Visit { task, result } = visit;

        let outcome = match result {
            Ok(page) => {
                tracing::debug!(
                    "Fetched {} [depth {}]: {} link(s)",
                    task.url,
                    task.hops,
                    page.links.len()
                );
                visited.record_success(&task.url, page.links.clone());

                if task.remaining > 1 {
                    for link in &page.links {
                        // Fetchers are never asked for an empty URL
                        if link.trim().is_empty() {
                            tracing::debug!("Skipping empty link on {}", task.url);
                            continue;
                        }
                        if visited.claim(link, task.hops + 1) {
                            self.spawn_visit(
                                tasks,
                                semaphore,
                                in_flight,
                                CrawlTask {
                                    url: link.clone(),
                                    hops: task.hops + 1,
                                    remaining: task.remaining - 1,
                                },
                            );
                        } else {
                            tracing::debug!("Skipping already claimed URL: {}", link);
                        }
                    }
                }

                PageOutcome::Fetched {
                    content: page.content,
                    links: page.links,
                }
            }
            Err(error) => {
                tracing::warn!("Failed to fetch {}: {}", task.url, error);
                visited.record_failure(&task.url, error.clone());
                PageOutcome::Failed { error }
            }
        };

        report.pages.push(PageReport {
            url: task.url,
            depth: task.hops,
            outcome,
        });
    }

    fn spawn_visit(
        &self,
        tasks: &mut JoinSet<Visit>,
        semaphore: &Arc<Semaphore>,
        in_flight: &mut HashMap<Id, CrawlTask>,
        task: CrawlTask,
    ) {
        tracing::debug!("Dispatching {} [depth {}]", task.url, task.hops);
        let entry = task.clone();

        let fetcher = Arc::clone(&self.fetcher);
        let semaphore = Arc::clone(semaphore);
        let handle = tasks.spawn(async move {
            let result = match semaphore.acquire_owned().await {
                Ok(_permit) => fetch_guarded(fetcher.as_ref(), &task.url).await,
                Err(_) => Err(FetchError::Cancelled),
            };
            Visit { task, result }
        });
        in_flight.insert(handle.id(), entry);
    }
}

// Stops every running visit task and marks its URL as cancelled
fn abandon_in_flight(
    seed: &str,
    reason: &str,
    tasks: &mut JoinSet<Visit>,
    in_flight: &mut HashMap<Id, CrawlTask>,
    visited: &VisitedSet,
    report: &mut CrawlReport,
) {
    tracing::warn!(
        "Crawl of {} {}, abandoning {} in-flight fetch(es)",
        seed,
        reason,
        in_flight.len()
    );

    tasks.abort_all();
    let mut abandoned: Vec<String> = in_flight.drain().map(|(_, task)| task.url).collect();
    abandoned.sort();
    for url in &abandoned {
        visited.record_failure(url, FetchError::Cancelled);
    }

    report.abandoned = abandoned;
    report.cancelled = true;
}

fn finish_report(mut report: CrawlReport, started: Instant) -> CrawlReport {
    report.elapsed = started.elapsed();
    tracing::info!(
        "Finished crawl of {}: {} page(s) in {:.2}s",
        report.seed,
        report.len(),
        report.elapsed.as_secs_f64()
    );
    report
}

// A visit task that died without returning its Visit still gets a
// terminal record and a report entry
fn record_lost_task(
    task: CrawlTask,
    error: &JoinError,
    visited: &VisitedSet,
    report: &mut CrawlReport,
) {
    let error = if error.is_cancelled() {
        FetchError::Cancelled
    } else {
        FetchError::Panicked(error.to_string())
    };
    tracing::error!("Visit task for {} ended unexpectedly: {}", task.url, error);

    visited.record_failure(&task.url, error.clone());
    report.pages.push(PageReport {
        url: task.url,
        depth: task.hops,
        outcome: PageOutcome::Failed { error },
    });
}

/// Crawls `seed` to `max_depth` with default settings.
pub async fn crawl<F: Fetcher + 'static>(
    seed: &str,
    max_depth: usize,
    fetcher: F,
) -> Result<CrawlReport, CrawlError> {
    Crawler::new(fetcher).run(seed, max_depth).await
}

// A panicking fetcher fails its own URL instead of taking the crawl down
async fn fetch_guarded<F: Fetcher + ?Sized>(fetcher: &F, url: &str) -> Result<FetchedPage, FetchError> {
    match AssertUnwindSafe(fetcher.fetch(url)).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(FetchError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why claim before spawning instead of inside the task?
//    - The claim is the only thing that decides who fetches a URL
//    - Doing it in the coordinating loop, under the visited set's lock,
//      means a URL is marked the moment it is accepted, not after its fetch
//
// 2. Why a JoinSet instead of counting workers?
//    - Every spawned task is owned by the set until it finishes
//    - join_next() returning None means the set is empty: nothing is
//      running and, since only finished tasks spawn new ones, nothing will be
//
// 3. Why no recursion?
//    - Children are started from the loop, not from inside their parent,
//      so the call stack stays flat on deep or cyclic link graphs
// -----------------------------------------------------------------------------
