// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging
// 3. Dispatch to the appropriate subcommand handler
// 4. Print the results as a table or JSON
// 5. Exit with proper code (0 = all pages fetched, 1 = some pages failed or
//    the crawl was cut short, 2 = error)
// =============================================================================

// Module declarations - only the CLI lives in the binary, the crawler itself
// is in the library (src/lib.rs)
mod cli;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use link_crawler::{logging, CancellationToken, CrawlReport, Crawler, Fetcher, HttpFetcher};
use url::Url;

// The #[tokio::main] attribute creates a tokio runtime and runs our async
// main inside it
#[tokio::main]
async fn main() {
    // Run the application logic and turn its result into an exit code
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = every page fetched
//   Ok(1) = some pages failed, or the crawl was stopped early
//   Err   = bad arguments or setup failure (main turns this into exit code 2)
async fn run() -> Result<i32> {
    // Parse command-line arguments; clap handles --help and --version
    let cli = Cli::parse();

    // Logs go to stderr, so they never mix with the report on stdout
    logging::init(cli.verbose);

    match cli.command {
        Commands::Crawl {
            url,
            max_depth,
            concurrency,
            timeout,
            request_timeout,
            same_domain,
            json,
        } => {
            let options = CrawlOptions {
                max_depth,
                concurrency,
                timeout: timeout.map(Duration::from_secs),
                request_timeout: Duration::from_secs(request_timeout),
                same_domain,
            };
            handle_crawl(&url, options, json).await
        }
        Commands::Links {
            url,
            request_timeout,
            json,
        } => handle_links(&url, Duration::from_secs(request_timeout), json).await,
    }
}

struct CrawlOptions {
    max_depth: usize,
    concurrency: usize,
    timeout: Option<Duration>,
    request_timeout: Duration,
    same_domain: bool,
}

// Handles the 'crawl' subcommand
async fn handle_crawl(start_url: &str, options: CrawlOptions, json: bool) -> Result<i32> {
    // Validate the URL up front so a typo fails fast instead of as a page error
    let start = Url::parse(start_url).with_context(|| format!("Invalid URL '{}'", start_url))?;

    // One HTTP client for the whole crawl (connection pooling)
    let mut fetcher = HttpFetcher::new(options.request_timeout)?;
    if options.same_domain {
        let host = start
            .host_str()
            .with_context(|| format!("URL has no host: {}", start_url))?;
        fetcher = fetcher.with_allowed_domain(host);
    }

    // Builder-style setup: each with_* call returns the updated crawler
    let mut crawler = Crawler::new(fetcher).with_concurrency(options.concurrency);
    if let Some(timeout) = options.timeout {
        crawler = crawler.with_timeout(timeout);
    }

    // Ctrl-C stops the crawl but still prints what was found
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted, finishing up...");
            on_interrupt.cancel();
        }
    });

    if !json {
        println!("🔍 Crawling: {}", start_url);
        println!("📊 Max crawl depth: {}", options.max_depth);
    }

    let report = crawler
        .run_with_cancellation(start_url, options.max_depth, cancel)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&report);
    }

    // Any failed or abandoned page means exit code 1, handy in CI
    if report.is_complete_success() {
        Ok(0)
    } else {
        Ok(1)
    }
}

// Handles the 'links' subcommand
async fn handle_links(url: &str, request_timeout: Duration, json: bool) -> Result<i32> {
    Url::parse(url).with_context(|| format!("Invalid URL '{}'", url))?;

    let fetcher = HttpFetcher::new(request_timeout)?;
    let page = match fetcher.fetch(url).await {
        Ok(page) => page,
        Err(e) => {
            eprintln!("❌ Failed to fetch {}: {}", url, e);
            return Ok(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&page.links)?);
    } else {
        println!("📄 {} link(s) found on {}", page.links.len(), url);
        for link in &page.links {
            println!("   {}", link);
        }
    }

    Ok(0)
}

// Prints the report as a human-readable table in the terminal
fn print_table(report: &CrawlReport) {
    println!();
    println!("{:<60} {:<6} {:<10} {:<30}", "URL", "DEPTH", "STATUS", "DETAIL");
    println!("{}", "=".repeat(106));

    for page in &report.pages {
        let (status, detail) = match page.error() {
            None => ("✅ OK".to_string(), format!("{} link(s)", page.links().len())),
            Some(error) => ("❌ FAILED".to_string(), error.to_string()),
        };

        println!(
            "{:<60} {:<6} {:<10} {:<30}",
            truncate(&page.url, 57),
            page.depth,
            status,
            detail
        );
    }

    for url in &report.abandoned {
        println!("{:<60} {:<6} {:<10} {:<30}", truncate(url, 57), "-", "⏹️  ABANDONED", "");
    }

    println!();

    let summary = report.summary();
    println!("📊 Summary:");
    println!("   ✅ Fetched: {}", summary.succeeded);
    println!("   ❌ Failed: {}", summary.failed);
    if summary.cancelled {
        println!("   ⏹️  Abandoned: {} (crawl stopped early)", summary.abandoned);
    }
    println!("   🔗 Links discovered: {}", summary.links_discovered);
    println!("   ⏱️  Duration: {:.2}s", summary.elapsed.as_secs_f64());
}

// Shortens long URLs so the table columns stay aligned
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is the crawler in a library and not here?
//    - src/lib.rs holds everything that can be tested without a terminal
//    - main.rs only parses arguments, wires things together, and prints
//
// 2. What is CancellationToken?
//    - A cheap handle that can be cloned and "cancelled" from anywhere
//    - Here the Ctrl-C task cancels it; the crawler notices and returns early
//      with whatever pages it already has
//
// 3. What does with_context() do?
//    - It is from anyhow: wraps an error with a human-readable message
//    - "{:#}" in main prints the message and the underlying cause together
//
// 4. Why std::process::exit instead of returning from main?
//    - We want specific exit codes (0, 1, 2) for scripts and CI pipelines
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 57), "short");
        let long = "x".repeat(70);
        assert_eq!(truncate(&long, 57), format!("{}...", "x".repeat(57)));
    }
}
