// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API, which builds the parser from these structs and
// their attributes.
//
// Commands:
// - crawl: crawl a site from a start URL and report every visited page
// - links: fetch one page and list its outbound links
// =============================================================================

use clap::{Parser, Subcommand};

// This struct represents the whole CLI application
//
// #[derive(Parser)] tells clap to generate the parsing code for us
#[derive(Parser, Debug)]
#[command(
    name = "link-crawler",
    version,
    about = "A bounded-depth concurrent web crawler",
    long_about = "link-crawler follows links from a start URL up to a maximum depth, fetching \
                  many pages in parallel and never fetching the same URL twice."
)]
pub struct Cli {
    /// Increase log output (-v = info, -vv = debug). RUST_LOG overrides this.
    // ArgAction::Count turns -v, -vv, -vvv into 1, 2, 3
    // global = true lets it appear after the subcommand too
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    // Holds whichever subcommand the user picked
    #[command(subcommand)]
    pub command: Commands,
}

// Each variant is a subcommand; its fields become that subcommand's arguments
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a website starting from a URL
    ///
    /// Example: link-crawler crawl https://golang.org/ --max-depth 3
    Crawl {
        /// URL to start crawling from
        url: String,

        /// Maximum crawl depth
        ///
        /// Depth 1 = just the starting page
        /// Depth 2 = starting page + all pages it links to
        /// etc. Depth 0 fetches nothing.
        #[arg(long, default_value_t = 4)]
        max_depth: usize,

        /// Maximum number of pages fetched at the same time
        // The range check rejects 0 at parse time, before any crawl starts
        #[arg(
            long,
            default_value_t = link_crawler::DEFAULT_CONCURRENCY,
            value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
        )]
        concurrency: usize,

        /// Stop the whole crawl after this many seconds and report what was found
        // Option<u64>: no flag = no deadline
        #[arg(long)]
        timeout: Option<u64>,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 10)]
        request_timeout: u64,

        /// Only follow links on the start URL's host
        #[arg(long)]
        same_domain: bool,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Fetch a single page and print the links found on it
    ///
    /// Example: link-crawler links https://golang.org/pkg/
    Links {
        /// Page to fetch
        url: String,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 10)]
        request_timeout: u64,

        /// Output the links as a JSON array
        #[arg(long)]
        json: bool,
    },
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why usize for max_depth?
//    - usize cannot be negative, so "-1" is rejected by clap before our code
//      ever runs
//
// 2. What are the /// comments for?
//    - clap turns doc comments into --help text
//    - Plain // comments are for people reading the code only
//
// 3. Why default_value_t instead of default_value?
//    - default_value_t takes a typed Rust value (4, 10, a constant)
//    - default_value takes a string that clap then parses
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_crawl_defaults() {
        let cli = Cli::parse_from(["link-crawler", "crawl", "https://golang.org/"]);
        match cli.command {
            Commands::Crawl {
                url,
                max_depth,
                concurrency,
                timeout,
                same_domain,
                json,
                ..
            } => {
                assert_eq!(url, "https://golang.org/");
                assert_eq!(max_depth, 4);
                assert_eq!(concurrency, link_crawler::DEFAULT_CONCURRENCY);
                assert_eq!(timeout, None);
                assert!(!same_domain);
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_negative_depth_rejected() {
        let result = Cli::try_parse_from(["link-crawler", "crawl", "https://x/", "--max-depth", "-1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let result = Cli::try_parse_from(["link-crawler", "crawl", "https://x/", "--concurrency", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::parse_from(["link-crawler", "links", "https://x/", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }
}
