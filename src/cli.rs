// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
// =============================================================================

use clap::{Parser, Subcommand};

// The whole CLI: one subcommand per feature
#[derive(Parser, Debug)]
#[command(
    name = "link-scout",
    version,
    about = "Crawl a website by depth and spot pagination and cookie-consent controls",
    long_about = "link-scout crawls a website breadth-first from a seed URL, staying on the seed's host, \
                  and reports every link it found with its labels, the pages it was found on and the depth \
                  it was first seen at. It can also point at the pagination controls and cookie banners of a page.\n\n\
                  Logging goes to stderr and is controlled with RUST_LOG (default: info)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a website and list every link found
    ///
    /// Example: link-scout crawl https://example.com --max-depth 2
    Crawl {
        /// Seed URL (e.g., https://example.com)
        url: String,

        /// Number of depth levels to crawl
        ///
        /// Depth 1 = just the seed page
        /// Depth 2 = the seed page + all pages it links to
        /// 0 behaves like 1
        #[arg(long, default_value_t = 4)]
        max_depth: usize,

        /// Minimum delay between two requests, in seconds
        #[arg(long, default_value_t = 1.0)]
        delay: f64,

        /// Share of CPU cores used as the number of concurrent requests (0.1 to 1.0)
        #[arg(long, default_value_t = 0.5)]
        core_usage: f64,

        /// Fixed number of concurrent requests (overrides --core-usage)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Per-request timeout, in seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,

        /// Also list links to other sites (they are never crawled)
        #[arg(long)]
        include_external: bool,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Find likely pagination controls on a page
    ///
    /// Example: link-scout pagination https://example.com/blog
    Pagination {
        /// Page URL or local HTML file
        source: String,

        /// Maximum number of snippets to print
        #[arg(long, default_value_t = 5)]
        max_candidates: usize,

        /// Output snippets as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Find likely cookie-consent banners on a page
    ///
    /// Example: link-scout cookies ./saved-page.html
    Cookies {
        /// Page URL or local HTML file
        source: String,

        /// Maximum number of snippets to print
        #[arg(long, default_value_t = 5)]
        max_candidates: usize,

        /// Output snippets as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Print the readable text of a page
    ///
    /// Example: link-scout text ./saved-page.html --base-url https://example.com/blog
    Text {
        /// Page URL or local HTML file
        source: String,

        /// URL relative links of a local file resolve against (ignored for URLs)
        #[arg(long)]
        base_url: Option<String>,

        /// Truncate the output to this many characters
        #[arg(long)]
        max_chars: Option<usize>,

        /// Drop link targets instead of printing them inline
        #[arg(long)]
        no_links: bool,
    },

    /// Print the page skeleton with only controls and headings keeping text
    Structure {
        /// Page URL or local HTML file
        source: String,

        /// Truncate the output to this many characters
        #[arg(long)]
        max_chars: Option<usize>,
    },
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why is `concurrency` an Option<usize>?
//    - None means "not given on the command line"
//    - The fetcher then derives the bound from the CPU count and --core-usage
//
// 2. Why f64 for delays?
//    - Sub-second delays like 0.25 are common for polite crawling
//    - The value is converted to a Duration once, and rejected if negative
// -----------------------------------------------------------------------------
