// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Depth-by-depth crawling starting from a seed URL
// - Same-host restriction (never fetches other sites)
// - One fetch per URL for the whole crawl
// - Polite crawling: bounded concurrency and a minimum delay between requests
//
// Submodules:
// - fetch: the throttled HTTP fetcher
// - registry: the per-crawl link registry
// - depth: the crawl loop itself
// =============================================================================

mod depth;
mod fetch;
mod registry;

pub use depth::{crawl_url_depth, CrawlReport, DepthCrawler};
pub use fetch::{FetchError, Fetcher, FetcherConfig};
pub use registry::{LinkRecord, LinkRegistry};
