// src/lib.rs
// =============================================================================
// link-scout: crawl a website depth by depth and analyze its pages.
//
// Modules:
// - urls: URL normalization, the crawl's notion of "same URL"
// - crawl: throttled fetching, the link registry and the depth crawler
// - extract: link extraction and the pagination / cookie-consent detectors
//
// The binary in src/main.rs is a thin CLI over this library.
// =============================================================================

pub mod crawl;
pub mod extract;
pub mod urls;

pub use crawl::{crawl_url_depth, CrawlReport, DepthCrawler, Fetcher, FetcherConfig, LinkRecord, LinkRegistry};
pub use extract::{extract_links, find_cookie_consent_candidates, find_pagination_candidates, ExtractedLink};
