// src/crawl/depth.rs
// =============================================================================
// Depth-by-depth website crawling.
//
// How it works:
// 1. The frontier starts as just the seed URL, at depth 0
// 2. Every frontier URL on the seed's host that was not visited yet is
//    fetched and link-extracted, all of them concurrently
// 3. Once the whole depth is done (a barrier), the results are merged into
//    the link registry one page at a time, in frontier order
// 4. Extracted URLs not visited yet become the next frontier, unless this
//    was the last depth
// 5. Repeat until the frontier is empty or the depth limit is reached
//
// Concurrency:
// - the per-URL futures of one depth are polled together by join_all in the
//   caller's task; the fetcher's gate and delay decide how many actually hit
//   the network
// - the registry is only written in step 3, after every future finished, so
//   it is never shared with the in-flight work
//
// A page that fails to download contributes nothing; its siblings and the rest
// of the crawl carry on.
//
// Rust concepts:
// - Lifetimes: DepthCrawler<'f> borrows the Fetcher instead of owning it
// - join_all: waits for a whole batch of futures, keeping their order
// - IndexSet: a HashSet that remembers insertion order
// =============================================================================

use anyhow::{anyhow, Result};
use futures::future::join_all;
use indexmap::IndexSet;
use serde::Serialize;
use tracing::{debug, info};

use super::fetch::{Fetcher, FetcherConfig};
use super::registry::LinkRegistry;
use crate::extract::{extract_links, ExtractedLink};
use crate::urls::{is_web_url, normalize, same_authority};

/// Everything a crawl produced
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub seed: String,
    pub max_depth: usize,
    /// Pages dispatched for fetching, in dispatch order
    pub visited: Vec<String>,
    /// Visited pages that could not be downloaded
    pub failed: Vec<String>,
    pub links: LinkRegistry,
}

/// Crawls one site breadth-first, one depth level at a time
pub struct DepthCrawler<'f> {
    fetcher: &'f Fetcher,
    max_depth: usize,
    include_external: bool,
}

impl<'f> DepthCrawler<'f> {
    /// `max_depth` counts levels: 1 = the seed page only, 2 = the seed and the
    /// pages it links to, and so on. 0 behaves like 1.
    pub fn new(fetcher: &'f Fetcher, max_depth: usize) -> Self {
        Self {
            fetcher,
            max_depth,
            include_external: false,
        }
    }

    /// Also record links to other hosts (they are still never fetched)
    pub fn include_external(mut self, include: bool) -> Self {
        self.include_external = include;
        self
    }

    pub async fn crawl(&self, seed_url: &str) -> Result<CrawlReport> {
        let seed = normalize(seed_url, None);
        if seed.is_empty() || !is_web_url(&seed) {
            return Err(anyhow!("Invalid URL '{}'", seed_url));
        }

        let levels = self.max_depth.max(1);
        let mut visited: IndexSet<String> = IndexSet::new();
        let mut failed = Vec::new();
        let mut registry = LinkRegistry::new();
        let mut frontier = vec![seed.clone()];

        info!(seed = %seed, levels, "starting crawl");

        for depth in 0..levels {
            if frontier.is_empty() {
                break;
            }
            info!(depth, urls = frontier.len(), "processing depth");

            // insert() returns false for URLs already visited at a shallower depth
            let mut dispatched = Vec::new();
            for url in frontier {
                if !same_authority(&url, &seed) {
                    debug!(url = %url, "skipping off-site URL");
                    continue;
                }
                if visited.insert(url.clone()) {
                    dispatched.push(url);
                }
            }

            // The barrier: nothing below runs until every page of this depth is done
            let results = join_all(dispatched.iter().map(|url| self.process_page(url, depth))).await;

            let last_level = depth + 1 >= levels;
            let mut next: IndexSet<String> = IndexSet::new();
            // zip pairs each result with the URL it came from, in frontier order
            for (url, result) in dispatched.iter().zip(results) {
                let links = match result {
                    Some(links) => links,
                    None => {
                        failed.push(url.clone());
                        continue;
                    }
                };

                for link in links {
                    if !self.include_external && !same_authority(&link.url, &seed) {
                        continue;
                    }
                    let target = link.url.clone();
                    registry.record(link, depth);
                    if !last_level && !visited.contains(&target) {
                        next.insert(target);
                    }
                }
            }

            info!(
                depth,
                fetched = dispatched.len(),
                registry = registry.len(),
                next = next.len(),
                "depth complete"
            );
            frontier = next.into_iter().collect();
        }

        info!(
            pages = visited.len(),
            failed = failed.len(),
            links = registry.len(),
            "crawl complete"
        );

        Ok(CrawlReport {
            seed,
            max_depth: self.max_depth,
            visited: visited.into_iter().collect(),
            failed,
            links: registry,
        })
    }

    // Fetch + extract for one page; None when the page could not be fetched
    async fn process_page(&self, url: &str, depth: usize) -> Option<Vec<ExtractedLink>> {
        info!(depth, url, "crawling");
        let body = self.fetcher.fetch(url).await?;
        let html = String::from_utf8_lossy(&body);
        let links = extract_links(&html, url);
        debug!(url, links = links.len(), "links extracted");
        Some(links)
    }
}

/// Crawls `url` to `max_depth` levels and returns every link found.
///
/// `request_delay` is the minimum number of seconds between two requests;
/// `core_usage` is the share of CPU cores used as the concurrency bound.
pub async fn crawl_url_depth(
    url: &str,
    max_depth: usize,
    request_delay: f64,
    core_usage: f64,
) -> Result<LinkRegistry> {
    let delay = std::time::Duration::try_from_secs_f64(request_delay)
        .map_err(|e| anyhow!("Invalid request delay {}: {}", request_delay, e))?;

    let config = FetcherConfig {
        delay,
        core_usage,
        ..FetcherConfig::default()
    };
    let fetcher = Fetcher::new(&config)?;

    let report = DepthCrawler::new(&fetcher, max_depth).crawl(url).await?;
    Ok(report.links)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why not spawn a tokio task per page?
//    - tokio::spawn needs 'static futures, so the fetcher would have to be
//      wrapped in an Arc
//    - join_all polls everything in the current task, which is enough for
//      I/O-bound work and lets us borrow &self
//
// 2. Why is the registry not behind a Mutex?
//    - It is only touched after join_all returns, by one task
//    - No shared mutable state, no locking
//
// 3. Why an IndexSet for the next frontier?
//    - The same URL is usually linked from many pages of one depth
//    - It must be fetched once, and in a stable order
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Mock, Server, ServerGuard};
    use std::time::Duration;

    fn fast_fetcher() -> Fetcher {
        Fetcher::new(&FetcherConfig {
            delay: Duration::ZERO,
            max_concurrent: Some(4),
            timeout: Duration::from_secs(5),
            ..FetcherConfig::default()
        })
        .unwrap()
    }

    async fn page(server: &mut ServerGuard, path: &str, body: &str, hits: usize) -> Mock {
        server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_seed_page_links_are_normalized_and_scoped() {
        let mut server = Server::new_async().await;
        let seed = format!("{}/", server.url());
        let root = page(
            &mut server,
            "/",
            r#"<a href="/a">A</a><a href="/a/">A again</a><a href="http://other.invalid/b">B</a>"#,
            1,
        )
        .await;
        let a = page(&mut server, "/a", "", 0).await;

        let fetcher = fast_fetcher();
        let report = DepthCrawler::new(&fetcher, 1).crawl(&seed).await.unwrap();

        let record = report.links.get(&format!("{}/a", server.url())).unwrap();
        assert_eq!(record.found_on_urls, vec![seed.clone()]);
        assert_eq!(record.depth_found, 0);
        assert_eq!(record.associated_texts.len(), 2);
        assert!(!report.links.contains("http://other.invalid/b"));
        assert_eq!(report.links.len(), 1);
        assert_eq!(report.visited, vec![seed]);

        root.assert_async().await;
        a.assert_async().await;
    }

    #[tokio::test]
    async fn test_depth_zero_fetches_only_the_seed() {
        let mut server = Server::new_async().await;
        let seed = server.url();
        let root = page(&mut server, "/", r#"<a href="/next">Next</a>"#, 1).await;
        let next = page(&mut server, "/next", "", 0).await;

        let fetcher = fast_fetcher();
        let report = DepthCrawler::new(&fetcher, 0).crawl(&seed).await.unwrap();

        assert_eq!(report.links.len(), 1);
        assert_eq!(report.visited.len(), 1);
        root.assert_async().await;
        next.assert_async().await;
    }

    #[tokio::test]
    async fn test_each_page_fetched_once_and_depth_is_first_sighting() {
        let mut server = Server::new_async().await;
        let base = server.url();
        let seed = format!("{}/", base);
        let root = page(&mut server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#, 1).await;
        let a = page(
            &mut server,
            "/a",
            r#"<a href="/">Home</a><a href="/b">Bee</a><a href="/c">C</a>"#,
            1,
        )
        .await;
        let b = page(&mut server, "/b", r#"<a href="/a#top">A</a>"#, 1).await;
        let c = page(&mut server, "/c", "", 0).await;

        let fetcher = fast_fetcher();
        let report = DepthCrawler::new(&fetcher, 2).crawl(&seed).await.unwrap();

        let a_url = format!("{}/a", base);
        let b_url = format!("{}/b", base);
        let c_url = format!("{}/c", base);

        let a_record = report.links.get(&a_url).unwrap();
        assert_eq!(a_record.depth_found, 0);
        assert_eq!(a_record.found_on_urls, vec![seed.clone(), b_url.clone()]);

        let b_record = report.links.get(&b_url).unwrap();
        assert_eq!(b_record.depth_found, 0);
        assert_eq!(b_record.found_on_urls, vec![seed.clone(), a_url.clone()]);
        assert!(b_record.associated_texts.contains("Bee"));

        assert_eq!(report.links.get(&c_url).unwrap().depth_found, 1);
        assert_eq!(report.links.get(&seed).unwrap().depth_found, 1);
        assert_eq!(report.visited, vec![seed, a_url, b_url]);

        root.assert_async().await;
        a.assert_async().await;
        b.assert_async().await;
        c.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_page_does_not_stop_siblings() {
        let mut server = Server::new_async().await;
        let base = server.url();
        let _root = page(&mut server, "/", r#"<a href="/broken">X</a><a href="/ok">Ok</a>"#, 1).await;
        let broken = server
            .mock("GET", "/broken")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;
        let _ok = page(&mut server, "/ok", r#"<a href="/deep">Deep</a>"#, 1).await;
        let deep = page(&mut server, "/deep", "<p>end</p>", 1).await;

        let fetcher = fast_fetcher();
        let report = DepthCrawler::new(&fetcher, 3).crawl(&base).await.unwrap();

        assert_eq!(report.failed, vec![format!("{}/broken", base)]);
        assert_eq!(report.links.get(&format!("{}/deep", base)).unwrap().depth_found, 1);
        broken.assert_async().await;
        deep.assert_async().await;
    }

    #[tokio::test]
    async fn test_external_links_recorded_but_never_fetched() {
        let mut server = Server::new_async().await;
        let seed = server.url();
        let _root = page(&mut server, "/", r#"<a href="http://other.invalid/b">B</a>"#, 1).await;

        let fetcher = fast_fetcher();
        let report = DepthCrawler::new(&fetcher, 3)
            .include_external(true)
            .crawl(&seed)
            .await
            .unwrap();

        assert!(report.links.contains("http://other.invalid/b"));
        assert_eq!(report.visited.len(), 1);
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_seed_is_an_error() {
        let fetcher = fast_fetcher();
        assert!(DepthCrawler::new(&fetcher, 1).crawl("not a url").await.is_err());
        assert!(DepthCrawler::new(&fetcher, 1).crawl("ftp://example.com/").await.is_err());
    }

    #[tokio::test]
    async fn test_negative_delay_is_rejected() {
        assert!(crawl_url_depth("https://example.com/", 1, -1.0, 0.5).await.is_err());
    }

    #[tokio::test]
    async fn test_bad_core_usage_is_rejected() {
        assert!(crawl_url_depth("https://example.com/", 1, 0.0, f64::INFINITY).await.is_err());
    }

    #[tokio::test]
    async fn test_crawl_url_depth_returns_registry() {
        let mut server = Server::new_async().await;
        let base = server.url();
        let seed = format!("{}/", base);
        let root = page(
            &mut server,
            "/",
            r#"<a href="/docs/">Docs</a><a href="http://other.invalid/x">X</a>"#,
            1,
        )
        .await;
        let docs = page(&mut server, "/docs", r#"<a href="/docs#intro" title="Intro">Start</a>"#, 1).await;

        let registry = crawl_url_depth(&seed, 2, 0.0, 0.5).await.unwrap();

        let docs_url = format!("{}/docs", base);
        let record = registry.get(&docs_url).unwrap();
        assert_eq!(record.depth_found, 0);
        assert_eq!(record.found_on_urls, vec![seed, docs_url.clone()]);
        assert!(record.associated_texts.contains("Docs"));
        assert!(record.associated_texts.contains("Intro"));
        assert!(!registry.contains("http://other.invalid/x"));
        assert_eq!(registry.len(), 1);

        root.assert_async().await;
        docs.assert_async().await;
    }
}
