// src/crawl/fetch.rs
// =============================================================================
// The throttled fetcher: every page the crawler downloads goes through here.
//
// Two independent limits:
// - a semaphore admits at most `concurrency` requests in flight
// - a shared "last dispatch" timestamp spaces request starts at least
//   `delay` apart, across all in-flight requests
//
// So `delay` throttles the dispatch rate, not the concurrency: with a 1s delay
// and 4 slots, a new request starts at most once per second, but up to 4
// slow responses can be outstanding at the same time.
//
// Failures are classified, logged, and turned into `None`. No retries.
//
// Rust concepts:
// - tokio::sync::Semaphore: a counter of permits shared by many tasks
// - RAII guards: the permit and the mutex guard release themselves on drop
// - thiserror: derives Display and Error for our own error enum
// =============================================================================

use anyhow::anyhow;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, DNT, UPGRADE_INSECURE_REQUESTS};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::Instant;
use tracing::{debug, info, warn};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:134.0) Gecko/20100101 Firefox/134.0";

/// Why a fetch produced no content
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("HTTP {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("failed to read body: {0}")]
    Body(String),
}

/// Settings for the fetcher
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Minimum spacing between request dispatches
    pub delay: Duration,
    /// Fixed number of concurrent requests; derived from CPU count when None
    pub max_concurrent: Option<usize>,
    /// Share of available cores used when `max_concurrent` is None
    pub core_usage: f64,
    /// Total per-request timeout
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            max_concurrent: None,
            core_usage: 0.5,
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetcherConfig {
    /// The concurrency bound: explicit, or `cores * core_usage`, never below 1
    /// and never above what a semaphore can hold
    pub fn concurrency(&self) -> usize {
        let bound = match self.max_concurrent {
            Some(n) => n,
            None => {
                let cores = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1);
                // `as` saturates, so a huge product lands on usize::MAX
                (cores as f64 * self.core_usage).floor() as usize
            }
        };
        bound.clamp(1, Semaphore::MAX_PERMITS)
    }
}

/// Rate- and concurrency-limited page downloader.
///
/// Shared by reference between all fetch tasks of a crawl.
pub struct Fetcher {
    client: Client,
    gate: Semaphore,
    last_dispatch: Mutex<Option<Instant>>,
    delay: Duration,
    concurrency: usize,
}

impl Fetcher {
    pub fn new(config: &FetcherConfig) -> anyhow::Result<Self> {
        // Only checked when it is actually used to size the gate
        if config.max_concurrent.is_none() && !(config.core_usage.is_finite() && config.core_usage >= 0.0) {
            return Err(anyhow!("Invalid core usage {}: expected a non-negative number", config.core_usage));
        }
        let concurrency = config.concurrency();

        // Headers a regular browser sends; some servers block bare clients
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(DNT, HeaderValue::from_static("1"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        info!(
            concurrency,
            delay_ms = config.delay.as_millis() as u64,
            "initialized request handler"
        );

        Ok(Self {
            client,
            gate: Semaphore::new(concurrency),
            last_dispatch: Mutex::new(None),
            delay: config.delay,
            concurrency,
        })
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Fetches `url`, returning the raw body, or None after logging why not
    pub async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        match self.try_fetch(url).await {
            Ok(body) => Some(body),
            Err(FetchError::Timeout) => {
                warn!(url, "timeout fetching page");
                None
            }
            Err(e) => {
                warn!(url, error = %e, "failed to fetch page");
                None
            }
        }
    }

    /// Same as `fetch`, but hands the classified failure back to the caller
    pub async fn try_fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        // The permit is released when it drops, whatever happens below
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        self.wait_for_turn().await;

        debug!(url, "dispatching request");
        let response = self.client.get(url).send().await.map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Body(e.to_string())
            }
        })?;

        Ok(body.to_vec())
    }

    // Holds the timestamp lock while sleeping so two tasks can never observe
    // the same "last dispatch" and start together
    async fn wait_for_turn(&self) {
        let mut last = self.last_dispatch.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.delay {
                tokio::time::sleep(self.delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

// Maps reqwest's error flags onto our small taxonomy
fn classify_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if let Some(status) = error.status() {
        FetchError::Status(status.as_u16())
    } else {
        FetchError::Transport(error.to_string())
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a Semaphore and not buffer_unordered(N)?
//    - The crawler hands us futures from join_all, so the limit has to live
//      inside the fetcher, shared by every caller
//    - acquire() waits until a permit is free; dropping `_permit` returns it
//
// 2. Why is the timestamp behind a tokio Mutex and not a std one?
//    - We sleep while holding it, and a std MutexGuard must not be held
//      across an .await
//
// 3. Why both fetch() and try_fetch()?
//    - The crawler only cares whether a page has content (Option)
//    - The CLI wants to tell the user why a single page failed (Result)
//
// 4. Why clamp the concurrency?
//    - Semaphore::new panics above Semaphore::MAX_PERMITS
//    - A bad --core-usage becomes an error in Fetcher::new instead
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn config(delay_ms: u64, slots: usize) -> FetcherConfig {
        FetcherConfig {
            delay: Duration::from_millis(delay_ms),
            max_concurrent: Some(slots),
            timeout: Duration::from_secs(5),
            ..FetcherConfig::default()
        }
    }

    #[test]
    fn test_concurrency_is_at_least_one() {
        let config = FetcherConfig {
            core_usage: 0.0,
            ..FetcherConfig::default()
        };
        assert_eq!(config.concurrency(), 1);

        let explicit = FetcherConfig {
            max_concurrent: Some(0),
            ..FetcherConfig::default()
        };
        assert_eq!(explicit.concurrency(), 1);
    }

    #[test]
    fn test_concurrency_is_capped_at_semaphore_limit() {
        let config = FetcherConfig {
            max_concurrent: Some(usize::MAX / 2),
            ..FetcherConfig::default()
        };
        assert_eq!(config.concurrency(), Semaphore::MAX_PERMITS);

        let fetcher = Fetcher::new(&config).unwrap();
        assert_eq!(fetcher.concurrency(), Semaphore::MAX_PERMITS);
    }

    #[test]
    fn test_bad_core_usage_is_an_error() {
        for core_usage in [f64::INFINITY, f64::NAN, -0.5] {
            let config = FetcherConfig {
                core_usage,
                ..FetcherConfig::default()
            };
            assert!(Fetcher::new(&config).is_err(), "core_usage: {}", core_usage);
        }

        // A huge but finite share is clamped instead of rejected
        let huge = FetcherConfig {
            core_usage: 1e300,
            ..FetcherConfig::default()
        };
        assert_eq!(Fetcher::new(&huge).unwrap().concurrency(), Semaphore::MAX_PERMITS);
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/page")
            .with_status(200)
            .with_body("<html>hello</html>")
            .expect(1)
            .create_async()
            .await;

        let fetcher = Fetcher::new(&config(0, 2)).unwrap();
        let body = fetcher.fetch(&format!("{}/page", server.url())).await;
        assert_eq!(body.as_deref(), Some(&b"<html>hello</html>"[..]));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_sends_browser_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_header("user-agent", DEFAULT_USER_AGENT)
            .match_header("accept-language", "en-US,en;q=0.5")
            .with_status(200)
            .create_async()
            .await;

        let fetcher = Fetcher::new(&config(0, 1)).unwrap();
        assert!(fetcher.fetch(&format!("{}/", server.url())).await.is_some());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_classified() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = Fetcher::new(&config(0, 1)).unwrap();
        let url = format!("{}/missing", server.url());

        assert!(matches!(fetcher.try_fetch(&url).await, Err(FetchError::Status(404))));
        assert!(fetcher.fetch(&url).await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let fetcher = Fetcher::new(&config(0, 1)).unwrap();
        // Port 9 (discard) on localhost is almost never listening
        let result = fetcher.try_fetch("http://127.0.0.1:9/").await;
        assert!(matches!(result, Err(FetchError::Transport(_))));
    }

    #[tokio::test]
    async fn test_dispatches_are_spaced_by_delay() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .with_status(200)
            .expect(3)
            .create_async()
            .await;

        let fetcher = Fetcher::new(&config(150, 3)).unwrap();
        let url = format!("{}/", server.url());

        let started = std::time::Instant::now();
        let results = futures::future::join_all((0..3).map(|_| fetcher.fetch(&url))).await;

        assert!(results.iter().all(Option::is_some));
        // Three dispatches need two full gaps
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_gate_blocks_when_all_slots_taken() {
        let mut server = Server::new_async().await;
        let _mock = server.mock("GET", "/").with_status(200).create_async().await;

        let fetcher = Fetcher::new(&config(0, 2)).unwrap();
        let url = format!("{}/", server.url());

        let first = fetcher.gate.acquire().await.unwrap();
        let second = fetcher.gate.acquire().await.unwrap();

        let blocked = tokio::time::timeout(Duration::from_millis(100), fetcher.fetch(&url)).await;
        assert!(blocked.is_err(), "fetch must wait for a free slot");

        drop(first);
        drop(second);
        assert!(fetcher.fetch(&url).await.is_some());
        assert_eq!(fetcher.gate.available_permits(), 2);
    }
}
