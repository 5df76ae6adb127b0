// src/urls.rs
// =============================================================================
// URL normalization: the single definition of "the same URL" for the crawler.
//
// A normalized URL is:
// - absolute (resolved against the page it was found on)
// - fragment-free (#section never creates a new page)
// - without a trailing slash, except for the root path "/"
//
// Every dedup decision in the crawl (visited set, link registry, frontier)
// keys on the output of `normalize`, so it must be idempotent.
// =============================================================================

use url::Url;

/// Resolves `url` against an optional `base`, strips the fragment and the
/// trailing slash of non-root paths.
///
/// Returns an empty string when nothing usable comes out; callers treat that
/// as "skip this link".
pub fn normalize(url: &str, base: Option<&str>) -> String {
    let resolved = match base.filter(|b| !b.is_empty()) {
        // A broken base still lets absolute hrefs through
        Some(base) => match Url::parse(base) {
            Ok(base) => base.join(url.trim()),
            Err(_) => Url::parse(url.trim()),
        },
        None => Url::parse(url.trim()),
    };

    let mut parsed = match resolved {
        Ok(parsed) => parsed,
        Err(_) => return String::new(),
    };

    parsed.set_fragment(None);

    let path = parsed.path();
    if path.starts_with('/') && path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        // "//" trims down to "", which the url crate turns back into "/"
        parsed.set_path(&trimmed);
    }

    parsed.to_string()
}

/// True when both URLs share host and explicit port.
///
/// Scheme is ignored: an http seed still follows https links
/// on the same site.
pub fn same_authority(a: &str, b: &str) -> bool {
    match (Url::parse(a), Url::parse(b)) {
        (Ok(a), Ok(b)) => a.host_str().is_some() && a.host_str() == b.host_str() && a.port() == b.port(),
        _ => false,
    }
}

/// Only http and https pages can be fetched or crawled
pub fn is_web_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
