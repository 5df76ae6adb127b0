// src/extract/links.rs
// =============================================================================
// Extracts the outbound links of one page, with their labels.
//
// For each <a href>:
// - skip script/mail/phone links and social network links
// - normalize the href against the page URL
// - collect the anchor's text and its title attribute as "associated texts"
//
// Anchors pointing to the same normalized URL are merged into one record per
// page. Merging across pages is the depth crawler's job.
//
// Rust concepts:
// - LazyLock: a static compiled once, on first use
// - IndexMap: a HashMap that remembers insertion order
// - BTreeSet: a sorted set, so labels print the same way every run
// =============================================================================

use indexmap::IndexMap;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::urls::{is_web_url, normalize};

// Substrings that disqualify an href outright
const IGNORED_PATTERNS: &[&str] = &[
    "javascript:",
    "mailto:",
    "tel:",
    "whatsapp.com",
    "twitter.com",
    "facebook.com",
    "linkedin.com",
    "instagram.com",
];

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// One unique link found on one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedLink {
    pub url: String,
    pub associated_texts: BTreeSet<String>,
    pub found_on_url: String,
}

/// Extracts all links of `html`, resolved against `base_url`.
///
/// Results come back in the order each URL first appears on the page.
///
/// Example:
///   html = `<a href="/docs" title="Documentation">Docs</a>`
///   base_url = "https://example.com"
///   result = [{ url: "https://example.com/docs", associated_texts: {"Docs", "Documentation"} }]
pub fn extract_links(html: &str, base_url: &str) -> Vec<ExtractedLink> {
    let document = Html::parse_document(html);
    let mut by_url: IndexMap<String, BTreeSet<String>> = IndexMap::new();

    for anchor in document.select(&ANCHOR) {
        // a[href] guarantees the attribute, but it can still be blank
        let href = anchor.value().attr("href").unwrap_or("").trim();
        if href.is_empty() || IGNORED_PATTERNS.iter().any(|p| href.contains(p)) {
            continue;
        }

        let url = normalize(href, Some(base_url));
        if url.is_empty() || !is_web_url(&url) {
            continue;
        }

        // .text() yields every text node under the anchor, nested tags included
        let text = anchor
            .text()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let title = anchor.value().attr("title").unwrap_or("").trim();

        let texts = by_url.entry(url).or_default();
        // An unlabeled link still needs an entry
        if text.is_empty() && title.is_empty() {
            texts.insert(String::new());
        }
        if !text.is_empty() {
            texts.insert(text);
        }
        if !title.is_empty() {
            texts.insert(title.to_string());
        }
    }

    by_url
        .into_iter()
        .map(|(url, associated_texts)| ExtractedLink {
            url,
            associated_texts,
            found_on_url: base_url.to_string(),
        })
        .collect()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why entry(url).or_default()?
//    - It returns the existing set for `url`, or inserts an empty one first
//    - One lookup instead of a contains_key + insert pair
//
// 2. Why keep an empty string for unlabeled links?
//    - An image-only link still counts as "seen with no text"
//    - It keeps the labels set non-empty for every record
//
// 3. Why does found_on_url use base_url as given?
//    - The crawler only ever passes normalized URLs, so it is already canonical
// -----------------------------------------------------------------------------
