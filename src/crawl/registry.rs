// src/crawl/registry.rs
// =============================================================================
// The link registry: one record per normalized URL for the whole crawl.
//
// Invariants:
// - a URL gets exactly one record, created the first time it is extracted
// - depth_found is set on creation and never touched again
// - found_on_urls only grows, keeps discovery order, never repeats a page
// - associated_texts is the union of every label seen for the URL
//
// Only the depth crawler's aggregation step writes here, one page result at
// a time, so there is no locking.
// =============================================================================

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::extract::ExtractedLink;

/// Everything we know about one discovered URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub url: String,
    pub associated_texts: BTreeSet<String>,
    pub found_on_urls: Vec<String>,
    pub depth_found: usize,
}

/// Normalized URL -> record, iterated in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkRegistry {
    records: IndexMap<String, LinkRecord>,
}

impl LinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one extracted link found at `depth`.
    ///
    /// Returns true if the URL was new to the registry.
    pub fn record(&mut self, link: ExtractedLink, depth: usize) -> bool {
        match self.records.get_mut(&link.url) {
            Some(existing) => {
                if !existing.found_on_urls.contains(&link.found_on_url) {
                    existing.found_on_urls.push(link.found_on_url);
                }
                existing.associated_texts.extend(link.associated_texts);
                false
            }
            None => {
                let record = LinkRecord {
                    url: link.url.clone(),
                    associated_texts: link.associated_texts,
                    found_on_urls: vec![link.found_on_url],
                    depth_found: depth,
                };
                self.records.insert(link.url, record);
                true
            }
        }
    }

    pub fn get(&self, url: &str) -> Option<&LinkRecord> {
        self.records.get(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.records.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LinkRecord> {
        self.records.values()
    }
}
