// src/extract/candidates.rs
// =============================================================================
// Shared machinery of the pagination and cookie-consent detectors.
//
// Both detectors work in three steps:
// 1. gather candidate elements from several heuristics (selectors, text)
// 2. lift each candidate to a container: the nearest ancestor that looks like
//    the whole widget, or a fallback after a bounded number of levels
// 3. drop containers nested inside an already accepted one, where the order
//    in which containers are considered (smallest or largest first) decides
//    which of two nested regions wins
// =============================================================================

use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;
use tracing::debug;

/// Result of the bounded ancestor walk
#[derive(Debug, Clone, Copy)]
pub(crate) enum ContainerMatch<'a> {
    /// An element (the candidate or an ancestor) passed the container test
    Matched(ElementRef<'a>),
    /// Nothing matched; the highest element the walk was allowed to reach
    Capped(ElementRef<'a>),
}

impl<'a> ContainerMatch<'a> {
    pub fn element(self) -> ElementRef<'a> {
        match self {
            ContainerMatch::Matched(element) | ContainerMatch::Capped(element) => element,
        }
    }
}

/// How far the ancestor walk may climb
#[derive(Debug, Clone, Copy)]
pub(crate) struct Walk {
    pub max_levels: usize,
    /// Never adopt <body> or <html> as a container
    pub stop_below_body: bool,
}

/// Which of two nested containers survives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SizeOrder {
    SmallestFirst,
    LargestFirst,
}

/// Runs every selector against the document, skipping the ones the selector
/// engine rejects
pub(crate) fn select_all<'a>(document: &'a Html, selectors: &[&str]) -> Vec<ElementRef<'a>> {
    let mut found = Vec::new();
    for raw in selectors {
        match Selector::parse(raw) {
            Ok(selector) => found.extend(document.select(&selector)),
            Err(e) => debug!(selector = *raw, error = ?e, "skipping unsupported selector"),
        }
    }
    found
}

/// All <a> and <button> elements
pub(crate) fn interactive_elements(document: &Html) -> Vec<ElementRef<'_>> {
    select_all(document, &["a, button"])
}

/// The element's only string, looking through single-child wrappers.
///
/// `<a><span>Next</span></a>` has "Next"; `<a>1 <b>2</b></a>` has none.
pub(crate) fn sole_string(element: ElementRef) -> Option<String> {
    let mut children = element.children();
    let only = children.next()?;
    if children.next().is_some() {
        return None;
    }
    match only.value() {
        Node::Text(text) => Some((**text).to_string()),
        Node::Element(_) => ElementRef::wrap(only).and_then(sole_string),
        _ => None,
    }
}

/// Lowercased attribute value, empty when absent
pub(crate) fn attr_lower(element: ElementRef, name: &str) -> String {
    element.value().attr(name).unwrap_or("").to_lowercase()
}

/// True if the element's class or id contains any of `keywords`
pub(crate) fn class_or_id_contains(element: ElementRef, keywords: &[&str]) -> bool {
    let class = attr_lower(element, "class");
    let id = attr_lower(element, "id");
    keywords.iter().any(|k| class.contains(k) || id.contains(k))
}

/// Lifts `candidate` to its container.
///
/// A candidate that already passes `is_container` is its own container.
/// Otherwise climb at most `walk.max_levels` element ancestors, stopping at
/// the first that passes; if none does, the last one reached wins.
pub(crate) fn find_container<'a, F>(candidate: ElementRef<'a>, walk: Walk, is_container: F) -> ContainerMatch<'a>
where
    F: Fn(ElementRef<'a>) -> bool,
{
    if is_container(candidate) {
        return ContainerMatch::Matched(candidate);
    }

    let mut current = candidate;
    for _ in 0..walk.max_levels {
        let parent = match current.parent().and_then(ElementRef::wrap) {
            Some(parent) => parent,
            None => break,
        };
        if walk.stop_below_body && matches!(parent.value().name(), "body" | "html") {
            break;
        }
        if is_container(parent) {
            return ContainerMatch::Matched(parent);
        }
        current = parent;
    }

    ContainerMatch::Capped(current)
}

/// Collapses candidates to containers and removes nested duplicates.
///
/// Containers are considered by serialized size in `order`; one is dropped
/// when it sits strictly inside a container accepted before it.
pub(crate) fn consolidate<'a, F>(
    candidates: Vec<ElementRef<'a>>,
    walk: Walk,
    is_container: F,
    order: SizeOrder,
) -> Vec<ElementRef<'a>>
where
    F: Fn(ElementRef<'a>) -> bool,
{
    let mut seen = HashSet::new();
    let mut containers: Vec<(usize, ElementRef<'a>)> = Vec::new();
    for candidate in candidates {
        let container = find_container(candidate, walk, &is_container).element();
        if seen.insert(container.id()) {
            containers.push((container.html().len(), container));
        }
    }

    // Stable sort keeps document order among equal sizes
    match order {
        SizeOrder::SmallestFirst => containers.sort_by_key(|(size, _)| *size),
        SizeOrder::LargestFirst => containers.sort_by(|a, b| b.0.cmp(&a.0)),
    }

    let mut accepted: Vec<ElementRef<'a>> = Vec::new();
    for (_, container) in containers {
        let nested = accepted
            .iter()
            .any(|outer| is_strict_descendant(container, *outer));
        if !nested {
            accepted.push(container);
        }
    }
    accepted
}

fn is_strict_descendant(inner: ElementRef, outer: ElementRef) -> bool {
    inner.ancestors().any(|ancestor| ancestor.id() == outer.id())
}
