// src/extract/pagination.rs
// =============================================================================
// Finds regions of a page that look like pagination controls.
//
// Heuristics, all feeding one candidate set:
// 1. class/id/aria-label keywords ("pagination", "pager", "pages") and
//    role="navigation"
// 2. links/buttons saying next/previous/more (several languages), showing an
//    arrow glyph, or holding a bare page number
// 3. links inside nav > ul > li
// 4. "Load more" / "Show more" buttons
//
// The compact control is what we want here, so nested containers are
// resolved smallest first.
// =============================================================================

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

use super::candidates::{
    attr_lower, class_or_id_contains, consolidate, interactive_elements, select_all, sole_string,
    SizeOrder, Walk,
};
use super::snippet::{render, TextRules};

const KEYWORD_SELECTORS: &[&str] = &[
    r#"[class*="pagination"]"#,
    r#"[id*="pagination"]"#,
    r#"[class*="pager"]"#,
    r#"[id*="pager"]"#,
    r#"[class*="pages"]"#,
    r#"[id*="pages"]"#,
    r#"[aria-label*="pagination"]"#,
    r#"[role="navigation"]"#,
];

const STRUCTURAL_SELECTORS: &[&str] = &["nav ul li a"];

// (tag, phrase) pairs for load-more style controls
const LOAD_MORE: &[(&str, &str)] = &[
    ("button", "Load more"),
    ("button", "Show more"),
    ("a", "Load more"),
    ("a", "Show more"),
];

const DIRECTION_SYMBOLS: &[&str] = &["»", "›", ">", "→", "«", "‹", "<", "←"];

const CONTAINER_KEYWORDS: &[&str] = &["pagination", "pager"];

static NEXT_PREV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)next|previous|prev|back|more|older|newer|continuar|siguiente|anterior").unwrap()
});

const WALK: Walk = Walk {
    max_levels: 5,
    stop_below_body: false,
};

const SNIPPET_RULES: TextRules = TextRules {
    keep_text_in: &["a", "button", "span", "option", "label"],
    drop_tags: &[],
};

/// Returns up to `max_candidates` HTML snippets that likely contain the
/// page's pagination controls, smallest first.
pub fn find_pagination_candidates(html: &str, max_candidates: usize) -> Vec<String> {
    let document = Html::parse_document(html);

    let mut candidates = select_all(&document, KEYWORD_SELECTORS);
    candidates.extend(select_all(&document, STRUCTURAL_SELECTORS));
    candidates.extend(load_more_controls(&document));

    for element in interactive_elements(&document) {
        let sole = sole_string(element);
        let sole = sole.as_deref().map(str::trim).unwrap_or("");

        let says_direction = !sole.is_empty()
            && (NEXT_PREV.is_match(sole) || DIRECTION_SYMBOLS.contains(&sole));
        let labelled_direction = NEXT_PREV.is_match(&attr_lower(element, "aria-label"));
        let page_number = !sole.is_empty() && sole.chars().all(|c| c.is_ascii_digit());

        if says_direction || labelled_direction || page_number {
            candidates.push(element);
        }
    }

    let containers = consolidate(candidates, WALK, is_pagination_container, SizeOrder::SmallestFirst);
    debug!(containers = containers.len(), "pagination containers found");

    containers
        .into_iter()
        .take(max_candidates)
        .map(|container| render(container, &SNIPPET_RULES))
        .collect()
}

fn is_pagination_container(element: scraper::ElementRef) -> bool {
    class_or_id_contains(element, CONTAINER_KEYWORDS)
        || element.value().attr("role") == Some("navigation")
}

// Tries a :contains() selector first; the selector engine does not support
// it, so in practice this falls through to a plain text match
fn load_more_controls(document: &Html) -> Vec<scraper::ElementRef<'_>> {
    let mut found = Vec::new();
    for &(tag, phrase) in LOAD_MORE {
        let pseudo = format!("{}:contains(\"{}\")", tag, phrase);
        if let Ok(selector) = Selector::parse(&pseudo) {
            found.extend(document.select(&selector));
            continue;
        }

        found.extend(
            select_all(document, &[tag])
                .into_iter()
                .filter(|element| element.text().collect::<String>().contains(phrase)),
        );
    }
    found
}
