// src/extract/cookies.rs
// =============================================================================
// Finds regions of a page that look like cookie-consent banners.
//
// Heuristics:
// 1. cookie/consent/banner/dialog/CMP keywords in class, id and ARIA
//    attributes, including the big consent platforms (OneTrust, Cookiebot)
// 2. links/buttons whose text or aria-label accepts ("Accept all", "Got it",
//    "Akzeptieren", ...)
// 3. role="dialog" / role="alertdialog"
//
// Banners are usually one enclosing element around several controls, so
// nested containers are resolved largest first and the walk never climbs to
// <body> or <html>.
// =============================================================================

use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;
use tracing::debug;

use super::candidates::{
    attr_lower, class_or_id_contains, consolidate, interactive_elements, select_all, sole_string,
    SizeOrder, Walk,
};
use super::snippet::{render, TextRules};

const KEYWORD_SELECTORS: &[&str] = &[
    r#"[class*="cookie"]"#,
    r#"[id*="cookie"]"#,
    r#"[class*="consent"]"#,
    r#"[id*="consent"]"#,
    r#"[class*="banner"]"#,
    r#"[id*="banner"]"#,
    r#"[class*="cmp"]"#,
    r#"[id*="cmp"]"#,
    r#"[class*="dialog"]"#,
    r#"[id*="dialog"]"#,
    r#"[aria-label*="cookie"]"#,
    r#"[aria-label*="consent"]"#,
    r#"[aria-labelledby*="cookie"]"#,
    r#"[aria-describedby*="cookie"]"#,
    r#"[aria-labelledby*="consent"]"#,
    r#"[aria-describedby*="consent"]"#,
    r#"[id*="onetrust"]"#,
    r#"[class*="onetrust"]"#,
    r#"[id*="cookiebot"]"#,
    r#"[class*="cookiebot"]"#,
];

const ROLE_SELECTORS: &[&str] = &[r#"[role="dialog"]"#, r#"[role="alertdialog"]"#];

const CONTAINER_KEYWORDS: &[&str] = &["cookie", "consent", "banner", "dialog", "cmp"];

static ACCEPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(accept|agree|allow|ok|got it|i understand|continue to site|ja|akzeptieren|zustimmen|einverstanden|acepto|aceptar)\b",
    )
    .unwrap()
});

const WALK: Walk = Walk {
    max_levels: 5,
    stop_below_body: true,
};

const SNIPPET_RULES: TextRules = TextRules {
    keep_text_in: &["a", "button", "span", "p", "h1", "h2", "h3", "label"],
    drop_tags: &[],
};

/// Returns up to `max_candidates` HTML snippets that likely contain a
/// cookie-consent banner, largest first.
pub fn find_cookie_consent_candidates(html: &str, max_candidates: usize) -> Vec<String> {
    let document = Html::parse_document(html);

    let mut candidates = select_all(&document, KEYWORD_SELECTORS);
    candidates.extend(select_all(&document, ROLE_SELECTORS));

    for element in interactive_elements(&document) {
        let accepts_by_text = sole_string(element).is_some_and(|text| ACCEPT.is_match(&text));
        let accepts_by_label = ACCEPT.is_match(&attr_lower(element, "aria-label"));
        if accepts_by_text || accepts_by_label {
            candidates.push(element);
        }
    }

    let containers = consolidate(candidates, WALK, is_consent_container, SizeOrder::LargestFirst);
    debug!(containers = containers.len(), "cookie consent containers found");

    containers
        .into_iter()
        .take(max_candidates)
        .map(|container| render(container, &SNIPPET_RULES))
        .collect()
}

fn is_consent_container(element: ElementRef) -> bool {
    class_or_id_contains(element, CONTAINER_KEYWORDS)
        || matches!(attr_lower(element, "role").as_str(), "dialog" | "alertdialog")
}
