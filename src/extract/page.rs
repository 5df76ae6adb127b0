// src/extract/page.rs
// =============================================================================
// Whole-page views used when a page has to be read by a person or a model:
//
// - clean_page_text: the readable text, with links rendered inline as
//   "label [URL: https://...]"
// - interactive_elements_html: the page skeleton with only controls and
//   headings keeping their text
//
// Both can be capped to a character budget with `truncate`.
// =============================================================================

use scraper::{ElementRef, Html, Node};
use tracing::debug;
use url::Url;

use super::snippet::{render, TextRules};

const TRUNCATION_NOTE: &str = "...\n[TRUNCATED DUE TO LENGTH RESTRICTIONS]";

const SKIPPED_IN_TEXT: &[&str] = &["script", "style"];

const STRUCTURE_RULES: TextRules = TextRules {
    keep_text_in: &[
        "a", "button", "input", "select", "option", "label", "h1", "h2", "h3", "h4", "h5", "h6",
        "title", "span",
    ],
    drop_tags: &["script", "style", "meta", "link", "svg", "path"],
};

/// Cuts `text` to `max_chars` characters and marks the cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}{}", &text[..byte_index], TRUNCATION_NOTE),
        None => text.to_string(),
    }
}

/// Extracts the readable text of a page.
///
/// Scripts and styles are dropped. With `preserve_links`, every link becomes
/// `"<text> [URL: <absolute href>]"` so the targets survive in plain text.
/// Blank lines are removed and every line is trimmed.
pub fn clean_page_text(html: &str, base_url: &str, preserve_links: bool, max_chars: Option<usize>) -> String {
    let document = Html::parse_document(html);
    let base = Url::parse(base_url).ok();

    let mut raw = String::new();
    collect_text(&mut raw, document.root_element(), base.as_ref(), preserve_links);

    let cleaned = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    let cleaned = match max_chars {
        Some(max) => truncate(&cleaned, max),
        None => cleaned,
    };

    debug!(
        url = base_url,
        chars = cleaned.len(),
        reduction = %format!("{:.2}%", reduction(html.len(), cleaned.len())),
        "cleaned page text"
    );
    cleaned
}

/// Renders the page skeleton: every tag stays, but only interactive elements
/// and headings keep their text. Scripts, styles, metadata and SVG drawings
/// are removed.
pub fn interactive_elements_html(html: &str, max_chars: Option<usize>) -> String {
    let document = Html::parse_document(html);
    let rendered = render(document.root_element(), &STRUCTURE_RULES);
    let rendered = match max_chars {
        Some(max) => truncate(&rendered, max),
        None => rendered,
    };

    debug!(
        chars = rendered.len(),
        reduction = %format!("{:.2}%", reduction(html.len(), rendered.len())),
        "extracted interactive structure"
    );
    rendered
}

fn collect_text(out: &mut String, element: ElementRef, base: Option<&Url>, preserve_links: bool) {
    let name = element.value().name();
    if SKIPPED_IN_TEXT.contains(&name) {
        return;
    }

    if preserve_links && name == "a" {
        if let Some(href) = element.value().attr("href") {
            let label = element
                .text()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            let target = base
                .and_then(|base| base.join(href).ok())
                .map(|url| url.to_string())
                .unwrap_or_else(|| href.to_string());
            out.push_str(&format!("{} [URL: {}]", label, target));
            return;
        }
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(out, child, base, preserve_links);
                }
            }
            _ => {}
        }
    }
}

fn reduction(before: usize, after: usize) -> f64 {
    if before == 0 {
        return 0.0;
    }
    (1.0 - after as f64 / before as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exact", 5), "exact");
        assert_eq!(truncate("héllo world", 5), format!("héllo{}", TRUNCATION_NOTE));
    }

    #[test]
    fn test_clean_text_drops_scripts_and_blank_lines() {
        let html = "<html><head><style>p { color: red; }</style></head>
            <body>
              <h1>Grants</h1>

              <script>var tracking = true;</script>
              <p>  Apply before June.  </p>
            </body></html>";
        let text = clean_page_text(html, "https://example.com/", false, None);
        assert_eq!(text, "Grants\nApply before June.");
    }

    #[test]
    fn test_clean_text_renders_links() {
        let html = r#"<p>See <a href="/calls">open calls</a></p>"#;
        let text = clean_page_text(html, "https://example.com/funding/", true, None);
        assert_eq!(text, "See open calls [URL: https://example.com/calls]");

        let plain = clean_page_text(html, "https://example.com/funding/", false, None);
        assert_eq!(plain, "See open calls");
    }

    #[test]
    fn test_clean_text_respects_budget() {
        let html = "<p>abcdefghij</p>";
        let text = clean_page_text(html, "https://example.com/", false, Some(4));
        assert!(text.starts_with("abcd..."));
    }

    #[test]
    fn test_interactive_structure() {
        let html = r#"<html><head><title>Shop</title><meta charset="utf-8"></head>
            <body><p>Long marketing copy</p><button>Buy</button><svg><path d="M0"></path></svg></body></html>"#;
        let structure = interactive_elements_html(html, None);
        assert!(structure.starts_with("<html>"));
        assert!(structure.contains("Shop"));
        assert!(structure.contains("Buy"));
        assert!(!structure.contains("Long marketing copy"));
        assert!(!structure.contains("meta"));
        assert!(!structure.contains("svg"));
    }
}
