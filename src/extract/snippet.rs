// src/extract/snippet.rs
// =============================================================================
// Renders a DOM subtree as a compact, indented HTML snippet.
//
// The point of a snippet is to show the *shape* of a region (which tags,
// classes, ids, hrefs) without the noise of its prose. So text survives only
// inside a caller-chosen set of tags (buttons, links, labels...), every other
// text node is blanked, and some tags can be dropped entirely.
//
// Layout follows the usual "prettify" convention: one tag or text per line,
// one space of indentation per nesting level.
// =============================================================================

use scraper::{ElementRef, Node};

// Elements that never have children or a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Which tags keep their text, and which are removed from the output
#[derive(Debug, Clone, Copy)]
pub(crate) struct TextRules {
    pub keep_text_in: &'static [&'static str],
    pub drop_tags: &'static [&'static str],
}

impl TextRules {
    fn keeps_text(&self, tag: &str) -> bool {
        self.keep_text_in.contains(&tag)
    }

    fn drops(&self, tag: &str) -> bool {
        self.drop_tags.contains(&tag)
    }
}

/// Renders `root` and its subtree under `rules`
pub(crate) fn render(root: ElementRef, rules: &TextRules) -> String {
    let mut out = String::new();
    write_element(&mut out, root, 0, rules);
    out.truncate(out.trim_end().len());
    out
}

fn write_element(out: &mut String, element: ElementRef, depth: usize, rules: &TextRules) {
    let name = element.value().name();
    if rules.drops(name) {
        return;
    }

    indent(out, depth);
    out.push('<');
    out.push_str(name);
    for (key, value) in element.value().attrs() {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value, true));
        out.push('"');
    }

    if VOID_ELEMENTS.contains(&name) {
        out.push_str("/>\n");
        return;
    }
    out.push_str(">\n");

    for child in element.children() {
        match child.value() {
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    write_element(out, child, depth + 1, rules);
                }
            }
            Node::Text(text) => {
                let text = text.trim();
                // Blanked text leaves no line behind
                if !text.is_empty() && rules.keeps_text(name) {
                    indent(out, depth + 1);
                    out.push_str(&escape(text, false));
                    out.push('\n');
                }
            }
            _ => {}
        }
    }

    indent(out, depth);
    out.push_str("</");
    out.push_str(name);
    out.push_str(">\n");
}

fn indent(out: &mut String, depth: usize) {
    out.extend(std::iter::repeat(' ').take(depth));
}

fn escape(text: &str, in_attribute: bool) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if in_attribute => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
