// src/extract/mod.rs
// =============================================================================
// HTML analysis: everything that reads a parsed page.
//
// Submodules:
// - links: outbound links with their labels (feeds the crawler)
// - pagination: snippets of likely pagination controls
// - cookies: snippets of likely cookie-consent banners
// - page: readable text and structural views of a whole page
// - candidates / snippet: shared container search and snippet rendering
// =============================================================================

mod candidates;
mod cookies;
mod links;
mod page;
mod pagination;
mod snippet;

pub use cookies::find_cookie_consent_candidates;
pub use links::{extract_links, ExtractedLink};
pub use page::{clean_page_text, interactive_elements_html, truncate};
pub use pagination::find_pagination_candidates;
