//! Locating the page that carries a target statement title.
//!
//! Statement pages are short: a title, a header block, and a table. Pages
//! of dense prose, index pages, and tables of contents all mention the
//! same titles and must be filtered out before matching.

use log::debug;

use crate::config::ExtractorConfig;
use crate::schema::Page;

/// Find the first page at or after `min_page` (1-indexed) whose text
/// contains `search_text`, case-insensitively, skipping pages that cannot
/// be statement pages. Returns `None` when no page qualifies; a missing
/// statement is a normal outcome, not an error.
pub fn find_page(
    pages: &[Page],
    search_text: &str,
    min_page: usize,
    config: &ExtractorConfig,
) -> Option<usize> {
    let needle = search_text.to_uppercase();

    for page in pages.iter().filter(|p| p.number >= min_page) {
        if page.text.is_empty() {
            continue;
        }

        let word_count = page.text.split_whitespace().count();
        if word_count >= config.prose_word_limit {
            debug!(
                "page {}: skipped, {} words of prose",
                page.number, word_count
            );
            continue;
        }

        let upper = page.text.to_uppercase();
        if upper.contains("INDEX") {
            debug!("page {}: skipped, index page", page.number);
            continue;
        }
        if upper.matches("TABLE OF CONTENTS").count() >= 2 {
            debug!("page {}: skipped, table of contents", page.number);
            continue;
        }

        if upper.contains(&needle) {
            debug!("page {}: matched '{}'", page.number, search_text);
            return Some(page.number);
        }
    }

    None
}
