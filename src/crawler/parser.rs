//! HTML content extraction
//!
//! This module turns fetched HTML into stored content:
//! - Plain text: every text node of the document, concatenated
//! - Reader mode: the main content region converted to markdown

use scraper::{ElementRef, Html, Selector};

/// Elements removed before markdown conversion
const READER_EXCLUDED: &[&str] = &["script", "style", "noscript", "template"];

/// Content regions tried, in order, when picking the reader root
const READER_ROOTS: &[&str] = &["article", "main", "body"];

/// Extracts the text of the whole document
///
/// Text nodes are concatenated as they appear. Markup is dropped but the text
/// of `<script>` and `<style>` elements is kept.
///
/// # Example
///
/// ```
/// use site_harvester::crawler::extract_text;
///
/// let text = extract_text("<html><body><h1>Hi</h1><p>there</p></body></html>");
/// assert_eq!(text, "Hithere");
/// ```
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    document.root_element().text().collect()
}

/// Renders the main content of a page as markdown
///
/// Excluded elements are detached from the parsed tree before the content
/// root is picked and serialized. Returns `None` if the conversion yields
/// nothing but whitespace.
pub fn extract_markdown(html: &str) -> Option<String> {
    let mut document = Html::parse_document(html);
    strip_excluded(&mut document);

    let root = reader_root(&document).unwrap_or_else(|| document.root_element());
    let markdown = html2md::parse_html(&root.html());
    let markdown = markdown.trim();
    if markdown.is_empty() {
        None
    } else {
        Some(markdown.to_string())
    }
}

/// Detaches every `READER_EXCLUDED` element (and its subtree) from the document
fn strip_excluded(document: &mut Html) {
    let Ok(selector) = Selector::parse(&READER_EXCLUDED.join(", ")) else {
        return;
    };
    let ids: Vec<_> = document.select(&selector).map(|element| element.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Picks the first matching content region
fn reader_root(document: &Html) -> Option<ElementRef<'_>> {
    READER_ROOTS.iter().find_map(|tag| {
        let selector = Selector::parse(tag).ok()?;
        document.select(&selector).next()
    })
}
