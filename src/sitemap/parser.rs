//! Sitemap XML parser
//!
//! Extracts the two tag families a sitemap can carry:
//! - `<sitemap><loc>` entries pointing at child sitemaps
//! - `<urlset><url><loc>` entries naming actual pages
//!
//! Both families are collected from the same document, so a mixed document
//! yields child sitemaps and pages at once.

use quick_xml::events::Event;
use quick_xml::Reader;

/// Entries extracted from a single sitemap document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapDocument {
    /// Raw `loc` values of `<sitemap>` entries, in document order
    pub sitemaps: Vec<String>,

    /// Trimmed `loc` values of `<urlset><url>` entries, in document order
    pub pages: Vec<String>,
}

impl SitemapDocument {
    /// Returns true if the document names neither child sitemaps nor pages
    pub fn is_empty(&self) -> bool {
        self.sitemaps.is_empty() && self.pages.is_empty()
    }
}

/// Parses a sitemap document
///
/// Only the first `<loc>` of each `<sitemap>` or `<url>` element is used.
/// Namespaced extension elements such as `<image:loc>` sit under their own
/// parents and are ignored.
///
/// # Arguments
///
/// * `xml` - The sitemap document body
///
/// # Returns
///
/// * `Ok(SitemapDocument)` - Extracted entries (possibly empty)
/// * `Err(String)` - The document is not well-formed XML
///
/// # Example
///
/// ```
/// use site_harvester::sitemap::parse_sitemap;
///
/// let xml = r#"<urlset><url><loc> https://example.com/a </loc></url></urlset>"#;
/// let document = parse_sitemap(xml).unwrap();
/// assert_eq!(document.pages, vec!["https://example.com/a".to_string()]);
/// ```
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut document = SitemapDocument::default();

    // Local names of the currently open elements
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut loc_text = String::new();
    let mut entry_has_loc = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"sitemap" || name == b"url" {
                    entry_has_loc = false;
                }
                if name == b"loc" {
                    loc_text.clear();
                }
                stack.push(name);
            }
            Ok(Event::Text(t)) => {
                if is_in_loc(&stack) {
                    let text = t
                        .unescape()
                        .map_err(|e| format!("invalid text at byte {}: {}", reader.buffer_position(), e))?;
                    loc_text.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if is_in_loc(&stack) {
                    loc_text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                if is_in_loc(&stack) && !entry_has_loc {
                    let loc = loc_text.trim();
                    match entry_kind(&stack) {
                        Some(EntryKind::Sitemap) if !loc.is_empty() => {
                            document.sitemaps.push(loc.to_string());
                            entry_has_loc = true;
                        }
                        Some(EntryKind::Page) if !loc.is_empty() => {
                            document.pages.push(loc.to_string());
                            entry_has_loc = true;
                        }
                        _ => {}
                    }
                }
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!("error at byte {}: {}", reader.buffer_position(), e));
            }
            _ => {}
        }
    }

    Ok(document)
}

enum EntryKind {
    Sitemap,
    Page,
}

fn is_in_loc(stack: &[Vec<u8>]) -> bool {
    stack.last().is_some_and(|name| name.as_slice() == b"loc")
}

/// Classifies the `<loc>` on top of the stack by its enclosing elements
fn entry_kind(stack: &[Vec<u8>]) -> Option<EntryKind> {
    let depth = stack.len();
    let parent = stack.get(depth.checked_sub(2)?)?.as_slice();
    match parent {
        b"sitemap" => Some(EntryKind::Sitemap),
        b"url" => {
            let grandparent = stack.get(depth.checked_sub(3)?)?.as_slice();
            (grandparent == b"urlset").then_some(EntryKind::Page)
        }
        _ => None,
    }
}
