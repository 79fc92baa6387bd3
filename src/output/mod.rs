//! Output module for persisting pages and reporting runs
//!
//! This module handles:
//! - Writing extracted page content into the site directory
//! - Aggregating per-page outcomes into a batch result
//! - Printing the end-of-run summary

mod store;
pub mod summary;

pub use store::PageStore;
pub use summary::{print_summary, BatchResult, FailureKind, PageFailure};

use crate::crawler::ContentVariant;
use crate::url::target_filename;

/// A fetched page on its way to disk
///
/// Created after a successful fetch, consumed by `PageStore::write`, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// Page URL as listed in the sitemap
    pub url: String,

    /// File name derived from the URL and content variant
    pub target_filename: String,

    /// Extracted content
    pub content: String,
}

impl PageRecord {
    /// Creates a record, deriving the file name from the URL
    pub fn new(url: impl Into<String>, variant: ContentVariant, content: String) -> Self {
        let url = url.into();
        let target_filename = target_filename(&url, variant);
        Self {
            url,
            target_filename,
            content,
        }
    }
}
