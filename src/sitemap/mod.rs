//! Sitemap module for discovering the pages a site publishes
//!
//! This module handles:
//! - Parsing sitemap documents (`<sitemapindex>` and `<urlset>`)
//! - Recursively resolving sitemap indexes into a flat list of page URLs
//! - Guarding against self-referential sitemap trees
//! - Applying the configured failure policy

mod parser;
mod resolver;

pub use crate::config::ResolutionPolicy;
pub use parser::{parse_sitemap, SitemapDocument};
pub use resolver::SitemapResolver;

use crate::UrlError;
use thiserror::Error;

/// Errors raised while loading a sitemap document
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Failed to fetch sitemap {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },

    #[error("Sitemap {url} returned HTTP {status_code}")]
    Status { url: String, status_code: u16 },

    #[error("Failed to parse sitemap {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Invalid sitemap location '{loc}': {source}")]
    InvalidLocation { loc: String, source: url::ParseError },

    #[error("Invalid site URL: {0}")]
    InvalidUrl(#[from] UrlError),
}

/// A sitemap document that was skipped under the best-effort policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapFailure {
    /// URL of the sitemap (or the raw location that could not be joined)
    pub url: String,

    /// Why it was skipped
    pub reason: String,
}

/// Outcome of resolving a site's sitemap tree
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Leaf page URLs in resolver order
    pub urls: Vec<String>,

    /// Sitemaps dropped under `ResolutionPolicy::BestEffort`
    pub failures: Vec<SitemapFailure>,
}

impl Resolution {
    /// Number of page URLs discovered
    pub fn total(&self) -> usize {
        self.urls.len()
    }

    /// Returns true if every sitemap in the tree loaded successfully
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
