//! Batch outcome aggregation and reporting
//!
//! This module provides the per-run result the coordinator hands back and
//! prints it in a human-readable form.

use crate::sitemap::SitemapFailure;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Where in a fetch-and-persist unit a page failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Network, HTTP status or extraction failure
    Fetch,
    /// The content could not be written
    Persist,
    /// The task died before reporting
    Task,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::Persist => write!(f, "persist"),
            Self::Task => write!(f, "task"),
        }
    }
}

/// A page that was dispatched but not stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub url: String,
    pub kind: FailureKind,
    pub reason: String,
}

impl PageFailure {
    pub fn new(url: impl Into<String>, kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} failed: {})", self.url, self.kind, self.reason)
    }
}

/// Outcome of one harvest run
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Page URLs the sitemap tree listed
    pub total: usize,

    /// Pages dispatched to the worker pool
    pub requested: usize,

    /// Pages fetched and written to disk
    pub fetched: usize,

    /// Dispatched pages that failed
    pub failed: usize,

    /// Worker pool size used
    pub workers: usize,

    /// Directory pages were written to
    pub directory: PathBuf,

    /// Wall-clock duration of the run
    pub elapsed: Duration,

    /// Details of every failed page
    pub failures: Vec<PageFailure>,

    /// Sitemaps skipped under the best-effort policy
    pub sitemap_failures: Vec<SitemapFailure>,
}

impl BatchResult {
    /// Pages listed in the sitemap but never dispatched
    pub fn skipped(&self) -> usize {
        self.total.saturating_sub(self.requested)
    }

    /// Elapsed wall-clock time in seconds
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Prints the run summary to stdout
pub fn print_summary(result: &BatchResult) {
    println!(
        "{} pages fetched and saved to {}. Total time: {:.2} seconds.",
        result.fetched,
        result.directory.display(),
        result.elapsed_seconds()
    );

    if result.failed > 0 {
        println!("{} of {} pages failed:", result.failed, result.requested);
        for failure in &result.failures {
            println!("  - {}", failure);
        }
    }

    if !result.sitemap_failures.is_empty() {
        println!("Skipped sitemaps ({}):", result.sitemap_failures.len());
        for failure in &result.sitemap_failures {
            println!("  - {}: {}", failure.url, failure.reason);
        }
    }

    if result.skipped() > 0 {
        println!("Leaving {} pages.", result.skipped());
    }
}
