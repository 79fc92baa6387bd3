use crate::crawler::ContentVariant;
use serde::Deserialize;
use std::path::PathBuf;

/// Number of pages fetched when the user sets no explicit cap
pub const DEFAULT_PAGE_CAP: usize = 100;

/// Upper bound on the worker pool size
pub const DEFAULT_MAX_WORKERS: usize = 10;

/// Pages each worker is expected to handle when sizing the pool
pub const DEFAULT_PAGES_PER_WORKER: usize = 10;

/// Directory under which one folder per site is created
pub const DEFAULT_STORAGE_ROOT: &str = "public";

/// Main configuration structure for Site-Harvester
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Pages fetched by default; sites larger than this trigger the page-count decision
    #[serde(rename = "default-page-cap", default = "default_page_cap")]
    pub default_page_cap: usize,

    /// Maximum number of concurrent fetch workers
    #[serde(rename = "max-workers", default = "default_max_workers")]
    pub max_workers: usize,

    /// Pages per worker used to size the pool
    #[serde(rename = "pages-per-worker", default = "default_pages_per_worker")]
    pub pages_per_worker: usize,

    /// What to do when a sitemap document cannot be fetched or parsed
    #[serde(rename = "resolution-policy", default)]
    pub resolution_policy: ResolutionPolicy,

    /// Per-request timeout in seconds (no timeout when absent)
    #[serde(rename = "request-timeout-secs", default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            default_page_cap: DEFAULT_PAGE_CAP,
            max_workers: DEFAULT_MAX_WORKERS,
            pages_per_worker: DEFAULT_PAGES_PER_WORKER,
            resolution_policy: ResolutionPolicy::default(),
            request_timeout_secs: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory; pages land in `<storage-root>/<site>/`
    #[serde(rename = "storage-root", default = "default_storage_root")]
    pub storage_root: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            storage_root: default_storage_root(),
        }
    }
}

/// Failure policy for sitemap resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionPolicy {
    /// The first sitemap that fails to load aborts the whole run
    #[default]
    Strict,
    /// A failed sitemap only drops its own subtree
    BestEffort,
}

/// How many of the discovered pages a run may fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLimit {
    /// Fetch every discovered page
    Unlimited,
    /// Fetch at most this many pages
    Capped(usize),
}

impl Default for PageLimit {
    fn default() -> Self {
        Self::Capped(DEFAULT_PAGE_CAP)
    }
}

/// Per-run configuration, resolved before the coordinator starts
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Website URL as supplied by the user
    pub url: String,

    /// Page cap for this run
    pub page_limit: PageLimit,

    /// Content extraction variant
    pub variant: ContentVariant,

    /// Emit per-page progress and failure details
    pub debug: bool,
}

impl RunConfig {
    /// Creates a run configuration with the default cap and plain-text extraction
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            page_limit: PageLimit::default(),
            variant: ContentVariant::PlainText,
            debug: false,
        }
    }
}

fn default_page_cap() -> usize {
    DEFAULT_PAGE_CAP
}

fn default_max_workers() -> usize {
    DEFAULT_MAX_WORKERS
}

fn default_pages_per_worker() -> usize {
    DEFAULT_PAGES_PER_WORKER
}

fn default_storage_root() -> PathBuf {
    PathBuf::from(DEFAULT_STORAGE_ROOT)
}
