//! Configuration module for Site-Harvester
//!
//! Settings come from two places: an optional TOML file holding the crawler
//! and output tuning (`Config`), and the per-run choices made on the command
//! line or at the prompt (`RunConfig`).
//!
//! # Example
//!
//! ```no_run
//! use site_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Default page cap: {}", config.crawler.default_page_cap);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, PageLimit, ResolutionPolicy, RunConfig,
    DEFAULT_MAX_WORKERS, DEFAULT_PAGES_PER_WORKER, DEFAULT_PAGE_CAP, DEFAULT_STORAGE_ROOT,
};

// Re-export parser and validation functions
pub use parser::{load_config, load_config_or_default};
pub use validation::{validate, validate_run_config};
