//! Crawler module for page fetching and batch orchestration
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching and content extraction (plain text and reader mode)
//! - Page-count decisions and worker pool sizing
//! - Overall run coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::Coordinator;
pub use fetcher::{
    build_http_client, fetch_html, fetcher_for, ContentFetcher, ContentVariant, FetchResult,
    PlainTextFetcher, ReaderFetcher,
};
pub use parser::{extract_markdown, extract_text};
pub use scheduler::{
    effective_pages, needs_page_count_decision, pool_size, KeepRequested, PageCountPrompt,
    WorkerPool,
};

pub use crate::output::BatchResult;
