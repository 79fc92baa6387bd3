//! HTTP fetcher implementation
//!
//! This module handles all page requests for the harvester, including:
//! - Building the shared HTTP client
//! - GET requests for page content
//! - Error classification into `FetchResult` values
//! - The two content fetchers (plain text and reader mode)

use crate::config::CrawlerConfig;
use crate::crawler::parser::{extract_markdown, extract_text};
use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Content extraction variant, selected once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentVariant {
    /// Whole-document visible text, stored as `.txt`
    #[default]
    PlainText,
    /// Reader-mode markdown, stored as `.md`
    Reader,
}

impl ContentVariant {
    /// File extension (without the dot) pages of this variant are stored with
    pub fn extension(&self) -> &'static str {
        match self {
            Self::PlainText => "txt",
            Self::Reader => "md",
        }
    }
}

impl fmt::Display for ContentVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlainText => write!(f, "plain text"),
            Self::Reader => write!(f, "reader"),
        }
    }
}

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched and extracted the page
    Success {
        /// Extracted content
        content: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body decode, etc.)
    NetworkError {
        /// Error description
        error: String,
    },

    /// Extraction produced no usable content
    EmptyContent,
}

impl FetchResult {
    /// Returns true if content was extracted
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Consumes the result, returning the content or a failure description
    pub fn into_content(self) -> Result<String, String> {
        match self {
            Self::Success { content } => Ok(content),
            Self::HttpError { status_code } => Err(format!("HTTP {}", status_code)),
            Self::NetworkError { error } => Err(error),
            Self::EmptyContent => Err("no usable content extracted".to_string()),
        }
    }
}

/// Turns a page URL into extracted content
///
/// Implementations never panic on expected failures; every failure mode is a
/// `FetchResult` variant so the coordinator can isolate it to one task.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// The variant this fetcher produces
    fn variant(&self) -> ContentVariant;

    /// Fetches the page and extracts its content
    async fn fetch(&self, url: &str) -> FetchResult;
}

/// Builds an HTTP client with proper configuration
///
/// No custom headers are sent. A timeout is applied only when configured.
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().gzip(true).brotli(true);

    if let Some(secs) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build()
}

/// Fetches the raw HTML of a page
///
/// # Returns
///
/// * `Ok(String)` - Response body of a successful request
/// * `Err(FetchResult)` - The failure, already classified
pub async fn fetch_html(client: &Client, url: &str) -> Result<String, FetchResult> {
    let response = client.get(url).send().await.map_err(classify_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchResult::HttpError {
            status_code: status.as_u16(),
        });
    }

    response.text().await.map_err(classify_error)
}

/// Classifies a transport error
fn classify_error(e: reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else if e.is_builder() {
        format!("Invalid request: {}", e)
    } else {
        e.to_string()
    };
    FetchResult::NetworkError { error }
}

/// Extracts all visible text of a page
pub struct PlainTextFetcher {
    client: Client,
}

impl PlainTextFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContentFetcher for PlainTextFetcher {
    fn variant(&self) -> ContentVariant {
        ContentVariant::PlainText
    }

    async fn fetch(&self, url: &str) -> FetchResult {
        match fetch_html(&self.client, url).await {
            Ok(html) => FetchResult::Success {
                content: extract_text(&html),
            },
            Err(failure) => failure,
        }
    }
}

/// Renders the main content of a page as markdown
pub struct ReaderFetcher {
    client: Client,
}

impl ReaderFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContentFetcher for ReaderFetcher {
    fn variant(&self) -> ContentVariant {
        ContentVariant::Reader
    }

    async fn fetch(&self, url: &str) -> FetchResult {
        match fetch_html(&self.client, url).await {
            Ok(html) => match extract_markdown(&html) {
                Some(content) => FetchResult::Success { content },
                None => FetchResult::EmptyContent,
            },
            Err(failure) => failure,
        }
    }
}

/// Returns the fetcher implementing the given variant
pub fn fetcher_for(variant: ContentVariant, client: Client) -> Arc<dyn ContentFetcher> {
    match variant {
        ContentVariant::PlainText => Arc::new(PlainTextFetcher::new(client)),
        ContentVariant::Reader => Arc::new(ReaderFetcher::new(client)),
    }
}
