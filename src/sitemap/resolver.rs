//! Recursive sitemap resolution
//!
//! Walks a sitemap tree rooted at `<origin>/sitemap.xml` depth-first. For each
//! document, its child sitemaps are fully expanded in document order, then its
//! own page entries are appended.

use crate::config::ResolutionPolicy;
use crate::sitemap::parser::{parse_sitemap, SitemapDocument};
use crate::sitemap::{Resolution, SitemapError, SitemapFailure};
use crate::url::Origin;
use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use std::collections::HashSet;
use url::Url;

/// Resolves a site's sitemap tree into an ordered list of page URLs
pub struct SitemapResolver {
    client: Client,
    policy: ResolutionPolicy,
}

/// State threaded through one resolution
#[derive(Default)]
struct Walk {
    /// Sitemap URLs already loaded (or attempted) during this resolution
    visited: HashSet<String>,
    failures: Vec<SitemapFailure>,
}

impl SitemapResolver {
    /// Creates a resolver using the given HTTP client and failure policy
    pub fn new(client: Client, policy: ResolutionPolicy) -> Self {
        Self { client, policy }
    }

    /// Resolves every page URL reachable from the site's root sitemap
    ///
    /// # Arguments
    ///
    /// * `origin` - The site origin; `/sitemap.xml` is resolved against it
    ///
    /// # Returns
    ///
    /// * `Ok(Resolution)` - Page URLs in resolver order, plus any sitemaps
    ///   skipped under the best-effort policy
    /// * `Err(SitemapError)` - Under the strict policy, the first sitemap that
    ///   failed to load
    pub async fn resolve(&self, origin: &Origin) -> Result<Resolution, SitemapError> {
        let base = origin.as_url()?;
        let entry = origin.sitemap_url()?;

        tracing::info!("Resolving sitemap tree from {}", entry);

        let mut walk = Walk::default();
        let urls = self.resolve_node(&base, entry, &mut walk).await?;

        tracing::info!(
            "Sitemap resolution finished: {} pages from {} sitemaps ({} skipped)",
            urls.len(),
            walk.visited.len(),
            walk.failures.len()
        );

        Ok(Resolution {
            urls,
            failures: walk.failures,
        })
    }

    /// Resolves one sitemap document and its subtree
    fn resolve_node<'a>(
        &'a self,
        base: &'a Url,
        sitemap_url: Url,
        walk: &'a mut Walk,
    ) -> BoxFuture<'a, Result<Vec<String>, SitemapError>> {
        async move {
            if !walk.visited.insert(sitemap_url.to_string()) {
                tracing::warn!("Sitemap {} already visited, skipping", sitemap_url);
                return Ok(Vec::new());
            }

            let document = match self.load(&sitemap_url).await {
                Ok(document) => document,
                Err(e) => return self.recover(e, sitemap_url.as_str(), walk).map(|_| Vec::new()),
            };

            tracing::debug!(
                "Loaded sitemap {} ({} child sitemaps, {} pages)",
                sitemap_url,
                document.sitemaps.len(),
                document.pages.len()
            );

            let mut urls = Vec::new();

            for loc in &document.sitemaps {
                let child = match base.join(loc) {
                    Ok(child) => child,
                    Err(source) => {
                        let error = SitemapError::InvalidLocation {
                            loc: loc.clone(),
                            source,
                        };
                        self.recover(error, loc, walk)?;
                        continue;
                    }
                };
                urls.extend(self.resolve_node(base, child, walk).await?);
            }

            urls.extend(document.pages);
            Ok(urls)
        }
        .boxed()
    }

    /// Applies the failure policy to a sitemap error
    ///
    /// Strict propagates the error; best-effort records it and lets the walk continue.
    fn recover(&self, error: SitemapError, url: &str, walk: &mut Walk) -> Result<(), SitemapError> {
        match self.policy {
            ResolutionPolicy::Strict => Err(error),
            ResolutionPolicy::BestEffort => {
                tracing::warn!("Skipping sitemap {}: {}", url, error);
                walk.failures.push(SitemapFailure {
                    url: url.to_string(),
                    reason: error.to_string(),
                });
                Ok(())
            }
        }
    }

    /// Fetches and parses a single sitemap document
    async fn load(&self, url: &Url) -> Result<SitemapDocument, SitemapError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| SitemapError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SitemapError::Status {
                url: url.to_string(),
                status_code: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| SitemapError::Fetch {
            url: url.to_string(),
            source,
        })?;

        parse_sitemap(&body).map_err(|message| SitemapError::Parse {
            url: url.to_string(),
            message,
        })
    }
}
