//! Crawler coordinator - main harvest orchestration logic
//!
//! This module contains the run pipeline that ties the other components
//! together:
//! - Validating the run configuration and preparing the site directory
//! - Resolving the sitemap tree
//! - Deciding how many pages to fetch and sizing the worker pool
//! - Dispatching one isolated fetch-and-persist task per page
//! - Joining every task and aggregating the outcomes

use crate::config::{validate_run_config, Config, PageLimit, RunConfig};
use crate::crawler::fetcher::{build_http_client, fetcher_for, ContentFetcher};
use crate::crawler::scheduler::{
    effective_pages, needs_page_count_decision, pool_size, KeepRequested, PageCountPrompt,
    WorkerPool,
};
use crate::output::{BatchResult, FailureKind, PageFailure, PageRecord, PageStore};
use crate::sitemap::{Resolution, SitemapResolver};
use crate::state::RunState;
use crate::url::{root_origin, site_identifier, Origin};
use crate::HarvestError;
use futures::FutureExt;
use indicatif::ProgressBar;
use reqwest::Client;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

/// Outcome of a single fetch-and-persist task
#[derive(Debug)]
enum TaskOutcome {
    Saved,
    Failed(PageFailure),
}

/// Main harvest coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    client: Client,
    prompt: Box<dyn PageCountPrompt>,
    fetcher: Option<Arc<dyn ContentFetcher>>,
    progress: ProgressBar,
    state: RunState,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The harvester configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.crawler)?;
        Ok(Self::with_client(config, client))
    }

    /// Creates a coordinator around an existing HTTP client
    pub fn with_client(config: Config, client: Client) -> Self {
        Self {
            config: Arc::new(config),
            client,
            prompt: Box::new(KeepRequested),
            fetcher: None,
            progress: ProgressBar::hidden(),
            state: RunState::Idle,
        }
    }

    /// Sets the collaborator consulted when a site exceeds the default cap
    pub fn with_prompt(mut self, prompt: impl PageCountPrompt + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    /// Replaces the variant-selected fetcher
    pub fn with_fetcher(mut self, fetcher: Arc<dyn ContentFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Reports per-page completion on the given progress bar
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Current run state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Resolves the site's sitemap tree without fetching any page
    ///
    /// Used for dry runs; the run state is left untouched.
    pub async fn discover(&self, run: &RunConfig) -> Result<(Origin, Resolution), HarvestError> {
        validate_run_config(run)?;
        let origin = root_origin(&run.url)?;
        let resolver = SitemapResolver::new(self.client.clone(), self.config.crawler.resolution_policy);
        let resolution = resolver.resolve(&origin).await?;
        Ok((origin, resolution))
    }

    /// Runs a complete harvest
    ///
    /// This is the core pipeline that:
    /// 1. Validates input and prepares `<storage-root>/<site>/`
    /// 2. Resolves the sitemap tree
    /// 3. Decides the page count (consulting the prompt for large sites)
    /// 4. Sizes the worker pool
    /// 5. Dispatches one task per page in the selected prefix
    /// 6. Waits for every task and aggregates the outcomes
    ///
    /// # Returns
    ///
    /// * `Ok(BatchResult)` - The run completed; individual pages may have failed
    /// * `Err(HarvestError)` - Invalid input, the directory could not be
    ///   created, or sitemap resolution failed
    pub async fn run(&mut self, run: &RunConfig) -> Result<BatchResult, HarvestError> {
        let start_time = Instant::now();
        self.state = RunState::Idle;

        validate_run_config(run)?;
        let origin = root_origin(&run.url)?;
        let site = site_identifier(&run.url)?;
        let store = PageStore::create(&self.config.output.storage_root, &site).await?;

        tracing::info!("Fetching pages from '{}'...", site);

        // Resolve the sitemap tree
        self.transition(RunState::Resolving)?;
        let resolver = SitemapResolver::new(self.client.clone(), self.config.crawler.resolution_policy);
        let resolution = match resolver.resolve(&origin).await {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::error!("Sitemap resolution failed: {}", e);
                self.transition(RunState::Aborted)?;
                return Err(e.into());
            }
        };
        let total = resolution.total();
        tracing::info!("Found {} pages.", total);

        // Decide how many pages to fetch
        let default_cap = self.config.crawler.default_page_cap;
        let chosen = if needs_page_count_decision(total, run.page_limit, default_cap) {
            self.transition(RunState::AwaitingPageCountDecision)?;
            let requested = match run.page_limit {
                PageLimit::Capped(cap) => cap,
                PageLimit::Unlimited => total,
            };
            self.prompt.choose(total, requested)
        } else {
            None
        };
        let pages = effective_pages(total, run.page_limit, default_cap, chosen);

        self.transition(RunState::Dispatching)?;
        let workers = pool_size(
            pages,
            self.config.crawler.pages_per_worker,
            self.config.crawler.max_workers,
        );
        tracing::info!("Fetching {} pages from {} using {} workers", pages, origin, workers);
        if total > pages {
            tracing::info!("Leaving {} pages.", total - pages);
        }

        let fetcher = match &self.fetcher {
            Some(fetcher) => Arc::clone(fetcher),
            None => fetcher_for(run.variant, self.client.clone()),
        };

        let failures = self
            .dispatch(&resolution.urls[..pages], fetcher, store.clone(), workers, run.debug)
            .await?;

        self.transition(RunState::Done)?;

        let result = BatchResult {
            total,
            requested: pages,
            fetched: pages - failures.len(),
            failed: failures.len(),
            workers,
            directory: store.directory().to_path_buf(),
            elapsed: start_time.elapsed(),
            failures,
            sitemap_failures: resolution.failures,
        };

        tracing::info!(
            "Harvest completed: {} fetched, {} failed, {} skipped in {:.2}s",
            result.fetched,
            result.failed,
            result.skipped(),
            result.elapsed_seconds()
        );

        Ok(result)
    }

    /// Fans the pages out over the worker pool and joins every task
    ///
    /// Returns the failures; every other dispatched page was stored.
    async fn dispatch(
        &mut self,
        urls: &[String],
        fetcher: Arc<dyn ContentFetcher>,
        store: PageStore,
        workers: usize,
        debug: bool,
    ) -> Result<Vec<PageFailure>, HarvestError> {
        let pool = WorkerPool::new(workers);
        let store = Arc::new(store);
        let count = urls.len();
        let mut tasks = JoinSet::new();

        for (index, url) in urls.iter().enumerate() {
            let url = url.clone();
            let pool = pool.clone();
            let fetcher = Arc::clone(&fetcher);
            let store = Arc::clone(&store);

            tasks.spawn(async move {
                let permit = match pool.acquire().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return TaskOutcome::Failed(PageFailure::new(
                            url,
                            FailureKind::Task,
                            e.to_string(),
                        ))
                    }
                };

                let unit = process_page(fetcher.as_ref(), &store, &url, index, count, debug);
                let outcome = AssertUnwindSafe(unit).catch_unwind().await.unwrap_or_else(|_| {
                    TaskOutcome::Failed(PageFailure::new(
                        url.clone(),
                        FailureKind::Task,
                        "task panicked",
                    ))
                });

                drop(permit);
                outcome
            });
        }

        self.transition(RunState::AwaitingCompletion)?;
        self.progress.set_length(count as u64);

        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            self.progress.inc(1);
            match joined {
                Ok(TaskOutcome::Saved) => {}
                Ok(TaskOutcome::Failed(failure)) => {
                    if debug {
                        tracing::warn!("Skipping {}", failure);
                    } else {
                        tracing::debug!("Skipping {}", failure);
                    }
                    failures.push(failure);
                }
                Err(e) => {
                    tracing::error!("Fetch task did not complete: {}", e);
                    failures.push(PageFailure::new(
                        "<unknown>",
                        FailureKind::Task,
                        e.to_string(),
                    ));
                }
            }
        }

        self.progress.finish_and_clear();
        Ok(failures)
    }

    fn transition(&mut self, next: RunState) -> Result<(), HarvestError> {
        if !self.state.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!("Run state: {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }
}

/// Fetches one page and writes it to the store
async fn process_page(
    fetcher: &dyn ContentFetcher,
    store: &PageStore,
    url: &str,
    index: usize,
    count: usize,
    debug: bool,
) -> TaskOutcome {
    if debug {
        tracing::info!("Fetching page {} / {}: {}", index + 1, count, url);
    }
    let started = Instant::now();

    let content = match fetcher.fetch(url).await.into_content() {
        Ok(content) => content,
        Err(reason) => return TaskOutcome::Failed(PageFailure::new(url, FailureKind::Fetch, reason)),
    };

    let record = PageRecord::new(url, fetcher.variant(), content);
    if let Err(e) = store.write(&record).await {
        return TaskOutcome::Failed(PageFailure::new(url, FailureKind::Persist, e.to_string()));
    }

    if debug {
        tracing::info!(
            "Fetched and saved {} in {:.2} seconds.",
            url,
            started.elapsed().as_secs_f64()
        );
    }
    TaskOutcome::Saved
}
