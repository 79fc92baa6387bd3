//! Scheduler for sizing and bounding the fetch workers
//!
//! This module handles:
//! - Deciding how many discovered pages a run fetches
//! - Sizing the worker pool from that page count
//! - Bounding concurrency via a semaphore shared by all fetch tasks

use crate::config::PageLimit;
use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

/// Negotiates the page count when a site exceeds the default cap
///
/// The coordinator consults this only for capped runs whose sitemap lists more
/// pages than the default cap. Returning `None` keeps the requested cap.
pub trait PageCountPrompt: Send + Sync {
    /// Chooses how many pages to fetch
    ///
    /// # Arguments
    ///
    /// * `total` - Number of pages the sitemap lists
    /// * `requested` - The cap currently in effect
    fn choose(&self, total: usize, requested: usize) -> Option<usize>;
}

/// Never renegotiates; the requested cap stands
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepRequested;

impl PageCountPrompt for KeepRequested {
    fn choose(&self, _total: usize, _requested: usize) -> Option<usize> {
        None
    }
}

/// Returns true if the page count has to be negotiated for this run
pub fn needs_page_count_decision(total: usize, limit: PageLimit, default_cap: usize) -> bool {
    matches!(limit, PageLimit::Capped(_)) && total > default_cap
}

/// Computes how many pages a run fetches
///
/// | Limit | Condition | Pages |
/// |-------|-----------|-------|
/// | Unlimited | - | `total` |
/// | Capped(cap) | `total > default_cap` | `min(chosen or cap, total)` |
/// | Capped(cap) | otherwise | `min(cap, total)` |
///
/// A chosen count of zero is ignored.
///
/// # Example
///
/// ```
/// use site_harvester::config::PageLimit;
/// use site_harvester::crawler::effective_pages;
///
/// assert_eq!(effective_pages(500, PageLimit::Capped(100), 100, None), 100);
/// assert_eq!(effective_pages(500, PageLimit::Unlimited, 100, None), 500);
/// ```
pub fn effective_pages(
    total: usize,
    limit: PageLimit,
    default_cap: usize,
    chosen: Option<usize>,
) -> usize {
    match limit {
        PageLimit::Unlimited => total,
        PageLimit::Capped(cap) => {
            let cap = if total > default_cap {
                chosen.filter(|n| *n > 0).unwrap_or(cap)
            } else {
                cap
            };
            cap.min(total)
        }
    }
}

/// Sizes the worker pool
///
/// `ceil(pages / pages_per_worker)`, clamped to `1..=max_workers`.
///
/// # Example
///
/// ```
/// use site_harvester::crawler::pool_size;
///
/// assert_eq!(pool_size(25, 10, 10), 3);
/// assert_eq!(pool_size(5000, 10, 10), 10);
/// ```
pub fn pool_size(pages: usize, pages_per_worker: usize, max_workers: usize) -> usize {
    let workers = pages.div_ceil(pages_per_worker.max(1));
    workers.max(1).min(max_workers.max(1))
}

/// A fixed number of worker slots shared by all fetch tasks of a run
///
/// Each task holds one permit for its whole fetch-and-persist unit, so at most
/// `size` units are in flight at once.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    /// Creates a pool with `size` worker slots (at least one)
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Number of worker slots
    pub fn size(&self) -> usize {
        self.size
    }

    /// Slots not currently held by a task
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Waits for a free worker slot
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, AcquireError> {
        self.semaphore.clone().acquire_owned().await
    }
}
