//! Crawl-scoped shared state
//!
//! Everything a fetch task touches lives in one [`CrawlContext`] that is
//! created per crawl and handed to each task behind an `Arc`. Nothing is
//! process-global, so several crawls can run side by side.

use crate::crawler::fetcher::fetch_and_scan;
use crate::crawler::pending::PendingWork;
use crate::crawler::registry::VisitedRegistry;
use crate::crawler::strategy::{DelayStrategy, IdentityRotation};
use crate::crawler::throttle::Throttle;
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Monotonic count of HTTP requests issued
///
/// Written by every fetch task and read by progress reporters; reads never
/// block writers.
#[derive(Debug, Default)]
pub struct RequestTally {
    count: AtomicU64,
}

impl RequestTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one request, returning the new total
    pub fn increment(&self) -> u64 {
        self.count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Current total
    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

/// State shared by the scheduler and all of its fetch tasks
pub(crate) struct CrawlContext {
    /// Seed URL; its host is the crawl scope
    pub(crate) base: Url,
    pub(crate) client: Client,
    pub(crate) registry: VisitedRegistry,
    pub(crate) throttle: Throttle,
    pub(crate) pending: Arc<PendingWork>,
    pub(crate) tally: Arc<RequestTally>,
    pub(crate) failures: AtomicU64,
    pub(crate) delay: Arc<dyn DelayStrategy>,
    pub(crate) identity: Arc<dyn IdentityRotation>,
    pub(crate) cancel: CancellationToken,
}

impl CrawlContext {
    /// Spawns a fetch task for a URL the caller has already claimed
    ///
    /// The task is counted as pending before it is spawned, so a parent that
    /// schedules children ahead of its own exit keeps the crawl alive.
    pub(crate) fn schedule(self: &Arc<Self>, url: Url) {
        let guard = self.pending.register();
        let ctx = Arc::clone(self);
        tokio::spawn(async move {
            let _guard = guard;
            fetch_and_scan(ctx, url).await;
        });
    }

    pub(crate) fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_counts() {
        let tally = RequestTally::new();
        assert_eq!(tally.get(), 0);
        assert_eq!(tally.increment(), 1);
        assert_eq!(tally.increment(), 2);
        assert_eq!(tally.get(), 2);
    }

    #[test]
    fn test_tally_concurrent_increments() {
        let tally = Arc::new(RequestTally::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tally = Arc::clone(&tally);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        tally.increment();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(tally.get(), 8000);
    }
}
