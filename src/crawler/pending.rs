//! Pending work counter used to detect crawl quiescence
//!
//! Fetch tasks are created while the crawl runs, so the total is never known
//! up front. Every task holds a [`WorkGuard`] taken *before* it is spawned and
//! released when it finishes. A parent schedules its children (taking their
//! guards) before its own guard drops, so the count cannot touch zero while
//! more work is about to appear.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Counted barrier over dynamically spawned tasks
#[derive(Debug, Default)]
pub struct PendingWork {
    outstanding: AtomicUsize,
    idle: Notify,
}

impl PendingWork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers one unit of outstanding work
    pub fn register(self: &Arc<Self>) -> WorkGuard {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        WorkGuard {
            pending: Arc::clone(self),
        }
    }

    /// Number of registered units not yet released
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Waits until every registered unit has been released
    ///
    /// Returns immediately if nothing is outstanding.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            // Register interest before checking so a release between the
            // check and the await is not missed.
            notified.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }

            notified.await;
        }
    }

    fn release(&self) {
        if self.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Releases its unit of work on drop, including during a panic unwind
#[derive(Debug)]
pub struct WorkGuard {
    pending: Arc<PendingWork>,
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        self.pending.release();
    }
}
