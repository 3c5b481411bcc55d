//! Concurrency throttle for the network phase of fetches
//!
//! A thin wrapper around a [`Semaphore`] that also tracks how many permits
//! are held right now and the highest number ever held at once.

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{AcquireError, Semaphore, SemaphorePermit};

/// Fixed-size permit pool bounding simultaneous fetches
#[derive(Debug)]
pub struct Throttle {
    permits: Semaphore,
    limit: usize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl Throttle {
    /// Creates a throttle allowing `limit` simultaneous holders
    ///
    /// A limit of zero is raised to one so that a crawl can always progress.
    pub fn new(limit: usize) -> Self {
        let limit = limit.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            permits: Semaphore::new(limit),
            limit,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Waits for a free slot
    ///
    /// The slot is returned to the pool when the permit is dropped.
    pub async fn acquire(&self) -> Result<ThrottlePermit<'_>, AcquireError> {
        let permit = self.permits.acquire().await?;
        let now = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak.fetch_max(now, Ordering::AcqRel);
        Ok(ThrottlePermit {
            _permit: permit,
            throttle: self,
        })
    }

    /// Configured number of slots
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Slots currently held
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Highest number of slots ever held at the same time
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Acquire)
    }
}

/// A held throttle slot
#[derive(Debug)]
pub struct ThrottlePermit<'a> {
    _permit: SemaphorePermit<'a>,
    throttle: &'a Throttle,
}

impl Drop for ThrottlePermit<'_> {
    fn drop(&mut self) {
        self.throttle.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}
