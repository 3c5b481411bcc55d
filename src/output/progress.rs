//! Live progress reporting while a crawl runs
//!
//! The reporter only reads the request tally; it never takes a lock the
//! crawl needs.

use crate::crawler::RequestTally;
use crate::output::summary::rps;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A point-in-time progress reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub total_requests: u64,
    pub requests_per_second: f64,
}

impl ProgressSnapshot {
    /// Reads the tally and derives the average rate since `start`
    pub fn capture(tally: &RequestTally, start: Instant) -> Self {
        let total_requests = tally.get();
        Self {
            total_requests,
            requests_per_second: rps(total_requests, start.elapsed()),
        }
    }
}

/// Background task logging request progress at a fixed interval
pub struct ProgressReporter {
    stop: CancellationToken,
    handle: JoinHandle<()>,
}

impl ProgressReporter {
    /// Starts reporting every `interval`, with rates measured from `start`
    pub fn spawn(tally: Arc<RequestTally>, interval: Duration, start: Instant) -> Self {
        let stop = CancellationToken::new();
        let token = stop.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let snapshot = ProgressSnapshot::capture(&tally, start);
                        tracing::info!(
                            "Total requests: {} | RPS: {:.2}",
                            snapshot.total_requests,
                            snapshot.requests_per_second
                        );
                    }
                    _ = token.cancelled() => break,
                }
            }
        });

        Self { stop, handle }
    }

    /// Stops reporting and waits for the task to exit
    pub async fn stop(self) {
        self.stop.cancel();
        if let Err(e) = self.handle.await {
            tracing::debug!("Progress reporter ended abnormally: {}", e);
        }
    }
}
