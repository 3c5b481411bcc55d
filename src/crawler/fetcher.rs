//! HTTP fetcher and per-URL fetch worker
//!
//! This module handles:
//! - Building the shared HTTP client
//! - Issuing a single GET per URL and classifying the outcome
//! - Streaming successful bodies through the link extractor
//! - Handing newly claimed links back to the scheduler

use crate::crawler::context::CrawlContext;
use crate::crawler::extractor::{LinkCandidate, LinkExtractor};
use crate::url::normalize;
use futures::TryStreamExt;
use reqwest::header::USER_AGENT;
use reqwest::{redirect::Policy, Client, Response};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::io::{StreamReader, SyncIoBridge};
use url::Url;

/// Per-request timeout used when none is configured
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Candidates buffered between the extractor thread and the worker
const CANDIDATE_BUFFER: usize = 64;

/// Outcome of a single GET
#[derive(Debug)]
pub enum FetchOutcome {
    /// 2xx response; the body has not been read yet
    Page {
        /// HTTP status code
        status_code: u16,
        /// The response, ready to be streamed
        response: Response,
    },

    /// Any status of 300 or above; redirects are not followed
    HttpStatus {
        /// HTTP status code
        status_code: u16,
    },

    /// The request never produced a status (connect, DNS, timeout, ...)
    NetworkError {
        /// Error description
        error: String,
        /// Whether the request timeout elapsed
        timed_out: bool,
    },
}

/// Builds the HTTP client shared by every fetch of a crawl
///
/// Redirects are disabled: a 3xx response ends the fetch like any other
/// non-success status. The `User-Agent` is set per request, not here.
///
/// # Example
///
/// ```no_run
/// use blackscout::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(request_timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(request_timeout)
        .connect_timeout(request_timeout)
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues one GET request and classifies the result
///
/// 1xx/2xx statuses come back as [`FetchOutcome::Page`]; everything from 300
/// upwards is [`FetchOutcome::HttpStatus`] and the body is left unread.
pub async fn fetch_url(client: &Client, url: &Url, user_agent: &str) -> FetchOutcome {
    match client
        .get(url.clone())
        .header(USER_AGENT, user_agent)
        .send()
        .await
    {
        Ok(response) => {
            let status = response.status();
            if status.as_u16() >= 300 {
                return FetchOutcome::HttpStatus {
                    status_code: status.as_u16(),
                };
            }

            FetchOutcome::Page {
                status_code: status.as_u16(),
                response,
            }
        }
        Err(e) => {
            // Classify error
            if e.is_timeout() {
                FetchOutcome::NetworkError {
                    error: "Request timeout".to_string(),
                    timed_out: true,
                }
            } else if e.is_connect() {
                FetchOutcome::NetworkError {
                    error: format!("Connection failed: {}", e),
                    timed_out: false,
                }
            } else {
                FetchOutcome::NetworkError {
                    error: e.to_string(),
                    timed_out: false,
                }
            }
        }
    }
}

/// Runs the whole life of one fetch task
///
/// Takes a throttle slot, waits the jitter delay, fetches, and scans the body
/// for links. Every failure ends only this task. The slot is released on
/// every return path when the permit drops.
pub(crate) async fn fetch_and_scan(ctx: Arc<CrawlContext>, url: Url) {
    if ctx.cancel.is_cancelled() {
        return;
    }

    let _permit = tokio::select! {
        permit = ctx.throttle.acquire() => match permit {
            Ok(permit) => permit,
            Err(_) => return,
        },
        _ = ctx.cancel.cancelled() => return,
    };

    let delay = ctx.delay.next_delay();
    if !delay.is_zero() {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = ctx.cancel.cancelled() => return,
        }
    }

    let user_agent = ctx.identity.next_identity();
    ctx.tally.increment();
    tracing::debug!("Fetching {}", url);

    let outcome = tokio::select! {
        outcome = fetch_url(&ctx.client, &url, &user_agent) => outcome,
        _ = ctx.cancel.cancelled() => return,
    };

    match outcome {
        FetchOutcome::Page { response, .. } => {
            scan_body(&ctx, &url, response).await;
        }
        FetchOutcome::HttpStatus { status_code } => {
            tracing::debug!("Not scanning {} (HTTP {})", url, status_code);
        }
        FetchOutcome::NetworkError { error, timed_out } => {
            ctx.record_failure();
            if timed_out {
                tracing::warn!("Timed out fetching {}", url);
            } else {
                tracing::warn!("Failed to fetch {}: {}", url, error);
            }
        }
    }
}

/// Streams a response body through the extractor and schedules new links
///
/// The extractor is synchronous and runs on a blocking thread, pulling the
/// body through a bridge as it needs it; candidates come back over a bounded
/// channel. Normalization and registry claims stay on this task.
///
/// Links are resolved against the crawl target, not against `page`.
async fn scan_body(ctx: &Arc<CrawlContext>, page: &Url, response: Response) {
    let body = response
        .bytes_stream()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e));
    let reader = SyncIoBridge::new(StreamReader::new(Box::pin(body)));

    let (tx, mut rx) = mpsc::channel::<LinkCandidate>(CANDIDATE_BUFFER);
    let extraction = tokio::task::spawn_blocking(move || {
        for candidate in LinkExtractor::new(reader) {
            if tx.blocking_send(candidate).is_err() {
                break;
            }
        }
    });

    let mut seen = 0usize;
    let mut scheduled = 0usize;
    loop {
        let candidate = tokio::select! {
            candidate = rx.recv() => candidate,
            _ = ctx.cancel.cancelled() => None,
        };
        let Some(candidate) = candidate else {
            break;
        };
        seen += 1;

        tracing::trace!("{} on {}: {}", candidate.kind.as_str(), page, candidate.value);
        let Some(link) = normalize(&candidate.value, &ctx.base) else {
            continue;
        };

        if ctx.registry.try_visit(&link) {
            scheduled += 1;
            ctx.schedule(link);
        }
    }

    // Unblocks the extractor if we stopped early
    drop(rx);

    // A blocked body read only ends at the request timeout; after
    // cancellation the extractor thread is left to finish on its own
    tokio::select! {
        joined = extraction => {
            if let Err(e) = joined {
                tracing::warn!("Link extraction for {} aborted: {}", page, e);
            }
        }
        _ = ctx.cancel.cancelled() => {
            tracing::debug!("Detached link extraction for {} after cancellation", page);
        }
    }

    tracing::debug!(
        "Scanned {}: {} candidates, {} new URLs",
        page,
        seen,
        scheduled
    );
}
