//! Crawl coordinator - seeds the crawl and waits for it to finish
//!
//! The coordinator owns the crawl context. It claims the seed, spawns the
//! first fetch task, and then simply waits: every further task is spawned by
//! the task that discovered its URL, and the crawl is done once the pending
//! work counter drops to zero.

use crate::config::Config;
use crate::crawler::context::{CrawlContext, RequestTally};
use crate::crawler::fetcher::{build_http_client, DEFAULT_REQUEST_TIMEOUT};
use crate::crawler::pending::PendingWork;
use crate::crawler::registry::VisitedRegistry;
use crate::crawler::strategy::{DelayStrategy, IdentityRotation, RandomJitter, RandomUserAgent};
use crate::crawler::throttle::Throttle;
use crate::url::parse_target;
use crate::BlackScoutError;
use chrono::{DateTime, Utc};
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Tunables for a single crawl
#[derive(Clone)]
pub struct CrawlSettings {
    /// Maximum number of fetches in their network phase at once
    pub threads: usize,

    /// Timeout applied to each request, body included
    pub request_timeout: Duration,

    /// Optional wall-clock limit for the whole crawl
    pub max_duration: Option<Duration>,

    /// Pause taken before each request
    pub delay: Arc<dyn DelayStrategy>,

    /// `User-Agent` chosen for each request
    pub identity: Arc<dyn IdentityRotation>,
}

impl CrawlSettings {
    /// Settings with random jitter up to `delay_ms` and the default identity pool
    pub fn new(threads: usize, delay_ms: u64) -> Self {
        Self {
            threads,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_duration: None,
            delay: Arc::new(RandomJitter::new(delay_ms)),
            identity: Arc::new(RandomUserAgent::default()),
        }
    }

    /// Builds settings from a validated configuration
    pub fn from_config(config: &Config) -> Self {
        let crawler = &config.crawler;
        Self {
            threads: crawler.threads,
            request_timeout: Duration::from_secs(crawler.request_timeout_secs),
            max_duration: crawler.max_duration_secs.map(Duration::from_secs),
            delay: Arc::new(
                RandomJitter::new(crawler.delay_ms).with_floor(crawler.legacy_jitter_floor),
            ),
            identity: Arc::new(RandomUserAgent::new(config.identity.user_agents.clone())),
        }
    }

    pub fn with_delay(mut self, delay: impl DelayStrategy + 'static) -> Self {
        self.delay = Arc::new(delay);
        self
    }

    pub fn with_identity(mut self, identity: impl IdentityRotation + 'static) -> Self {
        self.identity = Arc::new(identity);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_duration(mut self, limit: Duration) -> Self {
        self.max_duration = Some(limit);
        self
    }
}

/// The frozen outcome of a completed crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// The seed URL
    pub target: Url,

    /// Every in-scope URL discovered, seed first, in discovery order
    pub results: Vec<String>,

    /// Requests issued, successful or not
    pub total_requests: u64,

    /// Fetches that failed at the network level
    pub failed_fetches: u64,

    /// Highest number of fetches that held a throttle slot at once
    pub peak_in_flight: usize,

    /// Whether the crawl was stopped before running out of work
    pub cancelled: bool,

    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Number of unique URLs discovered
    pub fn unique_urls(&self) -> usize {
        self.results.len()
    }
}

/// A same-host crawler over a single seed URL
///
/// A crawler runs once; [`Crawler::run`] consumes it.
///
/// # Example
///
/// ```no_run
/// use blackscout::crawler::{CrawlSettings, Crawler};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let crawler = Crawler::new("https://example.com/", CrawlSettings::new(10, 300))?;
/// let report = crawler.run().await;
/// println!("{} URLs in {:?}", report.unique_urls(), report.elapsed);
/// # Ok(())
/// # }
/// ```
pub struct Crawler {
    ctx: Arc<CrawlContext>,
    max_duration: Option<Duration>,
}

impl Crawler {
    /// Creates a crawler for `target`
    ///
    /// Fails if the target is not an absolute HTTP(S) URL with a host, or if
    /// the HTTP client cannot be built. Nothing is fetched until `run`.
    pub fn new(target: &str, settings: CrawlSettings) -> Result<Self, BlackScoutError> {
        let base = parse_target(target)?;
        let client = build_http_client(settings.request_timeout)?;

        let ctx = CrawlContext {
            base,
            client,
            registry: VisitedRegistry::new(),
            throttle: Throttle::new(settings.threads),
            pending: PendingWork::new(),
            tally: Arc::new(RequestTally::new()),
            failures: AtomicU64::new(0),
            delay: settings.delay,
            identity: settings.identity,
            cancel: CancellationToken::new(),
        };

        Ok(Self {
            ctx: Arc::new(ctx),
            max_duration: settings.max_duration,
        })
    }

    /// Creates a crawler from a validated configuration
    pub fn from_config(config: &Config) -> Result<Self, BlackScoutError> {
        Self::new(&config.crawler.target, CrawlSettings::from_config(config))
    }

    /// The parsed seed URL
    pub fn target(&self) -> &Url {
        &self.ctx.base
    }

    /// Handle to the request counter, for progress reporting
    pub fn request_tally(&self) -> Arc<RequestTally> {
        Arc::clone(&self.ctx.tally)
    }

    /// Token that stops the crawl early when cancelled
    ///
    /// Tasks still waiting for a slot, sleeping, or mid-request give up;
    /// `run` then returns with whatever was discovered so far.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.ctx.cancel.clone()
    }

    /// Crawls until no work is left and returns the report
    pub async fn run(self) -> CrawlReport {
        let Crawler { ctx, max_duration } = self;

        let started_at = Utc::now();
        let start = Instant::now();
        tracing::info!(
            "Starting crawl of {} ({} concurrent fetches)",
            ctx.base,
            ctx.throttle.limit()
        );

        let seed = ctx.base.clone();
        if ctx.registry.try_visit(&seed) {
            ctx.schedule(seed);
        }

        let deadline = max_duration.map(|limit| {
            let cancel = ctx.cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(limit) => {
                        tracing::warn!("Crawl time limit of {:?} reached, stopping", limit);
                        cancel.cancel();
                    }
                    _ = cancel.cancelled() => {}
                }
            })
        });

        ctx.pending.wait_idle().await;

        if let Some(handle) = deadline {
            handle.abort();
        }

        let report = CrawlReport {
            target: ctx.base.clone(),
            results: ctx.registry.snapshot(),
            total_requests: ctx.tally.get(),
            failed_fetches: ctx.failures(),
            peak_in_flight: ctx.throttle.peak(),
            cancelled: ctx.cancel.is_cancelled(),
            started_at,
            elapsed: start.elapsed(),
        };

        tracing::info!(
            "Crawl completed: {} URLs, {} requests ({} failed) in {:?}",
            report.unique_urls(),
            report.total_requests,
            report.failed_fetches,
            report.elapsed
        );

        report
    }
}
