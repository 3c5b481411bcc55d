//! Crawler module: the concurrent crawl engine
//!
//! This module contains the core crawling logic, including:
//! - The visited registry that admits each URL exactly once
//! - The throttle bounding simultaneous fetches
//! - The pending work counter that detects when the crawl is done
//! - HTTP fetching and streaming link extraction
//! - Overall crawl coordination

mod context;
mod coordinator;
mod extractor;
mod fetcher;
mod pending;
mod registry;
mod strategy;
mod throttle;

pub use context::RequestTally;
pub use coordinator::{CrawlReport, CrawlSettings, Crawler};
pub use extractor::{AttributeKind, LinkCandidate, LinkExtractor};
pub use fetcher::{build_http_client, fetch_url, FetchOutcome, DEFAULT_REQUEST_TIMEOUT};
pub use pending::{PendingWork, WorkGuard};
pub use registry::VisitedRegistry;
pub use strategy::{
    DelayStrategy, FixedDelay, FixedIdentity, IdentityRotation, RandomJitter, RandomUserAgent,
    DEFAULT_USER_AGENTS,
};
pub use throttle::{Throttle, ThrottlePermit};

use crate::config::Config;
use crate::BlackScoutError;

/// Runs a complete crawl described by a configuration
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Parse the target and build the HTTP client
/// 2. Claim the seed and spawn the first fetch
/// 3. Wait until every discovered URL has been fetched
///
/// # Arguments
///
/// * `config` - A validated configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The crawl ran to completion (or to its time limit)
/// * `Err(BlackScoutError)` - The crawl could not start
pub async fn crawl(config: &Config) -> Result<CrawlReport, BlackScoutError> {
    let crawler = Crawler::from_config(config)?;
    Ok(crawler.run().await)
}
