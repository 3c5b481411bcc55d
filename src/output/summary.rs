//! Completion summary for a finished crawl

use crate::crawler::CrawlReport;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// The seed URL
    pub target: String,

    /// Total number of requests issued
    pub total_requests: u64,

    /// Number of unique in-scope URLs discovered
    pub unique_urls: usize,

    /// Fetches that failed at the network level
    pub failed_fetches: u64,

    /// Whether the crawl hit its time limit or was cancelled
    pub cancelled: bool,

    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl CrawlSummary {
    /// Average requests per second over the whole crawl
    pub fn requests_per_second(&self) -> f64 {
        rps(self.total_requests, self.elapsed)
    }
}

impl From<&CrawlReport> for CrawlSummary {
    fn from(report: &CrawlReport) -> Self {
        Self {
            target: report.target.to_string(),
            total_requests: report.total_requests,
            unique_urls: report.unique_urls(),
            failed_fetches: report.failed_fetches,
            cancelled: report.cancelled,
            started_at: report.started_at,
            elapsed: report.elapsed,
        }
    }
}

/// Events per second, or 0 when no time has passed
pub fn rps(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        count as f64 / secs
    } else {
        0.0
    }
}

/// Renders the summary as plain text
pub fn render_summary(summary: &CrawlSummary) -> String {
    let mut out = String::new();
    out.push_str("=== Crawl Summary ===\n\n");
    out.push_str(&format!("  Target: {}\n", summary.target));
    out.push_str(&format!(
        "  Started: {}\n",
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!(
        "  Total endpoints found: {}\n",
        summary.unique_urls
    ));
    out.push_str(&format!("  Total requests: {}\n", summary.total_requests));
    out.push_str(&format!("  Failed requests: {}\n", summary.failed_fetches));
    out.push_str(&format!(
        "  Total scan time: {:.2} seconds ({:.2} req/s)\n",
        summary.elapsed.as_secs_f64(),
        summary.requests_per_second()
    ));
    if summary.cancelled {
        out.push_str("  Stopped early: results are partial\n");
    }
    out
}

/// Prints the summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    print!("{}", render_summary(summary));
}
