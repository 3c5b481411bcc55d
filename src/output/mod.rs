//! Output module for presenting crawl results
//!
//! This module handles:
//! - The completion summary (requests, unique URLs, elapsed time)
//! - The numbered table of discovered URLs
//! - Exporting results to a text file
//! - Live progress reporting during a crawl

mod export;
mod progress;
pub mod summary;
mod table;

pub use export::{export_results, DEFAULT_EXPORT_PATH};
pub use progress::{ProgressReporter, ProgressSnapshot};
pub use summary::{print_summary, render_summary, CrawlSummary};
pub use table::{print_table, render_table, truncate_url};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create {path}: {source}")]
    Create {
        path: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type ExportResult<T> = Result<T, ExportError>;
