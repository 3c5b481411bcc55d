//! Configuration module for BlackScout
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every value has a default, so a file is optional; the command line
//! can fill in or override anything before validation.
//!
//! # Example
//!
//! ```no_run
//! use blackscout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("blackscout.toml")).unwrap();
//! println!("Crawling {} with {} threads", config.crawler.target, config.crawler.threads);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, IdentityConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, parse_config, read_config};
pub use validation::validate;
