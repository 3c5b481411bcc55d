//! URL handling module for BlackScout
//!
//! This module provides seed URL parsing, link normalization against a base
//! URL, and the same-host scope check that bounds every crawl.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{same_origin_host, scope_key};
pub use normalize::{normalize, parse_target};
