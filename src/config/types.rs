use crate::crawler::DEFAULT_USER_AGENTS;
use serde::Deserialize;

/// Main configuration structure for BlackScout
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Seed URL; its host bounds the crawl
    #[serde(default)]
    pub target: String,

    /// Maximum number of concurrent fetches
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Ceiling of the random pause before each request (milliseconds)
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Timeout for each request, body included (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Keep a 1ms minimum pause even when `delay-ms` is 0
    #[serde(rename = "legacy-jitter-floor", default)]
    pub legacy_jitter_floor: bool,

    /// Stop the whole crawl after this many seconds
    #[serde(rename = "max-duration-secs", default)]
    pub max_duration_secs: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            threads: default_threads(),
            delay_ms: default_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            legacy_jitter_floor: false,
            max_duration_secs: None,
        }
    }
}

/// Request identity configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Pool of `User-Agent` strings, one picked at random per request
    #[serde(rename = "user-agents", default = "default_user_agents")]
    pub user_agents: Vec<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            user_agents: default_user_agents(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Write discovered URLs to this file, one per line
    #[serde(rename = "export-path", default)]
    pub export_path: Option<String>,

    /// Print the table of discovered URLs after the crawl
    #[serde(rename = "show-table", default = "default_true")]
    pub show_table: bool,

    /// Seconds between progress lines
    #[serde(rename = "progress-interval-secs", default = "default_progress_interval_secs")]
    pub progress_interval_secs: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            export_path: None,
            show_table: true,
            progress_interval_secs: default_progress_interval_secs(),
        }
    }
}

fn default_threads() -> usize {
    10
}

fn default_delay_ms() -> u64 {
    300
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_progress_interval_secs() -> u64 {
    1
}

fn default_user_agents() -> Vec<String> {
    DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect()
}

fn default_true() -> bool {
    true
}
