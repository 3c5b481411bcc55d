//! BlackScout main entry point
//!
//! This is the command-line interface for the BlackScout same-host crawler.

use anyhow::Context;
use blackscout::config::{compute_config_hash, read_config, validate, Config};
use blackscout::crawler::Crawler;
use blackscout::output::{
    export_results, print_summary, print_table, CrawlSummary, ProgressReporter,
    DEFAULT_EXPORT_PATH,
};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// BlackScout: a same-host web crawler
///
/// BlackScout starts from a target URL and follows every href, src and
/// action reference that stays on the same host, then lists everything it
/// found.
#[derive(Parser, Debug)]
#[command(name = "blackscout")]
#[command(version)]
#[command(about = "A same-host web crawler", long_about = None)]
struct Cli {
    /// Target URL (e.g. https://site.com)
    #[arg(short = 'u', long, value_name = "URL")]
    target: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of concurrent requests
    #[arg(short, long)]
    threads: Option<usize>,

    /// Upper bound of the random delay before each request, in milliseconds
    #[arg(short, long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Stop the crawl after this many seconds
    #[arg(long, value_name = "SECS")]
    max_duration_secs: Option<u64>,

    /// Write discovered URLs to this file, one per line
    #[arg(
        short,
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_EXPORT_PATH
    )]
    export: Option<PathBuf>,

    /// Do not print the table of discovered URLs
    #[arg(long)]
    no_table: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {:#}", e);
            return Err(e);
        }
    };

    run(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("blackscout=info,warn"),
            1 => EnvFilter::new("blackscout=debug,info"),
            2 => EnvFilter::new("blackscout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the optional config file, applies command-line overrides, validates
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let config = read_config(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let hash = compute_config_hash(path)?;
            tracing::info!("Configuration loaded (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(target) = &cli.target {
        config.crawler.target = target.clone();
    }
    if let Some(threads) = cli.threads {
        config.crawler.threads = threads;
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.crawler.delay_ms = delay_ms;
    }
    if let Some(timeout) = cli.timeout_secs {
        config.crawler.request_timeout_secs = timeout;
    }
    if let Some(limit) = cli.max_duration_secs {
        config.crawler.max_duration_secs = Some(limit);
    }
    if let Some(path) = &cli.export {
        config.output.export_path = Some(path.display().to_string());
    }
    if cli.no_table {
        config.output.show_table = false;
    }

    validate(&config)?;
    Ok(config)
}

/// Handles the main crawl operation
async fn run(config: Config) -> anyhow::Result<()> {
    let crawler = Crawler::from_config(&config).context("starting crawler")?;

    tracing::info!(
        "Target: {}, threads: {}, delay: up to {}ms",
        crawler.target(),
        config.crawler.threads,
        config.crawler.delay_ms
    );

    let reporter = ProgressReporter::spawn(
        crawler.request_tally(),
        Duration::from_secs(config.output.progress_interval_secs),
        Instant::now(),
    );

    // Ctrl-C stops the crawl but still reports what was found
    let cancel = crawler.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing in-flight work");
            cancel.cancel();
        }
    });

    let report = crawler.run().await;
    reporter.stop().await;

    if config.output.show_table {
        print_table(&report.results);
    }
    print_summary(&CrawlSummary::from(&report));

    if let Some(path) = &config.output.export_path {
        export_results(&report.results, Path::new(path))
            .with_context(|| format!("exporting results to {}", path))?;
    }

    Ok(())
}
