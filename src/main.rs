//! Ripple-Crawl main entry point
//!
//! This is the command-line interface for the Ripple-Crawl crawler.

use anyhow::Context;
use clap::Parser;
use ripple_crawl::config::{load_config_with_hash, validate, Config, CrawlSettings};
use ripple_crawl::crawler::Coordinator;
use ripple_crawl::output::{
    generate_markdown_summary, print_statistics, render_report, CrawlStatistics,
};
use ripple_crawl::ScopeMode;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Ripple-Crawl: a bounded single-domain web crawler
///
/// Crawls every page reachable from SEED on the seed's host, fetching at
/// most MAX_PAGES distinct pages with at most MAX_CONCURRENCY requests in
/// flight, then reports how often each page was linked.
#[derive(Parser, Debug)]
#[command(name = "ripple-crawl")]
#[command(version)]
#[command(about = "A bounded single-domain web crawler", long_about = None)]
struct Cli {
    /// Address to start crawling from; also defines the crawl scope
    #[arg(value_name = "SEED")]
    seed: String,

    /// Maximum number of fetches in flight at once
    #[arg(value_name = "MAX_CONCURRENCY", value_parser = clap::value_parser!(u32).range(1..))]
    max_concurrency: u32,

    /// Maximum number of distinct pages to fetch
    #[arg(value_name = "MAX_PAGES")]
    max_pages: usize,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write a markdown summary to this file
    #[arg(short, long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Restrict the crawl to the seed's path instead of its whole host
    #[arg(long)]
    path_scope: bool,

    /// Per-request deadline in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

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

    let (config, config_hash) = load_configuration(&cli)?;

    let mut settings = CrawlSettings::new(
        cli.seed.clone(),
        cli.max_concurrency as usize,
        cli.max_pages,
    )
    .with_crawler_config(&config.crawler);
    if cli.path_scope {
        settings.scope = ScopeMode::PathPrefix;
    }

    let coordinator = Coordinator::with_http(settings, &config.fetcher)
        .with_context(|| format!("Cannot start crawl of {}", cli.seed))?;

    // Ctrl-C stops the crawl; whatever was collected so far is still reported
    let token = coordinator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling crawl");
            token.cancel();
        }
    });

    let outcome = coordinator.run().await;

    print!("{}", render_report(&outcome.ledger));
    if !cli.quiet {
        println!();
        print_statistics(&CrawlStatistics::from_outcome(&outcome));
    }

    if let Some(path) = &config.output.summary_path {
        generate_markdown_summary(&outcome, config_hash.as_deref(), Path::new(path))
            .with_context(|| format!("Failed to write summary to {}", path))?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_crawl=info,warn"),
            1 => EnvFilter::new("ripple_crawl=debug,info"),
            2 => EnvFilter::new("ripple_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration file if one was given and applies CLI overrides
fn load_configuration(cli: &Cli) -> anyhow::Result<(Config, Option<String>)> {
    let (mut config, hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Invalid configuration file {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    if let Some(timeout_ms) = cli.timeout_ms {
        config.fetcher.timeout_ms = timeout_ms;
    }
    if let Some(path) = &cli.summary {
        config.output.summary_path = Some(path.to_string_lossy().into_owned());
    }

    validate(&config).context("Invalid command-line overrides")?;
    Ok((config, hash))
}
