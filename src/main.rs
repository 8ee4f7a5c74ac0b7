//! Venue-Crawler main entry point
//!
//! This is the command-line interface for the Venue-Crawler listing scraper.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use venue_crawler::config::{load_config_with_hash, validate, Config};
use venue_crawler::{ResearchAgent, ResearchOutcome};

/// Venue-Crawler: a polite paginated listing scraper
///
/// Venue-Crawler walks the numbered pages of a listing site, extracts one
/// record per listing entry with an LLM, drops duplicates and writes the
/// result as CSV.
#[derive(Parser, Debug)]
#[command(name = "venue-crawler")]
#[command(version)]
#[command(about = "A polite paginated listing scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the maximum number of pages to crawl
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Override the pause between page requests, in seconds
    #[arg(long, value_name = "SECONDS")]
    pause_seconds: Option<u64>,

    /// Override the CSV output path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    apply_overrides(&mut config, &cli);
    if let Err(e) = validate(&config) {
        tracing::error!("Invalid command-line override: {}", e);
        return Err(e.into());
    }

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_crawl(&config).await?;
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
            0 => EnvFilter::new("venue_crawler=info,warn"),
            1 => EnvFilter::new("venue_crawler=debug,info"),
            2 => EnvFilter::new("venue_crawler=trace,debug"),
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

/// Applies command-line overrides on top of the file configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(pause_seconds) = cli.pause_seconds {
        config.crawler.pause_seconds = pause_seconds;
    }
    if let Some(output) = &cli.output {
        config.output.csv_path = output.display().to_string();
    }
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Venue-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  CSS selector: {}", config.crawler.css_selector);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Pause between pages: {}s", config.crawler.pause_seconds);
    println!("  No-results marker: {:?}", config.crawler.no_results_marker);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nExtraction:");
    println!("  Provider: {}", config.extraction.provider);
    println!("  API base: {}", config.extraction.api_base);
    println!(
        "  API key: ${} ({})",
        config.extraction.api_key_env,
        if std::env::var_os(&config.extraction.api_key_env).is_some() {
            "set"
        } else {
            "NOT SET"
        }
    );
    println!(
        "  Chunk threshold: {} tokens",
        config.extraction.chunk_token_threshold
    );

    println!("\nRecords:");
    println!("  Identity field: {}", config.record.identity_field);
    println!(
        "  Required fields: {}",
        config.record.required_fields.join(", ")
    );

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let agent = ResearchAgent::from_config(config)?;

    let report = match agent
        .run(
            config.crawler.max_pages,
            Duration::from_secs(config.crawler.pause_seconds),
        )
        .await
    {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!(
        "Crawl completed in {}s ({} page(s), {})",
        (report.crawl.finished_at - report.crawl.started_at).num_seconds(),
        report.crawl.pages_fetched,
        report.crawl.stop_reason
    );

    match report.outcome {
        ResearchOutcome::NothingFound => println!("No venues collected during the crawl."),
        ResearchOutcome::Saved { count, destination } => {
            println!("Saved {} venues to '{}'.", count, destination.display())
        }
    }

    Ok(())
}
