//! Indeed-Harvest main entry point
//!
//! This is the command-line interface for the Indeed job-listing harvester.

use anyhow::Context;
use clap::Parser;
use indeed_harvest::config::{resolve_config, Config, ConfigOverrides};
use indeed_harvest::scrape::run_harvest;
use indeed_harvest::url::build_search_url;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Indeed-Harvest: keyword job-listing harvester
///
/// Fetches Indeed search result pages through a scraping proxy, extracts the
/// job cards and appends unseen listings to a CSV file and a SQLite database.
/// Proxy credentials are read from SCRAPER_PROXY_USERNAME and
/// SCRAPER_PROXY_PASSWORD.
#[derive(Parser, Debug)]
#[command(name = "indeed-harvest")]
#[command(version)]
#[command(about = "Harvest Indeed job listings through a scraping proxy", long_about = None)]
struct Cli {
    /// Search phrase [default: "experience with Heartland Payroll"]
    #[arg(long, value_name = "TEXT")]
    query: Option<String>,

    /// Two-letter country code of the Indeed site [default: us]
    #[arg(long, value_name = "CC")]
    country: Option<String>,

    /// Number of result pages to fetch [default: 3]
    #[arg(long, value_name = "N")]
    pages: Option<u32>,

    /// Proxy request timeout in seconds [default: 60]
    #[arg(long, value_name = "SECS")]
    timeout: Option<f64>,

    /// CSV output file [default: heartland_jobs.csv]
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// SQLite database file [default: heartland_jobs.db]
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Optional TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Abort the run at the first page that fails to fetch
    #[arg(long)]
    fail_fast: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show the effective configuration and the URLs that would be fetched
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            query: self.query.clone(),
            country: self.country.clone(),
            pages: self.pages,
            timeout_secs: self.timeout,
            csv_path: self.csv.as_ref().map(|p| p.display().to_string()),
            database_path: self.db.as_ref().map(|p| p.display().to_string()),
            fail_fast: self.fail_fast,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(cli.config.as_deref(), cli.overrides())
        .context("Failed to load configuration")?;

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_harvest(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("indeed_harvest=info,warn"),
            1 => EnvFilter::new("indeed_harvest=debug,info"),
            2 => EnvFilter::new("indeed_harvest=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration and search URLs
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Indeed-Harvest Dry Run ===\n");

    println!("Search:");
    println!("  Query: {}", config.search.query);
    println!("  Country: {}", config.search.country);
    println!("  Pages: {}", config.search.pages);

    println!("\nProxy:");
    println!("  Endpoint: {}", config.proxy.endpoint);
    println!("  Timeout: {}s", config.proxy.timeout_secs);
    println!("  On fetch error: {:?}", config.proxy.on_fetch_error);
    println!(
        "  Credentials: {}",
        if config.credentials.is_some() {
            "set"
        } else {
            "missing"
        }
    );

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    println!("  Database: {}", config.output.database_path);

    println!("\nWould fetch:");
    for page_index in 0..config.search.pages {
        let url = build_search_url(&config.search.query, &config.search.country, page_index)?;
        println!("  {}", url);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use indeed_harvest::output::{load_statistics, print_statistics};
    use indeed_harvest::storage::open_storage;
    use std::path::Path;

    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config) -> anyhow::Result<()> {
    let csv_path = config.output.csv_path.clone();
    let database_path = config.output.database_path.clone();

    let summary = match run_harvest(config).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e.into());
        }
    };

    if summary.failed_pages > 0 {
        tracing::warn!(
            "{} of {} page(s) failed to fetch",
            summary.failed_pages,
            summary.pages_requested
        );
    }
    if summary.new_listings == 0 {
        tracing::warn!("No new jobs found.");
    }

    println!("{} → {} & {}", summary, csv_path, database_path);

    Ok(())
}
