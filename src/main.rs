//! Route-Harvest main entry point
//!
//! This is the command-line interface for the Route-Harvest aggregator.

use anyhow::{Context, Result};
use clap::Parser;
use route_harvest::storage::{load_statistics, print_statistics, RecordStore};
use route_harvest::HarvestContext;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Route-Harvest: a resumable climbing-route aggregator
///
/// Route-Harvest crawls the route listings of a climbing reference site,
/// stages areas, sectors and routes as JSON files and ingests the staged
/// files into a SQLite store.
#[derive(Parser, Debug)]
#[command(name = "route-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resumable climbing-route aggregator", long_about = None)]
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

    /// Discard the checkpoint and start from the first region
    #[arg(long)]
    fresh: bool,

    /// Stop after this many areas (overrides the configuration)
    #[arg(long, value_name = "N")]
    max_results: Option<usize>,

    /// Ingest the staging folder into the database and exit
    #[arg(long, conflicts_with_all = ["stats", "dry_run", "fresh", "max_results"])]
    ingest: bool,

    /// Show staged and stored record counts and exit
    #[arg(long, conflicts_with_all = ["ingest", "dry_run", "fresh", "max_results"])]
    stats: bool,

    /// Validate config and show the crawl position without crawling
    #[arg(long, conflicts_with_all = ["ingest", "stats"])]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let context = HarvestContext::load(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!(
        "Configuration loaded successfully (hash: {})",
        context.config_hash()
    );

    if cli.dry_run {
        handle_dry_run(&context, cli.fresh, cli.max_results)
    } else if cli.stats {
        handle_stats(&context)
    } else if cli.ingest {
        handle_ingest(&context)
    } else {
        handle_crawl(&context, cli.fresh, cli.max_results).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("route_harvest=info,warn"),
            1 => EnvFilter::new("route_harvest=debug,info"),
            2 => EnvFilter::new("route_harvest=trace,debug"),
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

/// Handles the --dry-run mode: shows the configuration and crawl position
fn handle_dry_run(context: &HarvestContext, fresh: bool, max_results: Option<usize>) -> Result<()> {
    let config = context.config();
    println!("=== Route-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Batch size: {}", config.crawler.batch_size);
    match max_results.or(config.crawler.max_results) {
        Some(max) => println!("  Max results: {}", max),
        None => println!("  Max results: unlimited"),
    }
    println!(
        "  Page cache: {} pages, trimmed by {}",
        config.crawler.cache_size, config.crawler.cache_trim
    );

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Staging: {}", config.output.staging_dir);
    println!("  Checkpoint: {}", config.output.checkpoint_path);
    println!("  Database: {}", config.output.database_path);
    if let Some(images) = &config.output.images_dir {
        println!("  Images: {}", images);
    }

    println!(
        "\nRetry: {} attempts, {}ms apart",
        config.retry.attempts, config.retry.delay_ms
    );

    let checkpoint = context.checkpoint_store().load();
    println!("\nCheckpoint:");
    if fresh || checkpoint.is_fresh() {
        println!("  Would start from the first region");
    } else {
        let regions = &checkpoint.regions;
        match regions.items.get(regions.current) {
            Some(region) => println!(
                "  Would resume at region {}/{} ({})",
                regions.current + 1,
                regions.items.len(),
                region.name
            ),
            None => println!("  All {} regions are done", regions.items.len()),
        }
        if checkpoint.config_hash.as_deref() != Some(context.config_hash()) {
            println!("  Written with a different configuration");
        }
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --stats mode: shows staged and stored record counts
fn handle_stats(context: &HarvestContext) -> Result<()> {
    let config = context.config();
    println!("Staging: {}", config.output.staging_dir);

    let store = if Path::new(&config.output.database_path).exists() {
        println!("Database: {}\n", config.output.database_path);
        Some(context.record_store()?)
    } else {
        println!("Database: {} (not created yet)\n", config.output.database_path);
        None
    };

    let stats = load_statistics(
        &context.staging_writer(),
        store.as_ref().map(|s| s as &dyn RecordStore),
    )?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --ingest mode: upserts staged files into the database
fn handle_ingest(context: &HarvestContext) -> Result<()> {
    let mut store = context
        .record_store()
        .context("Failed to open the record store")?;

    let summary = context.ingest_dumper().dump_all(&mut store)?;
    tracing::info!(
        "Ingest complete: {} areas, {} sectors, {} routes, {} images",
        summary.areas,
        summary.sectors,
        summary.routes,
        summary.images
    );

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    context: &HarvestContext,
    fresh: bool,
    max_results: Option<usize>,
) -> Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (discarding checkpoint)");
        context.checkpoint_store().clear()?;
    } else {
        tracing::info!("Starting crawl (will resume from the checkpoint if one exists)");
    }

    let mut crawler = context.crawler(max_results)?;
    let mut writer = context.staging_writer();

    match crawler.run(&mut writer).await {
        Ok(report) => {
            let staged = writer.total();
            tracing::info!(
                "Crawl completed: {} areas staged in {} batches{}",
                staged.areas,
                report.batches,
                if report.complete {
                    ""
                } else {
                    " (more to crawl, run again to resume)"
                }
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
