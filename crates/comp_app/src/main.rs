//! `comp_app`: crawl strategy-guide pages into normalized composition records.

mod config;
mod logging;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use comp_core::{build_record, Catalog, RecordSource, Resolver};
use comp_engine::{
    crawl_with_browser, spawn_periodic, Clock, CompositionStore, CrawlError, CrawlOrchestrator,
    CrawlReport, RonFileStore, StructuralExtractor,
};
use engine_logging::{engine_error, engine_info};
use log::LevelFilter;
use tokio::sync::Notify;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(
    name = "comp_app",
    about = "Harvests team compositions from strategy-guide sites",
    version
)]
struct Cli {
    /// Path to a RON config file (defaults to ./comp_harvester.ron if present).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl once and print a summary.
    Run {
        /// Overrides `listing_url` from the config.
        #[arg(long)]
        listing_url: Option<String>,
    },

    /// Crawl now, then again every `schedule_interval_hours` until Ctrl-C.
    Schedule,

    /// Extract and normalize a saved HTML page, printing the record as JSON.
    Extract {
        #[arg(long)]
        file: PathBuf,

        /// Source URL to stamp on the record.
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(config.log_destination, level);

    match cli.command {
        Commands::Run { listing_url } => {
            if listing_url.is_some() {
                config.listing_url = listing_url;
            }
            let report = run_once(&config).await?;
            print_summary(&report);
        }
        Commands::Schedule => schedule(config).await?,
        Commands::Extract { file, url } => extract(&config, &file, url)?,
    }
    Ok(())
}

fn utc_clock() -> Clock {
    Arc::new(|| chrono::Utc::now().to_rfc3339())
}

fn resolver(config: &AppConfig) -> Result<Resolver, CrawlError> {
    let catalog = Catalog::bundled()?;
    Ok(Resolver::new(Arc::new(catalog.clone())).with_fuzzy(config.fuzzy_matching))
}

async fn run_once(config: &AppConfig) -> anyhow::Result<CrawlReport> {
    let listing_url = config
        .listing_url
        .clone()
        .context("no listing_url configured; pass --listing-url or set it in the config")?;

    let extractor = Arc::new(StructuralExtractor::new(Arc::new(resolver(config)?)));
    let store: Arc<dyn CompositionStore> = Arc::new(RonFileStore::new(&config.store_path));
    let orchestrator = CrawlOrchestrator::new(
        store,
        extractor,
        config.crawl_settings(listing_url),
        utc_clock(),
    );
    Ok(crawl_with_browser(&orchestrator, config.acquire_settings()).await?)
}

async fn schedule(config: AppConfig) -> anyhow::Result<()> {
    // Fail fast on a config that can never run.
    if config.listing_url.is_none() {
        anyhow::bail!("no listing_url configured for scheduled runs");
    }
    let period = config.schedule_period();
    engine_info!("Scheduling crawls every {:?}", period);

    let shutdown = Arc::new(Notify::new());
    let config = Arc::new(config);
    let handle = spawn_periodic(period, shutdown.clone(), move || {
        let config = config.clone();
        async move {
            match run_once(&config).await {
                Ok(report) => print_summary(&report),
                Err(err) => engine_error!("Scheduled crawl failed: {:#}", err),
            }
        }
    });

    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    engine_info!("Ctrl-C received, stopping after the current run");
    shutdown.notify_one();
    handle.await.context("scheduler task panicked")?;
    Ok(())
}

fn extract(config: &AppConfig, file: &Path, url: Option<String>) -> anyhow::Result<()> {
    let html = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let extractor = StructuralExtractor::new(Arc::new(resolver(config)?));
    let skeleton = extractor.extract(&html);
    let source = RecordSource {
        url: url.unwrap_or_else(|| file.display().to_string()),
        crawled_utc: chrono::Utc::now().to_rfc3339(),
    };
    let record = build_record(skeleton, extractor.resolver(), config.board(), source);
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn print_summary(report: &CrawlReport) {
    let r = &report.result;
    println!(
        "discovered {} | created {} | skipped {} | failed {} | deleted {}",
        r.discovered, r.created, r.skipped, r.failed, r.deleted
    );
    for record in &report.created {
        println!("  + {} [{}] {}", record.name, record.tier, record.source_url);
    }
}
