//! CLI commands for release-radar.
//!
//! Supports API server mode plus one-shot refresh, listing and snapshot
//! management against the configured database.

use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::Path;

use crate::config::{is_known_platform, AppConfig};
use crate::scraper::{self, RefreshSummary};
use crate::storage::{create_shared_repository, BackupStore, ReleaseRecord, ReleaseRepository};

#[derive(Parser)]
#[command(name = "release-radar")]
#[command(version, about = "Release Radar: upcoming video game releases tracker", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Scrape the source page once and store new releases
    Refresh {
        /// Output format (json, table)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// List stored upcoming releases
    List {
        /// Platform tag filter (NS, XSX, PS5, XBO, PS4, Win)
        #[arg(short, long, default_value = "")]
        platform: String,

        /// Output format (json, table)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Write a snapshot of the dataset
    Backup,

    /// List available snapshots, newest first
    RestorePoints,

    /// Replace the dataset with a snapshot
    Restore {
        /// Snapshot filename (backup_*.json)
        #[arg(value_name = "FILENAME")]
        filename: String,
    },
}

fn open_repository(config: &AppConfig) -> anyhow::Result<ReleaseRepository> {
    ReleaseRepository::new(Path::new(&config.storage.database_path))
}

fn backup_store(config: &AppConfig) -> BackupStore {
    BackupStore::new(config.storage.backup_dir.clone().into())
}

/// Run the scrape pipeline once.
pub async fn run_refresh(format: String) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let repo = create_shared_repository(&config.storage.database_path)?;
    let client = scraper::build_client(config.scraper.timeout_secs, &config.scraper.user_agent)?;

    let today = Local::now().date_naive();
    let summary = scraper::refresh(&client, &repo, &config.scraper, today).await?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        "table" => print_refresh_table(&summary),
        _ => {
            eprintln!("Unknown format: {}. Using JSON.", format);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

/// Print stored releases.
pub fn run_list(platform: String, format: String) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let repo = open_repository(&config)?;

    if !platform.is_empty() && !is_known_platform(&platform) {
        anyhow::bail!("Unknown platform: {}", platform);
    }

    repo.purge_expired(Local::now().date_naive())?;
    let releases = repo.list_releases(&platform)?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&releases)?),
        _ => print_release_table(&releases),
    }

    Ok(())
}

/// Write a snapshot file.
pub fn run_backup() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let repo = open_repository(&config)?;

    let snapshot = repo.export_snapshot()?;
    let filename = backup_store(&config).save(&snapshot, Local::now().naive_local())?;
    println!("Restore point created: {}", filename);

    Ok(())
}

/// List snapshot files.
pub fn run_restore_points() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let names = backup_store(&config).list()?;

    if names.is_empty() {
        println!("No restore points, create one!");
    }
    for name in names {
        println!("{}", name);
    }

    Ok(())
}

/// Restore the dataset from a snapshot file.
pub fn run_restore(filename: String) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let repo = open_repository(&config)?;

    let snapshot = backup_store(&config).load(&filename)?;
    let (releases, excluded) = repo.import_snapshot(&snapshot)?;
    println!(
        "Restored {}: {} releases, {} excluded titles",
        filename, releases, excluded
    );

    Ok(())
}

fn print_refresh_table(summary: &RefreshSummary) {
    println!("Source: {}", summary.source_url);
    println!();
    println!("  {:<16} {:>6}", "Scraped rows", summary.scraped_rows);
    println!("  {:<16} {:>6}", "In window", summary.kept_rows);
    println!("  {:<16} {:>6}", "Inserted", summary.inserted);
    println!("  {:<16} {:>6}", "Already present", summary.already_present);
    println!("  {:<16} {:>6}", "Excluded", summary.excluded);

    if !summary.row_failures.is_empty() {
        println!();
        println!("=== Undatable Rows ===");
        for failure in &summary.row_failures {
            println!("  {}: {}", failure.title, failure.error);
        }
    }

    if !summary.store_failures.is_empty() {
        println!();
        println!("=== Store Failures ===");
        for failure in &summary.store_failures {
            println!("  {}: {}", failure.title, failure.error);
        }
    }
}

fn print_release_table(releases: &[ReleaseRecord]) {
    if releases.is_empty() {
        println!("No upcoming releases.");
        return;
    }

    println!("{:>5}  {:<10}  {:>5}  {:<40}  {}", "ID", "Date", "Votes", "Title", "Platforms");
    for release in releases {
        println!(
            "{:>5}  {:<10}  {:>5}  {:<40}  {}",
            release.id,
            release.date.to_string(),
            release.votes,
            release.title,
            release.platforms
        );
    }
}
