//! Release Radar
//!
//! Tracks upcoming video game releases scraped from Wikipedia, with voting,
//! admin curation and JSON snapshots. Runs as an API server or as one-shot
//! CLI commands.

mod cli;
mod config;
mod rate_limiter;
mod routes;
mod scraper;
mod storage;
mod types;

use chrono::Local;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::rate_limiter::VoteLimiter;
use crate::routes::AppState;
use crate::storage::{create_shared_repository, BackupStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "release_radar=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => run_server(host, port).await,
        Commands::Refresh { format } => cli::run_refresh(format).await,
        Commands::List { platform, format } => cli::run_list(platform, format),
        Commands::Backup => cli::run_backup(),
        Commands::RestorePoints => cli::run_restore_points(),
        Commands::Restore { filename } => cli::run_restore(filename),
    }
}

/// Run the API server.
async fn run_server(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    // Load configuration
    let mut config = AppConfig::load()?;

    // Override with CLI args
    if let Some(h) = host {
        config.server.host = h;
    }
    if let Some(p) = port {
        config.server.port = p;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("Database path: {}", config.storage.database_path);
    if config.admin.token.is_none() {
        tracing::warn!("No admin token configured, admin routes are disabled");
    }

    let repo = create_shared_repository(&config.storage.database_path)?;
    let client = scraper::build_client(config.scraper.timeout_secs, &config.scraper.user_agent)?;

    // Create application state
    let state = Arc::new(AppState {
        repo,
        backups: BackupStore::new(config.storage.backup_dir.clone().into()),
        client,
        limiter: VoteLimiter::new(config.voting.votes_per_hour),
        config: config.clone(),
    });

    if config.scraper.refresh_interval_secs > 0 {
        tokio::spawn(refresh_loop(
            state.clone(),
            Duration::from_secs(config.scraper.refresh_interval_secs),
        ));
    } else {
        tracing::info!("Periodic refresh disabled");
    }

    let app = routes::build_router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Refresh the store on startup and then every `period`. Failures are
/// logged and the next tick tries again.
async fn refresh_loop(state: Arc<AppState>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let today = Local::now().date_naive();
        match scraper::refresh(&state.client, &state.repo, &state.config.scraper, today).await {
            Ok(summary) => tracing::info!(
                inserted = summary.inserted,
                already_present = summary.already_present,
                excluded = summary.excluded,
                "Periodic refresh finished"
            ),
            Err(e) => tracing::error!(error = %e, "Periodic refresh failed"),
        }
    }
}
