//! Configuration for the release tracker.

use serde::{Deserialize, Serialize};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Scraper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Source page URL; `{year}` is replaced with the current year on every run
    #[serde(default = "default_source_url")]
    pub source_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Width of the upcoming-release window
    #[serde(default = "default_window_weeks")]
    pub window_weeks: u32,
    /// Background refresh period, 0 disables the task
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_source_url() -> String {
    "https://en.wikipedia.org/wiki/{year}_in_video_games".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_window_weeks() -> u32 {
    8
}

fn default_refresh_interval_secs() -> u64 {
    3600
}

fn default_user_agent() -> String {
    concat!("release-radar/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            timeout_secs: default_timeout_secs(),
            window_weeks: default_window_weeks(),
            refresh_interval_secs: default_refresh_interval_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// Directory holding `backup_*.json` snapshot files
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,
}

fn default_database_path() -> String {
    "data/releases.db".to_string()
}

fn default_backup_dir() -> String {
    ".".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            backup_dir: default_backup_dir(),
        }
    }
}

/// Voting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingConfig {
    /// Votes allowed per client address per hour
    #[serde(default = "default_votes_per_hour")]
    pub votes_per_hour: u32,
}

fn default_votes_per_hour() -> u32 {
    3
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            votes_per_hour: default_votes_per_hour(),
        }
    }
}

/// Admin configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Bearer token for admin routes; admin routes are closed when unset
    #[serde(default)]
    pub token: Option<String>,
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub voting: VotingConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

impl AppConfig {
    /// Load configuration from environment and config file
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Add config file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables (RELEASES_SERVER__PORT, etc.)
            .add_source(
                config::Environment::with_prefix("RELEASES")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

/// Platform tags a release must carry to be tracked, with display labels
pub const PLATFORMS: [(&str, &str); 6] = [
    ("NS", "Nintendo Switch"),
    ("XSX", "Xbox Series X/S"),
    ("PS5", "PlayStation 5"),
    ("XBO", "Xbox One"),
    ("PS4", "PlayStation 4"),
    ("Win", "PC"),
];

/// Returns true when `code` is one of the tracked platform tags
pub fn is_known_platform(code: &str) -> bool {
    PLATFORMS.iter().any(|(tag, _)| *tag == code)
}
