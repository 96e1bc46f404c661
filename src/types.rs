//! Request and response types for the release tracker API.

use serde::{Deserialize, Serialize};

use crate::config::{is_known_platform, PLATFORMS};
use crate::storage::ReleaseRecord;

/// Query string of the index page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexQuery {
    #[serde(default)]
    pub platform: String,
}

impl IndexQuery {
    /// Selected platform tag, or "" (all platforms) for unknown values
    pub fn platform(&self) -> &str {
        if is_known_platform(&self.platform) {
            &self.platform
        } else {
            ""
        }
    }
}

/// Vote form posted to the index page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoteForm {
    #[serde(default)]
    pub game_id: Option<String>,
}

/// Admin edit form
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateReleaseForm {
    /// YYYY-MM-DD
    pub date: String,
    pub title: String,
    pub platforms: String,
}

/// Platform filter choice
#[derive(Debug, Clone, Serialize)]
pub struct PlatformOption {
    pub code: String,
    pub label: String,
}

impl PlatformOption {
    /// All filter choices, starting with "All Platforms"
    pub fn all() -> Vec<Self> {
        std::iter::once(("", "All Platforms"))
            .chain(PLATFORMS)
            .map(|(code, label)| Self {
                code: code.to_string(),
                label: label.to_string(),
            })
            .collect()
    }
}

/// Index page payload
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub platform: String,
    pub platforms: Vec<PlatformOption>,
    /// Upcoming releases, soonest first
    pub games: Vec<ReleaseRecord>,
    /// Three most voted releases
    pub top_games: Vec<ReleaseRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Snapshot listing entry
#[derive(Debug, Serialize)]
pub struct RestorePoint {
    pub filename: String,
    pub url: String,
}

/// Backup creation response
#[derive(Debug, Serialize)]
pub struct BackupResponse {
    pub filename: String,
    pub message: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Stored release count
    pub releases: i64,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
