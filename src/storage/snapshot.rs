//! Snapshot files for backup and restore.
//!
//! A snapshot is a JSON array of fixture entries covering both tables:
//!
//! ```json
//! [
//!   {"model": "releases.game", "pk": 1,
//!    "fields": {"date": "2024-05-01", "title": "...", "platforms": "NS", "votes": 3}},
//!   {"model": "releases.blacklistedgame", "pk": 1, "fields": {"title": "..."}}
//! ]
//! ```
//!
//! Files are named `backup_<YYYY-MM-DD_HH-MM-SS>.json` and live in a single
//! directory.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::repository::StoreError;

const PREFIX: &str = "backup_";
const EXTENSION: &str = ".json";

/// Field set of a stored release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameFields {
    pub date: NaiveDate,
    pub title: String,
    pub platforms: String,
    #[serde(default)]
    pub votes: i64,
}

/// Field set of an exclusion entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedFields {
    pub title: String,
}

/// One row of either table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "model")]
pub enum SnapshotEntry {
    #[serde(rename = "releases.game")]
    Game { pk: i64, fields: GameFields },
    #[serde(rename = "releases.blacklistedgame")]
    ExcludedTitle { pk: i64, fields: ExcludedFields },
}

/// Full dump of the dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    pub entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    pub fn games(&self) -> impl Iterator<Item = (i64, &GameFields)> {
        self.entries.iter().filter_map(|e| match e {
            SnapshotEntry::Game { pk, fields } => Some((*pk, fields)),
            SnapshotEntry::ExcludedTitle { .. } => None,
        })
    }

    pub fn excluded_titles(&self) -> impl Iterator<Item = (i64, &ExcludedFields)> {
        self.entries.iter().filter_map(|e| match e {
            SnapshotEntry::ExcludedTitle { pk, fields } => Some((*pk, fields)),
            SnapshotEntry::Game { .. } => None,
        })
    }
}

/// Build the snapshot filename for a point in time
pub fn backup_filename(at: NaiveDateTime) -> String {
    format!("{}{}{}", PREFIX, at.format("%Y-%m-%d_%H-%M-%S"), EXTENSION)
}

/// Snapshot filenames are plain `backup_*.json` names, never paths
pub fn is_valid_backup_name(name: &str) -> bool {
    name.len() > PREFIX.len() + EXTENSION.len()
        && name.starts_with(PREFIX)
        && name.ends_with(EXTENSION)
        && !name.contains(['/', '\\'])
        && !name.contains("..")
}

/// Directory of snapshot files
#[derive(Debug, Clone)]
pub struct BackupStore {
    dir: PathBuf,
}

impl BackupStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_backup_name(name) {
            return Err(StoreError::InvalidSnapshotName(name.to_string()));
        }
        Ok(self.dir.join(name))
    }

    /// Write a snapshot and return its filename
    pub fn save(&self, snapshot: &Snapshot, at: NaiveDateTime) -> Result<String, StoreError> {
        std::fs::create_dir_all(&self.dir)?;

        let name = backup_filename(at);
        let content = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(self.dir.join(&name), content)?;

        Ok(name)
    }

    /// List snapshot filenames, newest first
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_valid_backup_name(name) {
                    names.push(name.to_string());
                }
            }
        }

        // Timestamped names sort chronologically
        names.sort_by(|a, b| b.cmp(a));
        Ok(names)
    }

    pub fn load(&self, name: &str) -> Result<Snapshot, StoreError> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(StoreError::SnapshotNotFound(name.to_string()));
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn remove(&self, name: &str) -> Result<(), StoreError> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(StoreError::SnapshotNotFound(name.to_string()));
        }
        std::fs::remove_file(&path)?;
        Ok(())
    }
}
