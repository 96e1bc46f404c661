//! SQLite storage module for release data
//!
//! Provides persistent storage for scraped releases, their votes and the
//! exclusion list, plus JSON snapshot files for backup and restore.

pub mod repository;
pub mod schema;
pub mod snapshot;

pub use repository::{
    ExclusionEntry, InsertOutcome, NewRelease, ReleaseRecord, ReleaseRepository, StoreError,
};
pub use snapshot::BackupStore;

use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Repository shared between request handlers and the refresh task
pub type SharedRepository = Arc<Mutex<ReleaseRepository>>;

/// Open the database and wrap it for sharing
pub fn create_shared_repository<P: AsRef<Path>>(path: P) -> anyhow::Result<SharedRepository> {
    let repo = ReleaseRepository::new(path.as_ref())?;
    Ok(Arc::new(Mutex::new(repo)))
}
