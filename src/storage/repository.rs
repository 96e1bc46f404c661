//! SQLite repository for tracked releases and the exclusion list

use anyhow::Context;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::schema::create_tables;
use super::snapshot::{ExcludedFields, GameFields, Snapshot, SnapshotEntry};

/// Errors surfaced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No release with this id
    #[error("Release {0} not found")]
    NotFound(i64),
    /// Another release already uses this title
    #[error("Title already exists: {0}")]
    TitleConflict(String),
    /// Title is on the exclusion list
    #[error("Title is excluded: {0}")]
    ExcludedTitle(String),
    #[error("Invalid snapshot name: {0}")]
    InvalidSnapshotName(String),
    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Snapshot format error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A tracked upcoming release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub title: String,
    pub platforms: String,
    pub votes: i64,
}

/// A title that must never be imported again
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExclusionEntry {
    pub id: i64,
    pub title: String,
}

/// Release fields without identity or votes, as scraped or as edited by an admin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRelease {
    pub date: NaiveDate,
    pub title: String,
    pub platforms: String,
}

/// Result of inserting one scraped release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(i64),
    /// Title already stored; the existing record is left untouched
    AlreadyPresent,
}

/// Per-batch counters from [`ReleaseRepository::store_releases`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    pub inserted: usize,
    pub already_present: usize,
    pub excluded: usize,
    pub failures: Vec<StoreFailure>,
}

/// A row the store refused for a reason other than a duplicate title
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreFailure {
    pub title: String,
    pub error: String,
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn release_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReleaseRecord> {
    Ok(ReleaseRecord {
        id: row.get(0)?,
        date: row.get(1)?,
        title: row.get(2)?,
        platforms: row.get(3)?,
        votes: row.get(4)?,
    })
}

/// Repository for release data
pub struct ReleaseRepository {
    conn: Connection,
}

impl ReleaseRepository {
    /// Create a new repository, initializing the database if needed
    pub fn new(db_path: &Path) -> anyhow::Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let conn = Connection::open(db_path).context("Failed to open database")?;

        // Create tables if they don't exist
        create_tables(&conn)?;

        Ok(Self { conn })
    }

    /// Create an in-memory repository (for testing)
    #[cfg(test)]
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        create_tables(&conn)?;
        Ok(Self { conn })
    }

    // ==================== Pipeline Writer ====================

    /// Check whether a title is on the exclusion list
    pub fn is_excluded(&self, title: &str) -> Result<bool, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM excluded_titles WHERE title = ?1",
            [title],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Insert a release with zero votes; a duplicate title is not an error
    pub fn insert_release(&self, release: &NewRelease) -> Result<InsertOutcome, StoreError> {
        let result = self.conn.execute(
            "INSERT INTO games (date, title, platforms, votes) VALUES (?1, ?2, ?3, 0)",
            params![release.date, release.title, release.platforms],
        );

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted(self.conn.last_insert_rowid())),
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::AlreadyPresent),
            Err(e) => Err(e.into()),
        }
    }

    /// Write a batch of scraped releases in order.
    ///
    /// Excluded titles are skipped. Each row is written independently, so a
    /// failing row is recorded and the rest of the batch continues.
    pub fn store_releases(&self, releases: &[NewRelease]) -> StoreSummary {
        let mut summary = StoreSummary::default();

        for release in releases {
            let outcome = self.is_excluded(&release.title).and_then(|excluded| {
                if excluded {
                    Ok(None)
                } else {
                    self.insert_release(release).map(Some)
                }
            });

            match outcome {
                Ok(None) => {
                    debug!(title = %release.title, "Skipping excluded title");
                    summary.excluded += 1;
                }
                Ok(Some(InsertOutcome::Inserted(id))) => {
                    debug!(id, title = %release.title, "Inserted release");
                    summary.inserted += 1;
                }
                Ok(Some(InsertOutcome::AlreadyPresent)) => summary.already_present += 1,
                Err(e) => {
                    warn!(title = %release.title, error = %e, "Failed to store release");
                    summary.failures.push(StoreFailure {
                        title: release.title.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        summary
    }

    // ==================== Query Operations ====================

    /// Get a release by id
    pub fn get_release(&self, id: i64) -> Result<Option<ReleaseRecord>, StoreError> {
        let release = self
            .conn
            .query_row(
                "SELECT id, date, title, platforms, votes FROM games WHERE id = ?1",
                [id],
                release_from_row,
            )
            .optional()?;
        Ok(release)
    }

    /// Releases whose platforms contain `platform`, soonest first. An empty
    /// filter matches everything.
    pub fn list_releases(&self, platform: &str) -> Result<Vec<ReleaseRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, date, title, platforms, votes
            FROM games
            WHERE ?1 = '' OR instr(platforms, ?1) > 0
            ORDER BY date, id
            "#,
        )?;

        let releases = stmt
            .query_map([platform], release_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(releases)
    }

    /// Most voted releases matching `platform`
    pub fn top_voted(&self, platform: &str, limit: usize) -> Result<Vec<ReleaseRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, date, title, platforms, votes
            FROM games
            WHERE ?1 = '' OR instr(platforms, ?1) > 0
            ORDER BY votes DESC, id
            LIMIT ?2
            "#,
        )?;

        let releases = stmt
            .query_map(params![platform, limit as i64], release_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(releases)
    }

    /// All exclusion entries
    pub fn list_excluded(&self) -> Result<Vec<ExclusionEntry>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title FROM excluded_titles ORDER BY id")?;

        let entries = stmt
            .query_map([], |row| {
                Ok(ExclusionEntry {
                    id: row.get(0)?,
                    title: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Get release count
    pub fn get_release_count(&self) -> Result<i64, StoreError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?;
        Ok(count)
    }

    // ==================== Visitor Mutations ====================

    /// Delete releases dated strictly before `today`
    pub fn purge_expired(&self, today: NaiveDate) -> Result<usize, StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM games WHERE date < ?1", [today])?;
        if removed > 0 {
            info!(removed, %today, "Purged expired releases");
        }
        Ok(removed)
    }

    /// Add one vote; returns the new count, or None for an unknown id
    pub fn add_vote(&self, id: i64) -> Result<Option<i64>, StoreError> {
        let votes = self
            .conn
            .query_row(
                "UPDATE games SET votes = votes + 1 WHERE id = ?1 RETURNING votes",
                [id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(votes)
    }

    // ==================== Admin Operations ====================

    /// Delete a release and exclude its title from future imports
    pub fn delete_release(&self, id: i64) -> Result<ReleaseRecord, StoreError> {
        let tx = self.conn.unchecked_transaction()?;

        let release = self.get_release(id)?.ok_or(StoreError::NotFound(id))?;
        tx.execute(
            "INSERT OR IGNORE INTO excluded_titles (title) VALUES (?1)",
            [&release.title],
        )?;
        tx.execute("DELETE FROM games WHERE id = ?1", [id])?;

        tx.commit()?;
        info!(id, title = %release.title, "Deleted release and excluded title");
        Ok(release)
    }

    /// Replace a release's fields. A previous title is excluded so the scraper
    /// cannot bring it back. Renaming onto an excluded title is refused.
    pub fn update_release(&self, id: i64, fields: &NewRelease) -> Result<ReleaseRecord, StoreError> {
        let tx = self.conn.unchecked_transaction()?;

        let current = self.get_release(id)?.ok_or(StoreError::NotFound(id))?;
        if current.title != fields.title {
            if self.is_excluded(&fields.title)? {
                return Err(StoreError::ExcludedTitle(fields.title.clone()));
            }
            tx.execute(
                "INSERT OR IGNORE INTO excluded_titles (title) VALUES (?1)",
                [&current.title],
            )?;
        }

        let result = tx.execute(
            "UPDATE games SET date = ?1, title = ?2, platforms = ?3 WHERE id = ?4",
            params![fields.date, fields.title, fields.platforms, id],
        );
        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(StoreError::TitleConflict(fields.title.clone()))
            }
            Err(e) => return Err(e.into()),
        }

        tx.commit()?;
        info!(id, old_title = %current.title, new_title = %fields.title, "Updated release");
        Ok(ReleaseRecord {
            id,
            date: fields.date,
            title: fields.title.clone(),
            platforms: fields.platforms.clone(),
            votes: current.votes,
        })
    }

    /// Empty both tables; returns (releases, exclusions) removed
    pub fn reset(&self) -> Result<(usize, usize), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let releases = tx.execute("DELETE FROM games", [])?;
        let excluded = tx.execute("DELETE FROM excluded_titles", [])?;
        tx.commit()?;

        info!(releases, excluded, "Reset all release data");
        Ok((releases, excluded))
    }

    // ==================== Snapshots ====================

    /// Dump both tables
    pub fn export_snapshot(&self) -> Result<Snapshot, StoreError> {
        let mut entries = Vec::new();

        let mut stmt = self
            .conn
            .prepare("SELECT id, date, title, platforms, votes FROM games ORDER BY id")?;
        for release in stmt.query_map([], release_from_row)? {
            let release = release?;
            entries.push(SnapshotEntry::Game {
                pk: release.id,
                fields: GameFields {
                    date: release.date,
                    title: release.title,
                    platforms: release.platforms,
                    votes: release.votes,
                },
            });
        }

        for entry in self.list_excluded()? {
            entries.push(SnapshotEntry::ExcludedTitle {
                pk: entry.id,
                fields: ExcludedFields { title: entry.title },
            });
        }

        Ok(Snapshot { entries })
    }

    /// Replace all data with the snapshot contents. Exclusion entries naming a
    /// restored release are dropped.
    pub fn import_snapshot(&self, snapshot: &Snapshot) -> Result<(usize, usize), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM games", [])?;
        tx.execute("DELETE FROM excluded_titles", [])?;

        let mut releases = 0;
        for (pk, game) in snapshot.games() {
            tx.execute(
                "INSERT INTO games (id, date, title, platforms, votes) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![pk, game.date, game.title, game.platforms, game.votes],
            )?;
            releases += 1;
        }

        let mut excluded = 0;
        for (pk, entry) in snapshot.excluded_titles() {
            tx.execute(
                "INSERT INTO excluded_titles (id, title) VALUES (?1, ?2)",
                params![pk, entry.title],
            )?;
            excluded += 1;
        }

        let reconciled = tx.execute(
            "DELETE FROM excluded_titles WHERE title IN (SELECT title FROM games)",
            [],
        )?;
        if reconciled > 0 {
            warn!(reconciled, "Dropped exclusions of restored titles");
        }
        let excluded = excluded - reconciled;

        tx.commit()?;
        info!(releases, excluded, "Restored snapshot");
        Ok((releases, excluded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn new_release(title: &str, days_ahead: i64, platforms: &str) -> NewRelease {
        NewRelease {
            date: today() + Duration::days(days_ahead),
            title: title.to_string(),
            platforms: platforms.to_string(),
        }
    }

    fn insert_with_votes(repo: &ReleaseRepository, title: &str, votes: i64) -> i64 {
        let InsertOutcome::Inserted(id) = repo.insert_release(&new_release(title, 15, "NS")).unwrap()
        else {
            panic!("expected insert");
        };
        for _ in 0..votes {
            repo.add_vote(id).unwrap();
        }
        id
    }

    #[test]
    fn test_insert_and_get_release() {
        let repo = ReleaseRepository::in_memory().unwrap();
        let release = new_release("Hades II", 10, "Win");

        let InsertOutcome::Inserted(id) = repo.insert_release(&release).unwrap() else {
            panic!("expected insert");
        };

        let stored = repo.get_release(id).unwrap().unwrap();
        assert_eq!(stored.title, "Hades II");
        assert_eq!(stored.date, release.date);
        assert_eq!(stored.votes, 0);
        assert!(repo.get_release(id + 1).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_insert_keeps_existing() {
        let repo = ReleaseRepository::in_memory().unwrap();
        repo.insert_release(&new_release("Possible duplicate", 15, "NS"))
            .unwrap();

        let outcome = repo
            .insert_release(&new_release("Possible duplicate", 20, "PS5"))
            .unwrap();
        assert_eq!(outcome, InsertOutcome::AlreadyPresent);

        let all = repo.list_releases("").unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].platforms, "NS");
        assert_eq!(all[0].date, today() + Duration::days(15));
    }

    #[test]
    fn test_store_releases_skips_excluded() {
        let repo = ReleaseRepository::in_memory().unwrap();
        repo.insert_release(&new_release("Possible duplicate", 15, "NS"))
            .unwrap();
        let id = insert_with_votes(&repo, "Possibly blacklisted", 0);
        repo.delete_release(id).unwrap();

        let summary = repo.store_releases(&[
            new_release("Possible duplicate", 15, "NS"),
            new_release("Possibly blacklisted", 15, "NS"),
            new_release("Fresh title", 3, "PS5"),
        ]);

        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.already_present, 1);
        assert_eq!(summary.excluded, 1);
        assert!(summary.failures.is_empty());
        assert_eq!(repo.get_release_count().unwrap(), 2);
        assert!(repo
            .list_releases("")
            .unwrap()
            .iter()
            .all(|r| r.title != "Possibly blacklisted"));
    }

    #[test]
    fn test_store_releases_idempotent() {
        let repo = ReleaseRepository::in_memory().unwrap();
        let batch = vec![new_release("A", 1, "NS"), new_release("B", 2, "PS5")];

        let first = repo.store_releases(&batch);
        let second = repo.store_releases(&batch);

        assert_eq!(first.inserted, 2);
        assert_eq!(second.inserted, 0);
        assert_eq!(second.already_present, 2);
        assert_eq!(repo.get_release_count().unwrap(), 2);
    }

    #[test]
    fn test_top_voted_ordering() {
        let repo = ReleaseRepository::in_memory().unwrap();
        insert_with_votes(&repo, "Title example 1", 7);
        insert_with_votes(&repo, "Title example 2", 1);
        insert_with_votes(&repo, "Title example 3", 8);
        insert_with_votes(&repo, "Title example 4", 2);

        let top: Vec<i64> = repo
            .top_voted("", 3)
            .unwrap()
            .iter()
            .map(|r| r.votes)
            .collect();
        assert_eq!(top, vec![8, 7, 2]);
    }

    #[test]
    fn test_platform_filter_and_date_order() {
        let repo = ReleaseRepository::in_memory().unwrap();
        repo.insert_release(&new_release("Late", 30, "PS5, Win"))
            .unwrap();
        repo.insert_release(&new_release("Early", 2, "NS")).unwrap();
        repo.insert_release(&new_release("Middle", 10, "Win"))
            .unwrap();

        let all: Vec<String> = repo
            .list_releases("")
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(all, vec!["Early", "Middle", "Late"]);

        let pc: Vec<String> = repo
            .list_releases("Win")
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(pc, vec!["Middle", "Late"]);
    }

    #[test]
    fn test_purge_expired() {
        let repo = ReleaseRepository::in_memory().unwrap();
        repo.insert_release(&new_release("Yesterday", -1, "NS"))
            .unwrap();
        repo.insert_release(&new_release("Today", 0, "NS")).unwrap();

        assert_eq!(repo.purge_expired(today()).unwrap(), 1);
        let left = repo.list_releases("").unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].title, "Today");
    }

    #[test]
    fn test_add_vote() {
        let repo = ReleaseRepository::in_memory().unwrap();
        let id = insert_with_votes(&repo, "Voted", 0);

        assert_eq!(repo.add_vote(id).unwrap(), Some(1));
        assert_eq!(repo.add_vote(id).unwrap(), Some(2));
        assert_eq!(repo.add_vote(id + 100).unwrap(), None);
    }

    #[test]
    fn test_delete_excludes_title() {
        let repo = ReleaseRepository::in_memory().unwrap();
        let id = insert_with_votes(&repo, "Half-Life 3", 0);

        let deleted = repo.delete_release(id).unwrap();
        assert_eq!(deleted.title, "Half-Life 3");
        assert!(repo.get_release(id).unwrap().is_none());
        assert!(repo.is_excluded("Half-Life 3").unwrap());

        let summary = repo.store_releases(&[new_release("Half-Life 3", 5, "Win")]);
        assert_eq!(summary.excluded, 1);
        assert_eq!(repo.get_release_count().unwrap(), 0);

        assert!(matches!(
            repo.delete_release(id),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_excludes_old_title() {
        let repo = ReleaseRepository::in_memory().unwrap();
        let id = insert_with_votes(&repo, "Title example", 4);

        let updated = repo
            .update_release(id, &new_release("Updated title", 20, "NS, PS5"))
            .unwrap();
        assert_eq!(updated.title, "Updated title");
        assert_eq!(updated.votes, 4);
        assert!(repo.is_excluded("Title example").unwrap());
        assert!(!repo.is_excluded("Updated title").unwrap());

        let stored = repo.get_release(id).unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[test]
    fn test_update_same_title_keeps_it_importable() {
        let repo = ReleaseRepository::in_memory().unwrap();
        let id = insert_with_votes(&repo, "Stable title", 0);

        repo.update_release(id, &new_release("Stable title", 9, "Win"))
            .unwrap();
        assert!(!repo.is_excluded("Stable title").unwrap());
    }

    #[test]
    fn test_update_conflict_and_missing() {
        let repo = ReleaseRepository::in_memory().unwrap();
        let first = insert_with_votes(&repo, "First", 0);
        insert_with_votes(&repo, "Second", 0);

        let result = repo.update_release(first, &new_release("Second", 3, "NS"));
        assert!(matches!(result, Err(StoreError::TitleConflict(_))));
        // Rolled back: old title still stored and not excluded
        assert_eq!(repo.get_release(first).unwrap().unwrap().title, "First");
        assert!(!repo.is_excluded("First").unwrap());

        assert!(matches!(
            repo.update_release(999, &new_release("X", 3, "NS")),
            Err(StoreError::NotFound(999))
        ));
    }

    #[test]
    fn test_update_onto_excluded_title_is_refused() {
        let repo = ReleaseRepository::in_memory().unwrap();
        let gone = insert_with_votes(&repo, "Gone", 0);
        let other = insert_with_votes(&repo, "Other", 2);
        repo.delete_release(gone).unwrap();

        let result = repo.update_release(other, &new_release("Gone", 5, "PS5"));
        assert!(matches!(result, Err(StoreError::ExcludedTitle(ref t)) if t == "Gone"));

        assert!(repo.is_excluded("Gone").unwrap());
        assert!(!repo.is_excluded("Other").unwrap());
        let stored = repo.get_release(other).unwrap().unwrap();
        assert_eq!(stored.title, "Other");
        assert_eq!(stored.votes, 2);
    }

    #[test]
    fn test_reset() {
        let repo = ReleaseRepository::in_memory().unwrap();
        let id = insert_with_votes(&repo, "Gone", 0);
        insert_with_votes(&repo, "Kept until reset", 0);
        repo.delete_release(id).unwrap();

        assert_eq!(repo.reset().unwrap(), (1, 1));
        assert_eq!(repo.get_release_count().unwrap(), 0);
        assert!(repo.list_excluded().unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_restore_replaces_data() {
        let repo = ReleaseRepository::in_memory().unwrap();
        let id = insert_with_votes(&repo, "Removed", 0);
        insert_with_votes(&repo, "Popular", 3);
        repo.delete_release(id).unwrap();

        let snapshot = repo.export_snapshot().unwrap();

        repo.reset().unwrap();
        insert_with_votes(&repo, "Added after backup", 1);

        assert_eq!(repo.import_snapshot(&snapshot).unwrap(), (1, 1));
        let releases = repo.list_releases("").unwrap();
        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].title, "Popular");
        assert_eq!(releases[0].votes, 3);
        assert!(repo.is_excluded("Removed").unwrap());
        assert_eq!(repo.export_snapshot().unwrap(), snapshot);
    }

    #[test]
    fn test_restore_drops_exclusions_of_stored_titles() {
        // Older dumps exclude a title on every edit, even when it is kept
        let json = r#"[
            {"model": "releases.game", "pk": 7, "fields": {"date": "2024-05-20", "title": "Edited Game", "platforms": "NS", "votes": 2}},
            {"model": "releases.blacklistedgame", "pk": 1, "fields": {"title": "Edited Game"}},
            {"model": "releases.blacklistedgame", "pk": 2, "fields": {"title": "Deleted Game"}}
        ]"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();

        let repo = ReleaseRepository::in_memory().unwrap();
        assert_eq!(repo.import_snapshot(&snapshot).unwrap(), (1, 1));

        let stored = repo.get_release(7).unwrap().unwrap();
        assert_eq!(stored.title, "Edited Game");
        assert!(!repo.is_excluded("Edited Game").unwrap());
        assert!(repo.is_excluded("Deleted Game").unwrap());
        assert_eq!(repo.list_excluded().unwrap().len(), 1);
    }
}
