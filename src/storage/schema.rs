//! SQLite schema definitions for release data
//!
//! Tables:
//! - games: Tracked upcoming releases with vote counters
//! - excluded_titles: Titles removed or renamed by an admin, never re-imported

use rusqlite::{Connection, Result};

/// Create all tables in the database
pub fn create_tables(conn: &Connection) -> Result<()> {
    // Tracked releases
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS games (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            title TEXT NOT NULL UNIQUE,
            platforms TEXT NOT NULL,
            votes INTEGER NOT NULL DEFAULT 0 CHECK (votes >= 0)
        )
        "#,
        [],
    )?;

    // Exclusion list
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS excluded_titles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL UNIQUE
        )
        "#,
        [],
    )?;

    conn.execute("CREATE INDEX IF NOT EXISTS idx_games_date ON games(date)", [])?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_games_votes ON games(votes)", [])?;

    Ok(())
}
