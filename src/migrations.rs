// src/migrations.rs

//! Linear schema migrations tracked by `PRAGMA user_version`.
//!
//! Step `n` brings a file from version `n - 1` to `n`. Every step only uses
//! `CREATE ... IF NOT EXISTS`, so re-applying it to a file that already has
//! the tables is a no-op.

use crate::error::{BragLogError, Result};
use rusqlite::Connection;
use tracing::{debug, info};

struct Migration {
    version: i64,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: "
        CREATE TABLE IF NOT EXISTS logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            message TEXT NOT NULL,
            tags TEXT,
            project TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
        CREATE TABLE IF NOT EXISTS tag (
            name TEXT PRIMARY KEY
        );
        CREATE TABLE IF NOT EXISTS project (
            name TEXT PRIMARY KEY
        );
    ",
}];

/// Newest schema version this build understands.
pub const CURRENT_VERSION: i64 = 1;

/// Reads the persisted schema version counter (0 for a brand-new file).
pub fn schema_version(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}

/// Applies every pending step in order.
///
/// Each step and its counter bump share one transaction. A file recorded at
/// a version newer than [`CURRENT_VERSION`] is rejected as incompatible.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    let mut current = schema_version(conn).map_err(BragLogError::migration)?;
    if current > CURRENT_VERSION {
        return Err(BragLogError::MigrationFailed(format!(
            "incompatible schema version {} (newest supported is {})",
            current, CURRENT_VERSION
        )));
    }

    for migration in MIGRATIONS {
        if migration.version <= current {
            continue;
        }
        info!(version = migration.version, "Applying migration");
        let tx = conn.transaction().map_err(BragLogError::migration)?;
        tx.execute_batch(migration.sql)
            .map_err(BragLogError::migration)?;
        tx.execute_batch(&format!("PRAGMA user_version = {}", migration.version))
            .map_err(BragLogError::migration)?;
        tx.commit().map_err(BragLogError::migration)?;
        current = migration.version;
    }

    debug!(version = current, "Schema up to date");
    Ok(())
}
