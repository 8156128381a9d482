// src/db.rs

use crate::error::{BragLogError, Result};
use crate::migrations;
use crate::models::{LogEntry, Project, Tag};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Path that selects an ephemeral, in-memory store.
pub const MEMORY_PATH: &str = ":memory:";

/// Standard location of the log file (<data dir>/BragLog/log.db)
pub fn default_db_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or(BragLogError::DataDirNotFound)?;
    Ok(data_dir.join("BragLog").join("log.db"))
}

/// Trims every tag and drops the ones left empty. Order and duplicates are kept.
pub fn normalize_tags<'a>(tags: &[&'a str]) -> Vec<&'a str> {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Trims the project name; blank means no project.
pub fn normalize_project(project: Option<&str>) -> Option<&str> {
    project.map(str::trim).filter(|p| !p.is_empty())
}

/// Owner of the single database connection.
///
/// Every operation on a closed store fails with [`BragLogError::StoreClosed`].
/// The store does no locking of its own; see [`crate::shared::SharedStore`]
/// for a handle that can be used from several threads.
#[derive(Debug)]
pub struct Store {
    path: Option<PathBuf>,
    conn: Option<Connection>,
}

impl Store {
    /// Opens (creating if needed) the store at `path` and migrates it.
    /// The literal path `:memory:` opens an in-memory store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path == Path::new(MEMORY_PATH) {
            return Self::open_in_memory();
        }
        let conn = connect(Some(path))?;
        info!(path = %path.display(), "Opened store");
        Ok(Store {
            path: Some(path.to_path_buf()),
            conn: Some(conn),
        })
    }

    /// Opens the store at [`default_db_path`].
    pub fn open_default() -> Result<Self> {
        Self::open(default_db_path()?)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = connect(None)?;
        Ok(Store {
            path: None,
            conn: Some(conn),
        })
    }

    /// Backing file, or `None` for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_in_memory(&self) -> bool {
        self.path.is_none()
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Releases the connection. Closing twice is harmless.
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_, e)) = conn.close() {
                warn!(error = %e, "Connection did not close cleanly");
            }
            debug!("Closed store");
        }
    }

    /// Connects again to the backing file and migrates it.
    pub(crate) fn reopen(&mut self) -> Result<()> {
        self.close();
        self.conn = Some(connect(self.path.as_deref())?);
        debug!("Reopened store");
        Ok(())
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(BragLogError::StoreClosed)
    }

    fn conn_mut(&mut self) -> Result<&mut Connection> {
        self.conn.as_mut().ok_or(BragLogError::StoreClosed)
    }

    pub fn schema_version(&self) -> Result<i64> {
        migrations::schema_version(self.conn()?).map_err(BragLogError::query)
    }

    /// All tags, ordered case-insensitively. Case variants sort adjacent,
    /// uppercase first.
    pub fn fetch_all_tags(&self) -> Result<Vec<Tag>> {
        let names = self.fetch_names("SELECT name FROM tag ORDER BY name COLLATE NOCASE, name")?;
        Ok(names.into_iter().map(|name| Tag { name }).collect())
    }

    /// All projects, in the same order as [`Store::fetch_all_tags`].
    pub fn fetch_all_projects(&self) -> Result<Vec<Project>> {
        let names =
            self.fetch_names("SELECT name FROM project ORDER BY name COLLATE NOCASE, name")?;
        Ok(names.into_iter().map(|name| Project { name }).collect())
    }

    fn fetch_names(&self, sql: &str) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql).map_err(BragLogError::query)?;
        let names = stmt
            .query_map([], |row| row.get(0))
            .map_err(BragLogError::query)?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(BragLogError::query)?;
        Ok(names)
    }

    /// Records one entry and registers its tags and project.
    ///
    /// An empty `tags` slice and a blank `project` are stored as NULL.
    /// All three inserts commit together or not at all. Returns the new
    /// entry's id.
    pub fn save_entry(&mut self, message: &str, tags: &[&str], project: Option<&str>) -> Result<i64> {
        let message = message.trim();
        if message.is_empty() {
            return Err(BragLogError::InvalidInput(
                "message must not be empty".to_string(),
            ));
        }
        let tags = normalize_tags(tags);
        let project = normalize_project(project);
        let raw_tags = if tags.is_empty() {
            None
        } else {
            Some(tags.join(","))
        };

        let conn = self.conn_mut()?;
        let tx = conn.transaction().map_err(BragLogError::write)?;
        {
            let mut insert_tag = tx
                .prepare("INSERT OR IGNORE INTO tag (name) VALUES (?1)")
                .map_err(BragLogError::write)?;
            for tag in &tags {
                insert_tag.execute(params![tag]).map_err(BragLogError::write)?;
            }
        }
        if let Some(p) = project {
            tx.execute("INSERT OR IGNORE INTO project (name) VALUES (?1)", params![p])
                .map_err(BragLogError::write)?;
        }
        tx.execute(
            "INSERT INTO logs (message, tags, project) VALUES (?1, ?2, ?3)",
            params![message, raw_tags, project],
        )
        .map_err(BragLogError::write)?;
        let id = tx.last_insert_rowid();
        tx.commit().map_err(BragLogError::write)?;

        debug!(id, tags = tags.len(), project = project.is_some(), "Saved entry");
        Ok(id)
    }

    /// Raw `tags` value of the newest entry.
    pub fn fetch_last_log_raw_tags(&self) -> Result<Option<String>> {
        self.fetch_last_raw("SELECT tags FROM logs ORDER BY id DESC LIMIT 1")
    }

    /// Raw `project` value of the newest entry.
    pub fn fetch_last_log_raw_project(&self) -> Result<Option<String>> {
        self.fetch_last_raw("SELECT project FROM logs ORDER BY id DESC LIMIT 1")
    }

    fn fetch_last_raw(&self, sql: &str) -> Result<Option<String>> {
        let value: Option<Option<String>> = self
            .conn()?
            .query_row(sql, [], |row| row.get(0))
            .optional()
            .map_err(BragLogError::query)?;
        Ok(value.flatten())
    }

    /// The `limit` newest entries, newest first.
    pub fn fetch_recent_entries(&self, limit: u32) -> Result<Vec<LogEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, message, tags, project, created_at FROM logs ORDER BY id DESC LIMIT ?1",
            )
            .map_err(BragLogError::query)?;
        let logs = stmt
            .query_map([limit], |row| {
                Ok(LogEntry {
                    id: row.get(0)?,
                    message: row.get(1)?,
                    tags: row.get(2)?,
                    project: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })
            .map_err(BragLogError::query)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(BragLogError::query)?;
        Ok(logs)
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        self.close();
    }
}

/// Opens a connection (in memory when `path` is `None`) and migrates it.
fn connect(path: Option<&Path>) -> Result<Connection> {
    let mut conn = match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(BragLogError::open)?;
                }
            }
            Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
            )
            .map_err(BragLogError::open)?
        }
        None => Connection::open_in_memory().map_err(BragLogError::open)?,
    };
    migrations::migrate(&mut conn)?;
    Ok(conn)
}
