// src/import.rs

//! Replacing the whole store with an external file.
//!
//! The import runs validate → backup → detach → replace → reattach. The
//! current file is copied aside before anything is touched, and the copy is
//! used to restore the store if the replace step leaves no file behind.

use crate::db::Store;
use crate::error::{BragLogError, Result};
use crate::migrations;
use chrono::{DateTime, Local};
use rusqlite::backup::Backup;
use rusqlite::{Connection, OpenFlags};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Timestamp part of backup names, in local time (yyyyMMdd-HHmmss).
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

const SQLITE_HEADER: &[u8] = b"SQLite format 3\0";

/// SQLite files that may sit next to the database and belong to it.
const SIDECAR_SUFFIXES: &[&str] = &["-journal", "-wal", "-shm"];

/// File-system operations used by [`ImportCoordinator`].
pub trait FileOps {
    /// Copies `from` to `to`.
    fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Replaces `target` with a copy of `source`.
    fn replace(&self, source: &Path, target: &Path) -> io::Result<()>;
}

/// [`FileOps`] on the local disk. `replace` snapshots the source with the
/// SQLite online backup API into a temp file next to the target and renames
/// it into place, so the target is never missing and rows still sitting in
/// the source's `-wal` file are carried over. The target keeps its file mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileOps;

impl FileOps for LocalFileOps {
    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::copy(from, to).map(|_| ())
    }

    fn replace(&self, source: &Path, target: &Path) -> io::Result<()> {
        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let source_meta = std::fs::metadata(source)?;
        let tmp = tempfile::NamedTempFile::new_in(dir)?;
        // An empty file is an empty database; nothing to snapshot.
        if source_meta.len() > 0 {
            snapshot(source, tmp.path()).map_err(sqlite_io)?;
        }

        let permissions = match std::fs::metadata(target) {
            Ok(meta) => meta.permissions(),
            Err(_) => source_meta.permissions(),
        };
        tmp.as_file().set_permissions(permissions)?;
        tmp.as_file().sync_all()?;
        tmp.persist(target).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Copies every committed page of `source`, including pages only present in
/// its write-ahead log, into the database file at `dest`.
fn snapshot(source: &Path, dest: &Path) -> rusqlite::Result<()> {
    let src = Connection::open_with_flags(source, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let mut dst = Connection::open(dest)?;
    {
        let backup = Backup::new(&src, &mut dst)?;
        backup.run_to_completion(256, Duration::ZERO, None)?;
    }
    // the store itself runs in rollback-journal mode
    dst.pragma_update(None, "journal_mode", "DELETE")?;
    dst.close().map_err(|(_, e)| e)?;
    Ok(())
}

fn sqlite_io(e: rusqlite::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}

/// `<name>.backup.<yyyyMMdd-HHmmss>` next to `target`.
pub fn backup_path(target: &Path, at: &DateTime<Local>) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "log.db".to_string());
    target.with_file_name(format!(
        "{}.backup.{}",
        name,
        at.format(BACKUP_TIMESTAMP_FORMAT)
    ))
}

/// Like [`backup_path`], with `-1`, `-2`, ... appended while the name is taken.
fn unused_backup_path(target: &Path, at: &DateTime<Local>) -> PathBuf {
    let base = backup_path(target, at);
    let mut candidate = base.clone();
    let mut n = 1;
    while candidate.exists() {
        let mut name = base.clone().into_os_string();
        name.push(format!("-{}", n));
        candidate = PathBuf::from(name);
        n += 1;
    }
    candidate
}

/// Removes stale journal files left next to `target`. Failures are logged
/// and otherwise ignored.
fn remove_sidecars(target: &Path) {
    for suffix in SIDECAR_SUFFIXES {
        let mut name = target.as_os_str().to_os_string();
        name.push(suffix);
        let sidecar = PathBuf::from(name);
        if sidecar.exists() {
            match std::fs::remove_file(&sidecar) {
                Ok(()) => debug!(path = %sidecar.display(), "Removed stale sidecar"),
                Err(e) => warn!(path = %sidecar.display(), error = %e, "Could not remove sidecar"),
            }
        }
    }
}

/// Replaces a store's backing file with another database file.
pub struct ImportCoordinator<'a, F: FileOps = LocalFileOps> {
    store: &'a mut Store,
    fs: F,
}

impl<'a> ImportCoordinator<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self::with_file_ops(store, LocalFileOps)
    }
}

impl<'a, F: FileOps> ImportCoordinator<'a, F> {
    pub fn with_file_ops(store: &'a mut Store, fs: F) -> Self {
        ImportCoordinator { store, fs }
    }

    /// Replaces the store's contents with those of `source`.
    ///
    /// On success the store is open on the imported data, migrated to the
    /// current schema. Whatever was there before survives only in the
    /// backup file.
    pub fn import_from(&mut self, source: impl AsRef<Path>) -> Result<()> {
        let source = source.as_ref();
        let target = self.validate(source)?;
        info!(source = %source.display(), target = %target.display(), "Importing database");

        let backup = self.backup(&target)?;

        self.store.close();
        remove_sidecars(&target);

        if let Err(e) = self.fs.replace(source, &target) {
            warn!(error = %e, "Copying the import into place failed");
            self.roll_back(&target, backup.as_deref());
            return Err(BragLogError::ImportCopyFailed(e.to_string()));
        }

        self.store.reopen()?;
        info!(target = %target.display(), "Import complete");
        Ok(())
    }

    /// Checks the source without touching anything; returns the store's path.
    fn validate(&self, source: &Path) -> Result<PathBuf> {
        let invalid = BragLogError::ImportValidationFailed;
        let target = self
            .store
            .path()
            .ok_or_else(|| invalid("in-memory stores cannot import".to_string()))?
            .to_path_buf();

        let meta = std::fs::metadata(source)
            .map_err(|e| invalid(format!("{}: {}", source.display(), e)))?;
        if !meta.is_file() {
            return Err(invalid(format!("{} is not a file", source.display())));
        }

        let mut header = Vec::with_capacity(SQLITE_HEADER.len());
        File::open(source)
            .and_then(|f| f.take(SQLITE_HEADER.len() as u64).read_to_end(&mut header))
            .map_err(|e| invalid(format!("{} is not readable: {}", source.display(), e)))?;
        if !header.is_empty() && header != SQLITE_HEADER {
            return Err(invalid(format!(
                "{} is not a SQLite database",
                source.display()
            )));
        }

        let version = Connection::open_with_flags(source, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .and_then(|conn| migrations::schema_version(&conn))
            .map_err(|e| invalid(format!("{} is not a SQLite database: {}", source.display(), e)))?;
        if version > migrations::CURRENT_VERSION {
            return Err(invalid(format!(
                "{} has schema version {} (newest supported is {})",
                source.display(),
                version,
                migrations::CURRENT_VERSION
            )));
        }

        if target.exists() {
            let same = match (source.canonicalize(), target.canonicalize()) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            };
            if same {
                return Err(invalid("source is the store's own file".to_string()));
            }
        }

        Ok(target)
    }

    /// Copies the current file aside, if there is one.
    fn backup(&self, target: &Path) -> Result<Option<PathBuf>> {
        if !target.exists() {
            return Ok(None);
        }
        let backup = unused_backup_path(target, &Local::now());
        self.fs
            .copy(target, &backup)
            .map_err(|e| BragLogError::ImportBackupFailed(e.to_string()))?;
        info!(backup = %backup.display(), "Backed up current database");
        Ok(Some(backup))
    }

    /// Best effort: put the backup back if the target is gone, then reopen
    /// whatever is at the path.
    fn roll_back(&mut self, target: &Path, backup: Option<&Path>) {
        if let Some(backup) = backup {
            if !target.exists() {
                match self.fs.replace(backup, target) {
                    Ok(()) => info!(backup = %backup.display(), "Restored database from backup"),
                    Err(e) => warn!(error = %e, "Restoring from backup failed"),
                }
            }
        }
        if let Err(e) = self.store.reopen() {
            warn!(error = %e, "Could not reopen store after failed import");
        }
    }
}

impl Store {
    /// Shorthand for [`ImportCoordinator::import_from`] with local file operations.
    pub fn import_from(&mut self, source: impl AsRef<Path>) -> Result<()> {
        ImportCoordinator::new(self).import_from(source)
    }
}
