// src/shared.rs

//! A [`Store`] behind a mutex, for callers on more than one thread.

use crate::db::Store;
use crate::error::{BragLogError, Result};
use crate::models::{LogEntry, Project, Tag};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Cloneable handle that serializes every operation on one [`Store`].
///
/// The lock is held for the whole operation, so an import never interleaves
/// with a read or a write.
#[derive(Debug, Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<Store>>,
}

impl SharedStore {
    pub fn new(store: Store) -> Self {
        SharedStore {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Store::open(path)?))
    }

    /// Locks the store. A caller that panicked while holding the lock
    /// poisons it for good.
    fn lock(&self) -> Result<MutexGuard<'_, Store>> {
        self.inner.lock().map_err(|_| BragLogError::StorePoisoned)
    }

    pub fn fetch_all_tags(&self) -> Result<Vec<Tag>> {
        self.lock()?.fetch_all_tags()
    }

    pub fn fetch_all_projects(&self) -> Result<Vec<Project>> {
        self.lock()?.fetch_all_projects()
    }

    pub fn save_entry(&self, message: &str, tags: &[&str], project: Option<&str>) -> Result<i64> {
        self.lock()?
            .save_entry(message, tags, project)
    }

    pub fn fetch_last_log_raw_tags(&self) -> Result<Option<String>> {
        self.lock()?.fetch_last_log_raw_tags()
    }

    pub fn fetch_last_log_raw_project(&self) -> Result<Option<String>> {
        self.lock()?
            .fetch_last_log_raw_project()
    }

    pub fn fetch_recent_entries(&self, limit: u32) -> Result<Vec<LogEntry>> {
        self.lock()?.fetch_recent_entries(limit)
    }

    pub fn import_from(&self, source: impl AsRef<Path>) -> Result<()> {
        self.lock()?.import_from(source)
    }

    pub fn close(&self) -> Result<()> {
        self.lock()?.close();
        Ok(())
    }
}
