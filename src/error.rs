// src/error.rs

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BragLogError {
    #[error("Open failed: {0}")]
    OpenFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Import rejected: {0}")]
    ImportValidationFailed(String),

    #[error("Backup failed: {0}")]
    ImportBackupFailed(String),

    #[error("Import failed: {0}")]
    ImportCopyFailed(String),

    #[error("Store is closed")]
    StoreClosed,

    #[error("Store lock poisoned by a panicked caller")]
    StorePoisoned,

    #[error("Application data directory not found")]
    DataDirNotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

impl BragLogError {
    pub(crate) fn open(e: impl std::fmt::Display) -> Self {
        BragLogError::OpenFailed(e.to_string())
    }

    pub(crate) fn migration(e: impl std::fmt::Display) -> Self {
        BragLogError::MigrationFailed(e.to_string())
    }

    pub(crate) fn query(e: impl std::fmt::Display) -> Self {
        BragLogError::QueryFailed(e.to_string())
    }

    pub(crate) fn write(e: impl std::fmt::Display) -> Self {
        BragLogError::WriteFailed(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BragLogError>;
