//! Local event log stored in a single SQLite file.
//!
//! [`Store`] owns the connection and migrates the file on open,
//! [`ImportCoordinator`] swaps the whole file for another one, and
//! [`SharedStore`] serializes access from several threads.

pub mod cli;
pub mod commands;
pub mod db;
pub mod error;
pub mod import;
pub mod migrations;
pub mod models;
pub mod shared;

pub use db::Store;
pub use error::{BragLogError, Result};
pub use import::ImportCoordinator;
pub use models::{LogEntry, Project, Tag};
pub use shared::SharedStore;
