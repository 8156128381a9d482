// src/commands.rs

use crate::db::{self, Store};
use crate::error::{BragLogError, Result};
use std::env;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

fn resolve_path(db_path: Option<&Path>) -> Result<PathBuf> {
    match db_path {
        Some(p) => Ok(p.to_path_buf()),
        None => db::default_db_path(),
    }
}

fn open_store(db_path: Option<&Path>) -> Result<Store> {
    match db_path {
        Some(p) => Store::open(p),
        None => Store::open_default(),
    }
}

/// Handles 'init'
pub fn handle_init(db_path: Option<&Path>) -> Result<()> {
    let path = resolve_path(db_path)?;
    let store = Store::open(&path)?;
    println!(
        "✓ Database ready at: {} (schema v{})",
        path.display(),
        store.schema_version()?
    );
    Ok(())
}

/// Handles 'log'
pub fn handle_log(
    db_path: Option<&Path>,
    message: Option<String>,
    tags: Option<String>,
    project: Option<String>,
) -> Result<()> {
    let content = match message {
        Some(msg) => msg,
        None => read_from_editor()?,
    };

    if content.trim().is_empty() {
        eprintln!("Empty log, skipped.");
        return Ok(());
    }

    let tag_list: Vec<&str> = tags.as_deref().map(|t| t.split(',').collect()).unwrap_or_default();
    let mut store = open_store(db_path)?;
    let id = store.save_entry(&content, &tag_list, project.as_deref())?;

    println!("✓ Log #{} recorded.", id);
    Ok(())
}

fn read_from_editor() -> Result<String> {
    let temp_file = tempfile::NamedTempFile::new()?;
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let status = Command::new(&editor).arg(temp_file.path()).status()?;

    if !status.success() {
        return Err(BragLogError::InvalidInput(format!(
            "editor '{}' exited with {}",
            editor, status
        )));
    }
    let mut buf = String::new();
    temp_file.reopen()?.read_to_string(&mut buf)?;
    Ok(buf)
}

/// Handles 'tags'
pub fn handle_tags(db_path: Option<&Path>) -> Result<()> {
    let store = open_store(db_path)?;
    for tag in store.fetch_all_tags()? {
        println!("{}", tag.name);
    }
    Ok(())
}

/// Handles 'projects'
pub fn handle_projects(db_path: Option<&Path>) -> Result<()> {
    let store = open_store(db_path)?;
    for project in store.fetch_all_projects()? {
        println!("{}", project.name);
    }
    Ok(())
}

/// Handles 'list'
pub fn handle_list(db_path: Option<&Path>, num: Option<u32>) -> Result<()> {
    let store = open_store(db_path)?;
    let logs = store.fetch_recent_entries(num.unwrap_or(10))?;

    if logs.is_empty() {
        println!("No logs found.");
        return Ok(());
    }

    for log in logs {
        let tags_display = log.tags.map_or(String::new(), |t| format!(" | Tags: {}", t));
        let project_display = log
            .project
            .map_or(String::new(), |p| format!(" | Project: {}", p));
        println!("[{}] {}{}{}", log.id, log.created_at, project_display, tags_display);
        println!("{}", log.message);
        println!("{}", "─".repeat(40));
    }
    Ok(())
}

/// Handles 'last'
pub fn handle_last(db_path: Option<&Path>) -> Result<()> {
    let store = open_store(db_path)?;
    let tags = store.fetch_last_log_raw_tags()?;
    let project = store.fetch_last_log_raw_project()?;
    println!("tags: {}", tags.as_deref().unwrap_or("(null)"));
    println!("project: {}", project.as_deref().unwrap_or("(null)"));
    Ok(())
}

/// Handles 'import'
pub fn handle_import(db_path: Option<&Path>, file: &Path) -> Result<()> {
    let mut store = open_store(db_path)?;
    store.import_from(file)?;
    let tags = store.fetch_all_tags()?.len();
    println!("✓ Imported {} ({} tags).", file.display(), tags);
    Ok(())
}
