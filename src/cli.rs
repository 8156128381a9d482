// src/cli.rs

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "braglog - record what you did, one line at a time",
    long_about = "braglog keeps short, optionally tagged entries in a local SQLite file. Entries can be grouped by project, and a whole log file can be imported to replace the current one (a backup is kept next to it)."
)]
pub struct Cli {
    /// Database file. Use ":memory:" for a throwaway store.
    #[arg(long, global = true, env = "BRAGLOG_DB", value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// No log output on stderr
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Creates the database if needed and brings its schema up to date.
    Init,

    /// Records a new entry.
    /// If no message is provided via -m, it opens the default editor.
    Log {
        #[arg(short, long, help = "A short, one-line message for the entry")]
        message: Option<String>,
        #[arg(short, long, help = "Comma-separated tags, e.g. \"Code,Review\"")]
        tags: Option<String>,
        #[arg(short, long, help = "Project the entry belongs to")]
        project: Option<String>,
    },

    /// Lists every tag ever used.
    Tags,

    /// Lists every project ever used.
    Projects,

    /// Shows the most recent entries.
    List {
        #[arg(short, long, help = "Show latest N entries (default: 10)")]
        num: Option<u32>,
    },

    /// Shows the stored tags and project of the most recent entry, as written.
    Last,

    /// Replaces the whole log with another database file.
    Import {
        #[arg(help = "The .db file to import")]
        file: PathBuf,
    },
}
