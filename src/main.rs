// src/main.rs

use braglog::cli::{Cli, Commands};
use braglog::commands;
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let db = cli.db.as_deref();
    let result = match cli.command {
        Commands::Init => commands::handle_init(db),
        Commands::Log {
            message,
            tags,
            project,
        } => commands::handle_log(db, message, tags, project),
        Commands::Tags => commands::handle_tags(db),
        Commands::Projects => commands::handle_projects(db),
        Commands::List { num } => commands::handle_list(db, num),
        Commands::Last => commands::handle_last(db),
        Commands::Import { file } => commands::handle_import(db, &file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // RUST_LOG wins over -v
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
