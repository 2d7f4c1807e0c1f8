//! cfgsync CLI
//!
//! Inspect, normalize and watch YAML configuration documents.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    cfgsync_core::logging::init(level).map_err(|e| CliError::user(e.to_string()))?;
    tracing::debug!("Verbose mode enabled");

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} YAML config synchronizer", "cfgsync".green().bold());
            println!();
            println!("Run {} for available commands.", "cfgsync --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Normalize { file } => commands::run_normalize(&file),
        Commands::Get {
            file,
            section,
            json,
        } => commands::run_get(&file, &section, json),
        Commands::Sections { file } => commands::run_sections(&file),
        Commands::Watch { files } => commands::run_watch(&files),
    }
}
