//! Commands that print a document or part of it
//!
//! `normalize` runs a cycle and rewrites the file. `get` and `sections` only
//! read it.

use std::path::Path;

use cfgsync_core::codec::Document;
use colored::Colorize;

use crate::error::{CliError, Result};

fn read_document(file: &Path) -> Result<Document> {
    Ok(cfgsync_core::get(file)?.read_document()?)
}

/// Run the normalize command
pub fn run_normalize(file: &Path) -> Result<()> {
    let sync = cfgsync_core::get(file)?;
    sync.reload()?;
    print!("{}", sync.content());
    Ok(())
}

/// Run the get command
pub fn run_get(file: &Path, section: &str, json: bool) -> Result<()> {
    let document = read_document(file)?;
    let value = document.get(section).ok_or_else(|| {
        CliError::user(format!(
            "Section '{}' not found in {}",
            section,
            file.display()
        ))
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", serde_yaml::to_string(value)?);
    }
    Ok(())
}

/// Run the sections command
pub fn run_sections(file: &Path) -> Result<()> {
    let document = read_document(file)?;

    if document.is_empty() {
        eprintln!("{} {} has no sections", "note:".yellow().bold(), file.display());
        return Ok(());
    }

    for title in document.keys() {
        println!("{}", title.green());
    }
    Ok(())
}
