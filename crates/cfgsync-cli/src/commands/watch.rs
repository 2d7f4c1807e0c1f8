//! The watch command: reload on SIGHUP until interrupted

use std::path::Path;

use cfgsync_core::Notifier;
use colored::Colorize;

use crate::error::{CliError, Result};

/// Run the watch command
pub fn run_watch(files: &[impl AsRef<Path>]) -> Result<()> {
    for file in files {
        cfgsync_core::get(file)?.reload()?;
    }

    let mut notices = Notifier::global()
        .subscribe()
        .ok_or_else(|| CliError::user("Reload notices already have a subscriber"))?;
    cfgsync_core::install_signal_reload()?;

    println!(
        "{} {} document(s). Send SIGHUP to pid {} to reload.",
        "Watching".cyan().bold(),
        files.len(),
        std::process::id()
    );

    while let Some(notice) = notices.blocking_recv() {
        if notice.is_ok() {
            println!("{} {}", "ok".green().bold(), notice);
        } else {
            println!("{} {}", "failed".red().bold(), notice);
        }
    }
    Ok(())
}
