//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// cfgsync - Inspect and normalize YAML configuration documents
#[derive(Parser, Debug)]
#[command(name = "cfgsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Rewrite a document in normalized form and print it
    ///
    /// Runs one synchronization cycle with nothing registered, so every
    /// section is rewritten after the divider in title order and comments
    /// are dropped. The file is created when missing.
    Normalize {
        /// Path of the document
        file: PathBuf,
    },

    /// Print one section of a document without modifying it
    ///
    /// Examples:
    ///   cfgsync get config/config.yaml server
    ///   cfgsync get config/config.yaml server --json
    Get {
        /// Path of the document
        file: PathBuf,

        /// Section title
        section: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List the section titles of a document without modifying it
    Sections {
        /// Path of the document
        file: PathBuf,
    },

    /// Reload documents on SIGHUP and report every reload
    Watch {
        /// Paths of the documents
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_get_with_json() {
        let cli = Cli::parse_from(["cfgsync", "get", "app.yaml", "server", "--json"]);
        assert_eq!(
            cli.command,
            Some(Commands::Get {
                file: PathBuf::from("app.yaml"),
                section: "server".into(),
                json: true,
            })
        );
    }

    #[test]
    fn parse_verbose_after_subcommand() {
        let cli = Cli::parse_from(["cfgsync", "normalize", "app.yaml", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn watch_requires_a_file() {
        assert!(Cli::try_parse_from(["cfgsync", "watch"]).is_err());
    }

    #[test]
    fn parse_no_command() {
        let cli = Cli::parse_from(["cfgsync"]);
        assert!(cli.command.is_none());
    }
}
