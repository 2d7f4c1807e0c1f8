//! Command implementations for cfgsync-cli

pub mod inspect;
pub mod watch;

pub use inspect::{run_get, run_normalize, run_sections};
pub use watch::run_watch;
