//! Bidirectional synchronization between YAML documents and typed settings
//!
//! Application modules register typed settings objects under named
//! sections of a shared YAML document. Every synchronization cycle:
//!
//! - **Reads** the document, creating it when absent
//! - **Reloads** registered settings from their sections through
//!   [`Settings::reload`]
//! - **Writes** the document back, registered sections first (encoded from
//!   the settings objects, so new fields and defaults appear in the file)
//!   and sections nobody registered after a divider comment, unchanged
//! - **Rolls back** the file to what was read if anything failed
//!
//! # Architecture
//!
//! ```text
//!        Directory  (path -> Synchronizer, process-wide or explicit)
//!            |
//!       Synchronizer  (one document, one lock, the cycle)
//!        |        |
//!   Registry    codec / section  (serde_yaml values, text layout)
//!        |
//!   Settings objects (Arc<RwLock<T>>, owned by the caller)
//!
//!   ReloadTrigger  (SIGHUP / requests -> Directory::reload_all -> Notifier)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::{Arc, RwLock};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! #[serde(default)]
//! struct Server { host: String, port: u16 }
//!
//! impl cfgsync_core::Settings for Server {}
//!
//! fn main() -> cfgsync_core::Result<()> {
//!     let server = Arc::new(RwLock::new(Server { host: "localhost".into(), port: 8080 }));
//!     cfgsync_core::register("server", Arc::clone(&server))?;
//!     cfgsync_core::install_signal_reload()?;
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod directory;
pub mod error;
pub mod logging;
mod registry;
pub mod section;
pub mod settings;
pub mod synchronizer;
pub mod trigger;

use std::path::Path;
use std::sync::{Arc, RwLock};

pub use directory::Directory;
pub use error::{Error, Failure, ReloadError, Result};
pub use section::{DIVIDER, Section};
pub use settings::{Bind, Settings};
pub use synchronizer::Synchronizer;
pub use trigger::{
    NOTIFY_CAPACITY, Notifier, ReloadNotice, ReloadSource, ReloadTrigger, install_signal_reload,
};

/// Document used by the shortcut functions, relative to the working directory.
pub const DEFAULT_DOCUMENT: &str = "config/config.yaml";

/// Get the synchronizer for `path` from the global directory.
pub fn get(path: impl AsRef<Path>) -> Result<Arc<Synchronizer>> {
    Directory::global().get(path)
}

/// Like [`get`], but panics on error.
pub fn must_get(path: impl AsRef<Path>) -> Arc<Synchronizer> {
    Directory::global().must_get(path)
}

/// The synchronizer for [`DEFAULT_DOCUMENT`].
pub fn default_document() -> Result<Arc<Synchronizer>> {
    get(DEFAULT_DOCUMENT)
}

/// Register `settings` under `title` in the default document.
pub fn register<T: Settings>(title: &str, settings: Arc<RwLock<T>>) -> Result<()> {
    default_document()?.register(title, settings)
}

/// Like [`register`], but panics on error.
pub fn must_register<T: Settings>(title: &str, settings: Arc<RwLock<T>>) {
    must_get(DEFAULT_DOCUMENT).must_register(title, settings)
}

/// Reload the default document.
pub fn reload() -> Result<()> {
    default_document()?.reload()
}

/// Reload every document known to the global directory.
pub fn reload_all() -> Result<()> {
    Directory::global().reload_all()
}

/// Current text of the default document.
pub fn content() -> Result<String> {
    Ok(default_document()?.content())
}
