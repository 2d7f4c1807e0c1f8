//! Error types for cfgsync-fs

use std::path::PathBuf;

/// Result type for cfgsync-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Filesystem failures while reading or writing a config document
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Opening, reading, writing or renaming failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The advisory file lock could not be taken
    #[error("could not lock {path}")]
    LockFailed { path: PathBuf },

    /// The document path could not be made absolute
    #[error("cannot resolve document path {path}: {source}")]
    PathResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
