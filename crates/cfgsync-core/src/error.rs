//! Error types for cfgsync-core

use std::fmt::Display;

use cfgsync_fs::{LINE_END, NormalizedPath};

/// Result type for cfgsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by a settings object from its reload callback.
pub type ReloadError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced to callers of cfgsync-core.
///
/// Every message carries the `[cfgsync]` prefix so configuration failures
/// stand out from the caller's own errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document path could not be made absolute
    #[error("[cfgsync] {0}")]
    PathResolution(#[source] cfgsync_fs::Error),

    /// A second settings object was registered under an existing title
    #[error("[cfgsync] multiple registration of section '{title}': {type_name} rejected")]
    DuplicateRegistration {
        title: String,
        type_name: &'static str,
    },

    /// The settings value does not encode as a struct-like mapping
    #[error(
        "[cfgsync] settings for section '{title}' must be a struct or map, {type_name} encodes as {shape}"
    )]
    InvalidSettings {
        title: String,
        type_name: &'static str,
        shape: &'static str,
    },

    /// A synchronization cycle failed; the document was rolled back
    #[error("[cfgsync] {}", join(.failures))]
    Sync {
        path: NormalizedPath,
        failures: Vec<Failure>,
    },

    /// One or more documents failed during a reload of every document
    #[error("{}", join(.errors))]
    ReloadAll { errors: Vec<Error> },

    /// The reload worker could not be started
    #[error("[cfgsync] failed to start reload trigger: {0}")]
    Trigger(#[source] std::io::Error),

    /// A section could not be bound into a caller-supplied target
    #[error("[cfgsync] failed to bind section '{title}': {source}")]
    Bind {
        title: String,
        #[source]
        source: serde_yaml::Error,
    },
}

impl Error {
    /// The individual failures of a synchronization cycle, if this is one.
    pub fn failures(&self) -> &[Failure] {
        match self {
            Self::Sync { failures, .. } => failures,
            _ => &[],
        }
    }
}

/// A single fault inside a synchronization cycle.
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    /// The document could not be decoded into titled sections
    #[error("failed to decode {path}: {message}")]
    Decode {
        path: NormalizedPath,
        message: String,
    },

    /// A settings object reported an error from its reload callback
    #[error("section '{title}' reload failed: {source}")]
    Reload {
        title: String,
        #[source]
        source: ReloadError,
    },

    /// A section value could not be encoded
    #[error("failed to encode section '{title}': {source}")]
    Encode {
        title: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// Reading, writing or locking the document failed
    #[error(transparent)]
    Io(#[from] cfgsync_fs::Error),
}

impl Failure {
    /// Fatal failures abort the cycle immediately; reload failures are
    /// collected until every section has been dispatched.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Reload { .. })
    }
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(LINE_END)
}
