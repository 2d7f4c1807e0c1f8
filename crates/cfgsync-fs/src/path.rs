//! Normalized document paths
//!
//! Documents are keyed by path, so two spellings of one file must compare
//! equal. Paths are kept with forward slashes and cleaned lexically.

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A cleaned, forward-slash path used as a document key.
///
/// Converted back to a native path only for I/O.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Clean `path` without touching the filesystem.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: clean(&path_str.replace('\\', "/")),
        }
    }

    /// Resolve a path to its absolute, cleaned form.
    ///
    /// Relative paths are resolved against the current working directory.
    /// The file does not need to exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathResolution`] if the working directory cannot be
    /// determined.
    pub fn absolute(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let absolute = std::path::absolute(path).map_err(|source| Error::PathResolution {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(dunce::simplified(&absolute)))
    }

    /// The cleaned forward-slash form.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Native path for I/O.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    pub fn is_absolute(&self) -> bool {
        self.inner.starts_with('/') || has_drive_prefix(&self.inner)
    }
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Lexically clean a forward-slash path.
///
/// An empty path becomes `.`. Empty and `.` components are dropped and `..`
/// pops the previous normal component, but never climbs above the root of an
/// absolute path. A leading `//` (network share) is kept.
fn clean(path: &str) -> String {
    let (prefix, rest) = if path.starts_with("//") && !path.starts_with("///") {
        ("//", &path[2..])
    } else if path.starts_with('/') {
        ("/", path.trim_start_matches('/'))
    } else {
        ("", path)
    };

    let mut parts: Vec<&str> = Vec::new();
    for component in rest.split('/') {
        match component {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." && !has_drive_prefix(last) => {
                    parts.pop();
                }
                Some(&last) if has_drive_prefix(last) => {}
                _ if !prefix.is_empty() => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    match (prefix, body.is_empty()) {
        ("", true) => ".".to_string(),
        (p, true) => p.to_string(),
        (p, false) => format!("{p}{body}"),
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}
