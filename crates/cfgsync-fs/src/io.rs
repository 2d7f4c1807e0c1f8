//! Locked reads and atomic writes for configuration documents

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Line ending used when composing documents on this platform.
#[cfg(windows)]
pub const LINE_END: &str = "\r\n";

/// Line ending used when composing documents on this platform.
#[cfg(not(windows))]
pub const LINE_END: &str = "\n";

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Create the parent directory of `path` if it is missing.
pub fn ensure_parent(path: &NormalizedPath) -> Result<()> {
    let native_path = path.to_native();
    if let Some(parent) = native_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    Ok(())
}

/// Read the whole document, creating an empty file (and its parent
/// directories) when it does not exist yet.
///
/// The read goes through a shared advisory lock on the opened handle so a
/// concurrent [`write_atomic`] from another process is never observed
/// half-way.
pub fn read_or_create(path: &NormalizedPath) -> Result<String> {
    ensure_parent(path)?;
    let native_path = path.to_native();

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&native_path)
        .map_err(|e| Error::io(&native_path, e))?;

    read_locked(&file, &native_path)
}

/// Read the whole document under a shared lock without creating anything.
///
/// A missing document is an [`Error::Io`] with `NotFound`.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    let file = File::open(&native_path).map_err(|e| Error::io(&native_path, e))?;
    read_locked(&file, &native_path)
}

fn read_locked(file: &File, native_path: &Path) -> Result<String> {
    file.lock_shared().map_err(|_| Error::LockFailed {
        path: native_path.to_path_buf(),
    })?;

    // Read through the locked handle to avoid a TOCTOU race
    let mut content = String::new();
    let read = (&*file).read_to_string(&mut content);
    let _ = FileExt::unlock(file);
    read.map_err(|e| Error::io(native_path, e))?;

    Ok(content)
}

/// Replace the document with `content`.
///
/// The bytes go to a locked temp file next to the document, are synced, then
/// renamed over it. Readers see either the old or the new document. On error
/// the temp file is removed and the document is left as it was.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    ensure_parent(path)?;
    let native_path = path.to_native();

    // Temp file lives in the same directory so the rename stays on one filesystem.
    // The sequence number keeps concurrent writers in one process apart.
    let temp_name = format!(
        ".{}.{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id(),
        TEMP_SEQ.fetch_add(1, Ordering::Relaxed)
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    let written = temp_file
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: native_path.clone(),
        })
        .and_then(|()| {
            temp_file
                .write_all(content)
                .map_err(|e| Error::io(&temp_path, e))
        })
        .and_then(|()| temp_file.sync_all().map_err(|e| Error::io(&temp_path, e)));

    let _ = FileExt::unlock(&temp_file);
    drop(temp_file);

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, &native_path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::io(&native_path, e)
    })?;

    tracing::trace!(path = %path, bytes = content.len(), "replaced file atomically");
    Ok(())
}

/// [`write_atomic`] for text.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}
