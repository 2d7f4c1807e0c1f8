//! Process-wide directory of synchronizers, one per document path

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use cfgsync_fs::NormalizedPath;
use tracing::debug;

use crate::{Error, Result, Synchronizer};

static GLOBAL: LazyLock<Arc<Directory>> = LazyLock::new(|| Arc::new(Directory::new()));

/// Maps absolute document paths to their [`Synchronizer`].
///
/// Entries are created on first lookup and live as long as the directory.
/// The lock is held only to look up or create an entry and while
/// [`reload_all`](Self::reload_all) fans out, never across an individual
/// cycle started through a synchronizer.
#[derive(Debug, Default)]
pub struct Directory {
    synchronizers: Mutex<BTreeMap<NormalizedPath, Arc<Synchronizer>>>,
}

impl Directory {
    /// Create an empty directory.
    ///
    /// Most programs use [`Directory::global`]; separate instances are
    /// useful for tests and embedding.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide directory, created on first use.
    pub fn global() -> &'static Arc<Directory> {
        &GLOBAL
    }

    /// Get the synchronizer for `path`, creating it if needed.
    ///
    /// Equivalent spellings of one path resolve to the same synchronizer.
    pub fn get(&self, path: impl AsRef<Path>) -> Result<Arc<Synchronizer>> {
        let path = NormalizedPath::absolute(path).map_err(Error::PathResolution)?;

        let mut synchronizers = self.lock();
        let synchronizer = synchronizers.entry(path).or_insert_with_key(|path| {
            debug!(path = %path, "opening config document");
            Arc::new(Synchronizer::new(path.clone()))
        });
        Ok(Arc::clone(synchronizer))
    }

    /// Like [`get`](Self::get), but panics on error.
    pub fn must_get(&self, path: impl AsRef<Path>) -> Arc<Synchronizer> {
        match self.get(path) {
            Ok(synchronizer) => synchronizer,
            Err(e) => panic!("{e}"),
        }
    }

    /// Paths of every known document, sorted.
    pub fn paths(&self) -> Vec<NormalizedPath> {
        self.lock().keys().cloned().collect()
    }

    /// Number of known documents.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Reload every known document in path order.
    ///
    /// A failing document does not stop the others; all errors are returned
    /// together.
    pub fn reload_all(&self) -> Result<()> {
        let synchronizers = self.lock();
        let errors: Vec<Error> = synchronizers
            .values()
            .filter_map(|synchronizer| synchronizer.reload().err())
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::ReloadAll { errors })
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<NormalizedPath, Arc<Synchronizer>>> {
        self.synchronizers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
