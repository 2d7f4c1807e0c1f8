//! Synchronizer: the read, dispatch, write and rollback cycle for one document
//!
//! A cycle runs under the synchronizer's write lock:
//!
//! 1. read the document (creating it when absent) and decode it
//! 2. dispatch the reload callback of every registered section in scope
//! 3. re-encode every registered section from its settings object
//! 4. keep every other section as it was decoded
//! 5. write registered sections, the divider, then other sections
//!
//! Any failure after the read restores the file to the text that was read,
//! and the in-memory state keeps the last committed snapshot.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use cfgsync_fs::{NormalizedPath, io};
use serde::{Serialize, de::DeserializeOwned};
use serde_yaml::Value;
use tracing::{debug, info};

use crate::codec::{self, Document};
use crate::registry::{Registry, SettingsEntry};
use crate::section::{self, Section};
use crate::settings::{Bind, Settings};
use crate::{Error, Failure, Result};

/// Keeps one configuration document and its registered settings in sync.
///
/// Obtain instances through [`Directory::get`](crate::Directory::get) so that
/// a document is never driven by two synchronizers.
#[derive(Debug)]
pub struct Synchronizer {
    path: NormalizedPath,
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    registry: Registry,
    document: Document,
    registered: Vec<Section>,
    other: Vec<Section>,
    content: String,
}

/// Outcome of a successful cycle, committed into [`State`] as a whole.
struct Snapshot {
    document: Document,
    registered: Vec<Section>,
    other: Vec<Section>,
    content: String,
}

/// Which registered sections get their reload callback run.
#[derive(Debug, Clone, Copy)]
enum Scope<'a> {
    All,
    Only(&'a str),
}

impl Scope<'_> {
    fn includes(&self, title: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => *only == title,
        }
    }
}

impl Synchronizer {
    pub(crate) fn new(path: NormalizedPath) -> Self {
        Self {
            path,
            state: RwLock::new(State::default()),
        }
    }

    /// Absolute path of the document.
    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    /// Register `settings` as the owner of section `title` and synchronize.
    ///
    /// Only this section's reload callback runs; other registered sections
    /// are re-read and re-written without being dispatched. The registration
    /// is kept even when the cycle fails, so the next reload retries it.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidSettings`] if the value does not encode as a mapping
    /// - [`Error::DuplicateRegistration`] if `title` is already registered
    /// - [`Error::Sync`] if the cycle failed and the document was rolled back
    pub fn register<T: Settings>(&self, title: &str, settings: Arc<RwLock<T>>) -> Result<()> {
        let entry = SettingsEntry::new(settings);
        entry.check_shape(title)?;

        let mut state = self.write_state();
        state.registry.insert(title, Box::new(entry))?;
        debug!(path = %self.path, title, "registered settings section");

        self.cycle(&mut state, Scope::Only(title))
    }

    /// Like [`register`](Self::register), but panics on error.
    ///
    /// Meant for configuration the program cannot start without.
    pub fn must_register<T: Settings>(&self, title: &str, settings: Arc<RwLock<T>>) {
        if let Err(e) = self.register(title, settings) {
            panic!("{e}");
        }
    }

    /// Re-read the document and reload every registered section.
    pub fn reload(&self) -> Result<()> {
        let mut state = self.write_state();
        self.cycle(&mut state, Scope::All)
    }

    /// Read and decode the document as it is on disk, without a cycle.
    ///
    /// Nothing is created, dispatched or written, and the committed state is
    /// left alone.
    pub fn read_document(&self) -> Result<Document> {
        let text = io::read_text(&self.path).map_err(|e| self.failed(vec![e.into()]))?;
        codec::decode_document(&self.path, &text).map_err(|f| self.failed(vec![f]))
    }

    /// The document text as last written by a successful cycle.
    pub fn content(&self) -> String {
        self.read_state().content.clone()
    }

    /// Current value of a section.
    ///
    /// A registered section reports its settings object's in-memory state;
    /// any other section reports the value last read from the document.
    pub fn get_section(&self, title: &str) -> Option<Value> {
        let state = self.read_state();
        if let Some(entry) = state.registry.get(title) {
            match entry.snapshot() {
                Ok(value) => return Some(value),
                Err(e) => {
                    debug!(path = %self.path, title, error = %e, "falling back to decoded section");
                }
            }
        }
        state.document.get(title).cloned()
    }

    /// Overlay a copy of section `title` onto `target`.
    ///
    /// For read access without owning the section. Returns `false` and leaves
    /// `target` untouched when the section does not exist.
    pub fn bind_section<T>(&self, title: &str, target: &mut T) -> Result<bool>
    where
        T: Serialize + DeserializeOwned,
    {
        let state = self.read_state();
        let Some(section) = state
            .registered
            .iter()
            .chain(state.other.iter())
            .find(|section| section.title() == title)
        else {
            return Ok(false);
        };

        codec::bind_into(section.single(), target).map_err(|source| Error::Bind {
            title: title.to_string(),
            source,
        })?;
        Ok(true)
    }

    /// Titles of the registered sections, sorted.
    pub fn titles(&self) -> Vec<String> {
        self.read_state().registry.titles()
    }

    /// Titles of the sections present in the document that nobody
    /// registered, sorted.
    pub fn other_titles(&self) -> Vec<String> {
        self.read_state()
            .other
            .iter()
            .map(|section| section.title().to_string())
            .collect()
    }

    /// Whether `title` has a registered settings object.
    pub fn is_registered(&self, title: &str) -> bool {
        self.read_state().registry.contains(title)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn cycle(&self, state: &mut State, scope: Scope<'_>) -> Result<()> {
        debug!(path = %self.path, ?scope, "reading config document");
        let original = io::read_or_create(&self.path).map_err(|e| self.failed(vec![e.into()]))?;

        match self.run(&state.registry, &original, scope) {
            Ok(snapshot) => {
                info!(
                    path = %self.path,
                    registered = snapshot.registered.len(),
                    other = snapshot.other.len(),
                    "config document synchronized"
                );
                state.document = snapshot.document;
                state.registered = snapshot.registered;
                state.other = snapshot.other;
                state.content = snapshot.content;
                Ok(())
            }
            Err(failures) => {
                self.rollback(&original);
                Err(self.failed(failures))
            }
        }
    }

    fn run(
        &self,
        registry: &Registry,
        original: &str,
        scope: Scope<'_>,
    ) -> std::result::Result<Snapshot, Vec<Failure>> {
        let document = codec::decode_document(&self.path, original).map_err(|f| vec![f])?;

        let mut reload_failures = Vec::new();
        for (title, entry) in registry.iter().filter(|(title, _)| scope.includes(title)) {
            let raw = document
                .get(title)
                .map(codec::encode)
                .transpose()
                .map_err(|source| vec![encode_failure(title, source)])?;

            debug!(path = %self.path, title, present = raw.is_some(), "dispatching reload");
            if let Err(source) = entry.dispatch(Bind::new(title, raw.as_deref())) {
                reload_failures.push(Failure::Reload {
                    title: title.to_string(),
                    source,
                });
            }
        }

        let registered = registry
            .iter()
            .map(|(title, entry)| {
                entry
                    .snapshot()
                    .and_then(|value| Section::from_value(title, &value))
                    .map_err(|source| encode_failure(title, source))
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|f| vec![f])?;

        let other = document
            .iter()
            .filter(|(title, _)| !registry.contains(title))
            .map(|(title, value)| {
                Section::from_value(title.as_str(), value)
                    .map_err(|source| encode_failure(title, source))
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|f| vec![f])?;

        if !reload_failures.is_empty() {
            return Err(reload_failures);
        }

        let content = section::compose(&registered, &other);
        debug!(path = %self.path, bytes = content.len(), "writing config document");
        io::write_text(&self.path, &content).map_err(|e| vec![e.into()])?;

        Ok(Snapshot {
            document,
            registered,
            other,
            content,
        })
    }

    /// Best-effort restore of the text read at the start of the cycle.
    fn rollback(&self, original: &str) {
        match io::write_text(&self.path, original) {
            Ok(()) => debug!(path = %self.path, "rolled back config document"),
            Err(e) => debug!(path = %self.path, error = %e, "rollback failed"),
        }
    }

    fn failed(&self, failures: Vec<Failure>) -> Error {
        Error::Sync {
            path: self.path.clone(),
            failures,
        }
    }
}

fn encode_failure(title: &str, source: serde_yaml::Error) -> Failure {
    Failure::Encode {
        title: title.to_string(),
        source,
    }
}
