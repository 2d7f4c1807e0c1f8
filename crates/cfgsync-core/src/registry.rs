//! Registry of settings objects bound to one document

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde_yaml::Value;

use crate::settings::{Bind, Settings};
use crate::{Error, ReloadError, Result, codec};

/// Type-erased handle to a caller-owned settings object.
pub(crate) trait Entry: Send + Sync {
    /// Run the settings object's reload callback.
    fn dispatch(&self, bind: Bind<'_>) -> std::result::Result<(), ReloadError>;

    /// Encode the settings object's current state.
    fn snapshot(&self) -> std::result::Result<Value, serde_yaml::Error>;

    fn type_name(&self) -> &'static str;
}

/// Shared handle registered by the caller.
pub(crate) struct SettingsEntry<T> {
    settings: Arc<RwLock<T>>,
}

impl<T: Settings> SettingsEntry<T> {
    pub(crate) fn new(settings: Arc<RwLock<T>>) -> Self {
        Self { settings }
    }

    /// Reject values that do not encode as a mapping.
    pub(crate) fn check_shape(&self, title: &str) -> Result<()> {
        let invalid = |shape| Error::InvalidSettings {
            title: title.to_string(),
            type_name: std::any::type_name::<T>(),
            shape,
        };
        match self.snapshot() {
            Ok(Value::Mapping(_)) => Ok(()),
            Ok(other) => Err(invalid(codec::shape_of(&other))),
            Err(_) => Err(invalid("an unencodable value")),
        }
    }
}

impl<T: Settings> Entry for SettingsEntry<T> {
    fn dispatch(&self, bind: Bind<'_>) -> std::result::Result<(), ReloadError> {
        let mut settings = self
            .settings
            .write()
            .map_err(|_| format!("settings for section '{}' are poisoned", bind.title()))?;
        settings.reload(bind)
    }

    fn snapshot(&self) -> std::result::Result<Value, serde_yaml::Error> {
        let settings = self.settings.read().unwrap_or_else(PoisonError::into_inner);
        serde_yaml::to_value(&*settings)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Section title to settings object, ordered by title.
#[derive(Default)]
pub(crate) struct Registry {
    entries: BTreeMap<String, Box<dyn Entry>>,
}

impl Registry {
    /// Insert a new entry. An existing title is never overwritten.
    pub(crate) fn insert(&mut self, title: &str, entry: Box<dyn Entry>) -> Result<()> {
        if self.entries.contains_key(title) {
            return Err(Error::DuplicateRegistration {
                title: title.to_string(),
                type_name: entry.type_name(),
            });
        }
        self.entries.insert(title.to_string(), entry);
        Ok(())
    }

    pub(crate) fn get(&self, title: &str) -> Option<&dyn Entry> {
        self.entries.get(title).map(|entry| &**entry)
    }

    pub(crate) fn contains(&self, title: &str) -> bool {
        self.entries.contains_key(title)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &dyn Entry)> {
        self.entries
            .iter()
            .map(|(title, entry)| (title.as_str(), &**entry))
    }

    pub(crate) fn titles(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v.type_name())))
            .finish()
    }
}
