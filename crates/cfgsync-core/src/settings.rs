//! The reload protocol between a document and its settings objects

use serde::{Serialize, de::DeserializeOwned};

use crate::{ReloadError, codec};

/// A typed configuration section owned by an application module.
///
/// The value is serialized to produce its section in the document, so field
/// names and options (rename, skip-if-default, flatten, ...) come from serde
/// attributes. Fields that may be missing from the document need
/// `#[serde(default)]`.
///
/// `reload` is called with a [`Bind`] over the section's current content.
/// Implementations decide when to call [`Bind::apply`], which lets them run
/// setup before their fields are overwritten or validate afterwards. The
/// default implementation only binds.
///
/// `reload` runs while the owning document is locked for the cycle, so it
/// must not call back into the same [`Synchronizer`](crate::Synchronizer).
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// #[serde(default)]
/// struct Server { host: String, port: u16 }
///
/// impl Settings for Server {
///     fn reload(&mut self, bind: Bind<'_>) -> Result<(), ReloadError> {
///         bind.apply(self)?;
///         if self.port == 0 {
///             return Err("port must not be zero".into());
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Settings: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Load or reload this section.
    fn reload(&mut self, bind: Bind<'_>) -> Result<(), ReloadError> {
        bind.apply(self)
    }
}

/// Binds one section's canonical YAML into a settings object.
#[derive(Debug, Clone, Copy)]
pub struct Bind<'a> {
    title: &'a str,
    raw: Option<&'a str>,
}

impl<'a> Bind<'a> {
    pub(crate) fn new(title: &'a str, raw: Option<&'a str>) -> Self {
        Self { title, raw }
    }

    /// Title of the section being reloaded.
    pub fn title(&self) -> &'a str {
        self.title
    }

    /// Whether the document currently contains this section.
    pub fn is_present(&self) -> bool {
        self.raw.is_some()
    }

    /// The section's canonical YAML, if present.
    pub fn raw(&self) -> Option<&'a str> {
        self.raw
    }

    /// Overlay the section onto `target`.
    ///
    /// Keys missing from the document keep the target's current values. Does
    /// nothing when the section is absent.
    pub fn apply<T>(&self, target: &mut T) -> Result<(), ReloadError>
    where
        T: Serialize + DeserializeOwned,
    {
        match self.raw {
            Some(raw) => Ok(codec::bind_into(raw, target)?),
            None => Ok(()),
        }
    }
}
