//! [`TestDocument`] builder for synchronization scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::fixtures;

/// A config document inside its own temporary directory.
///
/// The file itself is not created until [`write`](Self::write) is called, so
/// tests can also exercise the create-on-first-read path.
///
/// # Example
///
/// ```rust,no_run
/// use cfgsync_test_utils::TestDocument;
///
/// let doc = TestDocument::new().with_content("server:\n  port: 80\n");
/// doc.assert_contains("port: 80");
/// ```
pub struct TestDocument {
    temp_dir: TempDir,
    path: PathBuf,
}

impl Default for TestDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDocument {
    /// A document at `<tempdir>/config/config.yaml` that does not exist yet.
    pub fn new() -> Self {
        Self::named("config/config.yaml")
    }

    /// A document at `<tempdir>/<relative>` that does not exist yet.
    pub fn named(relative: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(relative);
        Self { temp_dir, path }
    }

    /// Write `content` to the document, creating parent directories.
    pub fn with_content(self, content: &str) -> Self {
        self.write(content);
        self
    }

    /// Start from `test-fixtures/documents/<name>`.
    pub fn from_fixture(name: &str) -> Self {
        Self::new().with_content(&fixtures::load_document(name))
    }

    /// Root of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Another path inside the same temporary directory.
    pub fn sibling(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Overwrite the document.
    pub fn write(&self, content: &str) {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&self.path, content).unwrap();
    }

    /// Current document text with line endings normalised to LF.
    ///
    /// # Panics
    /// Panics if the document cannot be read.
    pub fn read(&self) -> String {
        let content = fs::read_to_string(&self.path)
            .unwrap_or_else(|_| panic!("Could not read document: {}", self.path.display()));
        fixtures::normalize_line_endings(&content)
    }

    /// Whether the document exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Assert that the document contains `content`.
    ///
    /// # Panics
    /// Panics if the document cannot be read or does not contain `content`.
    pub fn assert_contains(&self, content: &str) {
        let actual = self.read();
        assert!(
            actual.contains(content),
            "Document {} does not contain expected content.\nExpected: {}\nActual: {}",
            self.path.display(),
            content,
            actual
        );
    }

    /// Assert that the document does **not** contain `content`.
    ///
    /// # Panics
    /// Panics if the document cannot be read or contains `content`.
    pub fn assert_not_contains(&self, content: &str) {
        let actual = self.read();
        assert!(
            !actual.contains(content),
            "Document {} unexpectedly contains: {}\nActual: {}",
            self.path.display(),
            content,
            actual
        );
    }
}
