//! Access to the golden documents under `test-fixtures/documents`.

use std::fs;
use std::path::PathBuf;

/// Path to the workspace `test-fixtures` directory.
pub fn fixtures_dir() -> PathBuf {
    // crates/cfgsync-test-utils -> ../../test-fixtures
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures")
}

/// Read `test-fixtures/documents/<name>` with line endings normalised to LF.
///
/// # Panics
/// Panics if the fixture cannot be read.
pub fn load_document(name: &str) -> String {
    let path = fixtures_dir().join("documents").join(name);
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture at {}: {}", path.display(), e));
    normalize_line_endings(&content)
}

/// Normalise line endings to LF for cross-platform comparison.
pub fn normalize_line_endings(s: &str) -> String {
    s.replace("\r\n", "\n")
}
