//! Failure handling: the document on disk must never be left half-updated

use std::sync::{Arc, RwLock};

use cfgsync_core::{Bind, Directory, Error, Failure, ReloadError, Settings, Synchronizer};
use cfgsync_test_utils::TestDocument;
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};

/// Rejects a zero port after binding.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct Listener {
    port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Self { port: 80 }
    }
}

impl Settings for Listener {
    fn reload(&mut self, bind: Bind<'_>) -> Result<(), ReloadError> {
        bind.apply(self)?;
        if self.port == 0 {
            return Err(format!("{}: port must not be zero", bind.title()).into());
        }
        Ok(())
    }
}

fn open(doc: &TestDocument) -> (Directory, Arc<Synchronizer>) {
    let directory = Directory::new();
    let sync = directory.get(doc.path()).unwrap();
    (directory, sync)
}

fn listener() -> Arc<RwLock<Listener>> {
    Arc::new(RwLock::new(Listener::default()))
}

#[test]
fn test_reload_failure_leaves_document_untouched() {
    let doc = TestDocument::new();
    let (_directory, sync) = open(&doc);
    sync.register("http", listener()).unwrap();
    let committed = sync.content();

    let edited = "# hand edit\nhttp:\n  port: 0\nextra: {a: 1}\n";
    doc.write(edited);
    let err = sync.reload().unwrap_err();

    assert_eq!(doc.read(), edited);
    assert_eq!(sync.content(), committed);
    assert!(matches!(err.failures(), [Failure::Reload { title, .. }] if title == "http"));
    assert!(err.to_string().contains("port must not be zero"));
}

#[test]
fn test_decode_failure_leaves_document_untouched() {
    let doc = TestDocument::new();
    let (_directory, sync) = open(&doc);
    sync.register("http", listener()).unwrap();

    let broken = "http:\n  port: [80\n";
    doc.write(broken);
    let err = sync.reload().unwrap_err();

    assert_eq!(doc.read(), broken);
    assert!(matches!(err.failures(), [Failure::Decode { .. }]));
    assert!(err.failures()[0].is_fatal());
}

#[test]
fn test_keys_naming_one_title_leave_document_untouched() {
    let source = "1:\n  a: 1\n'1':\n  b: 2\ntrue: x\n'true': y\n";
    let doc = TestDocument::new().with_content(source);
    let (_directory, sync) = open(&doc);

    let err = sync.reload().unwrap_err();

    assert_eq!(doc.read(), source);
    assert!(matches!(err.failures(), [Failure::Decode { .. }]));
    assert!(err.to_string().contains("more than one key"));
    assert!(sync.other_titles().is_empty());
}

#[test]
fn test_every_reload_failure_is_reported() {
    let doc = TestDocument::new();
    let (_directory, sync) = open(&doc);
    sync.register("http", listener()).unwrap();
    sync.register("https", listener()).unwrap();

    doc.write("http:\n  port: 0\nhttps:\n  port: 0\n");
    let err = sync.reload().unwrap_err();

    let titles: Vec<_> = err
        .failures()
        .iter()
        .map(|failure| match failure {
            Failure::Reload { title, .. } => title.as_str(),
            other => panic!("unexpected failure: {other}"),
        })
        .collect();
    assert_eq!(titles, vec!["http", "https"]);
    assert_eq!(err.to_string().matches("[cfgsync]").count(), 1);
}

#[test]
fn test_failed_registration_is_kept_for_retry() {
    let doc = TestDocument::new().with_content("http:\n  port: 0\n");
    let (_directory, sync) = open(&doc);

    let err = sync.register("http", listener()).unwrap_err();
    assert!(matches!(err, Error::Sync { .. }));
    assert!(sync.is_registered("http"));
    assert_eq!(doc.read(), "http:\n  port: 0\n");

    doc.write("http:\n  port: 8080\n");
    sync.reload().unwrap();
    assert_eq!(doc.read(), "http:\n  port: 8080\n");
}

#[test]
fn test_type_mismatch_in_document_is_a_reload_failure() {
    let doc = TestDocument::new();
    let (_directory, sync) = open(&doc);
    let http = listener();
    sync.register("http", Arc::clone(&http)).unwrap();

    doc.write("http:\n  port: not-a-number\n");
    let err = sync.reload().unwrap_err();

    assert!(matches!(err.failures(), [Failure::Reload { .. }]));
    assert_eq!(http.read().unwrap().port, 80);
    assert_eq!(doc.read(), "http:\n  port: not-a-number\n");
}

#[cfg(unix)]
#[test]
fn test_unwritable_directory_reports_io_failure() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let doc = TestDocument::new();
    let (_directory, sync) = open(&doc);
    sync.register("http", listener()).unwrap();

    let config_dir = doc.path().parent().unwrap().to_path_buf();
    fs::set_permissions(&config_dir, fs::Permissions::from_mode(0o555)).unwrap();

    // Root ignores directory permissions
    let probe = config_dir.join(".probe");
    if fs::write(&probe, "").is_ok() {
        let _ = fs::remove_file(&probe);
        fs::set_permissions(&config_dir, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let err = sync.reload().unwrap_err();
    fs::set_permissions(&config_dir, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(matches!(err.failures(), [Failure::Io(_)]));
    assert_eq!(doc.read(), "http:\n  port: 80\n");
}
