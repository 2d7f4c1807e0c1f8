//! End-to-end integration test for several modules sharing documents
//!
//! Mirrors a program where independent modules each register their own
//! section in `config/config.yaml` at startup, and the main module registers
//! one settings object in two documents.

use std::sync::{Arc, RwLock};

use cfgsync_core::{Directory, Settings};
use cfgsync_test_utils::TestDocument;
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};

mod module_1 {
    use super::*;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct T1 {
        #[serde(rename = "a", skip_serializing_if = "is_zero")]
        pub f: i64,
        pub b: i64,
    }

    fn is_zero(v: &i64) -> bool {
        *v == 0
    }

    impl Settings for T1 {}

    pub fn init(directory: &Directory, doc: &TestDocument) -> Arc<RwLock<T1>> {
        let settings = Arc::new(RwLock::new(T1 { f: 1, b: 2 }));
        directory
            .must_get(doc.path())
            .must_register("section1", Arc::clone(&settings));
        settings
    }
}

mod module_2 {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct T2 {
        pub x: String,
        pub y: Vec<String>,
        pub z: Vec<i64>,
        pub n: bool,
    }

    impl Default for T2 {
        fn default() -> Self {
            Self {
                x: "xxx".into(),
                y: vec!["x".into(), "y".into(), "z".into()],
                z: vec![1, 2, 3],
                n: false,
            }
        }
    }

    impl Settings for T2 {}

    pub fn init(directory: &Directory, doc: &TestDocument) -> Arc<RwLock<T2>> {
        let settings = Arc::new(RwLock::new(T2::default()));
        directory
            .must_get(doc.path())
            .must_register("section2", Arc::clone(&settings));
        settings
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct Main {
    c: String,
    #[serde(flatten)]
    t1: module_1::T1,
}

impl Settings for Main {}

#[test]
fn test_modules_share_one_document() {
    let doc = TestDocument::new();
    let directory = Directory::new();

    let t1 = module_1::init(&directory, &doc);
    let t2 = module_2::init(&directory, &doc);

    let main = Arc::new(RwLock::new(Main {
        c: "c".into(),
        t1: module_1::T1 { f: 0, b: 2 },
    }));
    directory
        .must_get(doc.path())
        .must_register("section", Arc::clone(&main));

    let config3 = doc.sibling("config/config3.yaml");
    directory
        .must_get(&config3)
        .must_register("section", Arc::clone(&main));

    assert_eq!(
        doc.read(),
        "section:\n  c: c\n  b: 2\n\n\
         section1:\n  a: 1\n  b: 2\n\n\
         section2:\n  x: xxx\n  y:\n  - x\n  - y\n  - z\n  z:\n  - 1\n  - 2\n  - 3\n  n: false\n"
    );
    assert_eq!(
        std::fs::read_to_string(&config3).unwrap().replace("\r\n", "\n"),
        "section:\n  c: c\n  b: 2\n"
    );
    assert_eq!(*t1.read().unwrap(), module_1::T1 { f: 1, b: 2 });
    assert_eq!(*t2.read().unwrap(), module_2::T2::default());
}

#[test]
fn test_edits_flow_to_every_module_on_reload_all() {
    let doc = TestDocument::new();
    let directory = Directory::new();
    let t1 = module_1::init(&directory, &doc);
    let t2 = module_2::init(&directory, &doc);

    doc.write(
        "section1:\n  a: 10\n  b: 20\n\
         section2:\n  x: edited\n  n: true\n\
         notes:\n  owner: ops\n",
    );
    directory.reload_all().unwrap();

    assert_eq!(*t1.read().unwrap(), module_1::T1 { f: 10, b: 20 });
    let t2 = t2.read().unwrap();
    assert_eq!(t2.x, "edited");
    assert!(t2.n);
    assert_eq!(t2.z, vec![1, 2, 3]);

    doc.assert_contains("# ------------------------- non-registered sections");
    doc.assert_contains("notes:\n  owner: ops\n");
}

#[test]
fn test_document_written_by_one_process_is_read_by_another() {
    let doc = TestDocument::new();

    let first = Directory::new();
    module_2::init(&first, &doc);
    let written = doc.read();

    // A fresh directory stands in for a restarted program
    let second = Directory::new();
    let t2 = module_2::init(&second, &doc);

    assert_eq!(doc.read(), written);
    assert_eq!(*t2.read().unwrap(), module_2::T2::default());
}
