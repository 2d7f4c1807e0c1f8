//! Concurrency scenarios: many threads driving the same documents

use std::sync::{Arc, RwLock};
use std::thread;

use cfgsync_core::{Directory, Settings};
use cfgsync_test_utils::TestDocument;
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct Worker {
    id: usize,
    threads: u32,
}

impl Settings for Worker {}

#[test]
fn test_concurrent_registrations_all_land() {
    let doc = TestDocument::new();
    let directory = Arc::new(Directory::new());

    let handles: Vec<_> = (0..8)
        .map(|id| {
            let directory = Arc::clone(&directory);
            let path = doc.path().to_path_buf();
            thread::spawn(move || {
                let worker = Arc::new(RwLock::new(Worker { id, threads: 2 }));
                directory
                    .get(&path)
                    .unwrap()
                    .register(&format!("worker{id}"), worker)
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let sync = directory.get(doc.path()).unwrap();
    let expected: Vec<String> = (0..8).map(|id| format!("worker{id}")).collect();
    assert_eq!(sync.titles(), expected);

    let decoded: serde_yaml::Value = serde_yaml::from_str(&doc.read()).unwrap();
    for id in 0..8 {
        assert_eq!(
            decoded[format!("worker{id}").as_str()]["id"],
            serde_yaml::Value::from(id as u64)
        );
    }
}

#[test]
fn test_concurrent_reloads_keep_document_stable() {
    let doc = TestDocument::new().with_content("shared:\n  threads: 4\nextra:\n  note: keep\n");
    let directory = Arc::new(Directory::new());
    let sync = directory.get(doc.path()).unwrap();
    let worker = Arc::new(RwLock::new(Worker::default()));
    sync.register("shared", Arc::clone(&worker)).unwrap();
    let settled = doc.read();

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let directory = Arc::clone(&directory);
            thread::spawn(move || {
                for _ in 0..20 {
                    directory.reload_all().unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(doc.read(), settled);
    assert_eq!(worker.read().unwrap().threads, 4);
}

#[test]
fn test_readers_never_see_partial_content() {
    let doc = TestDocument::new();
    let directory = Arc::new(Directory::new());
    let sync = directory.get(doc.path()).unwrap();
    for id in 0..4 {
        sync.register(
            &format!("worker{id}"),
            Arc::new(RwLock::new(Worker { id, threads: 1 })),
        )
        .unwrap();
    }
    let complete = sync.content();

    let reloader = {
        let sync = Arc::clone(&sync);
        thread::spawn(move || {
            for _ in 0..50 {
                sync.reload().unwrap();
            }
        })
    };
    for _ in 0..200 {
        assert_eq!(sync.content(), complete);
    }
    reloader.join().unwrap();
}
