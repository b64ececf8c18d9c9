#![allow(dead_code)]

use embedroute::dispatcher::{DispatchOutcome, Dispatcher};
use embedroute::server::RecordingSink;
use embedroute::static_files::{AssetSource, MemoryTable};
use http::Method;
use std::fs;
use tempfile::TempDir;

/// Memory source from `(path, bytes)` pairs.
pub fn memory_source(entries: &[(&'static str, &'static [u8])]) -> AssetSource {
    let mut table = MemoryTable::new();
    for (path, data) in entries {
        table.insert(*path, *data);
    }
    AssetSource::memory(table)
}

/// Temporary directory holding `(relative path, contents)` files.
pub fn fs_tree(entries: &[(&str, &[u8])]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, data) in entries {
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, data).unwrap();
    }
    dir
}

/// Dispatch into a fresh recording sink.
pub fn dispatch(dispatcher: &Dispatcher, method: Method, raw: &str) -> (DispatchOutcome, RecordingSink) {
    let mut sink = RecordingSink::new();
    let outcome = dispatcher.dispatch(&method, raw, &mut sink);
    (outcome, sink)
}

pub fn get(dispatcher: &Dispatcher, raw: &str) -> (DispatchOutcome, RecordingSink) {
    dispatch(dispatcher, Method::GET, raw)
}
