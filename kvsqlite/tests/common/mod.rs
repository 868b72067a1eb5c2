//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use kvsqlite::{Codec, Db, Options};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A fresh directory plus the path of a not-yet-created store inside it.
pub fn temp_store() -> (TempDir, PathBuf) {
    init_tracing();
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("store.db");
    (dir, path)
}

/// Opens `path` with default options.
pub fn open<K: Codec, V: Codec>(path: impl AsRef<std::path::Path>) -> Db<K, V> {
    Db::open(&Options::default(), path).expect("open store")
}
