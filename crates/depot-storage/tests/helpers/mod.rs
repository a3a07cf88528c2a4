//! Test helpers: scripted backends and request bodies for integration tests.
//!
//! Run from workspace root: `cargo test -p depot-storage`.
#![allow(dead_code)]

pub mod fixtures;
pub mod mock_backend;

use std::sync::Arc;

use depot_core::StorageConfig;
use depot_storage::{FileStore, ObjectBackend, ObjectStoreBackend};

/// File store over a fresh in-memory backend.
pub fn memory_store() -> FileStore {
    FileStore::with_backend(
        StorageConfig::in_memory(),
        Arc::new(ObjectStoreBackend::in_memory("depot-test")),
    )
}

/// File store over an arbitrary backend with default settings.
pub fn store_with(backend: Arc<dyn ObjectBackend>) -> FileStore {
    FileStore::with_backend(StorageConfig::in_memory(), backend)
}
