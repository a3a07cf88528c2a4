//! Mock backend implementation for testing

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use depot_core::constants::OBJECT_KIND;
use depot_core::{ObjectMetadata, SignedAction, StorageBackend};
use depot_storage::{
    BackendError, BackendResult, BackendStream, ByteStream, ObjectBackend, WriteOptions,
};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Script {
    /// Status returned by every metadata lookup.
    metadata_status: Option<u16>,
    /// Status returned by every write.
    write_status: Option<u16>,
    /// Kind reported for stored objects.
    kind: Option<String>,
}

/// Mock backend that stores objects in memory and can be told to fail.
#[derive(Clone, Default)]
pub struct MockBackend {
    files: Arc<Mutex<HashMap<String, (Vec<u8>, ObjectMetadata)>>>,
    script: Arc<Mutex<Script>>,
    metadata_calls: Arc<AtomicUsize>,
    read_calls: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every metadata lookup fail with `status`.
    pub fn fail_metadata(&self, status: u16) {
        self.script.lock().unwrap().metadata_status = Some(status);
    }

    /// Make every write fail with `status`.
    pub fn fail_writes(&self, status: u16) {
        self.script.lock().unwrap().write_status = Some(status);
    }

    /// Report stored objects with a different kind marker.
    pub fn report_kind(&self, kind: &str) {
        self.script.lock().unwrap().kind = Some(kind.to_string());
    }

    pub fn set_file(&self, path: &str, data: &[u8]) {
        let metadata = self.describe(path, data.len() as u64, &WriteOptions::default());
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), (data.to_vec(), metadata));
    }

    pub fn remove_file(&self, path: &str) {
        self.files.lock().unwrap().remove(path);
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    pub fn get_file(&self, path: &str) -> Option<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|(data, _)| data.clone())
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    /// Number of times an object body has been opened.
    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    fn describe(&self, path: &str, size: u64, options: &WriteOptions) -> ObjectMetadata {
        ObjectMetadata {
            kind: OBJECT_KIND.to_string(),
            bucket: "mock-bucket".to_string(),
            path: path.to_string(),
            size,
            content_type: options.content_type.clone(),
            etag: Some(format!("\"{}\"", size)),
            updated: Utc::now(),
            metadata: options.metadata.clone(),
        }
    }
}

#[async_trait]
impl ObjectBackend for MockBackend {
    async fn write(
        &self,
        path: &str,
        mut body: ByteStream,
        options: WriteOptions,
    ) -> BackendResult<u64> {
        let write_status = self.script.lock().unwrap().write_status;
        if let Some(status) = write_status {
            return Err(BackendError::new(Some(status), "write rejected"));
        }

        let mut data = Vec::new();
        while let Some(chunk) = body.next().await {
            data.extend_from_slice(&chunk?);
        }

        let size = data.len() as u64;
        let metadata = self.describe(path, size, &options);
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), (data, metadata));
        Ok(size)
    }

    async fn metadata(&self, path: &str) -> BackendResult<ObjectMetadata> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);

        let script = self.script.lock().unwrap();
        if let Some(status) = script.metadata_status {
            return Err(BackendError::new(
                Some(status),
                format!("metadata failed ({})", status),
            ));
        }

        let mut metadata = self
            .files
            .lock()
            .unwrap()
            .get(path)
            .map(|(_, metadata)| metadata.clone())
            .ok_or_else(|| BackendError::not_found(path))?;
        if let Some(kind) = &script.kind {
            metadata.kind = kind.clone();
        }
        Ok(metadata)
    }

    async fn read(&self, path: &str) -> BackendResult<BackendStream> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);

        let data = self
            .get_file(path)
            .ok_or_else(|| BackendError::not_found(path))?;
        let chunks: Vec<BackendResult<Bytes>> = data
            .chunks(4)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        Ok(stream::iter(chunks).boxed())
    }

    async fn signed_url(
        &self,
        path: &str,
        action: SignedAction,
        expires_in: Duration,
    ) -> BackendResult<String> {
        let method = match action {
            SignedAction::Write => "PUT",
            SignedAction::Read => "GET",
        };
        Ok(format!(
            "https://mock.example/{}?method={}&expires={}",
            path,
            method,
            expires_in.as_secs()
        ))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
