//! Streaming uploads and downloads.
//!
//! Uploads run as a spawned task that pipes the caller's body into the backend and
//! reports exactly once through a oneshot channel. Downloads resolve metadata first
//! and hand back a lazily-opened body stream.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use depot_core::constants::NAME_METADATA_FIELD;
use depot_core::{FileKey, ObjectMetadata, UploadedObject};
use futures::{stream, Stream, StreamExt, TryStreamExt};
use tokio::sync::oneshot;

use crate::keys::{generate_key, object_path};
use crate::traits::{
    BackendError, BodyStream, ByteStream, ObjectBackend, StorageError, StorageResult, WriteOptions,
};

/// Outcome of a download lookup.
///
/// Missing objects, objects the credentials may not read and entries that are not
/// regular objects all resolve to `NotFound`; only unexpected failures are errors.
#[derive(Debug)]
pub enum Download {
    Found(StoredObject),
    /// Carries a human-readable message naming the key.
    NotFound(String),
}

impl Download {
    fn not_found(key: &FileKey) -> Self {
        Download::NotFound(format!("No such file: {}.", key))
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Download::Found(_))
    }

    pub fn found(self) -> Option<StoredObject> {
        match self {
            Download::Found(object) => Some(object),
            Download::NotFound(_) => None,
        }
    }
}

/// A stored object resolved by [`TransferController::download`].
///
/// The body is not opened until [`StoredObject::stream`] or [`StoredObject::bytes`]
/// is called.
pub struct StoredObject {
    key: FileKey,
    path: String,
    metadata: ObjectMetadata,
    backend: Arc<dyn ObjectBackend>,
}

impl StoredObject {
    pub fn key(&self) -> &FileKey {
        &self.key
    }

    pub fn metadata(&self) -> &ObjectMetadata {
        &self.metadata
    }

    pub fn into_metadata(self) -> ObjectMetadata {
        self.metadata
    }

    /// Open the object body as a byte stream.
    pub fn stream(&self) -> BodyStream {
        let backend = self.backend.clone();
        let path = self.path.clone();
        let key = self.key.clone();

        stream::once(async move { backend.read(&path).await })
            .try_flatten()
            .map_err(move |source| StorageError::DownloadFailed {
                key: key.clone(),
                source,
            })
            .boxed()
    }

    /// Collect the whole body into memory.
    pub async fn bytes(&self) -> StorageResult<Bytes> {
        let chunks: Vec<Bytes> = self.stream().try_collect().await?;
        Ok(Bytes::from(chunks.concat()))
    }
}

impl fmt::Debug for StoredObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredObject")
            .field("key", &self.key)
            .field("path", &self.path)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Moves object bodies between callers and the backend.
#[derive(Clone)]
pub struct TransferController {
    backend: Arc<dyn ObjectBackend>,
}

impl TransferController {
    pub fn new(backend: Arc<dyn ObjectBackend>) -> Self {
        TransferController { backend }
    }

    /// Stream `body` into a new object named after `filename`.
    ///
    /// A fresh key is generated for every call, and the original `filename` is
    /// recorded as the object's `name` metadata. Resolves once the write completes
    /// and the backend has reported the object's metadata.
    ///
    /// # Errors
    /// * [`StorageError::UploadFailed`] when the body or the write fails
    /// * [`StorageError::MetadataFailed`] when the bytes were written but the
    ///   resulting metadata could not be read back
    pub async fn upload<S>(
        &self,
        filename: &str,
        body: S,
        mime_type: Option<&str>,
    ) -> StorageResult<UploadedObject>
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        let key = generate_key(filename);
        let options = WriteOptions {
            content_type: mime_type.map(String::from),
            metadata: HashMap::from([(NAME_METADATA_FIELD.to_string(), filename.to_string())]),
        };

        let (tx, rx) = oneshot::channel();
        let backend = self.backend.clone();
        let task_key = key.clone();
        let body = body.boxed();

        tokio::spawn(async move {
            let outcome = store(backend, task_key, body, options).await;
            // The caller may have gone away; the object is stored regardless.
            let _ = tx.send(outcome);
        });

        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(StorageError::UploadFailed {
                key,
                source: BackendError::new(None, "upload task ended without a result"),
            }),
        }
    }

    /// Look up the object addressed by `key`.
    ///
    /// Keys that cannot address an object in the storage folder resolve to
    /// `NotFound` without touching the backend.
    pub async fn download(&self, key: &FileKey) -> StorageResult<Download> {
        if !key.is_well_formed() {
            tracing::debug!(key = %key, "Rejected malformed file key");
            return Ok(Download::not_found(key));
        }

        let path = object_path(key);
        match self.backend.metadata(&path).await {
            Ok(metadata) if metadata.is_object() => Ok(Download::Found(StoredObject {
                key: key.clone(),
                path,
                metadata,
                backend: self.backend.clone(),
            })),
            Ok(metadata) => {
                tracing::debug!(key = %key, kind = %metadata.kind, "Entry is not a stored object");
                Ok(Download::not_found(key))
            }
            Err(e) if e.is_inaccessible() => {
                tracing::debug!(key = %key, status = ?e.status(), "File not accessible");
                Ok(Download::not_found(key))
            }
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Failed to fetch file metadata");
                Err(StorageError::Backend(e))
            }
        }
    }
}

async fn store(
    backend: Arc<dyn ObjectBackend>,
    key: FileKey,
    body: ByteStream,
    options: WriteOptions,
) -> StorageResult<UploadedObject> {
    let start = Instant::now();
    let path = object_path(&key);

    let size_bytes = backend
        .write(&path, body, options)
        .await
        .map_err(|source| {
            tracing::error!(
                error = %source,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Upload failed"
            );
            StorageError::UploadFailed {
                key: key.clone(),
                source,
            }
        })?;

    let metadata = backend.metadata(&path).await.map_err(|source| {
        tracing::error!(
            error = %source,
            key = %key,
            size_bytes = size_bytes,
            "Upload stored but metadata could not be read"
        );
        StorageError::MetadataFailed {
            key: key.clone(),
            source,
        }
    })?;

    tracing::info!(
        key = %key,
        size_bytes = size_bytes,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Upload successful"
    );

    Ok(UploadedObject {
        metadata,
        file_key: key,
    })
}

#[cfg(all(test, feature = "object-store"))]
mod tests {
    use super::*;
    use crate::ObjectStoreBackend;

    fn controller() -> TransferController {
        TransferController::new(Arc::new(ObjectStoreBackend::in_memory("unit")))
    }

    #[tokio::test]
    async fn malformed_keys_are_not_found() {
        let transfers = controller();
        for raw in ["", "..", "../secret", "a/b", "a\\b"] {
            let download = transfers.download(&FileKey::from(raw)).await.unwrap();
            assert!(!download.is_found(), "{raw:?} resolved to an object");
        }
    }

    #[tokio::test]
    async fn body_can_be_read_more_than_once() {
        let transfers = controller();
        let uploaded = transfers
            .upload(
                "lazy.txt",
                stream::iter(vec![Ok(Bytes::from_static(b"abc"))]),
                None,
            )
            .await
            .unwrap();

        let object = transfers
            .download(&uploaded.file_key)
            .await
            .unwrap()
            .found()
            .unwrap();

        assert_eq!(object.bytes().await.unwrap(), Bytes::from_static(b"abc"));
        assert_eq!(object.bytes().await.unwrap(), Bytes::from_static(b"abc"));
    }
}
