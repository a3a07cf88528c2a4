//! Storage abstraction trait
//!
//! This module defines the backend seam the storage layer talks to and the error
//! taxonomy surfaced to callers.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use depot_core::{FileKey, ObjectMetadata, SignedAction, StorageBackend};
use futures::stream::BoxStream;
use thiserror::Error;

/// Caller-supplied body for an upload.
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Object body as read from a backend.
pub type BackendStream = BoxStream<'static, BackendResult<Bytes>>;

/// Object body handed to download callers.
pub type BodyStream = BoxStream<'static, StorageResult<Bytes>>;

pub type BackendResult<T> = Result<T, BackendError>;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Error reported by an object store.
///
/// `status` is the HTTP-equivalent status code when the store reports one; the
/// transfer layer relies on it to tell "inaccessible" apart from infrastructure
/// failures.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct BackendError {
    status: Option<u16>,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl BackendError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        BackendError {
            status,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        status: Option<u16>,
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        BackendError {
            status,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn not_found(path: &str) -> Self {
        Self::new(Some(404), format!("Object not found: {}", path))
    }

    pub fn forbidden(path: &str) -> Self {
        Self::new(Some(403), format!("Access denied: {}", path))
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Forbidden and missing objects are both out of reach under a given key.
    pub fn is_inaccessible(&self) -> bool {
        matches!(self.status, Some(403) | Some(404))
    }
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::with_source(None, format!("I/O error: {}", err), err)
    }
}

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Required configuration is missing or unusable; fatal at initialization.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Streaming the body into the backend failed.
    #[error("Upload failed for {key}")]
    UploadFailed {
        key: FileKey,
        #[source]
        source: BackendError,
    },

    /// Reading the body back from the backend failed.
    #[error("Download failed for {key}")]
    DownloadFailed {
        key: FileKey,
        #[source]
        source: BackendError,
    },

    /// Metadata could not be read or recorded. Bytes may already be persisted.
    #[error("Metadata operation failed for {key}")]
    MetadataFailed {
        key: FileKey,
        #[source]
        source: BackendError,
    },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Any other backend failure, passed through unchanged.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Options attached to a streaming write.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    pub content_type: Option<String>,
    /// Custom metadata recorded on the object.
    pub metadata: HashMap<String, String>,
}

/// Object store collaborator.
///
/// Paths are `{folder}/{key}` strings in a hierarchical namespace. Implementations
/// must be safe to share across concurrent operations; the storage layer holds a
/// single instance behind an `Arc` for the life of the process.
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// Stream `body` into a new object at `path` (non-resumable).
    ///
    /// Returns the number of bytes written. Flow control is driven by the backend:
    /// the body is only polled as fast as the store accepts data.
    async fn write(&self, path: &str, body: ByteStream, options: WriteOptions)
        -> BackendResult<u64>;

    /// Fetch the metadata of the object at `path`.
    async fn metadata(&self, path: &str) -> BackendResult<ObjectMetadata>;

    /// Open the body of the object at `path` as a stream.
    async fn read(&self, path: &str) -> BackendResult<BackendStream>;

    /// Sign a URL granting `action` on `path` for `expires_in`.
    async fn signed_url(
        &self,
        path: &str,
        action: SignedAction,
        expires_in: Duration,
    ) -> BackendResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
