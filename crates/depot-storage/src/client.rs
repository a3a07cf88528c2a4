//! Process-wide entry point to the storage layer.

use std::io;
use std::sync::Arc;

use bytes::Bytes;
use depot_core::{FileKey, SignedUrlGrant, StorageBackend, StorageConfig, UploadedObject};
use futures::Stream;
use tokio::sync::OnceCell;

use crate::factory::create_backend;
use crate::signed_url::SignedUrlIssuer;
use crate::transfer::{Download, TransferController};
use crate::traits::{ObjectBackend, StorageResult};

/// Shared handle over one backend connection.
///
/// The backend is created on first use (or by an explicit [`FileStore::init`]) and
/// reused by every operation afterwards. Concurrent first calls share a single
/// initialization.
pub struct FileStore {
    config: StorageConfig,
    backend: OnceCell<Arc<dyn ObjectBackend>>,
}

impl FileStore {
    pub fn new(config: StorageConfig) -> Self {
        FileStore {
            config,
            backend: OnceCell::new(),
        }
    }

    /// Wrap an already connected backend.
    pub fn with_backend(config: StorageConfig, backend: Arc<dyn ObjectBackend>) -> Self {
        FileStore {
            config,
            backend: OnceCell::new_with(Some(backend)),
        }
    }

    /// Connect to the configured backend. Calling it again is a no-op.
    pub async fn init(&self) -> StorageResult<()> {
        let backend = self.backend().await?;
        tracing::info!(backend = %backend.backend_type(), "File store initialized");
        Ok(())
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn backend_type(&self) -> StorageBackend {
        self.backend
            .get()
            .map(|backend| backend.backend_type())
            .unwrap_or_else(|| self.config.storage_backend())
    }

    #[tracing::instrument(skip_all, fields(filename = %filename))]
    pub async fn upload<S>(
        &self,
        filename: &str,
        body: S,
        mime_type: Option<&str>,
    ) -> StorageResult<UploadedObject>
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        self.transfers()
            .await?
            .upload(filename, body, mime_type)
            .await
    }

    #[tracing::instrument(skip_all, fields(key = %key))]
    pub async fn download(&self, key: &FileKey) -> StorageResult<Download> {
        self.transfers().await?.download(key).await
    }

    #[tracing::instrument(skip_all, fields(filename = %filename))]
    pub async fn gen_upload_url(&self, filename: &str) -> StorageResult<SignedUrlGrant> {
        self.issuer().await?.gen_upload_url(filename).await
    }

    #[tracing::instrument(skip_all, fields(key = %key))]
    pub async fn gen_download_url(&self, key: &FileKey) -> StorageResult<SignedUrlGrant> {
        self.issuer().await?.gen_download_url(key).await
    }

    async fn backend(&self) -> StorageResult<&Arc<dyn ObjectBackend>> {
        self.backend
            .get_or_try_init(|| create_backend(&self.config))
            .await
    }

    async fn transfers(&self) -> StorageResult<TransferController> {
        Ok(TransferController::new(self.backend().await?.clone()))
    }

    async fn issuer(&self) -> StorageResult<SignedUrlIssuer> {
        Ok(SignedUrlIssuer::new(
            self.backend().await?.clone(),
            self.config.signed_upload_url_ttl(),
            self.config.signed_download_url_ttl(),
        ))
    }
}
