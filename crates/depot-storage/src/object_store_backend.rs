use crate::traits::{
    BackendError, BackendResult, BackendStream, ByteStream, ObjectBackend, StorageError,
    StorageResult, WriteOptions,
};
use async_trait::async_trait;
use depot_core::constants::OBJECT_KIND;
use depot_core::{ObjectMetadata, SignedAction, StorageBackend};
use futures::{StreamExt, TryStreamExt};
use http::Method;
use object_store::aws::AmazonS3Builder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{Attribute, Attributes, GetOptions, GetResult, ObjectStore, WriteMultipart};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Custom metadata travels as HTTP headers on S3, so anything outside visible
/// ASCII is percent-encoded on write and decoded on read.
const METADATA_ENCODE_SET: &AsciiSet = &CONTROLS.add(b'%');

/// Parts in flight per streaming upload.
const WRITE_CONCURRENCY: usize = 4;

/// [`ObjectBackend`] over an `object_store` implementation.
///
/// S3 and GCS stores can sign URLs; the in-memory store cannot.
#[derive(Debug, Clone)]
pub struct ObjectStoreBackend {
    store: Arc<dyn ObjectStore>,
    signer: Option<Arc<dyn Signer>>,
    bucket: String,
    backend: StorageBackend,
}

impl ObjectStoreBackend {
    /// Connect to an S3 bucket.
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    ///
    /// Credentials are picked up from the usual `AWS_*` environment variables.
    pub fn s3(bucket: String, region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        Self::from_s3(builder, bucket)
    }

    /// Build from a preconfigured S3 builder.
    pub fn from_s3(builder: AmazonS3Builder, bucket: String) -> StorageResult<Self> {
        let store = Arc::new(
            builder
                .build()
                .map_err(|e| StorageError::ConfigError(e.to_string()))?,
        );

        Ok(ObjectStoreBackend {
            store: store.clone(),
            signer: Some(store as Arc<dyn Signer>),
            bucket,
            backend: StorageBackend::S3,
        })
    }

    /// Connect to a GCS bucket using a service account key file.
    pub fn gcs(bucket: String, credentials_path: String) -> StorageResult<Self> {
        let store = Arc::new(
            GoogleCloudStorageBuilder::from_env()
                .with_bucket_name(bucket.clone())
                .with_service_account_path(credentials_path)
                .build()
                .map_err(|e| StorageError::ConfigError(e.to_string()))?,
        );

        Ok(ObjectStoreBackend {
            store: store.clone(),
            signer: Some(store as Arc<dyn Signer>),
            bucket,
            backend: StorageBackend::Gcs,
        })
    }

    /// Process-local store for development and tests. Cannot sign URLs.
    pub fn in_memory(bucket: impl Into<String>) -> Self {
        ObjectStoreBackend {
            store: Arc::new(InMemory::new()),
            signer: None,
            bucket: bucket.into(),
            backend: StorageBackend::Memory,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn attributes(options: &WriteOptions) -> Attributes {
        let mut attributes = Attributes::new();
        if let Some(content_type) = &options.content_type {
            attributes.insert(Attribute::ContentType, content_type.clone().into());
        }
        for (field, value) in &options.metadata {
            let encoded = utf8_percent_encode(value, METADATA_ENCODE_SET).to_string();
            attributes.insert(Attribute::Metadata(field.clone().into()), encoded.into());
        }
        attributes
    }

    fn metadata_from(&self, path: &str, result: &GetResult) -> ObjectMetadata {
        let mut content_type = None;
        let mut metadata = HashMap::new();

        for (attribute, value) in result.attributes.iter() {
            let value: &str = value.as_ref();
            match attribute {
                Attribute::ContentType => content_type = Some(value.to_string()),
                Attribute::Metadata(field) => {
                    let decoded = percent_decode_str(value).decode_utf8_lossy();
                    metadata.insert(field.to_string(), decoded.into_owned());
                }
                _ => {}
            }
        }

        ObjectMetadata {
            kind: OBJECT_KIND.to_string(),
            bucket: self.bucket.clone(),
            path: path.to_string(),
            size: result.meta.size as u64,
            content_type,
            etag: result.meta.e_tag.clone(),
            updated: result.meta.last_modified,
            metadata,
        }
    }
}

/// Translate an `object_store` error, keeping the HTTP-equivalent status the
/// transfer layer uses to recognise inaccessible objects.
pub(crate) fn map_error(err: ObjectStoreError, path: &str) -> BackendError {
    match err {
        ObjectStoreError::NotFound { .. } => {
            BackendError::with_source(Some(404), format!("Object not found: {}", path), err)
        }
        ObjectStoreError::PermissionDenied { .. } => {
            BackendError::with_source(Some(403), format!("Access denied: {}", path), err)
        }
        ObjectStoreError::Unauthenticated { .. } => {
            BackendError::with_source(Some(401), format!("Unauthenticated: {}", path), err)
        }
        other => BackendError::with_source(None, other.to_string(), other),
    }
}

async fn pump(
    writer: &mut WriteMultipart,
    body: &mut ByteStream,
    path: &str,
) -> BackendResult<u64> {
    let mut size_bytes = 0u64;
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        writer
            .wait_for_capacity(WRITE_CONCURRENCY)
            .await
            .map_err(|e| map_error(e, path))?;
        size_bytes += chunk.len() as u64;
        writer.write(&chunk);
    }
    Ok(size_bytes)
}

#[async_trait]
impl ObjectBackend for ObjectStoreBackend {
    async fn write(
        &self,
        path: &str,
        mut body: ByteStream,
        options: WriteOptions,
    ) -> BackendResult<u64> {
        let start = Instant::now();
        let location = Path::from(path);

        let upload = self
            .store
            .put_multipart_opts(&location, Self::attributes(&options).into())
            .await
            .map_err(|e| map_error(e, path))?;
        let mut writer = WriteMultipart::new(upload);

        let size_bytes = match pump(&mut writer, &mut body, path).await {
            Ok(size) => size,
            Err(e) => {
                if let Err(abort_err) = writer.abort().await {
                    tracing::warn!(
                        error = %abort_err,
                        bucket = %self.bucket,
                        key = %path,
                        "Failed to abort multipart upload"
                    );
                }
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %path,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Object upload failed"
                );
                return Err(e);
            }
        };

        writer.finish().await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %path,
                size_bytes = size_bytes,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Object upload failed to complete"
            );
            map_error(e, path)
        })?;

        tracing::info!(
            backend = %self.backend,
            bucket = %self.bucket,
            key = %path,
            size_bytes = size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object upload successful"
        );

        Ok(size_bytes)
    }

    async fn metadata(&self, path: &str) -> BackendResult<ObjectMetadata> {
        let location = Path::from(path);
        let options = GetOptions {
            head: true,
            ..Default::default()
        };

        let result = self
            .store
            .get_opts(&location, options)
            .await
            .map_err(|e| map_error(e, path))?;

        Ok(self.metadata_from(path, &result))
    }

    async fn read(&self, path: &str) -> BackendResult<BackendStream> {
        let start = Instant::now();
        let location = Path::from(path);

        let result = self
            .store
            .get_opts(&location, GetOptions::default())
            .await
            .map_err(|e| map_error(e, path))?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %path,
            size_bytes = result.meta.size as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object read opened"
        );

        let bucket = self.bucket.clone();
        let key = path.to_string();
        let stream = result.into_stream().map_err(move |e| {
            tracing::error!(
                error = %e,
                bucket = %bucket,
                key = %key,
                "Object stream read error"
            );
            map_error(e, &key)
        });

        Ok(stream.boxed())
    }

    async fn signed_url(
        &self,
        path: &str,
        action: SignedAction,
        expires_in: Duration,
    ) -> BackendResult<String> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            BackendError::new(
                None,
                format!("{} storage does not support signed URLs", self.backend),
            )
        })?;

        let method = match action {
            SignedAction::Write => Method::PUT,
            SignedAction::Read => Method::GET,
        };
        let location = Path::from(path);

        let url = signer
            .signed_url(method, &location, expires_in)
            .await
            .map_err(|e| map_error(e, path))?;

        Ok(url.to_string())
    }

    fn backend_type(&self) -> StorageBackend {
        self.backend
    }
}
