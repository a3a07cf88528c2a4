#[cfg(feature = "object-store")]
use crate::ObjectStoreBackend;
use crate::{ObjectBackend, StorageBackend, StorageError, StorageResult};
use depot_core::StorageConfig;
use std::path::Path;
use std::sync::Arc;

/// Bucket name reported by the in-memory backend when none is configured.
const MEMORY_BUCKET: &str = "memory";

/// Create a storage backend based on configuration
///
/// Missing settings are reported by variable name so that a misconfigured
/// deployment fails at startup rather than on its first transfer.
pub async fn create_backend(config: &StorageConfig) -> StorageResult<Arc<dyn ObjectBackend>> {
    match config.storage_backend() {
        #[cfg(feature = "object-store")]
        StorageBackend::S3 => {
            let bucket = config.bucket().map(String::from).ok_or_else(|| {
                StorageError::ConfigError("STORAGE_BUCKET not configured".to_string())
            })?;
            let region = config.s3_region().map(String::from).ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;
            let endpoint = config.s3_endpoint().map(String::from);

            let backend = ObjectStoreBackend::s3(bucket, region, endpoint)?;
            Ok(Arc::new(backend))
        }

        #[cfg(feature = "object-store")]
        StorageBackend::Gcs => {
            let bucket = config.bucket().map(String::from).ok_or_else(|| {
                StorageError::ConfigError("STORAGE_BUCKET not configured".to_string())
            })?;
            let credentials = config.gcs_credentials_path().ok_or_else(|| {
                StorageError::ConfigError(
                    "GOOGLE_APPLICATION_CREDENTIALS not configured".to_string(),
                )
            })?;
            if !Path::new(credentials).is_file() {
                return Err(StorageError::ConfigError(format!(
                    "GOOGLE_APPLICATION_CREDENTIALS points to a missing file: {}",
                    credentials
                )));
            }

            let backend = ObjectStoreBackend::gcs(bucket, credentials.to_string())?;
            Ok(Arc::new(backend))
        }

        #[cfg(feature = "object-store")]
        StorageBackend::Memory => {
            let bucket = config.bucket().unwrap_or(MEMORY_BUCKET);
            Ok(Arc::new(ObjectStoreBackend::in_memory(bucket)))
        }

        #[cfg(not(feature = "object-store"))]
        backend => Err(StorageError::ConfigError(format!(
            "{} storage backend not available (object-store feature not enabled)",
            backend
        ))),
    }
}
