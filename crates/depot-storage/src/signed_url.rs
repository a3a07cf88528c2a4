//! Signed URL issuance for direct client transfers.
//!
//! Write grants are short-lived and address a freshly generated key; read grants
//! are long-lived and address an existing key. Grants are never stored.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use depot_core::{FileKey, SignedAction, SignedUrlGrant};

use crate::keys::{generate_key, object_path};
use crate::traits::{ObjectBackend, StorageError, StorageResult};

#[derive(Clone)]
pub struct SignedUrlIssuer {
    backend: Arc<dyn ObjectBackend>,
    upload_ttl: Duration,
    download_ttl: Duration,
}

impl SignedUrlIssuer {
    pub fn new(
        backend: Arc<dyn ObjectBackend>,
        upload_ttl: Duration,
        download_ttl: Duration,
    ) -> Self {
        SignedUrlIssuer {
            backend,
            upload_ttl,
            download_ttl,
        }
    }

    pub fn upload_ttl(&self) -> Duration {
        self.upload_ttl
    }

    pub fn download_ttl(&self) -> Duration {
        self.download_ttl
    }

    /// Issue a write URL for a new object named after `filename`.
    ///
    /// The returned grant carries the key the client's upload will land under.
    pub async fn gen_upload_url(&self, filename: &str) -> StorageResult<SignedUrlGrant> {
        let key = generate_key(filename);
        self.issue(key, SignedAction::Write, self.upload_ttl).await
    }

    /// Issue a read URL for `key`. Whether the object exists is not checked.
    pub async fn gen_download_url(&self, key: &FileKey) -> StorageResult<SignedUrlGrant> {
        if !key.is_well_formed() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        self.issue(key.clone(), SignedAction::Read, self.download_ttl)
            .await
    }

    async fn issue(
        &self,
        key: FileKey,
        action: SignedAction,
        ttl: Duration,
    ) -> StorageResult<SignedUrlGrant> {
        let path = object_path(&key);
        let issued_at = Utc::now();

        let url = self
            .backend
            .signed_url(&path, action, ttl)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    key = %key,
                    action = ?action,
                    "Failed to sign URL"
                );
                StorageError::Backend(e)
            })?;

        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| issued_at.checked_add_signed(ttl))
            .ok_or_else(|| {
                StorageError::ConfigError(format!("Signed URL lifetime out of range: {:?}", ttl))
            })?;

        tracing::debug!(
            key = %key,
            action = ?action,
            expires_in_secs = ttl.as_secs(),
            "Signed URL issued"
        );

        Ok(SignedUrlGrant {
            url,
            key,
            action,
            expires_at,
        })
    }
}
