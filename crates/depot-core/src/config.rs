//! Configuration module
//!
//! Storage configuration is read from the environment (and a `.env` file when one is
//! present). Only parsing problems are reported here; whether the settings required by
//! the selected backend are present is checked when the backend is created, so that a
//! missing credential fails fast at initialization with the variable's name.

use std::env;
use std::time::Duration;

use crate::constants::{SIGNED_DOWNLOAD_URL_TTL_SECS, SIGNED_UPLOAD_URL_TTL_SECS};
use crate::storage_types::StorageBackend;

/// Object storage configuration
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub gcs_credentials_path: Option<String>,
    pub signed_upload_url_ttl: Duration,
    pub signed_download_url_ttl: Duration,
    pub environment: String,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_source(|name| env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_source<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let backend = match get("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::S3,
        };

        let signed_upload_url_ttl = parse_secs(
            get("SIGNED_UPLOAD_URL_TTL_SECS"),
            "SIGNED_UPLOAD_URL_TTL_SECS",
            SIGNED_UPLOAD_URL_TTL_SECS,
        )?;
        let signed_download_url_ttl = parse_secs(
            get("SIGNED_DOWNLOAD_URL_TTL_SECS"),
            "SIGNED_DOWNLOAD_URL_TTL_SECS",
            SIGNED_DOWNLOAD_URL_TTL_SECS,
        )?;

        Ok(StorageConfig {
            backend,
            bucket: get("STORAGE_BUCKET")
                .or_else(|| get("S3_BUCKET"))
                .or_else(|| get("GCS_BUCKET")),
            s3_region: get("S3_REGION").or_else(|| get("AWS_REGION")),
            s3_endpoint: get("S3_ENDPOINT"),
            gcs_credentials_path: get("GOOGLE_APPLICATION_CREDENTIALS")
                .or_else(|| get("GCS_SERVICE_ACCOUNT_PATH")),
            signed_upload_url_ttl,
            signed_download_url_ttl,
            environment: get("ENVIRONMENT")
                .or_else(|| get("APP_ENV"))
                .unwrap_or_else(|| "development".to_string()),
        })
    }

    /// In-memory configuration, handy for local experiments and tests.
    pub fn in_memory() -> Self {
        StorageConfig {
            backend: StorageBackend::Memory,
            bucket: None,
            s3_region: None,
            s3_endpoint: None,
            gcs_credentials_path: None,
            signed_upload_url_ttl: Duration::from_secs(SIGNED_UPLOAD_URL_TTL_SECS),
            signed_download_url_ttl: Duration::from_secs(SIGNED_DOWNLOAD_URL_TTL_SECS),
            environment: "development".to_string(),
        }
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.backend
    }

    pub fn bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.s3_endpoint.as_deref()
    }

    pub fn gcs_credentials_path(&self) -> Option<&str> {
        self.gcs_credentials_path.as_deref()
    }

    pub fn signed_upload_url_ttl(&self) -> Duration {
        self.signed_upload_url_ttl
    }

    pub fn signed_download_url_ttl(&self) -> Duration {
        self.signed_download_url_ttl
    }
}

fn parse_secs(value: Option<String>, name: &str, default: u64) -> Result<Duration, anyhow::Error> {
    let secs = match value {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("{} must be a whole number of seconds", name))?,
        None => default,
    };
    if secs == 0 {
        return Err(anyhow::anyhow!("{} must be greater than zero", name));
    }
    Ok(Duration::from_secs(secs))
}
