//! Depot Storage Library
//!
//! This crate provides the object storage access layer for Depot: file name
//! sanitization, key generation, streaming transfers and signed URLs, on top of
//! the `ObjectBackend` trait and its `object_store` implementation (S3, GCS and
//! in-memory).
//!
//! # Storage key format
//!
//! Every object lives under one storage folder, addressed by a file key:
//!
//! - **File key**: `{uuid}-{sanitized filename}`
//! - **Object path**: `uploads/{file key}`
//!
//! Keys must be a single path segment. Key generation is centralized in the `keys`
//! module so uploads and signed upload URLs stay consistent.

pub mod client;
pub mod factory;
pub mod keys;
pub mod naming;
#[cfg(feature = "object-store")]
pub mod object_store_backend;
pub mod signed_url;
pub mod transfer;
pub mod traits;

// Re-export commonly used types
pub use client::FileStore;
pub use depot_core::StorageBackend;
pub use factory::create_backend;
pub use keys::{generate_key, object_path};
pub use naming::sanitize;
#[cfg(feature = "object-store")]
pub use object_store_backend::ObjectStoreBackend;
pub use signed_url::SignedUrlIssuer;
pub use transfer::{Download, StoredObject, TransferController};
pub use traits::{
    BackendError, BackendResult, BackendStream, BodyStream, ByteStream, ObjectBackend, StorageError,
    StorageResult, WriteOptions,
};
