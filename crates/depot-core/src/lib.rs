//! Depot Core Library
//!
//! This crate provides the configuration, constants and shared models used by the
//! storage layer and its front ends.

pub mod config;
pub mod constants;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::StorageConfig;
pub use models::{FileKey, ObjectMetadata, SignedAction, SignedUrlGrant, UploadedObject};
pub use storage_types::StorageBackend;
