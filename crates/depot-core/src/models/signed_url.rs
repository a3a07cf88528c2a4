use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::FileKey;

/// Access a signed URL grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignedAction {
    /// Direct client upload (HTTP PUT).
    Write,
    /// Direct client download (HTTP GET).
    Read,
}

/// A backend-signed, time-limited URL for one object.
///
/// Grants are not persisted; the signature itself carries the expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlGrant {
    pub url: String,
    pub key: FileKey,
    pub action: SignedAction,
    pub expires_at: DateTime<Utc>,
}
