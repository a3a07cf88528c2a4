//! Stored object models: backend-reported metadata and upload results.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{NAME_METADATA_FIELD, OBJECT_KIND};
use crate::models::FileKey;

/// Attributes the object store reports for a stored object.
///
/// Owned by the backend; the storage layer only reads it and adds the `name`
/// custom field at upload time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    /// Object kind marker (`storage#object` for regular objects).
    pub kind: String,
    pub bucket: String,
    /// Full object path, storage folder included.
    pub path: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    pub updated: DateTime<Utc>,
    /// Custom metadata; carries at least the original `name` for uploads.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ObjectMetadata {
    pub fn is_object(&self) -> bool {
        self.kind == OBJECT_KIND
    }

    /// Original file name recorded at upload time.
    pub fn original_name(&self) -> Option<&str> {
        self.metadata.get(NAME_METADATA_FIELD).map(String::as_str)
    }
}

/// Metadata of a freshly uploaded object merged with the key that addresses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedObject {
    #[serde(flatten)]
    pub metadata: ObjectMetadata,
    pub file_key: FileKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ObjectMetadata {
        ObjectMetadata {
            kind: OBJECT_KIND.to_string(),
            bucket: "depot".to_string(),
            path: "uploads/k".to_string(),
            size: 3,
            content_type: Some("text/plain".to_string()),
            etag: None,
            updated: Utc::now(),
            metadata: HashMap::from([(NAME_METADATA_FIELD.to_string(), "a b.txt".to_string())]),
        }
    }

    #[test]
    fn original_name_and_kind() {
        let meta = sample();
        assert!(meta.is_object());
        assert_eq!(meta.original_name(), Some("a b.txt"));

        let folder = ObjectMetadata {
            kind: "storage#folder".to_string(),
            ..sample()
        };
        assert!(!folder.is_object());
    }

    #[test]
    fn uploaded_object_serializes_flat_with_file_key() {
        let uploaded = UploadedObject {
            metadata: sample(),
            file_key: FileKey::from("k"),
        };
        let json = serde_json::to_value(&uploaded).unwrap();

        assert_eq!(json["fileKey"], "k");
        assert_eq!(json["kind"], OBJECT_KIND);
        assert_eq!(json["contentType"], "text/plain");
        assert_eq!(json["metadata"]["name"], "a b.txt");
        assert!(json.get("etag").is_none());
    }
}
