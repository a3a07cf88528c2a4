//! Shared key generation for storage backends.
//!
//! Key format: `{uuid}-{sanitized filename}`. Objects live at `uploads/{key}`.

use depot_core::constants::STORAGE_FOLDER;
use depot_core::FileKey;
use uuid::Uuid;

use crate::naming::sanitize;

/// Generate a fresh key for `filename`.
///
/// The token is a random v4 UUID, so two calls with the same name yield different
/// keys sharing the same suffix.
pub fn generate_key(filename: &str) -> FileKey {
    key_with_token(Uuid::new_v4(), filename)
}

/// Build the key for `filename` under a known token.
pub fn key_with_token(token: Uuid, filename: &str) -> FileKey {
    FileKey::new(token, &sanitize(filename))
}

/// Location of the object addressed by `key`. All backends must use this layout.
pub fn object_path(key: &FileKey) -> String {
    format!("{}/{}", STORAGE_FOLDER, key)
}
