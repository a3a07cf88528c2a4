//! Application-wide constants.

/// Virtual directory every object managed by depot lives under.
pub const STORAGE_FOLDER: &str = "uploads";

/// Kind marker reported for regular stored objects.
pub const OBJECT_KIND: &str = "storage#object";

/// Custom metadata field holding the caller's original, unsanitized file name.
pub const NAME_METADATA_FIELD: &str = "name";

/// Separator between the unique token and the sanitized name in a file key.
pub const KEY_SEPARATOR: char = '-';

/// Base name used when sanitization leaves nothing behind.
pub const FALLBACK_BASE_NAME: &str = "file";

/// Longest sanitized name, in bytes.
pub const MAX_FILE_NAME_BYTES: usize = 255;

/// Default lifetime of a signed upload (write) URL: two minutes.
pub const SIGNED_UPLOAD_URL_TTL_SECS: u64 = 2 * 60;

/// Default lifetime of a signed download (read) URL: five years.
pub const SIGNED_DOWNLOAD_URL_TTL_SECS: u64 = 5 * 365 * 24 * 60 * 60;
