//! File key model: the opaque handle addressing one stored object.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::KEY_SEPARATOR;

/// Length of a hyphenated UUID.
const TOKEN_LEN: usize = 36;

/// `{unique-token}-{sanitized-name}`.
///
/// Keys are created once, when an upload starts or a signed upload URL is issued,
/// and never change afterwards. Keys arriving from callers are wrapped unchecked;
/// use [`FileKey::is_well_formed`] before building a storage path from them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileKey(String);

impl FileKey {
    pub fn new(token: Uuid, sanitized_name: &str) -> Self {
        FileKey(format!(
            "{}{}{}",
            token.hyphenated(),
            KEY_SEPARATOR,
            sanitized_name
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// The random token, if the key follows the generated layout.
    pub fn token(&self) -> Option<Uuid> {
        let token = self.0.get(..TOKEN_LEN)?;
        if !self.0[TOKEN_LEN..].starts_with(KEY_SEPARATOR) {
            return None;
        }
        Uuid::parse_str(token).ok()
    }

    /// The sanitized name suffix, if the key follows the generated layout.
    pub fn sanitized_name(&self) -> Option<&str> {
        self.token()?;
        self.0.get(TOKEN_LEN + KEY_SEPARATOR.len_utf8()..)
    }

    /// A key can only address an object inside the storage folder when it is a single,
    /// non-traversing path segment.
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty()
            && self.0 != "."
            && self.0 != ".."
            && !self.0.contains(['/', '\\'])
            && !self.0.chars().any(char::is_control)
    }
}

impl Display for FileKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FileKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for FileKey {
    fn from(value: String) -> Self {
        FileKey(value)
    }
}

impl From<&str> for FileKey {
    fn from(value: &str) -> Self {
        FileKey(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_and_accessors() {
        let token = Uuid::new_v4();
        let key = FileKey::new(token, "myReport.PDF");

        assert_eq!(key.as_str(), format!("{}-myReport.PDF", token));
        assert_eq!(key.token(), Some(token));
        assert_eq!(key.sanitized_name(), Some("myReport.PDF"));
        assert!(key.is_well_formed());
    }

    #[test]
    fn foreign_keys_have_no_token() {
        let key = FileKey::from("nonexistent-key");
        assert_eq!(key.token(), None);
        assert_eq!(key.sanitized_name(), None);
        assert!(key.is_well_formed());
    }

    #[test]
    fn traversing_keys_are_not_well_formed() {
        for raw in ["", ".", "..", "../secret", "a/b", "a\\b", "line\nbreak"] {
            assert!(!FileKey::from(raw).is_well_formed(), "{raw:?}");
        }
    }

    #[test]
    fn serializes_as_plain_string() {
        let key = FileKey::from("abc");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"abc\"");
    }
}
