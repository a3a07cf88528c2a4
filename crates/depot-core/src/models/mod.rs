pub mod file_key;
pub mod object;
pub mod signed_url;

pub use file_key::FileKey;
pub use object::{ObjectMetadata, UploadedObject};
pub use signed_url::{SignedAction, SignedUrlGrant};
