use bytes::Bytes;
use futures::stream::{self, Stream};
use std::io;

/// Body yielding `chunks` in order.
pub fn body(chunks: &[&'static [u8]]) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
    stream::iter(
        chunks
            .iter()
            .map(|c| Ok(Bytes::from_static(c)))
            .collect::<Vec<_>>(),
    )
}

/// Body that yields `chunk` and then fails, like a client dropping mid-upload.
pub fn broken_body(chunk: &'static [u8]) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
    stream::iter(vec![
        Ok(Bytes::from_static(chunk)),
        Err(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        )),
    ])
}

/// Split a generated key into its token and sanitized name, asserting the layout.
pub fn split_key(key: &str) -> (&str, &str) {
    assert!(key.len() > 37, "key too short: {key}");
    let (token, rest) = key.split_at(36);
    assert!(uuid::Uuid::parse_str(token).is_ok(), "bad token in {key}");
    assert!(rest.starts_with('-'), "missing separator in {key}");
    (token, &rest[1..])
}
