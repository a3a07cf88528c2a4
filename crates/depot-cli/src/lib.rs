//! Helpers shared by the `depot` command-line tool.

use std::path::{Path, PathBuf};

use anyhow::Context;
use depot_core::FileKey;
use depot_storage::BodyStream;
use futures::TryStreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::io::ReaderStream;

/// Name recorded for an upload: the explicit override, else the file's own name.
pub fn upload_name(path: &Path, name: Option<&str>) -> String {
    match name {
        Some(name) => name.to_string(),
        None => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

/// Content type guessed from the file extension.
pub fn guess_content_type(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
}

/// Open `path` as an upload body.
pub async fn open_body(path: &Path) -> anyhow::Result<ReaderStream<File>> {
    let file = File::open(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(ReaderStream::new(file))
}

/// Where a download lands when no output path is given: the key's sanitized name.
pub fn default_output(key: &FileKey) -> PathBuf {
    PathBuf::from(key.sanitized_name().unwrap_or(key.as_str()))
}

/// Drain `body` into `out`, returning the number of bytes written.
pub async fn write_body<W>(mut body: BodyStream, out: &mut W) -> anyhow::Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0u64;
    while let Some(chunk) = body.try_next().await? {
        out.write_all(&chunk).await.context("Failed to write output")?;
        written += chunk.len() as u64;
    }
    out.flush().await.context("Failed to flush output")?;
    Ok(written)
}

/// Initialize tracing for CLI binaries.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
