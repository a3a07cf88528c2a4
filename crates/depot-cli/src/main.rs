//! Depot CLI: command-line access to the configured object store.
//!
//! Configure with STORAGE_BACKEND, STORAGE_BUCKET and the backend's credentials
//! (see `StorageConfig`). A `.env` file in the working directory is honoured.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use depot_core::{FileKey, StorageConfig};
use depot_cli::{
    default_output, guess_content_type, init_tracing, open_body, upload_name, write_body,
};
use depot_storage::{generate_key, Download, FileStore};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "depot", about = "Object storage CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a local file
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        /// Name to record instead of the file's own name
        #[arg(long)]
        name: Option<String>,
        /// Content type (guessed from the extension when omitted)
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Download a stored file by key
    Download {
        /// File key returned by an upload
        key: String,
        /// Output path; use "-" for stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Issue a signed URL for a direct client upload
    UploadUrl {
        /// Original file name
        filename: String,
    },
    /// Issue a signed URL for a direct client download
    DownloadUrl {
        /// File key
        key: String,
    },
    /// Show the key an upload of FILENAME would receive
    Key {
        /// Original file name
        filename: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if let Commands::Key { filename } = &cli.command {
        let key = generate_key(filename);
        return print_json(&serde_json::json!({
            "fileKey": key,
            "name": key.sanitized_name(),
        }));
    }

    let config = StorageConfig::from_env().context("Failed to load storage configuration")?;
    let store = FileStore::new(config);
    store
        .init()
        .await
        .context("Failed to connect to object storage")?;
    tracing::debug!(backend = %store.backend_type(), "Storage ready");

    match cli.command {
        Commands::Upload {
            file,
            name,
            content_type,
        } => {
            let filename = upload_name(&file, name.as_deref());
            let content_type = content_type.or_else(|| guess_content_type(&file));
            let body = open_body(&file).await?;
            let uploaded = store
                .upload(&filename, body, content_type.as_deref())
                .await?;
            print_json(&uploaded)?;
        }
        Commands::Download { key, output } => {
            let key = FileKey::from(key);
            let object = match store.download(&key).await? {
                Download::Found(object) => object,
                Download::NotFound(message) => anyhow::bail!(message),
            };

            let output = output.unwrap_or_else(|| default_output(&key));
            if output.as_os_str() == "-" {
                write_body(object.stream(), &mut tokio::io::stdout()).await?;
            } else {
                let mut file = tokio::fs::File::create(&output)
                    .await
                    .with_context(|| format!("Failed to create {}", output.display()))?;
                let written = write_body(object.stream(), &mut file).await?;
                print_json(&serde_json::json!({
                    "fileKey": key,
                    "output": output.display().to_string(),
                    "sizeBytes": written,
                    "metadata": object.metadata(),
                }))?;
            }
        }
        Commands::UploadUrl { filename } => {
            let grant = store.gen_upload_url(&filename).await?;
            print_json(&grant)?;
        }
        Commands::DownloadUrl { key } => {
            let grant = store.gen_download_url(&FileKey::from(key)).await?;
            print_json(&grant)?;
        }
        Commands::Key { .. } => {}
    }

    Ok(())
}
