use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Selects which object store the storage layer connects to. `Memory` keeps
/// everything in process and is meant for development and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Gcs,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "gcs" | "gs" => Ok(StorageBackend::Gcs),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Gcs => write!(f, "gcs"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_backends() {
        assert_eq!("S3".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert_eq!("gs".parse::<StorageBackend>().unwrap(), StorageBackend::Gcs);
        assert_eq!(
            " memory ".parse::<StorageBackend>().unwrap(),
            StorageBackend::Memory
        );
        assert!("nfs".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for backend in [
            StorageBackend::S3,
            StorageBackend::Gcs,
            StorageBackend::Memory,
        ] {
            assert_eq!(
                backend.to_string().parse::<StorageBackend>().unwrap(),
                backend
            );
        }
    }
}
