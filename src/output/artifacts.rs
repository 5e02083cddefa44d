//! File-backed store for fetched message text.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::info;

use crate::error::WriteError;

/// Persists each message as a standalone text artifact.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Write `text` under `identifier`, returning where it landed.
    async fn save_text(&self, identifier: &str, text: &str) -> Result<PathBuf, WriteError>;
}

/// Writes artifacts as files in one directory.
pub struct FileArtifactStore {
    base_path: PathBuf,
}

impl FileArtifactStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Ensure the artifact directory exists.
    pub async fn ensure_dirs(&self) -> Result<(), WriteError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|source| WriteError::Io {
                path: self.base_path.clone(),
                source,
            })
    }

    /// Only the final path component of an identifier is used, so an
    /// identifier can never escape the base directory.
    fn resolve_path(&self, identifier: &str) -> Result<PathBuf, WriteError> {
        let name = Path::new(identifier)
            .file_name()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| WriteError::InvalidName(identifier.to_string()))?;
        Ok(self.base_path.join(name))
    }
}

#[async_trait]
impl ArtifactStore for FileArtifactStore {
    async fn save_text(&self, identifier: &str, text: &str) -> Result<PathBuf, WriteError> {
        let path = self.resolve_path(identifier)?;
        fs::write(&path, text)
            .await
            .map_err(|source| WriteError::Io {
                path: path.clone(),
                source,
            })?;
        info!(path = %path.display(), "Saved message");
        Ok(path)
    }
}
