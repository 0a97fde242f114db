use crate::infrastructure::StorageBackend;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// File-per-key backend: each key becomes `<data_dir>/<key>.json`.
pub struct FsBackend {
    data_dir: PathBuf,
}

impl FsBackend {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for FsBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.key_path(key);

        if !path.exists() {
            return Ok(None);
        }

        let bytes = std::fs::read(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Some(bytes))
    }

    fn set(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.key_path(key);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        std::fs::write(&path, bytes)
            .with_context(|| format!("failed to write {}", path.display()))
    }
}

/// Expose the path for a key so callers can report where data lives.
pub fn storage_path(data_dir: &Path, key: &str) -> PathBuf {
    data_dir.join(format!("{key}.json"))
}
