use crate::{DeviceStore, Result, StorageError};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Filesystem-backed store: one key maps to one file in the data
/// directory.
#[derive(Debug)]
pub struct FileStore {
    storage_dir: PathBuf,
}

impl FileStore {
    /// Store under the platform data directory for this application.
    pub fn new() -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "shrike").ok_or_else(|| StorageError::Unavailable {
                message: "could not determine a data directory".to_string(),
            })?;

        Self::with_dir(proj_dirs.data_dir().join("device"))
    }

    /// Store under an explicit directory, created if missing.
    pub fn with_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let storage_dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;
        Ok(Self { storage_dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are well-known constants; sanitize anyway so a caller
        // cannot escape the storage directory.
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.storage_dir.join(safe)
    }
}

impl DeviceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        std::fs::write(&path, value)?;
        debug!("Persisted {} to {}", key, path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
