//! Data-directory handling for the file-based store.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Owns the base data directory and the well-known file paths inside it.
#[derive(Debug, Clone)]
pub struct StoreConnection {
    base_directory: PathBuf,
}

impl StoreConnection {
    /// Open a connection rooted at `base_directory`, creating the directory
    /// if needed.
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_directory = base_directory.as_ref().to_path_buf();
        if !base_directory.exists() {
            fs::create_dir_all(&base_directory)?;
            info!("Created data directory: {}", base_directory.display());
        }
        Ok(Self { base_directory })
    }

    /// Open a connection in the default per-user location:
    /// `<documents>/Juku Pay Tracker`, falling back to the home directory
    /// when no documents directory is known.
    pub fn new_default() -> Result<Self> {
        let parent = dirs::document_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
        Self::new(parent.join("Juku Pay Tracker"))
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn entries_file_path(&self) -> PathBuf {
        self.base_directory.join("work_entries.csv")
    }

    pub fn settings_file_path(&self) -> PathBuf {
        self.base_directory.join("settings.yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested").join("store");
        let connection = StoreConnection::new(&nested).unwrap();
        assert!(nested.exists());
        assert_eq!(connection.base_directory(), nested);
    }

    #[test]
    fn test_file_paths_live_under_base_directory() {
        let dir = TempDir::new().unwrap();
        let connection = StoreConnection::new(dir.path()).unwrap();
        assert_eq!(
            connection.entries_file_path(),
            dir.path().join("work_entries.csv")
        );
        assert_eq!(
            connection.settings_file_path(),
            dir.path().join("settings.yaml")
        );
    }
}
