//! Stateless file-IO boundary, shared freely across dispatchers.
//!
//! Grounded on `original_source/wrapper/wrapper.go`'s `IFileOps` interface: a small trait so
//! tests can substitute an in-memory fixture instead of touching the real filesystem.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::{HubError, HubResult};

#[async_trait]
pub trait FileOps: Send + Sync {
    /// Reads the entirety of `path` relative to nothing in particular — callers pass a full
    /// path already joined from the API directory.
    async fn read(&self, path: &Path) -> HubResult<Vec<u8>>;

    /// Lists the entries of a directory, returning their file names.
    async fn read_dir(&self, dir: &Path) -> HubResult<Vec<PathBuf>>;
}

/// Real filesystem implementation, backed by `tokio::fs`.
#[derive(Clone, Default)]
pub struct RealFileOps;

#[async_trait]
impl FileOps for RealFileOps {
    async fn read(&self, path: &Path) -> HubResult<Vec<u8>> {
        tokio::fs::read(path).await.map_err(|source| HubError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    async fn read_dir(&self, dir: &Path) -> HubResult<Vec<PathBuf>> {
        let mut entries =
            tokio::fs::read_dir(dir).await.map_err(|source| HubError::Io {
                path: dir.display().to_string(),
                source,
            })?;

        let mut paths = Vec::new();
        loop {
            let next = entries.next_entry().await.map_err(|source| HubError::Io {
                path: dir.display().to_string(),
                source,
            })?;
            match next {
                Some(entry) => paths.push(entry.path()),
                None => break,
            }
        }
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn real_file_ops_reads_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.json");
        std::fs::write(&path, br#"{"ok":true}"#).unwrap();

        let ops = RealFileOps;
        let bytes = ops.read(&path).await.unwrap();
        assert_eq!(bytes, br#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn real_file_ops_reports_io_error_on_missing_file() {
        let ops = RealFileOps;
        let err = ops.read(Path::new("/nonexistent/file.json")).await.unwrap_err();
        assert!(matches!(err, HubError::Io { .. }));
    }

    #[tokio::test]
    async fn real_file_ops_lists_directory_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.toml"), b"").unwrap();
        std::fs::write(dir.path().join("b.toml"), b"").unwrap();

        let ops = RealFileOps;
        let entries = ops.read_dir(dir.path()).await.unwrap();
        assert_eq!(entries.len(), 2);
    }
}
