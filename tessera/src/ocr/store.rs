use std::io;
use std::path::Path;

use async_trait::async_trait;

/// Read and delete access to the files the binary writes.
#[async_trait]
pub trait OutputStore: Send + Sync {
    /// Reads the whole file as UTF-8.
    async fn read_output(&self, path: &Path) -> io::Result<String>;
    async fn remove_output(&self, path: &Path) -> io::Result<()>;
}

/// [`OutputStore`] backed by `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsOutputStore;

#[async_trait]
impl OutputStore for FsOutputStore {
    async fn read_output(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn remove_output(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fs_store_reads_then_removes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        tokio::fs::write(&path, "node-tesseract\n").await.unwrap();

        let store = FsOutputStore;
        assert_eq!(store.read_output(&path).await.unwrap(), "node-tesseract\n");
        store.remove_output(&path).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_fs_store_rejects_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        tokio::fs::write(&path, [0xff, 0xfe, 0x00]).await.unwrap();

        let err = FsOutputStore.read_output(&path).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
