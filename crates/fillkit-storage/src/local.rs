//! Local filesystem storage backend.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use fillkit_core::{Error, Result, StorageBackend};

/// Files documents into a directory tree under a configured root.
///
/// Destinations are relative paths like `@Reference/Medical/2026/x.pdf`;
/// parent directories are created as needed. An occupied destination is
/// rejected as a duplicate so a retried filing cannot silently double-file.
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root from the `FILLKIT_LOCAL_ROOT` environment variable, defaulting
    /// to `~/Documents`.
    pub fn from_env() -> Self {
        let root = std::env::var("FILLKIT_LOCAL_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                std::env::var("HOME")
                    .map(|home| Path::new(&home).join("Documents"))
                    .unwrap_or_else(|_| PathBuf::from("Documents"))
            });
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, dest_path: &str) -> Result<PathBuf> {
        // Destinations stay inside the root; reject traversal segments.
        if Path::new(dest_path)
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir | std::path::Component::RootDir))
        {
            return Err(Error::Storage(format!(
                "destination escapes backend root: {dest_path}"
            )));
        }
        Ok(self.root.join(dest_path))
    }

    async fn write_new(&self, full: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(full, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        "local"
    }

    async fn transfer(&self, bytes: &[u8], dest_path: &str) -> Result<String> {
        let full = self.resolve(dest_path)?;
        if tokio::fs::try_exists(&full).await? {
            return Err(Error::Storage(format!("duplicate destination: {dest_path}")));
        }
        self.write_new(&full, bytes).await?;
        info!(backend = "local", dest = %full.display(), "Stored document");
        Ok(full.display().to_string())
    }

    async fn store_metadata(&self, metadata_yaml: &str, pdf_dest_path: &str) -> Result<String> {
        let meta_dest = match pdf_dest_path.rsplit_once('.') {
            Some((base, _)) => format!("{base}.meta.yml"),
            None => format!("{pdf_dest_path}.meta.yml"),
        };
        let full = self.resolve(&meta_dest)?;
        self.write_new(&full, metadata_yaml.as_bytes()).await?;
        Ok(full.display().to_string())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let full = self.resolve(path)?;
        Ok(tokio::fs::try_exists(&full).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transfer_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(dir.path());

        let uri = backend
            .transfer(b"pdf bytes", "@Reference/Medical/2026/a.pdf")
            .await
            .unwrap();

        assert!(uri.ends_with("a.pdf"));
        let stored = tokio::fs::read(dir.path().join("@Reference/Medical/2026/a.pdf"))
            .await
            .unwrap();
        assert_eq!(stored, b"pdf bytes");
    }

    #[tokio::test]
    async fn test_transfer_rejects_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(dir.path());

        backend.transfer(b"one", "@Inbox/a.pdf").await.unwrap();
        let err = backend.transfer(b"two", "@Inbox/a.pdf").await;
        assert!(matches!(err, Err(Error::Storage(_))));

        // The original bytes survive.
        let stored = tokio::fs::read(dir.path().join("@Inbox/a.pdf")).await.unwrap();
        assert_eq!(stored, b"one");
    }

    #[tokio::test]
    async fn test_transfer_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(dir.path());

        let err = backend.transfer(b"x", "../outside.pdf").await;
        assert!(matches!(err, Err(Error::Storage(_))));
    }

    #[tokio::test]
    async fn test_store_metadata_derives_sidecar_path() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(dir.path());

        backend.transfer(b"pdf", "@Inbox/a.pdf").await.unwrap();
        let path = backend
            .store_metadata("category: medical\n", "@Inbox/a.pdf")
            .await
            .unwrap();

        assert!(path.ends_with("a.meta.yml"));
        let stored = tokio::fs::read_to_string(dir.path().join("@Inbox/a.meta.yml"))
            .await
            .unwrap();
        assert_eq!(stored, "category: medical\n");
    }

    #[tokio::test]
    async fn test_exists() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(dir.path());

        assert!(!backend.exists("@Inbox/a.pdf").await.unwrap());
        backend.transfer(b"pdf", "@Inbox/a.pdf").await.unwrap();
        assert!(backend.exists("@Inbox/a.pdf").await.unwrap());
    }
}
