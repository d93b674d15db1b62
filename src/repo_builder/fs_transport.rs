use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::try_exists;
use tracing::trace;

use crate::repo_builder::transport::{Transport, TransportError};
use crate::util::staged_file::{file_stream, write_staged, StagedWrite};

/// Copies files from a repository on a local or mounted filesystem.
pub struct FsTransport {
    origin: String,
    root: PathBuf,
}
impl FsTransport {
    pub fn new(origin: &str, root: PathBuf) -> FsTransport {
        FsTransport {
            origin: origin.to_string(),
            root,
        }
    }
}

#[async_trait]
impl Transport for FsTransport {
    fn origin(&self) -> &str {
        &self.origin
    }

    async fn fetch(&self, relative_path: &str, destination: &Path) -> Result<StagedWrite, TransportError> {
        let source = self.root.join(relative_path);
        if !try_exists(&source).await.map_err(anyhow::Error::from)? {
            return Err(TransportError::NotFound(source.display().to_string()));
        }

        trace!("copying {} to {}", source.display(), destination.display());
        let data = file_stream(&source).await?;
        Ok(write_staged(destination, data).await?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_copy() {
        let source_dir = tempfile::tempdir().unwrap();
        let target_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(source_dir.path().join("g/a/1")).unwrap();
        std::fs::write(source_dir.path().join("g/a/1/a-1.jar"), "jar content").unwrap();

        let transport = FsTransport::new("local", source_dir.path().to_path_buf());
        let destination = target_dir.path().join("g/a/1/a-1.jar");

        let result = transport.fetch("g/a/1/a-1.jar", &destination).await.unwrap();
        assert_eq!(result, StagedWrite::Written);
        assert_eq!(std::fs::read_to_string(&destination).unwrap(), "jar content");

        let again = transport.fetch("g/a/1/a-1.jar", &destination).await.unwrap();
        assert_eq!(again, StagedWrite::AlreadyPresent);
    }

    #[tokio::test]
    async fn test_missing_source() {
        let source_dir = tempfile::tempdir().unwrap();
        let target_dir = tempfile::tempdir().unwrap();

        let transport = FsTransport::new("local", source_dir.path().to_path_buf());
        let destination = target_dir.path().join("g/a/1/a-1.jar");

        let result = transport.fetch("g/a/1/a-1.jar", &destination).await;
        assert!(matches!(result, Err(TransportError::NotFound(_))));
        assert!(!destination.exists());
    }
}
