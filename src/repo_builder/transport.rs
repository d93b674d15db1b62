use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use thiserror::Error;

use crate::origin::Origin;
use crate::repo_builder::fs_transport::FsTransport;
use crate::repo_builder::http_transport::HttpTransport;
use crate::util::staged_file::StagedWrite;
use crate::util::validating_http_downloader::ValidatingHttpDownloader;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{0} not found")]
    NotFound(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Copies files from a repository root to a local destination. Implementations never overwrite an
///  existing destination, and the destination is either absent or complete after a fetch.
#[async_trait]
pub trait Transport: Send + Sync {
    /// the repository root, as given by the user
    fn origin(&self) -> &str;

    async fn fetch(&self, relative_path: &str, destination: &Path) -> Result<StagedWrite, TransportError>;
}

/// Selects the transport for a repository URL by its scheme.
pub fn transport_for_origin(origin: &str, downloader: Arc<ValidatingHttpDownloader>) -> anyhow::Result<Box<dyn Transport>> {
    match Origin::parse(origin) {
        Origin::Http(base) => Ok(Box::new(HttpTransport::new(origin, base, downloader))),
        Origin::Filesystem(root) => Ok(Box::new(FsTransport::new(origin, root))),
        Origin::Unsupported { scheme } => Err(anyhow!("unsupported protocol {} in {}", scheme, origin)),
    }
}

#[cfg(test)]
mod test {
    use rstest::*;
    use super::*;

    #[rstest]
    #[case("https://repo1.maven.org/maven2", true)]
    #[case("http://localhost:8081/repo/", true)]
    #[case("file:///srv/repo", true)]
    #[case("/srv/repo", true)]
    #[case("ftp://host/repo", false)]
    #[case("scp://host/repo", false)]
    fn test_transport_for_origin(#[case] origin: &str, #[case] supported: bool) {
        let transport = transport_for_origin(origin, Arc::new(ValidatingHttpDownloader::new()));
        assert_eq!(transport.is_ok(), supported);
        if let Ok(t) = transport {
            assert_eq!(t.origin(), origin);
        }
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(TransportError::NotFound("g/a/1/a-1.jar".to_string()).to_string(), "g/a/1/a-1.jar not found");
    }
}
