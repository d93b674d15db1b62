use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use crate::repo_builder::transport::{Transport, TransportError};
use crate::util::staged_file::{write_staged, StagedWrite};
use crate::util::validating_http_downloader::{Download, ValidatingHttpDownloader};

/// Downloads files from a remote repository. Checksums announced in response headers are verified
///  before a file is renamed into place.
pub struct HttpTransport {
    origin: String,
    base_url: String,
    downloader: Arc<ValidatingHttpDownloader>,
}
impl HttpTransport {
    /// `base_url` has to end with a '/'
    pub fn new(origin: &str, base_url: String, downloader: Arc<ValidatingHttpDownloader>) -> HttpTransport {
        HttpTransport {
            origin: origin.to_string(),
            base_url,
            downloader,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn origin(&self) -> &str {
        &self.origin
    }

    async fn fetch(&self, relative_path: &str, destination: &Path) -> Result<StagedWrite, TransportError> {
        let url = format!("{}{}", self.base_url, relative_path);
        trace!("downloading {} to {}", url, destination.display());

        match self.downloader.download(&url).await? {
            Download::Found(body) => Ok(write_staged(destination, body).await?),
            Download::NotFound => Err(TransportError::NotFound(url)),
        }
    }
}
