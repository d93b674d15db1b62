use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::artifact_list::layered_index::LayeredIndex;
use crate::artifact_list::repository_lister::{artifacts_in, RepositoryLister};
use crate::config::{ArtifactSource, Configuration};
use crate::maven::dependency_list::read_list_file;
use crate::maven::patterns::{any_matches, listing_prefixes, GavPattern};
use crate::util::validating_http_downloader::ValidatingHttpDownloader;

/// Reads source declarations into a layered index. Sources that can not be read are logged and
///  contribute nothing - they are never an error for the index as a whole.
#[async_trait]
pub trait SourceReader {
    async fn read_sources(&self) -> LayeredIndex;
}

const LIST_FILE_PRIORITY: u32 = 1;

/// Plain artifact list files whose artifacts are all retrieved from one repository. The files are
///  one source: everything they list is kept, and classifiers of the same version are merged.
pub struct ListFileSource {
    files: Vec<PathBuf>,
    url: String,
}
impl ListFileSource {
    pub fn new(files: Vec<PathBuf>, url: &str) -> ListFileSource {
        ListFileSource {
            files,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl SourceReader for ListFileSource {
    async fn read_sources(&self) -> LayeredIndex {
        let mut index = LayeredIndex::new();
        for file in &self.files {
            add_list_file(&mut index, LIST_FILE_PRIORITY, file, &self.url).await;
        }
        index
    }
}

async fn add_list_file(index: &mut LayeredIndex, priority: u32, file: &Path, url: &str) {
    if !file.is_file() {
        warn!("Dependency list file does not exist, skipping: {}", file.display());
        return;
    }

    info!("Reading artifact list from file: {}", file.display());
    match read_list_file(file).await {
        Ok(artifacts) => {
            for artifact in &artifacts {
                index.add_artifact(priority, artifact, url);
            }
        }
        Err(e) => {
            error!("Unable to read file {}: {}", file.display(), e);
        }
    }
}

/// The artifact sources of a configuration, ranked in declaration order.
pub struct ConfiguredSources<'a> {
    config: &'a Configuration,
    lister: RepositoryLister,
}
impl<'a> ConfiguredSources<'a> {
    pub fn new(config: &'a Configuration, downloader: Arc<ValidatingHttpDownloader>) -> ConfiguredSources<'a> {
        ConfiguredSources {
            config,
            lister: RepositoryLister::new(downloader),
        }
    }

    async fn add_repository(&self, index: &mut LayeredIndex, priority: u32, urls: &[&str], included_gav_patterns: &[String]) {
        let patterns = match GavPattern::parse_all(included_gav_patterns) {
            Ok(p) => p,
            Err(e) => {
                error!("Skipping repository source: {}", e);
                return;
            }
        };
        let prefixes = listing_prefixes(included_gav_patterns);

        // the first repository that has an artifact version wins, see LayeredIndex::add_artifact
        for url in urls {
            let files = match self.lister.list_files(url, &prefixes).await {
                Ok(files) => files,
                Err(e) => {
                    error!("Error while listing repository {}: {}", url, e);
                    continue;
                }
            };

            let mut count = 0;
            for artifact in artifacts_in(&files) {
                if patterns.is_empty() || any_matches(&patterns, &artifact.gav()) {
                    index.add_artifact(priority, &artifact, url);
                    count += 1;
                }
            }
            debug!("Found {} artifact files in {}", count, url);
        }
    }
}

#[async_trait]
impl<'a> SourceReader for ConfiguredSources<'a> {
    async fn read_sources(&self) -> LayeredIndex {
        let mut index = LayeredIndex::new();

        for (priority, source) in (1..).zip(&self.config.artifact_sources) {
            match source {
                ArtifactSource::Repository { repo_url, included_gav_patterns } => {
                    info!("Building artifact list from repository {:?}", repo_url.urls());
                    self.add_repository(&mut index, priority, &repo_url.urls(), included_gav_patterns).await;
                }
                ArtifactSource::ArtifactList { repo_url, files } => {
                    info!("Building artifact list from list files for {}", repo_url);
                    for file in files {
                        add_list_file(&mut index, priority, &self.config.resolve_path(file), repo_url).await;
                    }
                }
                ArtifactSource::Unsupported => {
                    warn!("Unsupported source type of artifact source #{}", priority);
                    continue;
                }
            }
            debug!("The result contains {} GATs so far", index.gat_count());
        }

        index
    }
}
