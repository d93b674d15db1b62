//! The two pipelines: building an artifact list from a configuration, and building a local
//!  repository from an artifact list.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, info_span, Instrument};

use crate::artifact_list::builder::{ConfiguredSources, ListFileSource, SourceReader};
use crate::artifact_list::filter::{ArtifactFilter, NoFilter, PatternFilter};
use crate::artifact_list::resolver::{flatten, reduce_priorities, ResolvedArtifactList};
use crate::config::Configuration;
use crate::maven::coordinates::{MavenClassifier, MavenCoordinates};
use crate::repo_builder::artifact_fetcher::ArtifactFetcher;
use crate::repo_builder::checksums::ChecksumGenerator;
use crate::repo_builder::report::RunReport;
use crate::repo_builder::transport::transport_for_origin;
use crate::util::staged_file::ensure_dir;
use crate::util::validating_http_downloader::ValidatingHttpDownloader;

/// Reads all configured sources, keeps the highest priority source for each artifact version,
///  applies the configured exclusions and groups the result by repository.
pub async fn generate_artifact_list(config: &Configuration, downloader: Arc<ValidatingHttpDownloader>) -> anyhow::Result<ResolvedArtifactList> {
    let filter = PatternFilter::from_config(config)?;

    let index = ConfiguredSources::new(config, downloader)
        .read_sources()
        .await;
    index.log_contents("Artifacts found in sources");

    let reduced = reduce_priorities(index);
    let filtered = filter.filter(reduced);
    filtered.log_contents("Artifacts after priority reduction and filtering");

    Ok(flatten(&filtered, config.all_classifiers))
}

/// Reads artifact list files, all of them retrieved from `url`. Every artifact named in any of the
///  files is kept, including all classifiers.
pub async fn read_list_files(files: &[PathBuf], url: &str) -> ResolvedArtifactList {
    let index = ListFileSource::new(files.to_vec(), url)
        .read_sources()
        .await;
    flatten(&NoFilter.filter(reduce_priorities(index)), true)
}

/// Fills a local repository directory with the artifacts of a list and generates checksum files
///  for everything in it.
pub struct RepositoryBuilder {
    output: PathBuf,
    fetcher: ArtifactFetcher,
    downloader: Arc<ValidatingHttpDownloader>,
}
impl RepositoryBuilder {
    pub fn new(output: &Path, auxiliary_classifiers: Vec<MavenClassifier>, downloader: Arc<ValidatingHttpDownloader>) -> RepositoryBuilder {
        RepositoryBuilder {
            output: output.to_path_buf(),
            fetcher: ArtifactFetcher::new(output, auxiliary_classifiers),
            downloader,
        }
    }

    async fn fetch_origin(&self, origin: &str, artifacts: &[MavenCoordinates], report: &mut RunReport) {
        match transport_for_origin(origin, self.downloader.clone()) {
            Ok(transport) => {
                self.fetcher.fetch_artifacts(transport.as_ref(), artifacts, report).await;
            }
            Err(e) => {
                error!("Skipping {} artifacts: {}", artifacts.len(), e);
                report.reject_origin(origin, e.to_string());
            }
        }
    }

    /// Only a failure to create the output directory is an error, everything else ends up in the
    ///  report.
    pub async fn build(&self, list: &ResolvedArtifactList) -> anyhow::Result<RunReport> {
        let span = info_span!("build", output = %self.output.display());
        async {
            ensure_dir(&self.output).await?;
            let mut report = RunReport::new();

            info!("Retrieving {} artifacts from {} repositories", list.len(), list.origins().count());
            for (origin, artifacts) in list.iter() {
                self.fetch_origin(origin, artifacts, &mut report).await;
            }

            ChecksumGenerator::new(&self.output)
                .generate(&mut report)
                .await;
            Ok::<_, anyhow::Error>(report)
        }
            .instrument(span)
            .await
    }
}
