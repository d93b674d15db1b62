use std::path::{Path, PathBuf};

use tokio::fs::try_exists;
use tracing::{debug, error, info, warn};

use crate::maven::coordinates::{MavenClassifier, MavenCoordinates};
use crate::maven::paths::{as_maven_path, as_remote_maven_path};
use crate::repo_builder::report::{FetchOutcome, RunReport, SkipReason};
use crate::repo_builder::transport::{Transport, TransportError};
use crate::util::staged_file::StagedWrite;

/// The files that make up an artifact in the output repository: the artifact itself, its pom,
///  and for main artifacts the requested auxiliary classifiers (e.g. sources).
pub fn files_to_fetch(artifact: &MavenCoordinates, auxiliary_classifiers: &[MavenClassifier]) -> Vec<MavenCoordinates> {
    let mut result = vec![artifact.clone()];
    if !artifact.is_pom() {
        result.push(artifact.pom());

        if !artifact.classifier.is_classified() {
            for classifier in auxiliary_classifiers {
                let auxiliary = artifact.with_classifier(classifier.clone());
                if !result.contains(&auxiliary) {
                    result.push(auxiliary);
                }
            }
        }
    }
    result
}

/// Copies artifacts from one origin into the output repository, skipping everything that is
///  there already.
pub struct ArtifactFetcher {
    output: PathBuf,
    auxiliary_classifiers: Vec<MavenClassifier>,
}
impl ArtifactFetcher {
    pub fn new(output: &Path, auxiliary_classifiers: Vec<MavenClassifier>) -> ArtifactFetcher {
        ArtifactFetcher {
            output: output.to_path_buf(),
            auxiliary_classifiers,
        }
    }

    /// Timestamped snapshot files are stored under their '-SNAPSHOT' name.
    pub async fn fetch_artifacts(&self, transport: &dyn Transport, artifacts: &[MavenCoordinates], report: &mut RunReport) {
        info!("Fetching {} artifacts from {}", artifacts.len(), transport.origin());
        for artifact in artifacts {
            for file in files_to_fetch(artifact, &self.auxiliary_classifiers) {
                let relative_path = as_maven_path(&file);
                let remote_path = as_remote_maven_path(&file);
                let outcome = self.fetch_file(transport, &remote_path, &relative_path).await;
                report.record_fetch(transport.origin(), &relative_path, outcome);
            }
        }
    }

    async fn fetch_file(&self, transport: &dyn Transport, remote_path: &str, relative_path: &str) -> FetchOutcome {
        let destination = self.output.join(relative_path);

        match try_exists(&destination).await {
            Ok(true) => {
                debug!("{} is already present, skipping", relative_path);
                return FetchOutcome::Skipped(SkipReason::AlreadyPresent);
            }
            Ok(false) => {}
            Err(e) => {
                error!("Unable to check {}: {}", destination.display(), e);
                return FetchOutcome::Failed(e.to_string());
            }
        }

        match transport.fetch(remote_path, &destination).await {
            Ok(StagedWrite::Written) => {
                debug!("fetched {}", remote_path);
                FetchOutcome::Fetched
            }
            Ok(StagedWrite::AlreadyPresent) => FetchOutcome::Skipped(SkipReason::AlreadyPresent),
            Err(TransportError::NotFound(location)) => {
                warn!("{} was not found", location);
                FetchOutcome::Skipped(SkipReason::NotFound)
            }
            Err(TransportError::Other(e)) => {
                error!("Failed to fetch {} from {}: {}", remote_path, transport.origin(), e);
                FetchOutcome::Failed(e.to_string())
            }
        }
    }
}
