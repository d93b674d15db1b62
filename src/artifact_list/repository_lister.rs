use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;
use async_recursion::async_recursion;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace, warn};

use crate::maven::coordinates::{MavenClassifier, MavenCoordinates, POM_TYPE};
use crate::maven::paths::parse_maven_path;
use crate::origin::Origin;
use crate::util::validating_http_downloader::ValidatingHttpDownloader;
use crate::util::walk::{list_files, relative_repo_path};

lazy_static! {
    static ref HREF_REGEX: Regex = Regex::new(r#"(?i)href\s*=\s*"([^"]+)""#).unwrap();
}

/// Finds the files of an existing Maven repository, either by walking a local directory tree or by
///  crawling the HTML directory indexes served for a remote repository.
pub struct RepositoryLister {
    downloader: Arc<ValidatingHttpDownloader>,
}
impl RepositoryLister {
    pub fn new(downloader: Arc<ValidatingHttpDownloader>) -> RepositoryLister {
        RepositoryLister {
            downloader,
        }
    }

    /// Paths (relative to the repository root) of all files below the given prefixes. A prefix
    ///  that can not be listed contributes nothing, only failing to list the repository root is an
    ///  error.
    pub async fn list_files(&self, origin: &str, prefixes: &BTreeSet<String>) -> anyhow::Result<Vec<String>> {
        let origin_kind = Origin::parse(origin);
        if let Origin::Unsupported { scheme } = &origin_kind {
            return Err(anyhow!("unsupported protocol {} in {}", scheme, origin));
        }

        let mut result = Vec::new();
        for prefix in prefixes {
            debug!("listing repository {} prefix '{}'", origin, prefix);
            let files = match &origin_kind {
                Origin::Filesystem(root) => list_local(root, prefix).await,
                Origin::Http(base) => self.list_remote(base, prefix).await,
                Origin::Unsupported { .. } => continue,
            };
            match files {
                Ok(files) => result.extend(files),
                Err(e) if prefix.is_empty() => return Err(e),
                Err(e) => warn!("unable to list {} in {}: {}. Skipping...", prefix, origin, e),
            }
        }
        Ok(result)
    }

    async fn list_remote(&self, base: &str, prefix: &str) -> anyhow::Result<Vec<String>> {
        let mut files = Vec::new();
        let listing = self.downloader.get_text(&format!("{}{}", base, prefix)).await?;
        for entry in index_entries(&listing, &format!("{}{}", base, prefix)) {
            self.visit_remote(base, format!("{}{}", prefix, entry), &mut files).await;
        }
        Ok(files)
    }

    #[async_recursion]
    async fn visit_remote(&self, base: &str, path: String, files: &mut Vec<String>) {
        if !path.ends_with('/') {
            files.push(path);
            return;
        }

        let url = format!("{}{}", base, path);
        match self.downloader.get_text(&url).await {
            Ok(listing) => {
                for entry in index_entries(&listing, &url) {
                    self.visit_remote(base, format!("{}{}", path, entry), files).await;
                }
            }
            Err(e) => {
                warn!("error while listing {}: {}. Skipping...", url, e);
            }
        }
    }
}

async fn list_local(root: &Path, prefix: &str) -> anyhow::Result<Vec<String>> {
    let dir = root.join(prefix);
    if !dir.is_dir() {
        if prefix.is_empty() {
            return Err(anyhow!("repository directory {} does not exist", root.display()));
        }
        debug!("{} does not exist, nothing to list", dir.display());
        return Ok(vec![]);
    }

    Ok(list_files(&dir).await?
        .iter()
        .filter_map(|f| relative_repo_path(root, f))
        .collect())
}

/// The entries of an HTML directory index page as names relative to the directory, subdirectories
///  with a trailing '/'. Links that leave the directory are ignored.
fn index_entries(listing: &str, dir_url: &str) -> Vec<String> {
    let mut entries = BTreeSet::new();
    for captures in HREF_REGEX.captures_iter(listing) {
        let href = &captures[1];
        let href = href.strip_prefix(dir_url).unwrap_or(href);

        if href.is_empty()
            || href.starts_with(|c: char| "?#/.".contains(c))
            || href.contains(':')
            || href.trim_end_matches('/').contains('/')
        {
            continue;
        }
        entries.insert(href.to_string());
    }
    entries.into_iter().collect()
}

/// Parses repository file paths into artifact coordinates. Files that are not artifacts (checksums,
///  metadata, signatures) are skipped. A version's pom is dropped if the version has a main
///  artifact of another type, since the pom is fetched alongside it anyway. If a snapshot version
///  has timestamped files, all of its artifacts refer to the newest timestamp.
pub fn artifacts_in(paths: &[String]) -> Vec<MavenCoordinates> {
    let mut by_gav: BTreeMap<String, BTreeSet<MavenCoordinates>> = BTreeMap::new();
    for path in paths {
        match parse_maven_path(path) {
            Ok(coordinates) => {
                by_gav.entry(coordinates.gav())
                    .or_default()
                    .insert(coordinates);
            }
            Err(e) => trace!("not an artifact: {}", e),
        }
    }

    let mut result = Vec::new();
    for (_, artifacts) in by_gav {
        let newest_suffix = artifacts.iter()
            .filter_map(|a| a.snapshot_suffix.clone())
            .max();
        let artifacts: BTreeSet<MavenCoordinates> = artifacts.into_iter()
            .map(|a| a.with_snapshot_suffix(newest_suffix.clone()))
            .collect();

        let types: BTreeSet<&str> = artifacts.iter().map(|a| a.artifact_type.as_str()).collect();
        let has_main_non_pom = artifacts.iter()
            .any(|a| !a.is_pom() && a.classifier == MavenClassifier::Unclassified);
        let drop_pom = types.len() > 1 && has_main_non_pom;

        result.extend(artifacts.into_iter()
            .filter(|a| !(drop_pom && a.artifact_type == POM_TYPE)));
    }
    result
}
