//! Configuration of the artifact list generator.
//!
//! The configuration is a JSON document with kebab-case keys:
//!
//! ```json
//! {
//!   "artifact-sources": [
//!     {"type": "repository", "repo-url": ["file:///srv/repo"], "included-gav-patterns": ["org.example:*"]},
//!     {"type": "artifact-list", "repo-url": "https://repo1.maven.org/maven2/", "files": ["deps.txt"]}
//!   ],
//!   "excluded-gav-patterns": ["r/.*-SNAPSHOT$/"],
//!   "excluded-types": ["war"],
//!   "excluded-classifiers": ["tests"]
//! }
//! ```
//!
//! Sources are listed in order of decreasing priority: when several sources provide the same
//!  artifact version, the one declared first wins.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RepoUrls {
    One(String),
    Many(Vec<String>),
}
impl RepoUrls {
    pub fn urls(&self) -> Vec<&str> {
        match self {
            RepoUrls::One(url) => vec![url.as_str()],
            RepoUrls::Many(urls) => urls.iter().map(|u| u.as_str()).collect(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ArtifactSource {
    /// all artifacts found in one or more repositories, optionally restricted to GAV patterns
    #[serde(rename_all = "kebab-case")]
    Repository {
        repo_url: RepoUrls,
        #[serde(default)]
        included_gav_patterns: Vec<String>,
    },
    /// artifacts listed in text files, all of them retrieved from the same repository
    #[serde(rename_all = "kebab-case")]
    ArtifactList {
        repo_url: String,
        files: Vec<PathBuf>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Configuration {
    #[serde(default)]
    pub artifact_sources: Vec<ArtifactSource>,
    #[serde(default)]
    pub excluded_gav_patterns: Vec<String>,
    #[serde(default)]
    pub excluded_types: Vec<String>,
    #[serde(default)]
    pub excluded_classifiers: Vec<String>,
    /// keep every classifier found by the sources instead of only the main artifacts
    #[serde(default)]
    pub all_classifiers: bool,

    /// directory that relative paths in the configuration are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}
impl Configuration {
    pub fn parse(json: &str) -> anyhow::Result<Configuration> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> anyhow::Result<Configuration> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration file {}", path.display()))?;
        let mut config = Configuration::parse(&json)
            .with_context(|| format!("invalid configuration file {}", path.display()))?;
        config.base_dir = path.parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_default();
        Ok(config)
    }

    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        }
        else {
            self.base_dir.join(path)
        }
    }
}
