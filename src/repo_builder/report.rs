use std::path::PathBuf;

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// the file exists in the output repository from an earlier run
    AlreadyPresent,
    /// the origin does not have the file, which is normal for optional files like sources jars
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched,
    Skipped(SkipReason),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRecord {
    pub origin: String,
    /// path relative to the repository root
    pub path: String,
    pub outcome: FetchOutcome,
}

/// Everything that happened during a repository build. Failures of individual files do not abort a
///  build, they end up here.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub fetches: Vec<FetchRecord>,
    /// origins that were not fetched from at all, with the reason
    pub rejected_origins: Vec<(String, String)>,
    pub checksums_written: Vec<PathBuf>,
    pub checksum_failures: Vec<(PathBuf, String)>,
}
impl RunReport {
    pub fn new() -> RunReport {
        Default::default()
    }

    pub fn record_fetch(&mut self, origin: &str, path: &str, outcome: FetchOutcome) {
        self.fetches.push(FetchRecord {
            origin: origin.to_string(),
            path: path.to_string(),
            outcome,
        });
    }

    pub fn reject_origin(&mut self, origin: &str, reason: String) {
        self.rejected_origins.push((origin.to_string(), reason));
    }

    pub fn fetched_count(&self) -> usize {
        self.count(|o| *o == FetchOutcome::Fetched)
    }

    pub fn skipped_count(&self, reason: SkipReason) -> usize {
        self.count(|o| *o == FetchOutcome::Skipped(reason))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, FetchOutcome::Failed(_)))
    }

    fn count(&self, predicate: impl Fn(&FetchOutcome) -> bool) -> usize {
        self.fetches.iter()
            .filter(|r| predicate(&r.outcome))
            .count()
    }

    pub fn outcome(&self, path: &str) -> Option<&FetchOutcome> {
        self.fetches.iter()
            .find(|r| r.path == path)
            .map(|r| &r.outcome)
    }

    /// true if nothing went wrong beyond files that the origins do not have
    pub fn is_clean(&self) -> bool {
        self.failed_count() == 0 && self.rejected_origins.is_empty() && self.checksum_failures.is_empty()
    }

    pub fn log_summary(&self) {
        info!("Fetched {} files, {} already present, {} not found in their repository, {} failed",
            self.fetched_count(),
            self.skipped_count(SkipReason::AlreadyPresent),
            self.skipped_count(SkipReason::NotFound),
            self.failed_count(),
        );
        info!("Wrote {} checksum files", self.checksums_written.len());

        for (origin, reason) in &self.rejected_origins {
            warn!("Skipped repository {}: {}", origin, reason);
        }
        for record in &self.fetches {
            if let FetchOutcome::Failed(reason) = &record.outcome {
                warn!("Failed to fetch {} from {}: {}", record.path, record.origin, reason);
            }
        }
        for (path, reason) in &self.checksum_failures {
            warn!("Failed to generate checksums for {}: {}", path.display(), reason);
        }
    }
}
