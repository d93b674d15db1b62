use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::StreamExt;
use sha1::{Digest, Sha1};
use tokio::fs::try_exists;
use tracing::{debug, error, info, trace};

use crate::repo_builder::report::RunReport;
use crate::util::staged_file::{file_stream, write_staged, StagedWrite, STAGING_SUFFIX};
use crate::util::walk::list_files;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestKind {
    Md5,
    Sha1,
}
impl DigestKind {
    pub const ALL: [DigestKind; 2] = [DigestKind::Md5, DigestKind::Sha1];

    pub fn extension(&self) -> &'static str {
        match self {
            DigestKind::Md5 => "md5",
            DigestKind::Sha1 => "sha1",
        }
    }

    pub fn sidecar_path(&self, file: &Path) -> PathBuf {
        let mut name = file.as_os_str().to_owned();
        name.push(".");
        name.push(self.extension());
        PathBuf::from(name)
    }
}

/// true for checksum files and for leftovers of interrupted writes
fn is_excluded(file: &Path) -> bool {
    let name = file.file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    name.ends_with(STAGING_SUFFIX)
        || DigestKind::ALL.iter().any(|k| file.extension().map(|e| e == k.extension()).unwrap_or(false))
}

/// lowercase hex md5 and sha1 digests of a file, computed in a single pass
async fn digests(file: &Path) -> anyhow::Result<(String, String)> {
    let mut md5 = md5::Context::new();
    let mut sha1 = Sha1::new();

    let mut data = Box::pin(file_stream(file).await?);
    while let Some(chunk) = data.next().await {
        let chunk = chunk?;
        md5.consume(&chunk);
        sha1.update(&chunk);
    }
    Ok((format!("{:x}", md5.compute()), hex::encode(sha1.finalize())))
}

/// Writes `.md5` and `.sha1` files next to every file of a repository tree, leaving existing
///  checksum files alone.
pub struct ChecksumGenerator {
    root: PathBuf,
}
impl ChecksumGenerator {
    pub fn new(root: &Path) -> ChecksumGenerator {
        ChecksumGenerator {
            root: root.to_path_buf(),
        }
    }

    pub async fn generate(&self, report: &mut RunReport) {
        info!("Generating checksums in {}", self.root.display());

        let files = match list_files(&self.root).await {
            Ok(files) => files,
            Err(e) => {
                error!("Unable to list {}: {}", self.root.display(), e);
                report.checksum_failures.push((self.root.clone(), e.to_string()));
                return;
            }
        };

        for file in files.iter().filter(|f| !is_excluded(f)) {
            if let Err(e) = self.generate_for_file(file, report).await {
                error!("Failed to generate checksums for {}: {}", file.display(), e);
                report.checksum_failures.push((file.clone(), e.to_string()));
            }
        }
        debug!("wrote {} checksum files", report.checksums_written.len());
    }

    async fn generate_for_file(&self, file: &Path, report: &mut RunReport) -> anyhow::Result<()> {
        let mut missing = Vec::new();
        for kind in DigestKind::ALL {
            let sidecar = kind.sidecar_path(file);
            if !try_exists(&sidecar).await? {
                missing.push((kind, sidecar));
            }
        }
        if missing.is_empty() {
            trace!("checksums for {} exist", file.display());
            return Ok(());
        }

        let (md5, sha1) = digests(file).await?;
        for (kind, sidecar) in missing {
            let digest = match kind {
                DigestKind::Md5 => &md5,
                DigestKind::Sha1 => &sha1,
            };
            let content = Bytes::from(format!("{}\n", digest));
            if write_staged(&sidecar, futures::stream::iter([Ok(content)])).await? == StagedWrite::Written {
                report.checksums_written.push(sidecar);
            }
        }
        Ok(())
    }
}
