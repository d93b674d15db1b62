use std::path::{Path, PathBuf};

use async_recursion::async_recursion;
use tokio::fs::{metadata, read_dir, symlink_metadata};
use tracing::{debug, warn};

/// Recursively collects all regular files below `dir`. Symbolic links to files are included,
///  symbolic links to directories are not descended into. Subdirectories that can not be read are
///  logged and skipped, only an unreadable `dir` itself is an error.
pub async fn list_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut entries = read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        visit(entry.path(), &mut files).await;
    }
    files.sort();
    Ok(files)
}

#[async_recursion]
async fn visit(path: PathBuf, files: &mut Vec<PathBuf>) {
    let file_metadata = match symlink_metadata(&path).await {
        Ok(m) => m,
        Err(e) => {
            warn!("skipping {}: {}", path.display(), e);
            return;
        }
    };

    if file_metadata.is_symlink() {
        match metadata(&path).await {
            Ok(target) if target.is_file() => files.push(path),
            Ok(_) => debug!("not following symbolic link {}", path.display()),
            Err(e) => warn!("skipping dangling symbolic link {}: {}", path.display(), e),
        }
    }
    else if file_metadata.is_file() {
        files.push(path);
    }
    else if file_metadata.is_dir() {
        let mut entries = match read_dir(&path).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("skipping directory {}: {}", path.display(), e);
                return;
            }
        };
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => visit(entry.path(), files).await,
                Ok(None) => break,
                Err(e) => {
                    warn!("error listing directory {}: {}", path.display(), e);
                    break;
                }
            }
        }
    }
}

/// `path` relative to `root` with '/' as separator, as used in repository paths and URLs
pub fn relative_repo_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Vec<String> = relative.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(segments.join("/"))
}
