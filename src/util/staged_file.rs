use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::StreamExt;
use futures_core::Stream;
use tokio::fs::{create_dir_all, remove_file, rename, try_exists, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{error, trace};
use uuid::Uuid;

/// suffix of files that are being written and not yet renamed to their final name
pub const STAGING_SUFFIX: &str = ".inserting";

/// What happened to a staged write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedWrite {
    Written,
    /// the destination appeared while the data was being staged, the staged copy was discarded
    AlreadyPresent,
}

fn staging_path(destination: &Path) -> PathBuf {
    let file_name = destination.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    destination.with_file_name(format!(".{}.{}{}", file_name, Uuid::new_v4().as_hyphenated(), STAGING_SUFFIX))
}

/// Creates a directory including its parents. A directory that already exists, possibly because
///  it was created concurrently, is not an error.
pub async fn ensure_dir(dir: &Path) -> anyhow::Result<()> {
    match create_dir_all(dir).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

async fn do_write(staging_path: &Path, data: impl Stream<Item=anyhow::Result<Bytes>>) -> anyhow::Result<()> {
    let mut data = Box::pin(data);

    let mut file = OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(staging_path)
        .await?;

    while let Some(bytes) = data.next().await {
        file.write_all(&bytes?).await?;
    }
    file.flush().await?;
    file.sync_all().await?;
    Ok(())
}

/// Writes data to a uniquely named file next to the destination and atomically renames it into
///  place once all data is written, so the destination never holds partial content. Existing
///  destination files are never overwritten.
pub async fn write_staged(destination: &Path, data: impl Stream<Item=anyhow::Result<Bytes>>) -> anyhow::Result<StagedWrite> {
    if let Some(parent) = destination.parent() {
        ensure_dir(parent).await?;
    }

    let staging_path = staging_path(destination);
    trace!("staging {} as {}", destination.display(), staging_path.display());

    let result = match do_write(&staging_path, data).await {
        Ok(()) => {
            if try_exists(destination).await? {
                remove_file(&staging_path).await?;
                Ok(StagedWrite::AlreadyPresent)
            }
            else {
                rename(&staging_path, destination).await?;
                Ok(StagedWrite::Written)
            }
        }
        Err(e) => Err(e),
    };

    if result.is_err() {
        match remove_file(&staging_path).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                error!("error cleaning up {} after failed attempt to write: {}", staging_path.display(), e);
            }
        }
    }
    result
}

/// a file's content as a stream of chunks
pub async fn file_stream(path: &Path) -> anyhow::Result<impl Stream<Item=anyhow::Result<Bytes>>> {
    let file = File::open(path).await?;
    Ok(ReaderStream::new(file).map(|chunk| chunk.map_err(anyhow::Error::from)))
}
