//! On-disk persistence for the startup cache file
//!
//! Writes never touch the canonical path until the new content is fully on
//! disk: bytes go to a temporary sibling file which is then renamed over
//! the target. A crash mid-write leaves at most an orphaned temp file,
//! which [`FileStorage::sweep_temp_files`] removes once it is older than
//! [`STALE_TEMP_AGE`]. Younger temp files may belong to a writer in another
//! process that has not renamed yet.

use crate::error::{StartupCacheError, StartupCacheResult};
use async_trait::async_trait;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

const TEMP_MARKER: &str = ".tmp.";

/// Minimum age before a temp file counts as orphaned
pub const STALE_TEMP_AGE: Duration = Duration::from_secs(10 * 60);

/// Why a cache read did not produce data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadFailure {
    /// No cache file yet (first run or cleared cache)
    NotFound,
    /// File exists but its content could not be decoded
    Decode(String),
    /// Any other read failure (permissions, file is a directory, ...)
    Io(String),
}

impl ReadFailure {
    /// Key recorded in the read error counter
    pub fn telemetry_key(&self) -> &'static str {
        match self {
            Self::NotFound => "NotFoundError",
            Self::Decode(_) => "DecodeError",
            Self::Io(_) => "IOError",
        }
    }

    /// A missing file is the normal first-run condition
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl fmt::Display for ReadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "cache file not found"),
            Self::Decode(reason) => write!(f, "cache file could not be decoded: {}", reason),
            Self::Io(reason) => write!(f, "cache file could not be read: {}", reason),
        }
    }
}

/// Storage backend for the cache file
///
/// The store serializes all calls, so implementations need not guard
/// against two writers on the same path.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Read the raw blob at `path`
    async fn read(&self, path: &Path) -> Result<Vec<u8>, ReadFailure>;

    /// Replace the blob at `path` atomically
    async fn write(&self, path: &Path, bytes: &[u8]) -> StartupCacheResult<()>;

    /// Delete the blob at `path`; a missing file is not an error
    async fn remove(&self, path: &Path) -> StartupCacheResult<()>;
}

/// Filesystem-backed storage
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStorage;

impl FileStorage {
    /// Create a filesystem storage
    pub fn new() -> Self {
        Self
    }

    /// Remove temp files left next to `path` by interrupted writes
    ///
    /// Only files last modified at least `min_age` ago are removed. Returns
    /// the number of files removed.
    pub async fn sweep_temp_files(
        &self,
        path: &Path,
        min_age: Duration,
    ) -> StartupCacheResult<usize> {
        let (dir, prefix) = match (path.parent(), path.file_name()) {
            (Some(dir), Some(name)) => (
                parent_or_cwd(dir),
                format!(".{}{}", name.to_string_lossy(), TEMP_MARKER),
            ),
            _ => return Ok(0),
        };

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(StartupCacheError::io(
                    format!("reading cache directory {}", dir.display()),
                    e,
                ))
            }
        };

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StartupCacheError::io("reading cache directory entry", e))?
        {
            if !entry.file_name().to_string_lossy().starts_with(&prefix) {
                continue;
            }

            let age = entry
                .metadata()
                .await
                .and_then(|meta| meta.modified())
                .ok()
                .and_then(|modified| SystemTime::now().duration_since(modified).ok());
            match age {
                Some(age) if age >= min_age => {}
                _ => {
                    debug!("Keeping recent temp file {}", entry.path().display());
                    continue;
                }
            }

            match fs::remove_file(entry.path()).await {
                Ok(()) => {
                    debug!("Removed orphaned temp file {}", entry.path().display());
                    removed += 1;
                }
                Err(e) => warn!(
                    "Failed to remove orphaned temp file {}: {}",
                    entry.path().display(),
                    e
                ),
            }
        }

        Ok(removed)
    }
}

#[async_trait]
impl CacheStorage for FileStorage {
    async fn read(&self, path: &Path) -> Result<Vec<u8>, ReadFailure> {
        match fs::read(path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ReadFailure::NotFound),
            Err(e) => Err(ReadFailure::Io(e.to_string())),
        }
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> StartupCacheResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StartupCacheError::write(path, e))?;
        }

        let temp_path = temp_path_for(path);

        if let Err(e) = write_synced(&temp_path, bytes).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StartupCacheError::write(path, e));
        }

        if let Err(e) = fs::rename(&temp_path, path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StartupCacheError::write(path, e));
        }

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    async fn remove(&self, path: &Path) -> StartupCacheResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StartupCacheError::io(
                format!("removing cache file {}", path.display()),
                e,
            )),
        }
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await
}

/// Unique temp path in the same directory, so the final rename never
/// crosses filesystems
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "startup-cache".to_string());
    let temp_name = format!(".{}{}{}", name, TEMP_MARKER, Uuid::new_v4().simple());

    match path.parent() {
        Some(parent) => parent.join(temp_name),
        None => PathBuf::from(temp_name),
    }
}

fn parent_or_cwd(dir: &Path) -> PathBuf {
    if dir.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        dir.to_path_buf()
    }
}
