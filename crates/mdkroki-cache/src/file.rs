//! On-disk cache tier.
//!
//! [`DiskStore`] keeps one file per entry, named `{hash}.{extension}`, in a
//! single flat directory. There is no metadata file: a file's modification
//! time records when the entry was last written or read.
//!
//! On open, entries whose modification time is older than the retention
//! window are deleted. Reads refresh the modification time, so frequently
//! used diagrams survive the sweep (a coarse LRU by mtime).

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::Fingerprint;

/// Directory-backed store of rendered diagrams.
#[derive(Debug)]
pub(crate) struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    /// Open the store at `dir`, creating it if needed, then sweep stale entries.
    ///
    /// Returns `None` if the directory cannot be created; the caller then
    /// runs without a disk tier.
    pub(crate) fn open(dir: PathBuf, retention: Duration) -> Option<Self> {
        if let Err(e) = fs::create_dir_all(&dir) {
            tracing::warn!("could not create cache directory {}: {e}", dir.display());
            return None;
        }
        tracing::debug!("using cache directory: {}", dir.display());

        let store = Self { dir };
        let deleted = store.sweep(retention, SystemTime::now());
        if deleted > 0 {
            tracing::info!("cleaned up {deleted} old cache files");
        }
        Some(store)
    }

    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }

    /// Delete entries last modified more than `retention` before `now`.
    ///
    /// Returns the number of deleted files. Individual failures are logged
    /// and skipped.
    fn sweep(&self, retention: Duration, now: SystemTime) -> usize {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("error during cache cleanup: {e}");
                return 0;
            }
        };

        let mut deleted = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let Ok(modified) = metadata.modified() else {
                continue;
            };
            // Entries with a future mtime have an age of zero
            let age = now.duration_since(modified).unwrap_or_default();
            if age > retention {
                match fs::remove_file(&path) {
                    Ok(()) => deleted += 1,
                    Err(e) => {
                        tracing::debug!("could not delete cache file {}: {e}", path.display());
                    }
                }
            }
        }
        deleted
    }

    /// Read an entry, refreshing its modification time on success.
    pub(crate) fn get(&self, key: &Fingerprint) -> Option<Vec<u8>> {
        let path = self.dir.join(key.file_name());
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("could not read cache file {}: {e}", path.display());
                return None;
            }
        };

        if let Err(e) = touch(&path) {
            tracing::debug!("could not touch cache file {}: {e}", path.display());
        }
        Some(data)
    }

    /// Write an entry. Failures are logged and swallowed.
    pub(crate) fn put(&self, key: &Fingerprint, value: &[u8]) {
        let path = self.dir.join(key.file_name());
        match fs::write(&path, value) {
            Ok(()) => tracing::debug!(key = key.short(), "cached to file"),
            Err(e) => tracing::warn!("could not write cache file {}: {e}", path.display()),
        }
    }
}

/// Set a file's modification time to now without changing its content.
fn touch(path: &Path) -> io::Result<()> {
    let file = File::options().write(true).open(path)?;
    file.set_modified(SystemTime::now())
}
