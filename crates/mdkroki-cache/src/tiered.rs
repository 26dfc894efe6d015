//! Two-tier diagram cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use crate::dir::resolve_cache_dir;
use crate::file::DiskStore;
use crate::{DiagramCache, Fingerprint};

/// Default maximum age of on-disk entries (3 days).
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(3 * 24 * 60 * 60);

/// Settings for opening a [`TieredCache`].
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Explicit cache directory. When `None`, the platform fallback chain of
    /// [`resolve_cache_dir`] applies.
    pub dir: Option<PathBuf>,
    /// Entries not modified for longer than this are deleted on open.
    pub retention: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            dir: None,
            retention: DEFAULT_RETENTION,
        }
    }
}

/// [`DiagramCache`] with an in-process table in front of a disk directory.
///
/// Lookups check memory first, then disk; a disk hit is copied into memory.
/// Writes always go to both tiers. If the cache directory cannot be created,
/// the disk tier is disabled for the lifetime of the cache and the memory
/// tier keeps working.
#[derive(Debug)]
pub struct TieredCache {
    memory: RwLock<HashMap<Fingerprint, Vec<u8>>>,
    disk: Option<DiskStore>,
}

impl TieredCache {
    /// Open the cache, resolving and creating its directory and deleting
    /// entries older than the retention window.
    ///
    /// The sweep runs once, synchronously, before the cache is returned.
    #[must_use]
    pub fn open(settings: &CacheSettings) -> Self {
        let dir = resolve_cache_dir(settings.dir.as_deref());
        Self {
            memory: RwLock::new(HashMap::new()),
            disk: DiskStore::open(dir, settings.retention),
        }
    }

    /// Create a cache without a disk tier.
    #[must_use]
    pub fn memory_only() -> Self {
        Self {
            memory: RwLock::new(HashMap::new()),
            disk: None,
        }
    }

    /// Directory of the disk tier, if enabled.
    #[must_use]
    pub fn disk_dir(&self) -> Option<&Path> {
        self.disk.as_ref().map(DiskStore::dir)
    }

    /// Number of entries in the memory tier.
    #[must_use]
    pub fn memory_len(&self) -> usize {
        self.memory
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl DiagramCache for TieredCache {
    fn get(&self, key: &Fingerprint) -> Option<Vec<u8>> {
        let cached = self
            .memory
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned();
        if let Some(data) = cached {
            tracing::debug!(key = key.short(), "cache hit (memory)");
            return Some(data);
        }

        if let Some(data) = self.disk.as_ref().and_then(|disk| disk.get(key)) {
            tracing::debug!(key = key.short(), "cache hit (file)");
            self.memory
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(key.clone(), data.clone());
            return Some(data);
        }

        tracing::debug!(key = key.short(), "cache miss");
        None
    }

    fn put(&self, key: &Fingerprint, value: &[u8]) {
        self.memory
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), value.to_vec());

        if let Some(disk) = &self.disk {
            disk.put(key, value);
        }
    }
}
