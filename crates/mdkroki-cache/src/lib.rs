//! Content-addressed cache for rendered diagrams.
//!
//! This crate decouples the diagram pipeline from cache storage. The core
//! API is the [`DiagramCache`] trait, keyed by a [`Fingerprint`] computed
//! from everything that affects the rendered output.
//!
//! # Implementations
//!
//! - [`NullCache`]: No-op implementation (always miss)
//! - [`TieredCache`]: In-process table backed by an on-disk directory whose
//!   file modification times drive time-based eviction
//!
//! Cache failures are never fatal. Disk errors are logged and treated as a
//! miss (on read) or a no-op (on write).
//!
//! # Example
//!
//! ```
//! use mdkroki_cache::{DiagramCache, Fingerprint, TieredCache};
//!
//! let cache = TieredCache::memory_only();
//! let key = Fingerprint::compute("mermaid", "svg", "graph TD; A-->B;", [("theme", "dark")]);
//!
//! assert_eq!(cache.get(&key), None);
//! cache.put(&key, b"<svg/>");
//! assert_eq!(cache.get(&key), Some(b"<svg/>".to_vec()));
//! ```

mod dir;
mod file;
mod key;
mod tiered;

pub use dir::{CACHE_DIR_NAME, resolve_cache_dir};
pub use key::Fingerprint;
pub use tiered::{CacheSettings, DEFAULT_RETENTION, TieredCache};

/// Store of rendered diagram bytes keyed by [`Fingerprint`].
///
/// Implementations must be safe to share between the concurrent tasks that
/// render the blocks of one document.
pub trait DiagramCache: Send + Sync {
    /// Retrieve previously stored bytes.
    ///
    /// Returns `None` on a miss. Storage errors are also reported as a miss.
    fn get(&self, key: &Fingerprint) -> Option<Vec<u8>>;

    /// Store rendered bytes.
    ///
    /// Overwrites any existing entry. Storage errors are swallowed.
    fn put(&self, key: &Fingerprint, value: &[u8]);
}

/// No-op [`DiagramCache`] that never stores or retrieves data.
///
/// Use when caching is disabled.
#[derive(Debug, Default)]
pub struct NullCache;

impl DiagramCache for NullCache {
    fn get(&self, _key: &Fingerprint) -> Option<Vec<u8>> {
        None
    }

    fn put(&self, _key: &Fingerprint, _value: &[u8]) {}
}
