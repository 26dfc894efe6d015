//! Cache directory resolution.

use std::path::{Path, PathBuf};

/// Directory name appended to the platform and fallback cache roots.
pub const CACHE_DIR_NAME: &str = "mdkroki";

/// Resolve the on-disk cache directory.
///
/// Fallback chain:
/// 1. `explicit`, used as is
/// 2. The platform user cache root (e.g. `$XDG_CACHE_HOME`) + `mdkroki`
/// 3. `$HOME/.cache/mdkroki`
/// 4. The process temp directory + `mdkroki`
///
/// The directory is not created here.
#[must_use]
pub fn resolve_cache_dir(explicit: Option<&Path>) -> PathBuf {
    resolve_with(
        explicit,
        dirs::cache_dir(),
        dirs::home_dir(),
        std::env::temp_dir(),
    )
}

fn resolve_with(
    explicit: Option<&Path>,
    platform_cache: Option<PathBuf>,
    home: Option<PathBuf>,
    temp: PathBuf,
) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    if let Some(root) = platform_cache {
        return root.join(CACHE_DIR_NAME);
    }
    if let Some(home) = home {
        return home.join(".cache").join(CACHE_DIR_NAME);
    }
    tracing::info!("using temporary directory for cache: {}", temp.display());
    temp.join(CACHE_DIR_NAME)
}
