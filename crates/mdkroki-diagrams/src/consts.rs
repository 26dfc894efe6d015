//! Internal constants for diagram rendering.

use std::time::Duration;

/// Default Kroki server.
pub const DEFAULT_SERVER_URL: &str = "https://kroki.io";

/// Default HTTP timeout for Kroki requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Block body prefix that loads the diagram source from a file.
pub const FROM_FILE_SIGIL: &str = "@from_file:";

/// Encoded GET payloads at or above this length may be truncated by Kroki.
pub(crate) const GET_PAYLOAD_WARN_LEN: usize = 4096;

/// Fence option that only marks a block for the plugin and is dropped.
pub(crate) const KROKI_MARKER_OPTION: &str = "kroki";

/// Fence options consumed by presentation instead of being sent to Kroki.
pub(crate) const DISPLAY_WIDTH: &str = "display-width";
pub(crate) const DISPLAY_HEIGHT: &str = "display-height";
pub(crate) const DISPLAY_ALIGN: &str = "display-align";
