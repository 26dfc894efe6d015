//! Renderer contract.

use std::collections::BTreeMap;

/// Parameters of one render call.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// Kroki endpoint name (e.g. `mermaid`).
    pub diagram_type: &'a str,
    /// Output extension (e.g. `svg`).
    pub extension: &'a str,
    /// Diagram source text.
    pub source: &'a str,
    /// Diagram options forwarded to the service.
    pub options: &'a BTreeMap<String, String>,
}

/// Where the rendered image lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
    /// The image is served from this URL.
    Url(String),
    /// The image bytes themselves.
    Embedded(Vec<u8>),
}

/// Result of rendering one diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    /// Output file extension.
    pub extension: String,
    pub source: ArtifactSource,
}

impl RenderedArtifact {
    /// Artifact holding image bytes.
    #[must_use]
    pub fn embedded(extension: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            extension: extension.into(),
            source: ArtifactSource::Embedded(bytes),
        }
    }

    /// Artifact referencing an image URL.
    #[must_use]
    pub fn url(extension: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            source: ArtifactSource::Url(url.into()),
        }
    }
}

/// Render failure for a single diagram.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The service rejected the diagram source.
    #[error("diagram error (HTTP 400)")]
    Diagram { body: String },
    /// The service answered with an unexpected status.
    #[error("unexpected HTTP {status}")]
    Status { status: u16, body: String },
    /// The request could not be sent or the response not read.
    #[error("request failed: {0}")]
    Request(String),
    /// Local failure preparing the request.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Response body returned by the service, if any.
    #[must_use]
    pub fn response_text(&self) -> Option<&str> {
        match self {
            Self::Diagram { body } | Self::Status { body, .. } => Some(body),
            Self::Request(_) | Self::Io(_) => None,
        }
    }
}

/// Turns diagram source into a [`RenderedArtifact`].
///
/// Called concurrently from the worker pool, one call per diagram block.
/// Timeouts and retries are the implementation's concern.
pub trait Renderer: Send + Sync {
    /// Render one diagram.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the diagram could not be rendered.
    fn render(&self, request: &RenderRequest<'_>) -> Result<RenderedArtifact, RenderError>;
}
