//! Diagram blocks built from fence matches.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use mdkroki_cache::Fingerprint;
use mdkroki_fence::FenceMatch;

use crate::consts::{
    DISPLAY_ALIGN, DISPLAY_HEIGHT, DISPLAY_WIDTH, FROM_FILE_SIGIL, KROKI_MARKER_OPTION,
};
use crate::language::DiagramType;
use crate::render::RenderRequest;

/// Horizontal placement of a rendered diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayAlign {
    Left,
    Center,
    Right,
}

impl DisplayAlign {
    /// Parse an alignment value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    fn margins(self) -> (&'static str, &'static str) {
        match self {
            Self::Left => ("0", "auto"),
            Self::Center => ("auto", "auto"),
            Self::Right => ("auto", "0"),
        }
    }
}

/// Presentation options taken from `display-*` fence options.
///
/// These never reach the renderer or the fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    pub width: Option<String>,
    pub height: Option<String>,
    pub align: Option<DisplayAlign>,
}

impl DisplayOptions {
    /// Inline CSS for these options, empty when none are set.
    #[must_use]
    pub fn style(&self) -> String {
        let mut rules = Vec::new();
        if let Some(width) = &self.width {
            rules.push(format!("width: {width}"));
        }
        if let Some(height) = &self.height {
            rules.push(format!("height: {height}"));
        }
        if let Some(align) = self.align {
            let (left, right) = align.margins();
            rules.push("display: block".to_owned());
            rules.push(format!("margin-left: {left}"));
            rules.push(format!("margin-right: {right}"));
        }
        rules.join("; ")
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none() && self.align.is_none()
    }
}

/// The `@from_file:` indirection could not load its target.
#[derive(Debug, thiserror::Error)]
#[error("can't read file \"{}\" from code block \"{reference}\": {source}", path.display())]
pub struct BlockReadError {
    /// Resolved path that was read.
    pub path: PathBuf,
    /// Block body as written.
    pub reference: String,
    #[source]
    pub source: std::io::Error,
}

/// A fenced block recognized as a diagram.
#[derive(Debug)]
pub struct DiagramBlock {
    pub diagram_type: DiagramType,
    /// Options forwarded to the renderer, sorted by key.
    pub options: BTreeMap<String, String>,
    pub display: DisplayOptions,
    /// Diagram source, or why it could not be loaded.
    pub source: Result<String, BlockReadError>,
}

impl DiagramBlock {
    /// Build a block from a fence match already resolved to `diagram_type`.
    ///
    /// `display-*` options move into [`DisplayOptions`], a `kroki=` marker is
    /// dropped, and a body starting with `@from_file:` is replaced by the
    /// named file, relative to `doc_root`.
    #[must_use]
    pub fn from_match(fence: &FenceMatch, diagram_type: DiagramType, doc_root: &Path) -> Self {
        let mut options = BTreeMap::new();
        let mut display = DisplayOptions::default();

        for (key, value) in fence.options() {
            match key.as_str() {
                KROKI_MARKER_OPTION => {}
                DISPLAY_WIDTH => display.width = Some(value),
                DISPLAY_HEIGHT => display.height = Some(value),
                DISPLAY_ALIGN => match DisplayAlign::parse(&value) {
                    Some(align) => display.align = Some(align),
                    None => tracing::warn!(
                        value = %value,
                        "ignoring display-align (valid: left, center, right)"
                    ),
                },
                _ => {
                    options.insert(key, value);
                }
            }
        }

        Self {
            diagram_type,
            options,
            display,
            source: load_source(&fence.body, doc_root),
        }
    }

    /// Cache key, or `None` if the source could not be loaded.
    #[must_use]
    pub fn fingerprint(&self) -> Option<Fingerprint> {
        let source = self.source.as_ref().ok()?;
        Some(Fingerprint::compute(
            self.diagram_type.name(),
            self.diagram_type.extension(),
            source,
            &self.options,
        ))
    }

    /// Renderer request, or `None` if the source could not be loaded.
    #[must_use]
    pub fn request(&self) -> Option<RenderRequest<'_>> {
        let source = self.source.as_ref().ok()?;
        Some(RenderRequest {
            diagram_type: self.diagram_type.name(),
            extension: self.diagram_type.extension(),
            source,
            options: &self.options,
        })
    }
}

/// Resolve the block body, following the `@from_file:` indirection.
fn load_source(body: &str, doc_root: &Path) -> Result<String, BlockReadError> {
    let Some(reference) = body.strip_prefix(FROM_FILE_SIGIL) else {
        return Ok(body.to_owned());
    };

    let path = doc_root.join(reference.trim());
    tracing::debug!("reading diagram from file: {}", path.display());
    fs::read_to_string(&path).map_err(|source| BlockReadError {
        path,
        reference: body.trim_end().to_owned(),
        source,
    })
}
