//! Diagram types supported by Kroki and their output extensions.
//!
//! [`DiagramTypes`] is built once from a [`TypesConfig`] and maps every
//! enabled diagram type to the output extension it will be rendered with.
//! Configuration problems are reported at construction, never per block.

use std::collections::BTreeMap;
use std::fmt;

/// Group of diagram types enabled or disabled together.
///
/// The base family is always enabled; the others can be toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagramFamily {
    Base,
    BlockDiag,
    Bpmn,
    Excalidraw,
    Mermaid,
    DiagramsNet,
}

impl DiagramFamily {
    /// Families that can be disabled.
    pub const OPTIONAL: [Self; 5] = [
        Self::BlockDiag,
        Self::Bpmn,
        Self::Excalidraw,
        Self::Mermaid,
        Self::DiagramsNet,
    ];

    /// Family name as used in configuration keys (`enable_{name}`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::BlockDiag => "blockdiag",
            Self::Bpmn => "bpmn",
            Self::Excalidraw => "excalidraw",
            Self::Mermaid => "mermaid",
            Self::DiagramsNet => "diagramsnet",
        }
    }
}

impl fmt::Display for DiagramFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct KnownType {
    name: &'static str,
    family: DiagramFamily,
    extensions: &'static [&'static str],
}

const fn known(
    name: &'static str,
    family: DiagramFamily,
    extensions: &'static [&'static str],
) -> KnownType {
    KnownType {
        name,
        family,
        extensions,
    }
}

const SVG: &[&str] = &["svg"];
const PNG_SVG: &[&str] = &["png", "svg"];
const PNG_SVG_PDF: &[&str] = &["png", "svg", "pdf"];
const PNG_SVG_JPEG: &[&str] = &["png", "svg", "jpeg"];
const PNG_SVG_JPEG_PDF: &[&str] = &["png", "svg", "jpeg", "pdf"];

/// Every diagram type Kroki renders, with the extensions it supports.
const KNOWN_TYPES: &[KnownType] = &[
    known("bytefield", DiagramFamily::Base, SVG),
    known("ditaa", DiagramFamily::Base, PNG_SVG),
    known("erd", DiagramFamily::Base, PNG_SVG_JPEG_PDF),
    known("graphviz", DiagramFamily::Base, PNG_SVG_JPEG_PDF),
    known("nomnoml", DiagramFamily::Base, SVG),
    known("plantuml", DiagramFamily::Base, PNG_SVG_JPEG),
    known("structurizr", DiagramFamily::Base, PNG_SVG),
    known("c4plantuml", DiagramFamily::Base, PNG_SVG_JPEG),
    known("svgbob", DiagramFamily::Base, SVG),
    known("vega", DiagramFamily::Base, PNG_SVG_PDF),
    known("vegalite", DiagramFamily::Base, PNG_SVG_PDF),
    known("wavedrom", DiagramFamily::Base, SVG),
    known("pikchr", DiagramFamily::Base, SVG),
    known("umlet", DiagramFamily::Base, PNG_SVG),
    known("d2", DiagramFamily::Base, SVG),
    known("dbml", DiagramFamily::Base, SVG),
    known("tikz", DiagramFamily::Base, PNG_SVG_JPEG_PDF),
    known("symbolator", DiagramFamily::Base, SVG),
    known("wireviz", DiagramFamily::Base, PNG_SVG),
    known("blockdiag", DiagramFamily::BlockDiag, PNG_SVG_PDF),
    known("seqdiag", DiagramFamily::BlockDiag, PNG_SVG_PDF),
    known("actdiag", DiagramFamily::BlockDiag, PNG_SVG_PDF),
    known("nwdiag", DiagramFamily::BlockDiag, PNG_SVG_PDF),
    known("packetdiag", DiagramFamily::BlockDiag, PNG_SVG_PDF),
    known("rackdiag", DiagramFamily::BlockDiag, PNG_SVG_PDF),
    known("bpmn", DiagramFamily::Bpmn, SVG),
    known("excalidraw", DiagramFamily::Excalidraw, SVG),
    known("mermaid", DiagramFamily::Mermaid, PNG_SVG),
    known("diagramsnet", DiagramFamily::DiagramsNet, SVG),
];

fn find_known(name: &str) -> Option<&'static KnownType> {
    KNOWN_TYPES.iter().find(|t| t.name == name)
}

/// Extensions Kroki supports for a diagram type, regardless of configuration.
#[must_use]
pub fn supported_extensions(diagram_type: &str) -> Option<&'static [&'static str]> {
    find_known(diagram_type).map(|t| t.extensions)
}

/// A resolved diagram type: canonical Kroki name plus output extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagramType {
    name: &'static str,
    extension: &'static str,
    family: DiagramFamily,
}

impl DiagramType {
    /// Canonical Kroki endpoint name (e.g. `mermaid`).
    #[must_use]
    pub fn name(self) -> &'static str {
        self.name
    }

    /// Output file extension (e.g. `svg`).
    #[must_use]
    pub fn extension(self) -> &'static str {
        self.extension
    }

    /// Family this type belongs to.
    #[must_use]
    pub fn family(self) -> DiagramFamily {
        self.family
    }
}

/// Configuration error detected while building [`DiagramTypes`].
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error("file type override for unknown diagram type '{diagram_type}'")]
    UnknownType { diagram_type: String },
    #[error("file type override for '{diagram_type}', but the {family} diagram family is disabled")]
    DisabledType {
        diagram_type: String,
        family: DiagramFamily,
    },
    #[error("diagram type '{diagram_type}' does not support '{extension}' (supported: {supported})")]
    UnsupportedExtension {
        diagram_type: String,
        extension: String,
        supported: String,
    },
    #[error(
        "diagram type '{diagram_type}' supports none of the configured file types [{preferred}] (supported: {supported})"
    )]
    NoSupportedExtension {
        diagram_type: String,
        preferred: String,
        supported: String,
    },
}

/// Inputs for building [`DiagramTypes`].
#[derive(Debug, Clone)]
pub struct TypesConfig {
    /// Prefix a fence language must carry (e.g. `kroki-`). Empty matches every tag.
    pub fence_prefix: String,
    /// Preferred extensions, most preferred first.
    pub file_types: Vec<String>,
    /// Per-type extension overriding `file_types`.
    pub file_type_overrides: BTreeMap<String, String>,
    /// Optional families that are enabled. The base family is always on.
    pub enabled_families: Vec<DiagramFamily>,
}

impl Default for TypesConfig {
    fn default() -> Self {
        Self {
            fence_prefix: String::new(),
            file_types: vec!["svg".to_owned()],
            file_type_overrides: BTreeMap::new(),
            enabled_families: DiagramFamily::OPTIONAL.to_vec(),
        }
    }
}

impl TypesConfig {
    fn is_enabled(&self, family: DiagramFamily) -> bool {
        family == DiagramFamily::Base || self.enabled_families.contains(&family)
    }
}

/// Maps fence languages to enabled diagram types.
#[derive(Debug, Clone)]
pub struct DiagramTypes {
    fence_prefix: String,
    types: BTreeMap<&'static str, DiagramType>,
}

impl DiagramTypes {
    /// Build the type table.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError`] if an override names an unknown or disabled
    /// type or an extension the type does not support, or if an enabled type
    /// without an override supports none of the preferred extensions.
    pub fn new(config: &TypesConfig) -> Result<Self, ResolverError> {
        for diagram_type in config.file_type_overrides.keys() {
            let known = find_known(diagram_type).ok_or_else(|| ResolverError::UnknownType {
                diagram_type: diagram_type.clone(),
            })?;
            if !config.is_enabled(known.family) {
                return Err(ResolverError::DisabledType {
                    diagram_type: diagram_type.clone(),
                    family: known.family,
                });
            }
        }

        let mut types = BTreeMap::new();
        for known in KNOWN_TYPES.iter().filter(|t| config.is_enabled(t.family)) {
            let extension = match config.file_type_overrides.get(known.name) {
                Some(requested) => known
                    .extensions
                    .iter()
                    .find(|ext| **ext == requested.as_str())
                    .copied()
                    .ok_or_else(|| ResolverError::UnsupportedExtension {
                        diagram_type: known.name.to_owned(),
                        extension: requested.clone(),
                        supported: known.extensions.join(", "),
                    })?,
                None => config
                    .file_types
                    .iter()
                    .find_map(|preferred| {
                        known
                            .extensions
                            .iter()
                            .find(|ext| **ext == preferred.as_str())
                            .copied()
                    })
                    .ok_or_else(|| ResolverError::NoSupportedExtension {
                        diagram_type: known.name.to_owned(),
                        preferred: config.file_types.join(", "),
                        supported: known.extensions.join(", "),
                    })?,
            };
            types.insert(
                known.name,
                DiagramType {
                    name: known.name,
                    extension,
                    family: known.family,
                },
            );
        }

        tracing::debug!(
            count = types.len(),
            prefix = %config.fence_prefix,
            "diagram types configured"
        );
        Ok(Self {
            fence_prefix: config.fence_prefix.clone(),
            types,
        })
    }

    /// Resolve a fence language tag to a diagram type.
    ///
    /// The configured prefix is stripped case-insensitively and the rest is
    /// lowercased. Returns `None` if the tag lacks the prefix or names no
    /// enabled type.
    #[must_use]
    pub fn resolve(&self, language: &str) -> Option<DiagramType> {
        let prefix_len = self.fence_prefix.len();
        let prefix = language.get(..prefix_len)?;
        if !prefix.eq_ignore_ascii_case(&self.fence_prefix) {
            return None;
        }
        let name = language[prefix_len..].to_ascii_lowercase();
        self.types.get(name.as_str()).copied()
    }

    /// Output extension of an enabled diagram type.
    #[must_use]
    pub fn file_extension(&self, diagram_type: &str) -> Option<&'static str> {
        self.types.get(diagram_type).map(|t| t.extension)
    }

    /// Enabled diagram types in name order.
    pub fn iter(&self) -> impl Iterator<Item = DiagramType> + '_ {
        self.types.values().copied()
    }

    /// Fence language prefix.
    #[must_use]
    pub fn fence_prefix(&self) -> &str {
        &self.fence_prefix
    }
}
