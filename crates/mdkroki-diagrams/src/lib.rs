//! Diagram rendering via Kroki for Markdown documents.
//!
//! This crate turns diagram code blocks into HTML references to rendered
//! images:
//! - [`DiagramTypes`] maps fence languages to Kroki diagram types and output extensions
//! - [`DiagramBlock`] holds a block's options, display settings and source
//!   (including `@from_file:` indirection)
//! - [`DiagramProcessor`] renders all blocks of a document in parallel,
//!   cache-first, and rewrites the document
//! - [`KrokiRenderer`] is the HTTP [`Renderer`] for a Kroki server
//!
//! # Architecture
//!
//! The crate is organized into modules:
//! - [`language`]: Diagram families, supported extensions and type resolution
//! - [`block`]: Diagram blocks built from fence matches
//! - [`render`]: The [`Renderer`] contract and [`RenderedArtifact`]
//! - [`kroki`]: Kroki `GET`/`POST` rendering
//! - [`output`]: HTML tag emission and error placeholders
//! - [`processor`]: Document processing and substitution
//!
//! # Example
//!
//! ```no_run
//! use mdkroki_cache::{CacheSettings, TieredCache};
//! use mdkroki_diagrams::{DiagramProcessor, DiagramTypes, KrokiRenderer, TypesConfig};
//!
//! let types = DiagramTypes::new(&TypesConfig::default())?;
//! let processor = DiagramProcessor::new(types, Box::new(KrokiRenderer::new("https://kroki.io")))
//!     .with_cache(Box::new(TieredCache::open(&CacheSettings::default())));
//!
//! let html = processor.process_document("```mermaid\ngraph TD; A-->B;\n```\n")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod block;
mod consts;
pub mod kroki;
pub mod language;
pub mod output;
pub mod processor;
pub mod render;

pub use block::{BlockReadError, DiagramBlock, DisplayAlign, DisplayOptions};
pub use consts::{DEFAULT_SERVER_URL, DEFAULT_TIMEOUT, FROM_FILE_SIGIL};
pub use kroki::{HttpMethod, KrokiRenderer};
pub use language::{DiagramFamily, DiagramType, DiagramTypes, ResolverError, TypesConfig};
pub use output::TagFormat;
pub use processor::{BlockError, CancelToken, DiagramProcessor, DocumentError};
pub use render::{ArtifactSource, RenderError, RenderRequest, RenderedArtifact, Renderer};
