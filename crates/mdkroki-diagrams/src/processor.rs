//! Document-level diagram processing.
//!
//! This module provides [`DiagramProcessor`], which finds diagram blocks in a
//! Markdown document, renders them concurrently, and substitutes each block
//! with an HTML tag referencing the rendered image.

use std::cmp::Reverse;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use mdkroki_cache::{DiagramCache, NullCache};
use mdkroki_fence::{FenceMatch, Scanner, indent};
use rayon::ThreadPool;
use rayon::prelude::*;

use crate::block::{BlockReadError, DiagramBlock};
use crate::language::DiagramTypes;
use crate::output::{TagFormat, error_placeholder, render_tag};
use crate::render::{ArtifactSource, RenderError, RenderedArtifact, Renderer};

/// Cooperative cancellation flag shared with an in-flight document.
///
/// Blocks that have not reached their render call when the token is
/// cancelled skip rendering, and the document fails with
/// [`DocumentError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Failure of a single diagram block.
#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    #[error(transparent)]
    Read(#[from] BlockReadError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Document processing error.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// A block failed while fail-fast mode is on.
    #[error("diagram {index} ({diagram_type}): {source}")]
    Block {
        /// Zero-based index of the block among all fenced blocks.
        index: usize,
        diagram_type: &'static str,
        #[source]
        source: BlockError,
    },
    #[error("document processing cancelled")]
    Cancelled,
}

/// Renders every diagram block of a document and substitutes the results.
///
/// Blocks are independent: they are looked up in the cache and rendered in
/// parallel on the rayon pool, and the document is rewritten once all of
/// them have finished. Text outside diagram blocks is never modified, and
/// fenced blocks with other languages are left exactly as written.
///
/// A block that fails (unreadable `@from_file:` target or render error) is
/// replaced by an error placeholder, unless [`fail_fast`](Self::fail_fast)
/// is set, in which case the whole document fails.
///
/// # Example
///
/// ```
/// use mdkroki_diagrams::{
///     DiagramProcessor, DiagramTypes, RenderError, RenderRequest, RenderedArtifact, Renderer,
///     TypesConfig,
/// };
///
/// struct Fixed;
///
/// impl Renderer for Fixed {
///     fn render(&self, request: &RenderRequest<'_>) -> Result<RenderedArtifact, RenderError> {
///         Ok(RenderedArtifact::url(request.extension, "https://example.com/d.svg"))
///     }
/// }
///
/// let types = DiagramTypes::new(&TypesConfig::default()).unwrap();
/// let processor = DiagramProcessor::new(types, Box::new(Fixed));
///
/// let html = processor.process_document("```mermaid\ngraph TD\n```\n").unwrap();
/// assert_eq!(html, "<img alt=\"Kroki\" src=\"https://example.com/d.svg\">\n");
/// ```
pub struct DiagramProcessor {
    types: DiagramTypes,
    renderer: Box<dyn Renderer>,
    cache: Box<dyn DiagramCache>,
    scanner: Scanner,
    doc_root: PathBuf,
    tag_format: TagFormat,
    fail_fast: bool,
    pool: Option<Arc<ThreadPool>>,
}

impl DiagramProcessor {
    /// Create a processor with no cache, `<img>` tags and the current
    /// directory as the `@from_file:` root.
    #[must_use]
    pub fn new(types: DiagramTypes, renderer: Box<dyn Renderer>) -> Self {
        Self {
            types,
            renderer,
            cache: Box::new(NullCache),
            scanner: Scanner::new(),
            doc_root: PathBuf::from("."),
            tag_format: TagFormat::default(),
            fail_fast: false,
            pool: None,
        }
    }

    /// Set the cache consulted before rendering.
    #[must_use]
    pub fn with_cache(mut self, cache: Box<dyn DiagramCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Set the directory `@from_file:` paths are relative to.
    #[must_use]
    pub fn doc_root(mut self, doc_root: impl Into<PathBuf>) -> Self {
        self.doc_root = doc_root.into();
        self
    }

    #[must_use]
    pub fn tag_format(mut self, tag_format: TagFormat) -> Self {
        self.tag_format = tag_format;
        self
    }

    /// Abort the document on the first failing block instead of emitting
    /// an error placeholder.
    #[must_use]
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Set the fence scanner (e.g. to change the indentation limit).
    #[must_use]
    pub fn scanner(mut self, scanner: Scanner) -> Self {
        self.scanner = scanner;
        self
    }

    /// Render on a dedicated pool of `threads` workers instead of the global
    /// rayon pool, bounding the number of in-flight requests.
    ///
    /// If the pool cannot be created, the global pool is used.
    #[must_use]
    pub fn max_concurrency(mut self, threads: usize) -> Self {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("mdkroki-render-{i}"))
            .build()
        {
            Ok(pool) => self.pool = Some(Arc::new(pool)),
            Err(e) => tracing::warn!("could not create render pool, using global pool: {e}"),
        }
        self
    }

    #[must_use]
    pub fn types(&self) -> &DiagramTypes {
        &self.types
    }

    /// Replace every diagram block in `text` with its rendered tag.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Block`] for the first failing block when
    /// fail-fast mode is on.
    pub fn process_document(&self, text: &str) -> Result<String, DocumentError> {
        self.process_document_with_cancel(text, &CancelToken::new())
    }

    /// Like [`process_document`](Self::process_document), stopping early
    /// when `cancel` is triggered.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Cancelled`] if the token was cancelled before
    /// all blocks were resolved, and [`DocumentError::Block`] as for
    /// [`process_document`](Self::process_document).
    pub fn process_document_with_cancel(
        &self,
        text: &str,
        cancel: &CancelToken,
    ) -> Result<String, DocumentError> {
        let scan = self.scanner.scan(text);
        let diagrams: Vec<Diagram<'_>> = scan
            .matches()
            .iter()
            .enumerate()
            .filter_map(|(index, fence)| self.classify(index, fence))
            .collect();

        let span = tracing::debug_span!(
            "process_document",
            fences = scan.matches().len(),
            diagrams = diagrams.len()
        );
        let _entered = span.enter();

        if diagrams.is_empty() {
            return Ok(text.to_owned());
        }

        let outcomes: Vec<Option<Outcome>> = self.install(|| {
            diagrams
                .par_iter()
                .map(|diagram| {
                    let _entered = span.enter();
                    self.resolve(diagram, cancel)
                })
                .collect()
        });

        if cancel.is_cancelled() {
            tracing::info!("document processing cancelled");
            return Err(DocumentError::Cancelled);
        }

        let mut replacements = Replacements::with_capacity(diagrams.len());
        for (diagram, outcome) in diagrams.into_iter().zip(outcomes) {
            let html = self.substitution(diagram.index, diagram.block, outcome)?;
            replacements.add(
                diagram.fence.span.clone(),
                indent(&html, &diagram.fence.indent),
            );
        }

        Ok(replacements.apply(text))
    }

    /// Resolve a fence to a diagram, or `None` for passthrough.
    fn classify<'a>(&self, index: usize, fence: &'a FenceMatch) -> Option<Diagram<'a>> {
        let Some(diagram_type) = self.types.resolve(&fence.language) else {
            tracing::debug!(index, language = %fence.language, "passthrough block");
            return None;
        };
        Some(Diagram {
            index,
            fence,
            block: DiagramBlock::from_match(fence, diagram_type, &self.doc_root),
        })
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Cache lookup, then render on miss. Runs on a worker thread.
    ///
    /// Returns `None` if the block has no source or was cancelled before
    /// its render call.
    fn resolve(&self, diagram: &Diagram<'_>, cancel: &CancelToken) -> Option<Outcome> {
        let block = &diagram.block;
        let fingerprint = block.fingerprint()?;
        let request = block.request()?;

        if let Some(bytes) = self.cache.get(&fingerprint) {
            return Some(Ok(RenderedArtifact::embedded(request.extension, bytes)));
        }

        if cancel.is_cancelled() {
            return None;
        }

        tracing::debug!(
            index = diagram.index,
            diagram_type = request.diagram_type,
            key = fingerprint.short(),
            "rendering diagram"
        );
        let outcome = self.renderer.render(&request);
        if let Ok(RenderedArtifact {
            source: ArtifactSource::Embedded(bytes),
            ..
        }) = &outcome
        {
            self.cache.put(&fingerprint, bytes);
        }
        Some(outcome)
    }

    /// HTML for one resolved block.
    fn substitution(
        &self,
        index: usize,
        block: DiagramBlock,
        outcome: Option<Outcome>,
    ) -> Result<String, DocumentError> {
        let diagram_type = block.diagram_type.name();
        let (error, placeholder) = match (block.source, outcome) {
            (_, Some(Ok(artifact))) => {
                return Ok(render_tag(self.tag_format, &artifact, &block.display));
            }
            (Err(read_error), _) => {
                let placeholder = error_placeholder(&read_error.to_string(), None, None);
                (BlockError::Read(read_error), placeholder)
            }
            (Ok(source), Some(Err(render_error))) => {
                let placeholder = error_placeholder(
                    &render_error.to_string(),
                    render_error.response_text(),
                    Some(&source),
                );
                (BlockError::Render(render_error), placeholder)
            }
            (Ok(_), None) => return Err(DocumentError::Cancelled),
        };

        tracing::error!(index, diagram_type, "{error}");
        if self.fail_fast {
            return Err(DocumentError::Block {
                index,
                diagram_type,
                source: error,
            });
        }
        Ok(placeholder)
    }
}

/// A fence recognized as a diagram.
struct Diagram<'a> {
    index: usize,
    fence: &'a FenceMatch,
    block: DiagramBlock,
}

/// Result of resolving one diagram on a worker thread.
type Outcome = Result<RenderedArtifact, RenderError>;

/// Collects span replacements for a single rewrite of the document.
///
/// Replacements are applied rightmost first, so the offsets of the ones
/// still pending stay valid.
struct Replacements {
    items: Vec<(Range<usize>, String)>,
}

impl Replacements {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Add a replacement for a byte span of the document.
    fn add(&mut self, span: Range<usize>, content: String) {
        self.items.push((span, content));
    }

    fn apply(mut self, text: &str) -> String {
        self.items.sort_by_key(|(span, _)| Reverse(span.start));

        let mut result = text.to_owned();
        for (span, content) in self.items {
            result.replace_range(span, &content);
        }
        result
    }
}
