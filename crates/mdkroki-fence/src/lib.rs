//! Fenced code block scanner for mdkroki.
//!
//! This crate finds fenced code blocks in a text document without parsing
//! the rest of the Markdown. It understands the generalized fence grammar:
//!
//! - Fences are runs of three or more backticks or tildes
//! - A closing fence uses the same character and is at least as long as the opener
//! - Fences of the other character (or shorter runs) inside a block are body text
//! - Openers may be indented (up to 3 spaces by default)
//!
//! Scanning never fails. Unclosed fences are simply not reported, and the
//! text they occupy stays part of the untouched spans.
//!
//! # Example
//!
//! ```
//! use mdkroki_fence::{Segment, scan};
//!
//! let doc = "Intro\n```mermaid\ngraph TD; A-->B;\n```\nOutro\n";
//! let scan = scan(doc);
//!
//! assert_eq!(scan.matches().len(), 1);
//! let block = &scan.matches()[0];
//! assert_eq!(block.language, "mermaid");
//! assert_eq!(block.body, "graph TD; A-->B;\n");
//!
//! let rebuilt: String = scan
//!     .segments()
//!     .map(|segment| match segment {
//!         Segment::Text { text, .. } => text,
//!         Segment::Fence(m) => &doc[m.span.clone()],
//!     })
//!     .collect();
//! assert_eq!(rebuilt, doc);
//! ```

mod dedent;
mod info;
mod scanner;

pub use dedent::{dedent, indent};
pub use info::parse_options;
pub use scanner::{DEFAULT_MAX_INDENT, FenceMatch, Scan, Scanner, Segment, Segments, scan};
