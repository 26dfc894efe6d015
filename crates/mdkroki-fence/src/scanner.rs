//! Line-anchored fence scanner.
//!
//! The scanner walks the document line by line. When a line opens a fence it
//! looks ahead for the first line that closes it; if none exists the opener
//! is ignored and scanning resumes on the next line. A matched block is
//! skipped as a whole, so matches never overlap.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::dedent::dedent;
use crate::info::{parse_options, split_info};

/// Default maximum indentation (in spaces) of an opening fence.
pub const DEFAULT_MAX_INDENT: usize = 3;

/// Opening fence: indentation, a run of 3+ backticks or tildes, info text.
static OPENER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^( *)(`{3,}|~{3,})(.*)$").expect("valid opener regex"));

/// Candidate closing fence: indentation, a fence run, trailing blanks only.
static CLOSER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^( *)(`+|~+)[ \t]*$").expect("valid closer regex"));

/// A fenced code block found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceMatch {
    /// Byte range of the block in the source document.
    ///
    /// Starts at the beginning of the opener line (indentation included) and
    /// ends at the end of the closer line (its line break excluded).
    pub span: Range<usize>,
    /// Leading whitespace of the opener line.
    pub indent: String,
    /// Language tag (first token of the info string).
    pub language: String,
    /// Unparsed option text following the language tag.
    pub options_raw: String,
    /// Dedented block body. Every body line keeps its trailing newline.
    pub body: String,
}

impl FenceMatch {
    /// Parsed `key=value` options, empty if the option text is malformed.
    #[must_use]
    pub fn options(&self) -> Vec<(String, String)> {
        parse_options(&self.options_raw)
    }
}

/// A piece of a scanned document, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text outside any matched block.
    Text {
        /// Byte range in the source document.
        span: Range<usize>,
        /// The untouched text.
        text: &'a str,
    },
    /// A matched fenced block.
    Fence(&'a FenceMatch),
}

/// Result of scanning a document.
#[derive(Debug)]
pub struct Scan<'a> {
    text: &'a str,
    matches: Vec<FenceMatch>,
}

impl<'a> Scan<'a> {
    /// The scanned document.
    #[must_use]
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Matched blocks, ordered by position.
    #[must_use]
    pub fn matches(&self) -> &[FenceMatch] {
        &self.matches
    }

    /// Consume the scan, returning the matched blocks.
    #[must_use]
    pub fn into_matches(self) -> Vec<FenceMatch> {
        self.matches
    }

    /// Iterate over untouched text and matched blocks.
    ///
    /// Concatenating the segments' source text in order reproduces the
    /// whole document. Empty text segments are skipped.
    pub fn segments(&self) -> Segments<'_> {
        Segments {
            text: self.text,
            matches: &self.matches,
            next_match: 0,
            cursor: 0,
        }
    }
}

/// Iterator returned by [`Scan::segments`].
#[derive(Debug)]
pub struct Segments<'a> {
    text: &'a str,
    matches: &'a [FenceMatch],
    next_match: usize,
    cursor: usize,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(m) = self.matches.get(self.next_match) {
            if self.cursor < m.span.start {
                let span = self.cursor..m.span.start;
                self.cursor = m.span.start;
                return Some(Segment::Text {
                    text: &self.text[span.clone()],
                    span,
                });
            }
            self.next_match += 1;
            self.cursor = m.span.end;
            return Some(Segment::Fence(m));
        }

        if self.cursor < self.text.len() {
            let span = self.cursor..self.text.len();
            self.cursor = self.text.len();
            return Some(Segment::Text {
                text: &self.text[span.clone()],
                span,
            });
        }
        None
    }
}

/// Configurable fence scanner.
///
/// # Example
///
/// ```
/// use mdkroki_fence::Scanner;
///
/// let doc = "- item\n\n    ```mermaid\n    graph TD\n    ```\n";
/// assert!(Scanner::new().scan(doc).matches().is_empty());
/// assert_eq!(Scanner::new().max_indent(4).scan(doc).matches().len(), 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Scanner {
    max_indent: usize,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte offsets of one line: `start..end` is the content, `next` the start of the following line.
#[derive(Debug, Clone, Copy)]
struct Line {
    start: usize,
    end: usize,
    next: usize,
}

/// A parsed opening fence.
struct Opener<'a> {
    indent: &'a str,
    fence_char: char,
    fence_len: usize,
    info: &'a str,
}

impl Scanner {
    /// Create a scanner with the default indentation limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_indent: DEFAULT_MAX_INDENT,
        }
    }

    /// Set the maximum number of spaces before an opening or closing fence.
    #[must_use]
    pub fn max_indent(mut self, max_indent: usize) -> Self {
        self.max_indent = max_indent;
        self
    }

    /// Scan `text` for fenced blocks.
    ///
    /// Runs in time linear in the length of `text`, even when many openers
    /// are never closed.
    #[must_use]
    pub fn scan<'a>(&self, text: &'a str) -> Scan<'a> {
        let lines = split_lines(text);
        let closers: Vec<Option<(char, usize)>> = lines
            .iter()
            .map(|&line| self.closing_run(line_text(text, line)))
            .collect();
        let longest = LongestClosers::new(&closers);
        let mut matches = Vec::new();

        let mut i = 0;
        while i < lines.len() {
            let Some(opener) = self.parse_opener(line_text(text, lines[i])) else {
                i += 1;
                continue;
            };
            if longest.after(opener.fence_char, i) < opener.fence_len {
                tracing::debug!(line = i + 1, "unclosed fence, treating as text");
                i += 1;
                continue;
            }
            let Some(close) = (i + 1..lines.len()).find(|&j| {
                closers[j].is_some_and(|(c, len)| c == opener.fence_char && len >= opener.fence_len)
            }) else {
                i += 1;
                continue;
            };

            let (language, options_raw) = split_info(opener.info);
            let body_start = lines[i].next;
            let body_end = lines[close].start.max(body_start);
            matches.push(FenceMatch {
                span: lines[i].start..lines[close].start + line_text(text, lines[close]).len(),
                indent: opener.indent.to_owned(),
                language,
                options_raw,
                body: dedent(&text[body_start..body_end]),
            });
            i = close + 1;
        }

        Scan { text, matches }
    }

    fn parse_opener<'a>(&self, line: &'a str) -> Option<Opener<'a>> {
        let caps = OPENER_RE.captures(line)?;
        let indent = caps.get(1)?.as_str();
        if indent.len() > self.max_indent {
            return None;
        }
        let run = caps.get(2)?.as_str();
        let info = caps.get(3)?.as_str();
        let fence_char = run.chars().next()?;
        // A backtick fence cannot carry backticks in its info string
        if fence_char == '`' && info.contains('`') {
            return None;
        }
        Some(Opener {
            indent,
            fence_char,
            fence_len: run.len(),
            info,
        })
    }

    /// Fence character and run length if `line` can close a fence.
    ///
    /// Openers are never indented past `max_indent`, so the same limit
    /// applies to closers.
    fn closing_run(&self, line: &str) -> Option<(char, usize)> {
        let caps = CLOSER_RE.captures(line)?;
        if caps.get(1)?.as_str().len() > self.max_indent {
            return None;
        }
        let run = caps.get(2)?.as_str();
        Some((run.chars().next()?, run.len()))
    }
}

/// Longest closing run of each fence character at or after every line.
struct LongestClosers {
    backtick: Vec<usize>,
    tilde: Vec<usize>,
}

impl LongestClosers {
    fn new(closers: &[Option<(char, usize)>]) -> Self {
        let mut backtick = vec![0; closers.len() + 1];
        let mut tilde = vec![0; closers.len() + 1];
        for (j, closer) in closers.iter().enumerate().rev() {
            backtick[j] = backtick[j + 1];
            tilde[j] = tilde[j + 1];
            match closer {
                Some(('`', len)) => backtick[j] = backtick[j].max(*len),
                Some((_, len)) => tilde[j] = tilde[j].max(*len),
                None => {}
            }
        }
        Self { backtick, tilde }
    }

    /// Longest closing run of `fence_char` on any line after `line`.
    fn after(&self, fence_char: char, line: usize) -> usize {
        let runs = if fence_char == '`' {
            &self.backtick
        } else {
            &self.tilde
        };
        runs.get(line + 1).copied().unwrap_or(0)
    }
}

/// Scan `text` with the default [`Scanner`].
#[must_use]
pub fn scan(text: &str) -> Scan<'_> {
    Scanner::new().scan(text)
}

fn split_lines(text: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let end = text[start..].find('\n').map_or(text.len(), |pos| start + pos);
        let next = if end < text.len() { end + 1 } else { end };
        lines.push(Line { start, end, next });
        start = next;
    }
    lines
}

/// Line content without its line break (a trailing `\r` is dropped too).
fn line_text(text: &str, line: Line) -> &str {
    let content = &text[line.start..line.end];
    content.strip_suffix('\r').unwrap_or(content)
}
