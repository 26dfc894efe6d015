//! Fence info string parsing.
//!
//! The info string is everything after the opening fence run. Its first
//! token is the language tag; the rest is an option list such as
//! `theme=dark scale=2` or `{theme=dark scale=2}`.

/// Split an info string into the language tag and the raw option text.
///
/// A single leading `.` on the tag is dropped (`.mermaid` → `mermaid`), and
/// an option block glued to the tag (`mermaid{a=b}`) is split off.
pub(crate) fn split_info(info: &str) -> (String, String) {
    let info = info.trim();
    if info.starts_with('{') {
        return (String::new(), info.to_owned());
    }

    let (tag, rest) = match info.find(|c: char| c.is_whitespace() || c == '{') {
        Some(pos) => (&info[..pos], &info[pos..]),
        None => (info, ""),
    };
    let tag = tag.strip_prefix('.').unwrap_or(tag);

    (tag.to_owned(), rest.trim().to_owned())
}

/// Parse a raw option string into ordered `key=value` pairs.
///
/// Accepts whitespace-separated `key=value` tokens, optionally wrapped in
/// one pair of braces. Any malformed token (missing `=`, empty key) or an
/// unbalanced brace yields an empty list; option errors never fail a scan.
///
/// # Example
///
/// ```
/// use mdkroki_fence::parse_options;
///
/// assert_eq!(
///     parse_options("{theme=dark scale=2}"),
///     vec![("theme".to_owned(), "dark".to_owned()), ("scale".to_owned(), "2".to_owned())]
/// );
/// assert!(parse_options("theme dark").is_empty());
/// ```
#[must_use]
pub fn parse_options(raw: &str) -> Vec<(String, String)> {
    let trimmed = raw.trim();
    let inner = if let Some(open) = trimmed.strip_prefix('{') {
        match open.strip_suffix('}') {
            Some(inner) => inner,
            None => return Vec::new(),
        }
    } else {
        trimmed
    };

    let mut options = Vec::new();
    for token in inner.split_whitespace() {
        match token.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                options.push((key.to_owned(), value.to_owned()));
            }
            _ => return Vec::new(),
        }
    }
    options
}
