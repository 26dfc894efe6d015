//! Block body dedenting and re-indenting.

/// Remove the whitespace margin shared by every non-blank line.
///
/// Lines consisting only of spaces and tabs do not take part in the margin
/// computation and are emptied (their newline is kept). Tabs and spaces are
/// not treated as equivalent: the margin is the longest common prefix of the
/// lines' leading whitespace.
///
/// # Example
///
/// ```
/// assert_eq!(mdkroki_fence::dedent("  a\n    b\n \n  c\n"), "a\n  b\n\nc\n");
/// ```
#[must_use]
pub fn dedent(text: &str) -> String {
    let mut margin: Option<&str> = None;
    for line in text.lines() {
        if is_blank(line) {
            continue;
        }
        let ws = leading_whitespace(line);
        margin = Some(match margin {
            None => ws,
            Some(current) => common_prefix(current, ws),
        });
    }
    let margin_len = margin.map_or(0, str::len);

    let mut result = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let (content, newline) = match line.strip_suffix('\n') {
            Some(content) => (content, "\n"),
            None => (line, ""),
        };
        if !is_blank(content) {
            result.push_str(&content[margin_len..]);
        }
        result.push_str(newline);
    }
    result
}

/// Prefix every non-blank line of `text` with `prefix`.
///
/// Blank lines (empty or whitespace-only) are left as they are so that
/// re-indenting never introduces trailing whitespace.
///
/// # Example
///
/// ```
/// assert_eq!(mdkroki_fence::indent("a\n\nb", "  "), "  a\n\n  b");
/// ```
#[must_use]
pub fn indent(text: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return text.to_owned();
    }
    let mut result = String::with_capacity(text.len() + prefix.len());
    for line in text.split_inclusive('\n') {
        if !line.trim().is_empty() {
            result.push_str(prefix);
        }
        result.push_str(line);
    }
    result
}

fn is_blank(line: &str) -> bool {
    line.chars().all(|c| c == ' ' || c == '\t' || c == '\r')
}

fn leading_whitespace(line: &str) -> &str {
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    &a[..len]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dedent_common_margin() {
        assert_eq!(dedent("    a\n    b\n"), "a\nb\n");
        assert_eq!(dedent("   Alice -> Bob\n"), "Alice -> Bob\n");
    }

    #[test]
    fn test_dedent_keeps_relative_indentation() {
        assert_eq!(dedent("   aaa\n    aaa\n  aaa\n"), " aaa\n  aaa\naaa\n");
    }

    #[test]
    fn test_dedent_blank_lines_ignored_and_emptied() {
        assert_eq!(dedent("    stuff containing ```\n\n"), "stuff containing ```\n\n");
        assert_eq!(dedent("  a\n   \n  b\n"), "a\n\nb\n");
    }

    #[test]
    fn test_dedent_no_margin() {
        assert_eq!(dedent("a\n  b\n"), "a\n  b\n");
        assert_eq!(dedent(""), "");
    }

    #[test]
    fn test_dedent_mixed_tabs_and_spaces() {
        // Only the literally shared prefix is removed
        assert_eq!(dedent("\t a\n\t  b\n"), "a\n b\n");
        assert_eq!(dedent(" \ta\n\t b\n"), " \ta\n\t b\n");
    }

    #[test]
    fn test_dedent_without_trailing_newline() {
        assert_eq!(dedent("  a\n  b"), "a\nb");
    }

    #[test]
    fn test_indent_skips_blank_lines() {
        assert_eq!(indent("a\n\n  \nb\n", "> "), "> a\n\n  \n> b\n");
    }

    #[test]
    fn test_indent_empty_prefix() {
        assert_eq!(indent("a\nb", ""), "a\nb");
    }

    #[test]
    fn test_indent_single_line() {
        assert_eq!(indent(r#"<img alt="Kroki">"#, "   "), r#"   <img alt="Kroki">"#);
    }
}
