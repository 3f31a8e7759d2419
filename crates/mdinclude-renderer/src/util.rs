//! Shared utility functions for parsing and rendering.

use unicode_width::UnicodeWidthStr;

/// Indentation unit for reST directive bodies.
pub(crate) const INDENT: &str = "   ";

/// Prefix every line of `text` that contains non-whitespace with `prefix`.
///
/// Whitespace-only lines are left untouched and line endings are preserved,
/// so blank lines inside directive bodies stay empty.
pub(crate) fn indent_block(text: &str, prefix: &str) -> String {
    let mut result = String::with_capacity(text.len() + prefix.len() * 4);
    for line in text.split_inclusive('\n') {
        if !line.trim().is_empty() {
            result.push_str(prefix);
        }
        result.push_str(line);
    }
    result
}

/// Escape special HTML characters.
pub(crate) fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Display column width of `text`, counting East Asian wide characters as two.
pub(crate) fn column_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Normalize a footnote key into a valid reST label: join words with `-` and upper-case.
pub(crate) fn footnote_key(key: &str) -> String {
    key.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_uppercase()
}

/// Normalize a link reference label: collapse whitespace and lower-case.
pub(crate) fn link_label(label: &str) -> String {
    collapse_whitespace(label).to_lowercase()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace tabs in leading whitespace with spaces up to the next 4-column stop.
pub(crate) fn expand_leading_tabs(line: &str) -> String {
    let indent_end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    if !line[..indent_end].contains('\t') {
        return line.to_owned();
    }

    let mut result = String::with_capacity(line.len() + 8);
    let mut column = 0;
    for c in line[..indent_end].chars() {
        if c == '\t' {
            let width = 4 - column % 4;
            result.extend(std::iter::repeat_n(' ', width));
            column += width;
        } else {
            result.push(c);
            column += 1;
        }
    }
    result.push_str(&line[indent_end..]);
    result
}

/// Number of leading spaces.
pub(crate) fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Remove up to `n` leading spaces.
pub(crate) fn dedent(line: &str, n: usize) -> &str {
    let strip = leading_spaces(line).min(n);
    &line[strip..]
}

/// Check whether a line is empty or whitespace-only.
pub(crate) fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Check whether a URL carries a scheme such as `https:` or `mailto:`.
pub(crate) fn has_scheme(url: &str) -> bool {
    let Some(colon) = url.find(':') else {
        return false;
    };
    let scheme = &url[..colon];
    scheme.len() >= 2
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_block_skips_blank_lines() {
        assert_eq!(indent_block("a\n\n  \nb\n", "   "), "   a\n\n  \n   b\n");
    }

    #[test]
    fn test_indent_block_without_trailing_newline() {
        assert_eq!(indent_block("<h1>title</h1>", "   "), "   <h1>title</h1>");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html(r#""quoted""#), "&quot;quoted&quot;");
        assert_eq!(escape_html("it's"), "it's");
    }

    #[test]
    fn test_column_width_wide_characters() {
        assert_eq!(column_width("head 1"), 6);
        assert_eq!(column_width("マルチバイト文字"), 16);
    }

    #[test]
    fn test_footnote_key() {
        assert_eq!(footnote_key("ref"), "REF");
        assert_eq!(footnote_key(" my   note "), "MY-NOTE");
        assert_eq!(footnote_key("my\tnote"), "MY-NOTE");
        assert_eq!(footnote_key("1"), "1");
    }

    #[test]
    fn test_link_label() {
        assert_eq!(link_label("Foo\n  Bar"), "foo bar");
    }

    #[test]
    fn test_expand_leading_tabs() {
        assert_eq!(expand_leading_tabs("\tcode"), "    code");
        assert_eq!(expand_leading_tabs("  \tcode"), "    code");
        assert_eq!(expand_leading_tabs("a\tb"), "a\tb");
    }

    #[test]
    fn test_dedent() {
        assert_eq!(dedent("     x", 3), "  x");
        assert_eq!(dedent(" x", 3), "x");
    }

    #[test]
    fn test_has_scheme() {
        assert!(has_scheme("https://example.com"));
        assert!(has_scheme("mailto:a@b.c"));
        assert!(!has_scheme("guide/intro.md"));
        assert!(!has_scheme("C:/docs"));
        assert!(!has_scheme("#anchor"));
    }
}
