//! Raw HTML recognition for block and inline grammars.

use std::sync::LazyLock;

use regex::Regex;

const TAG_NAME: &str = r"[A-Za-z][A-Za-z0-9-]*";
const ATTRIBUTES: &str =
    r#"(?:\s+[A-Za-z_:][A-Za-z0-9_.:-]*(?:\s*=\s*(?:[^ !"'=<>`]+|'[^']*?'|"[^"]*?"))?)*"#;

/// Inline HTML: an open tag spanning to the last close tag on the line, a
/// self-closing tag, a processing instruction, a declaration or CDATA.
static INLINE_HTML: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\A(?:<{TAG_NAME}{ATTRIBUTES}\s*>.*</{TAG_NAME}\s*>|<{TAG_NAME}{ATTRIBUTES}\s*/>|<\?[\s\S]+?\?>|<![A-Z][\s\S]+?>|<!\[CDATA\[[\s\S]+?\]\]>)"
    ))
    .unwrap()
});

static SCRIPT_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}<(?i:script|pre|style|textarea)(?:\s|>|$)").unwrap());

static BLOCK_TAG_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^ {0,3}</?(?i:address|article|aside|base|basefont|blockquote|body|caption|center|col|colgroup|dd|details|dialog|dir|div|dl|dt|fieldset|figcaption|figure|footer|form|frame|frameset|h[1-6]|head|header|hr|html|iframe|legend|li|link|main|menu|menuitem|nav|noframes|ol|optgroup|option|p|param|search|section|summary|table|tbody|td|tfoot|th|thead|title|tr|track|ul)(?:\s|/?>|$)",
    )
    .unwrap()
});

static COMPLETE_TAG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^ {{0,3}}(?:<{TAG_NAME}{ATTRIBUTES}\s*/?>|</{TAG_NAME}\s*>)\s*$"
    ))
    .unwrap()
});

/// Condition that ends an HTML block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HtmlBlockEnd {
    /// Line containing one of the given markers (case-insensitive).
    Marker(&'static [&'static str]),
    /// Blank line (not included in the block).
    BlankLine,
}

/// Kind of HTML block opened by a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HtmlBlockStart {
    pub(crate) end: HtmlBlockEnd,
    /// Whether this block may interrupt a paragraph.
    pub(crate) interrupts: bool,
}

/// Detect the start of an HTML block.
pub(crate) fn block_start(line: &str) -> Option<HtmlBlockStart> {
    let trimmed = line.trim_start_matches(' ');
    if !trimmed.starts_with('<') || line.len() - trimmed.len() > 3 {
        return None;
    }

    let end = if SCRIPT_START.is_match(line) {
        HtmlBlockEnd::Marker(&["</script>", "</pre>", "</style>", "</textarea>"])
    } else if trimmed.starts_with("<!--") {
        HtmlBlockEnd::Marker(&["-->"])
    } else if trimmed.starts_with("<?") {
        HtmlBlockEnd::Marker(&["?>"])
    } else if trimmed.starts_with("<![CDATA[") {
        HtmlBlockEnd::Marker(&["]]>"])
    } else if trimmed.starts_with("<!")
        && trimmed[2..].starts_with(|c: char| c.is_ascii_alphabetic())
    {
        HtmlBlockEnd::Marker(&[">"])
    } else if BLOCK_TAG_START.is_match(line) {
        HtmlBlockEnd::BlankLine
    } else if COMPLETE_TAG_LINE.is_match(line) {
        return Some(HtmlBlockStart {
            end: HtmlBlockEnd::BlankLine,
            interrupts: false,
        });
    } else {
        return None;
    };

    Some(HtmlBlockStart {
        end,
        interrupts: true,
    })
}

impl HtmlBlockEnd {
    /// Check whether `line` closes a block with a marker end condition.
    pub(crate) fn is_closed_by(self, line: &str) -> bool {
        match self {
            Self::Marker(markers) => {
                let lower = line.to_ascii_lowercase();
                markers.iter().any(|marker| lower.contains(marker))
            }
            Self::BlankLine => false,
        }
    }
}

/// Match inline HTML at the start of `text`.
pub(crate) fn match_inline(text: &str) -> Option<&str> {
    INLINE_HTML.find(text).map(|m| m.as_str())
}
