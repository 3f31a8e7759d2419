//! Block-level grammar.
//!
//! The block parser works line by line. At each line it tries an ordered
//! table of rules; the first rule that matches pushes its token(s) and returns
//! the index of the first unconsumed line. Lines no rule claims start a
//! paragraph.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::fence::Fence;
use super::html::{self, HtmlBlockEnd};
use super::{plugins, rest_block};
use crate::options::ConvertOptions;
use crate::plugin::Plugin;
use crate::token::{Block, CodeStyle};
use crate::util::{dedent, is_blank, leading_spaces, link_label};

/// Block rule: inspects `lines[start..]`, pushes tokens and returns the next line index.
pub(crate) type BlockRule =
    fn(&mut BlockParser, &[String], usize, &mut Vec<Block<String>>) -> Option<usize>;

/// Baseline rules in match order.
const BASE_RULES: &[(&str, BlockRule)] = &[
    ("blank_line", parse_blank_line),
    ("fenced_code", parse_fenced_code),
    ("indent_code", parse_indent_code),
    ("atx_heading", parse_atx_heading),
    ("thematic_break", parse_thematic_break),
    ("block_quote", parse_block_quote),
    ("list", parse_list),
    ("ref_link", parse_ref_link),
    ("block_html", parse_block_html),
];

static ATX_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(#{1,6})(?:[ \t]+(.*?))?(?:[ \t]+#+)?[ \t]*$").unwrap());

static SETEXT_UNDERLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(=+|-+)[ \t]*$").unwrap());

static THEMATIC_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}(?:(?:\*[ \t]*){3,}|(?:-[ \t]*){3,}|(?:_[ \t]*){3,})$").unwrap()
});

static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^( {0,3})(?:([*+-])|(\d{1,9})([.)]))((?:[ \t].*)?)$").unwrap());

static REF_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^ {0,3}\[((?:[^\[\]\\]|\\.)+)\]:[ \t]*(<[^<>]*>|\S+)(?:[ \t]+("(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'|\((?:[^()\\]|\\.)*\)))?[ \t]*$"#,
    )
    .unwrap()
});

/// Link reference definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LinkDef {
    pub(crate) url: String,
    pub(crate) title: Option<String>,
}

/// Definitions collected while parsing blocks, resolved by the inline grammar.
#[derive(Debug, Default)]
pub(crate) struct BlockEnv {
    /// Link definitions keyed by normalized label.
    pub(crate) links: HashMap<String, LinkDef>,
    /// Footnote bodies keyed by normalized key.
    pub(crate) footnotes: HashMap<String, Vec<Block<String>>>,
}

/// Line-based block parser.
pub(crate) struct BlockParser {
    rules: Vec<(&'static str, BlockRule)>,
    footnotes: bool,
    tables: bool,
    pub(crate) env: BlockEnv,
}

impl BlockParser {
    /// Build the rule table: baseline rules, plugin rules, then reST rules.
    pub(crate) fn new(options: &ConvertOptions) -> Self {
        let footnotes = options.plugins.contains(Plugin::Footnotes);
        let tables = options.plugins.contains(Plugin::Table);

        let mut rules = Vec::with_capacity(BASE_RULES.len() + 5);
        for &(name, rule) in BASE_RULES {
            if name == "ref_link" && footnotes {
                rules.push(("footnote", plugins::parse_footnote as BlockRule));
            }
            rules.push((name, rule));
            if name == "ref_link" && tables {
                rules.push(("table", plugins::parse_table as BlockRule));
            }
        }
        rules.extend_from_slice(rest_block::RULES);

        Self {
            rules,
            footnotes,
            tables,
            env: BlockEnv::default(),
        }
    }

    /// Parse a sequence of lines into block tokens.
    pub(crate) fn parse_lines(&mut self, lines: &[String]) -> Vec<Block<String>> {
        let mut tokens = Vec::new();
        let mut pos = 0;
        while pos < lines.len() {
            pos = self.parse_block(lines, pos, &mut tokens);
        }
        tokens
    }

    fn parse_block(
        &mut self,
        lines: &[String],
        start: usize,
        out: &mut Vec<Block<String>>,
    ) -> usize {
        for idx in 0..self.rules.len() {
            let (_, rule) = self.rules[idx];
            if let Some(next) = rule(self, lines, start, out) {
                return next;
            }
        }
        parse_paragraph(self, lines, start, out)
    }

    /// Check whether `line` ends an open paragraph.
    pub(crate) fn interrupts_paragraph(&self, line: &str, next: Option<&str>) -> bool {
        if is_blank(line) {
            return true;
        }
        if Fence::open(line).is_some()
            || ATX_HEADING.is_match(line)
            || THEMATIC_BREAK.is_match(line)
            || strip_quote_marker(line).is_some()
            || rest_block::starts_directive(line)
            || rest_block::is_rest_code_block(line)
        {
            return true;
        }
        if let Some(marker) = ListMarker::parse(line)
            && !is_blank(&marker.content)
            && marker.start.is_none_or(|n| n == 1)
        {
            return true;
        }
        if html::block_start(line).is_some_and(|start| start.interrupts) {
            return true;
        }
        if self.footnotes && plugins::starts_footnote(line) {
            return true;
        }
        self.tables && next.is_some_and(|next| plugins::starts_table(line, next))
    }
}

/// Remove a block quote marker (`>` and one optional space).
fn strip_quote_marker(line: &str) -> Option<&str> {
    let indent = leading_spaces(line);
    if indent > 3 {
        return None;
    }
    let rest = line[indent..].strip_prefix('>')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

fn parse_blank_line(
    _parser: &mut BlockParser,
    lines: &[String],
    start: usize,
    out: &mut Vec<Block<String>>,
) -> Option<usize> {
    if !is_blank(&lines[start]) {
        return None;
    }
    let end = lines[start..]
        .iter()
        .position(|line| !is_blank(line))
        .map_or(lines.len(), |offset| start + offset);
    out.push(Block::BlankLine);
    Some(end)
}

fn parse_fenced_code(
    _parser: &mut BlockParser,
    lines: &[String],
    start: usize,
    out: &mut Vec<Block<String>>,
) -> Option<usize> {
    let fence = Fence::open(&lines[start])?;

    let mut text = String::new();
    let mut pos = start + 1;
    while pos < lines.len() {
        let line = &lines[pos];
        pos += 1;
        if fence.is_closed_by(line) {
            break;
        }
        text.push_str(dedent(line, fence.indent));
        text.push('\n');
    }

    let info = (!fence.info.is_empty()).then(|| fence.info.clone());
    out.push(Block::CodeBlock {
        info,
        text,
        style: CodeStyle::Fenced,
    });
    Some(pos)
}

fn parse_indent_code(
    _parser: &mut BlockParser,
    lines: &[String],
    start: usize,
    out: &mut Vec<Block<String>>,
) -> Option<usize> {
    if is_blank(&lines[start]) || leading_spaces(&lines[start]) < 4 {
        return None;
    }

    let mut end = start;
    let mut last_content = start;
    while end < lines.len() && (is_blank(&lines[end]) || leading_spaces(&lines[end]) >= 4) {
        if !is_blank(&lines[end]) {
            last_content = end;
        }
        end += 1;
    }

    let text = lines[start..=last_content]
        .iter()
        .map(|line| dedent(line, 4))
        .collect::<Vec<_>>()
        .join("\n");
    out.push(Block::CodeBlock {
        info: None,
        text,
        style: CodeStyle::Indented,
    });
    Some(last_content + 1)
}

fn parse_atx_heading(
    _parser: &mut BlockParser,
    lines: &[String],
    start: usize,
    out: &mut Vec<Block<String>>,
) -> Option<usize> {
    let caps = ATX_HEADING.captures(&lines[start])?;
    let level = u8::try_from(caps[1].len()).unwrap_or(6);
    let content = caps.get(2).map_or("", |m| m.as_str()).trim().to_owned();
    out.push(Block::Heading { level, content });
    Some(start + 1)
}

fn parse_thematic_break(
    _parser: &mut BlockParser,
    lines: &[String],
    start: usize,
    out: &mut Vec<Block<String>>,
) -> Option<usize> {
    if !THEMATIC_BREAK.is_match(&lines[start]) {
        return None;
    }
    out.push(Block::ThematicBreak);
    Some(start + 1)
}

fn parse_block_quote(
    parser: &mut BlockParser,
    lines: &[String],
    start: usize,
    out: &mut Vec<Block<String>>,
) -> Option<usize> {
    strip_quote_marker(&lines[start])?;

    let mut inner = Vec::new();
    let mut lazy = false;
    let mut pos = start;
    while pos < lines.len() {
        let line = &lines[pos];
        if let Some(rest) = strip_quote_marker(line) {
            lazy = !is_blank(rest) && Fence::open(rest).is_none();
            inner.push(rest.to_owned());
        } else if lazy
            && !parser.interrupts_paragraph(line, lines.get(pos + 1).map(String::as_str))
        {
            inner.push(line.clone());
        } else {
            break;
        }
        pos += 1;
    }

    let children = parser.parse_lines(&inner);
    out.push(Block::BlockQuote(children));
    Some(pos)
}

/// Parsed list item marker line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListMarker {
    /// Bullet character or ordered delimiter (`.` or `)`).
    delimiter: char,
    /// Start number for ordered items.
    start: Option<u64>,
    /// Column where item content begins.
    offset: usize,
    /// Content of the marker line.
    content: String,
}

impl ListMarker {
    pub(crate) fn parse(line: &str) -> Option<Self> {
        if THEMATIC_BREAK.is_match(line) {
            return None;
        }
        let caps = LIST_ITEM.captures(line)?;
        let indent = caps[1].len();
        let (delimiter, start, marker_width) = if let Some(bullet) = caps.get(2) {
            (bullet.as_str().chars().next()?, None, 1)
        } else {
            let digits = caps.get(3)?.as_str();
            let delimiter = caps.get(4)?.as_str().chars().next()?;
            (delimiter, digits.parse().ok(), digits.len() + 1)
        };

        let after = caps.get(5).map_or("", |m| m.as_str());
        let spaces = leading_spaces(after);
        let (offset, content) = if is_blank(after) {
            (indent + marker_width + 1, String::new())
        } else if spaces >= 5 {
            (indent + marker_width + 1, after[1..].to_owned())
        } else {
            (indent + marker_width + spaces, after[spaces..].to_owned())
        };

        Some(Self {
            delimiter,
            start,
            offset,
            content,
        })
    }

    fn same_list(&self, other: &Self) -> bool {
        self.delimiter == other.delimiter && self.start.is_some() == other.start.is_some()
    }
}

fn parse_list(
    parser: &mut BlockParser,
    lines: &[String],
    start: usize,
    out: &mut Vec<Block<String>>,
) -> Option<usize> {
    let first = ListMarker::parse(&lines[start])?;
    let ordered = first.start.is_some();
    let list_start = first.start;

    let mut items: Vec<Vec<Block<String>>> = Vec::new();
    let mut tight = true;
    let mut marker = first;
    let mut pos = start;
    loop {
        let mut item_lines = vec![marker.content.clone()];
        let mut lazy = !is_blank(&marker.content);
        pos += 1;
        while pos < lines.len() {
            let line = &lines[pos];
            if is_blank(line) {
                item_lines.push(String::new());
                lazy = false;
            } else if leading_spaces(line) >= marker.offset {
                item_lines.push(line[marker.offset..].to_owned());
                lazy = true;
            } else if lazy
                && ListMarker::parse(line).is_none()
                && !parser.interrupts_paragraph(line, lines.get(pos + 1).map(String::as_str))
            {
                item_lines.push(line.trim_start().to_owned());
            } else {
                break;
            }
            pos += 1;
        }

        // Trailing blank lines belong to whatever follows the item
        while item_lines.len() > 1 && item_lines.last().is_some_and(|line| is_blank(line)) {
            item_lines.pop();
            pos -= 1;
        }

        let blocks = parser.parse_lines(&item_lines);
        if has_inner_blank_line(&blocks) {
            tight = false;
        }
        items.push(blocks);

        let next_start = lines[pos..]
            .iter()
            .position(|line| !is_blank(line))
            .map_or(lines.len(), |offset| pos + offset);
        let Some(next) = lines.get(next_start).and_then(|line| ListMarker::parse(line)) else {
            break;
        };
        if !next.same_list(&marker) {
            break;
        }
        if next_start > pos {
            tight = false;
        }
        pos = next_start;
        marker = next;
    }

    let items = items
        .into_iter()
        .map(|blocks| {
            blocks
                .into_iter()
                .filter(|block| !matches!(block, Block::BlankLine))
                .map(|block| match block {
                    Block::Paragraph(text) if tight => Block::Text(text),
                    other => other,
                })
                .collect()
        })
        .collect();

    out.push(Block::List {
        ordered,
        start: list_start,
        tight,
        items,
    });
    Some(pos)
}

/// Check whether a blank line separates two blocks of a list item.
fn has_inner_blank_line(blocks: &[Block<String>]) -> bool {
    blocks.iter().enumerate().any(|(i, block)| {
        matches!(block, Block::BlankLine) && i > 0 && i + 1 < blocks.len()
    })
}

fn parse_ref_link(
    parser: &mut BlockParser,
    lines: &[String],
    start: usize,
    _out: &mut Vec<Block<String>>,
) -> Option<usize> {
    let caps = REF_LINK.captures(&lines[start])?;
    let label = link_label(&caps[1]);
    if label.is_empty() {
        return None;
    }

    let url = caps[2]
        .strip_prefix('<')
        .and_then(|url| url.strip_suffix('>'))
        .unwrap_or(&caps[2]);
    let title = caps.get(3).map(|m| {
        let quoted = m.as_str();
        unescape(&quoted[1..quoted.len() - 1])
    });

    parser.env.links.entry(label).or_insert_with(|| LinkDef {
        url: unescape(url),
        title,
    });
    Some(start + 1)
}

fn parse_block_html(
    _parser: &mut BlockParser,
    lines: &[String],
    start: usize,
    out: &mut Vec<Block<String>>,
) -> Option<usize> {
    let block = html::block_start(&lines[start])?;

    let mut end = start;
    match block.end {
        HtmlBlockEnd::Marker(_) => {
            while end < lines.len() {
                end += 1;
                if block.end.is_closed_by(&lines[end - 1]) {
                    break;
                }
            }
        }
        HtmlBlockEnd::BlankLine => {
            while end < lines.len() && !is_blank(&lines[end]) {
                end += 1;
            }
        }
    }

    out.push(Block::BlockHtml(lines[start..end].join("\n")));
    Some(end)
}

fn parse_paragraph(
    parser: &mut BlockParser,
    lines: &[String],
    start: usize,
    out: &mut Vec<Block<String>>,
) -> usize {
    let mut text_lines = vec![lines[start].trim_start()];
    let mut pos = start + 1;
    while pos < lines.len() {
        let line = &lines[pos];
        if let Some(caps) = SETEXT_UNDERLINE.captures(line) {
            let level = if caps[1].starts_with('=') { 1 } else { 2 };
            out.push(Block::Heading {
                level,
                content: text_lines.join("\n").trim().to_owned(),
            });
            return pos + 1;
        }
        if parser.interrupts_paragraph(line, lines.get(pos + 1).map(String::as_str)) {
            break;
        }
        text_lines.push(line.trim_start());
        pos += 1;
    }

    let text = text_lines.join("\n");
    out.push(Block::Paragraph(text.trim_end().to_owned()));
    pos
}

/// Remove backslash escapes before ASCII punctuation.
pub(crate) fn unescape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\'
            && let Some(&next) = chars.peek()
            && next.is_ascii_punctuation()
        {
            result.push(next);
            chars.next();
        } else {
            result.push(c);
        }
    }
    result
}
