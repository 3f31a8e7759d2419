//! Grammar for the optional plugins: footnotes, tables and strikethrough.
//!
//! Block rules are spliced into the block rule table by
//! [`BlockParser::new`](super::block::BlockParser::new); inline rules by
//! [`InlineParser::new`](super::inline::InlineParser::new). Each is only
//! registered when its [`Plugin`](crate::Plugin) is enabled.

use std::sync::LazyLock;

use regex::Regex;

use super::block::BlockParser;
use super::inline::InlineParser;
use crate::token::{Align, Block, Inline};
use crate::util::{dedent, footnote_key, is_blank, leading_spaces};

static FOOTNOTE_DEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}\[\^([^\]\s][^\]]*)\]:[ \t]*(.*)$").unwrap());

static FOOTNOTE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A\[\^([^\]\s][^\]]*)\]").unwrap());

static DELIMITER_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*:?-+:?[ \t]*$").unwrap());

static STRIKETHROUGH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A~~(\S|\S.*?\S)~~").unwrap());

/// Check whether a line opens a footnote definition.
pub(crate) fn starts_footnote(line: &str) -> bool {
    FOOTNOTE_DEF.is_match(line)
}

/// Footnote definition: `[^key]: text` plus indented continuation lines.
///
/// The body is parsed as blocks and stored in the environment; no token is
/// emitted in place. The first definition of a key wins.
pub(crate) fn parse_footnote(
    parser: &mut BlockParser,
    lines: &[String],
    start: usize,
    _out: &mut Vec<Block<String>>,
) -> Option<usize> {
    let caps = FOOTNOTE_DEF.captures(&lines[start])?;
    let key = footnote_key(&caps[1]);

    let mut body = vec![caps[2].to_owned()];
    let mut pending_blank = 0;
    let mut end = start + 1;
    for (pos, line) in lines.iter().enumerate().skip(start + 1) {
        if is_blank(line) {
            pending_blank += 1;
            continue;
        }
        if leading_spaces(line) == 0 {
            break;
        }
        body.extend(std::iter::repeat_n(String::new(), pending_blank));
        pending_blank = 0;
        body.push(dedent(line, 4).to_owned());
        end = pos + 1;
    }

    let blocks = parser.parse_lines(&body);
    parser.env.footnotes.entry(key).or_insert(blocks);
    Some(end)
}

/// Check whether `line` and `next` form a table header and delimiter row.
pub(crate) fn starts_table(line: &str, next: &str) -> bool {
    if !line.contains('|') || !next.contains('|') || leading_spaces(line) > 3 {
        return false;
    }
    let delimiters = split_row(next);
    delimiters.iter().all(|cell| DELIMITER_CELL.is_match(cell))
        && delimiters.len() == split_row(line).len()
}

/// Pipe table with a header row, a delimiter row and body rows.
///
/// Body rows continue while lines contain a pipe and nothing else interrupts
/// them. Rows are padded or truncated to the header's column count.
pub(crate) fn parse_table(
    parser: &mut BlockParser,
    lines: &[String],
    start: usize,
    out: &mut Vec<Block<String>>,
) -> Option<usize> {
    let next = lines.get(start + 1)?;
    if !starts_table(&lines[start], next) {
        return None;
    }

    let head = split_row(&lines[start]);
    let columns = head.len();
    let align = split_row(next).iter().map(|cell| parse_align(cell)).collect();

    let mut rows = Vec::new();
    let mut pos = start + 2;
    while pos < lines.len() {
        let line = &lines[pos];
        if !line.contains('|') || parser.interrupts_paragraph(line, None) {
            break;
        }
        let mut row = split_row(line);
        row.resize(columns, String::new());
        rows.push(row);
        pos += 1;
    }

    let head = (!head.iter().all(String::is_empty)).then_some(head);
    out.push(Block::Table { head, align, rows });
    Some(pos)
}

/// Split a table row into trimmed cells.
///
/// Leading and trailing pipes are optional. Escaped pipes (`\|`) stay in the
/// cell text.
fn split_row(line: &str) -> Vec<String> {
    let mut row = line.trim();
    row = row.strip_prefix('|').unwrap_or(row);
    if row.ends_with('|') && !row.ends_with("\\|") {
        row = &row[..row.len() - 1];
    }

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut escaped = false;
    for c in row.chars() {
        if c == '|' && !escaped {
            cells.push(cell.trim().to_owned());
            cell.clear();
        } else {
            cell.push(c);
        }
        escaped = c == '\\' && !escaped;
    }
    cells.push(cell.trim().to_owned());
    cells
}

fn parse_align(cell: &str) -> Align {
    let cell = cell.trim();
    match (cell.starts_with(':'), cell.ends_with(':')) {
        (true, true) => Align::Center,
        (true, false) => Align::Left,
        (false, true) => Align::Right,
        (false, false) => Align::None,
    }
}

/// Footnote reference `[^key]`; only matches keys with a definition.
pub(crate) fn parse_footnote_ref(
    p: &mut InlineParser<'_>,
    text: &str,
    pos: usize,
) -> Option<usize> {
    let caps = FOOTNOTE_REF.captures(&text[pos..])?;
    let key = footnote_key(&caps[1]);
    if !p.has_footnote(&key) {
        return None;
    }
    p.reference_footnote(&key);
    p.push(Inline::FootnoteRef(key));
    Some(pos + caps[0].len())
}

pub(crate) fn parse_strikethrough(
    p: &mut InlineParser<'_>,
    text: &str,
    pos: usize,
) -> Option<usize> {
    let caps = STRIKETHROUGH.captures(&text[pos..])?;
    let children = p.parse(&caps[1]);
    p.push(Inline::Strikethrough(children));
    Some(pos + caps[0].len())
}
