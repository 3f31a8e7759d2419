//! reStructuredText block extensions.
//!
//! Explicit markup blocks (`.. directive::`, comments, footnote targets) and
//! bare `::` literal openers pass through the Markdown grammar untouched.
//! These rules run after every baseline rule.

use std::sync::LazyLock;

use regex::Regex;

use super::block::{BlockParser, BlockRule};
use crate::token::Block;
use crate::util::is_blank;

/// reST block rules in match order.
pub(crate) const RULES: &[(&str, BlockRule)] = &[
    ("directive", parse_directive),
    ("oneline_directive", parse_oneline_directive),
    ("rest_code_block", parse_rest_code_block),
];

static DIRECTIVE_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ *\.\.").unwrap());

static REST_CODE_BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^::\s*$").unwrap());

/// Check whether a line opens an explicit markup block.
pub(crate) fn starts_directive(line: &str) -> bool {
    DIRECTIVE_START.is_match(line)
}

/// Check whether a line is a bare `::` literal block opener.
pub(crate) fn is_rest_code_block(line: &str) -> bool {
    REST_CODE_BLOCK.is_match(line)
}

/// Multi-line explicit markup block.
///
/// Consumes the opening line and every following line up to (not including)
/// the next line starting with non-whitespace. Blank lines inside the block
/// are kept. When no such line exists, the block runs to the last non-blank
/// line; a directive whose body is empty is left to the one-line rule.
fn parse_directive(
    _parser: &mut BlockParser,
    lines: &[String],
    start: usize,
    out: &mut Vec<Block<String>>,
) -> Option<usize> {
    if !starts_directive(&lines[start]) {
        return None;
    }

    let next_unindented = (start + 1..lines.len()).find(|&i| starts_unindented(&lines[i]));
    let end = if let Some(end) = next_unindented {
        end
    } else {
        let last = (start + 1..lines.len())
            .rev()
            .find(|&i| !is_blank(&lines[i]))?;
        last + 1
    };

    out.push(Block::Directive(lines[start..end].join("\n")));
    Some(end)
}

/// Single-line explicit markup block.
fn parse_oneline_directive(
    _parser: &mut BlockParser,
    lines: &[String],
    start: usize,
    out: &mut Vec<Block<String>>,
) -> Option<usize> {
    if !starts_directive(&lines[start]) {
        return None;
    }
    out.push(Block::Directive(lines[start].clone()));
    Some(start + 1)
}

fn parse_rest_code_block(
    _parser: &mut BlockParser,
    lines: &[String],
    start: usize,
    out: &mut Vec<Block<String>>,
) -> Option<usize> {
    if !is_rest_code_block(&lines[start]) {
        return None;
    }
    out.push(Block::RestCodeBlock);
    Some(start + 1)
}

fn starts_unindented(line: &str) -> bool {
    line.starts_with(|c: char| !c.is_whitespace())
}
