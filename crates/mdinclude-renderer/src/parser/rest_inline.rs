//! reStructuredText inline extensions.
//!
//! Roles, hyperlink references and inline math are emitted verbatim, so they
//! must be recognized before the Markdown code span rule claims their
//! backticks. These rules are tried first at every position.

use std::sync::LazyLock;

use regex::Regex;

use super::inline::{InlineParser, InlineRule};
use crate::options::ConvertOptions;
use crate::token::Inline;

static INLINE_MATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\A`\$(.*?)\$`").unwrap());

static REST_ROLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A(?::.*?:`.*?`|`[^`]+`:.*?:)").unwrap());

static REST_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\A`[^`]*?`_").unwrap());

static EOL_LITERAL_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A(\s+)?::\s*\z").unwrap());

/// reST inline rules in match order.
pub(crate) fn rules(options: &ConvertOptions) -> Vec<(&'static str, InlineRule)> {
    let mut rules: Vec<(&'static str, InlineRule)> = Vec::new();
    if !options.disable_inline_math {
        rules.push(("inline_math", parse_inline_math));
    }
    rules.push(("rest_role", parse_rest_role));
    rules.push(("rest_link", parse_rest_link));
    rules.push(("eol_literal_marker", parse_eol_literal_marker));
    rules
}

fn parse_inline_math(p: &mut InlineParser<'_>, text: &str, pos: usize) -> Option<usize> {
    let caps = INLINE_MATH.captures(&text[pos..])?;
    p.push(Inline::InlineMath(caps[1].to_owned()));
    Some(pos + caps[0].len())
}

fn parse_rest_role(p: &mut InlineParser<'_>, text: &str, pos: usize) -> Option<usize> {
    let m = REST_ROLE.find(&text[pos..])?;
    p.push(Inline::RestRole(m.as_str().to_owned()));
    Some(pos + m.end())
}

fn parse_rest_link(p: &mut InlineParser<'_>, text: &str, pos: usize) -> Option<usize> {
    let m = REST_LINK.find(&text[pos..])?;
    p.push(Inline::RestLink(m.as_str().to_owned()));
    Some(pos + m.end())
}

/// Trailing `::` of a paragraph introducing a literal block.
fn parse_eol_literal_marker(p: &mut InlineParser<'_>, text: &str, pos: usize) -> Option<usize> {
    let caps = EOL_LITERAL_MARKER.captures(&text[pos..])?;
    p.push(Inline::EolLiteralMarker {
        spaced: caps.get(1).is_some(),
    });
    Some(text.len())
}
