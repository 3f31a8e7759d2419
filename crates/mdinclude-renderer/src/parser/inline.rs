//! Span-level grammar.
//!
//! The inline parser scans text position by position. At each position the
//! rules are tried in order and the first one that matches appends its
//! token(s) and reports where scanning resumes. When no rule matches, the
//! character becomes part of the current text run.

use std::sync::LazyLock;

use regex::Regex;

use super::block::{BlockEnv, LinkDef, unescape};
use super::{html, plugins, rest_inline};
use crate::options::ConvertOptions;
use crate::plugin::Plugin;
use crate::token::Inline;
use crate::util::link_label;

/// Inline rule: inspects `text[pos..]`, pushes tokens and returns the resume position.
pub(crate) type InlineRule = fn(&mut InlineParser<'_>, &str, usize) -> Option<usize>;

static ESCAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\A\\([!-/:-@\[-`{-~])").unwrap());

static AUTO_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A<([A-Za-z][A-Za-z0-9.+-]{1,31}:[^<>\x00-\x20]*)>").unwrap());

static AUTO_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\A<([A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*)>",
    )
    .unwrap()
});

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A(?: {2,}|\\)\n[ \t]*").unwrap());

/// Inline parser state for one document.
pub(crate) struct InlineParser<'a> {
    rules: Vec<(&'static str, InlineRule)>,
    env: &'a BlockEnv,
    underscore_emphasis: bool,
    in_link: bool,
    tokens: Vec<Inline>,
    /// Referenced footnote keys in first-reference order.
    pub(crate) footnote_refs: Vec<String>,
}

impl<'a> InlineParser<'a> {
    /// Build the rule table: reST rules first, then baseline and plugin rules.
    pub(crate) fn new(options: &ConvertOptions, env: &'a BlockEnv) -> Self {
        let mut rules = rest_inline::rules(options);
        rules.push(("escape", parse_escape as InlineRule));
        rules.push(("codespan", parse_code_span));
        if options.plugins.contains(Plugin::Footnotes) {
            rules.push(("footnote_ref", plugins::parse_footnote_ref));
        }
        rules.push(("link", parse_link));
        rules.push(("auto_link", parse_auto_link));
        rules.push(("auto_email", parse_auto_email));
        rules.push(("inline_html", parse_inline_html));
        if options.plugins.contains(Plugin::Strikethrough) {
            rules.push(("strikethrough", plugins::parse_strikethrough));
        }
        rules.push(("emphasis", parse_emphasis));
        rules.push(("linebreak", parse_line_break));
        rules.push(("softbreak", parse_soft_break));

        Self {
            rules,
            env,
            underscore_emphasis: !options.no_underscore_emphasis,
            in_link: false,
            tokens: Vec::new(),
            footnote_refs: Vec::new(),
        }
    }

    /// Parse span-level content into tokens.
    pub(crate) fn parse(&mut self, text: &str) -> Vec<Inline> {
        let outer = std::mem::take(&mut self.tokens);

        let mut pos = 0;
        'scan: while pos < text.len() {
            for idx in 0..self.rules.len() {
                let (_, rule) = self.rules[idx];
                if let Some(next) = rule(self, text, pos) {
                    pos = next;
                    continue 'scan;
                }
            }
            let ch_len = text[pos..].chars().next().map_or(1, char::len_utf8);
            self.push_text(&text[pos..pos + ch_len]);
            pos += ch_len;
        }

        std::mem::replace(&mut self.tokens, outer)
    }

    /// Append a token.
    pub(crate) fn push(&mut self, token: Inline) {
        self.tokens.push(token);
    }

    /// Append text, merging with a preceding text run.
    pub(crate) fn push_text(&mut self, text: &str) {
        if let Some(Inline::Text(last)) = self.tokens.last_mut() {
            last.push_str(text);
        } else {
            self.tokens.push(Inline::Text(text.to_owned()));
        }
    }

    pub(crate) fn has_footnote(&self, key: &str) -> bool {
        self.env.footnotes.contains_key(key)
    }

    /// Record a footnote reference, keeping first-reference order.
    pub(crate) fn reference_footnote(&mut self, key: &str) {
        if !self.footnote_refs.iter().any(|k| k == key) {
            self.footnote_refs.push(key.to_owned());
        }
    }

    #[cfg(test)]
    fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|(name, _)| *name).collect()
    }
}

fn parse_escape(p: &mut InlineParser<'_>, text: &str, pos: usize) -> Option<usize> {
    let caps = ESCAPE.captures(&text[pos..])?;
    let ch = caps[1].chars().next()?;
    p.push(Inline::Escape(ch));
    Some(pos + caps[0].len())
}

fn parse_code_span(p: &mut InlineParser<'_>, text: &str, pos: usize) -> Option<usize> {
    if !text[pos..].starts_with('`') {
        return None;
    }
    let run = run_length(text, pos, b'`');
    let Some(close) = find_code_span_end(text, pos + run, run) else {
        // Unmatched backtick string is literal
        p.push_text(&text[pos..pos + run]);
        return Some(pos + run);
    };

    let content = text[pos + run..close].replace('\n', " ");
    let content = if content.len() >= 2
        && content.starts_with(' ')
        && content.ends_with(' ')
        && !content.trim().is_empty()
    {
        content[1..content.len() - 1].to_owned()
    } else {
        content
    };
    p.push(Inline::CodeSpan(content));
    Some(close + run)
}

/// Length of the run of `byte` starting at `pos`.
pub(crate) fn run_length(text: &str, pos: usize, byte: u8) -> usize {
    text.as_bytes()[pos..].iter().take_while(|&&b| b == byte).count()
}

/// Find the start of a backtick run of exactly `len` at or after `from`.
pub(crate) fn find_code_span_end(text: &str, from: usize, len: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let run = run_length(text, i, b'`');
            if run == len {
                return Some(i);
            }
            i += run;
        } else {
            i += 1;
        }
    }
    None
}

fn parse_emphasis(p: &mut InlineParser<'_>, text: &str, pos: usize) -> Option<usize> {
    let marker = match text.as_bytes()[pos] {
        b'*' => b'*',
        b'_' if p.underscore_emphasis => b'_',
        _ => return None,
    };
    let run = run_length(text, pos, marker);
    let after_run = pos + run;

    let opens = run <= 3
        && text[after_run..].starts_with(|c: char| !c.is_whitespace())
        && (marker != b'_' || !text[..pos].ends_with(char::is_alphanumeric));
    if opens {
        for want in (1..=run).rev() {
            let open_end = after_run;
            let open_start = open_end - want;
            let Some(close) = find_emphasis_end(text, open_end, marker, want) else {
                continue;
            };
            if open_start > pos {
                p.push_text(&text[pos..open_start]);
            }
            let children = p.parse(&text[open_end..close]);
            p.push(match want {
                1 => Inline::Emphasis(children),
                2 => Inline::Strong(children),
                _ => Inline::Emphasis(vec![Inline::Strong(children)]),
            });
            return Some(close + want);
        }
    }

    p.push_text(&text[pos..after_run]);
    Some(after_run)
}

/// Find a closing delimiter run of exactly `want` markers after `from`.
///
/// Code spans and escapes are skipped. The closer must follow non-whitespace,
/// and an underscore closer must not be followed by an alphanumeric.
/// An unclosed opener scans to the end of `text`, so a paragraph of many
/// unmatched markers costs time quadratic in its length.
fn find_emphasis_end(text: &str, from: usize, marker: u8, want: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => {
                let run = run_length(text, i, b'`');
                i = find_code_span_end(text, i + run, run).map_or(i + run, |end| end + run);
            }
            b if b == marker => {
                let run = run_length(text, i, marker);
                let after_text = !text[..i].ends_with(char::is_whitespace);
                let word_boundary =
                    marker != b'_' || !text[i + run..].starts_with(char::is_alphanumeric);
                if run == want && i > from && after_text && word_boundary {
                    return Some(i);
                }
                i += run;
            }
            _ => i += 1,
        }
    }
    None
}

fn parse_link(p: &mut InlineParser<'_>, text: &str, pos: usize) -> Option<usize> {
    let rest = &text[pos..];
    let (is_image, label_start) = if rest.starts_with("![") {
        (true, pos + 2)
    } else if rest.starts_with('[') && !p.in_link {
        (false, pos + 1)
    } else {
        return None;
    };

    let label_end = find_label_end(text, label_start)?;
    let label = &text[label_start..label_end];
    let after = label_end + 1;

    let (target, end) = if let Some((target, end)) = parse_inline_target(text, after) {
        (target, end)
    } else {
        resolve_reference(p, text, label, after)?
    };

    if is_image {
        p.push(Inline::Image {
            src: target.url,
            alt: unescape(label),
            title: target.title,
        });
    } else {
        let saved = std::mem::replace(&mut p.in_link, true);
        let children = p.parse(label);
        p.in_link = saved;
        p.push(Inline::Link {
            url: target.url,
            title: target.title,
            children,
        });
    }
    Some(end)
}

/// Find the `]` closing a link label opened just before `from`.
fn find_label_end(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 1;
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => {
                let run = run_length(text, i, b'`');
                i = find_code_span_end(text, i + run, run).map_or(i + run, |end| end + run);
            }
            b'[' => {
                depth += 1;
                i += 1;
            }
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

/// Parse `(url "title")` starting at `open`; returns the target and end position.
fn parse_inline_target(text: &str, open: usize) -> Option<(LinkDef, usize)> {
    if !text[open..].starts_with('(') {
        return None;
    }
    let mut i = skip_whitespace(text, open + 1);

    let url = if text[i..].starts_with('<') {
        let close = text[i + 1..].find(['>', '\n'])? + i + 1;
        if text.as_bytes()[close] != b'>' {
            return None;
        }
        let url = &text[i + 1..close];
        i = close + 1;
        url
    } else {
        let start = i;
        let mut depth = 0usize;
        let bytes = text.as_bytes();
        while i < bytes.len() {
            match bytes[i] {
                b'\\' if i + 1 < bytes.len() => i += 2,
                b'(' => {
                    depth += 1;
                    i += 1;
                }
                b')' if depth == 0 => break,
                b')' => {
                    depth -= 1;
                    i += 1;
                }
                b if b.is_ascii_whitespace() || b.is_ascii_control() => break,
                _ => i += 1,
            }
        }
        &text[start..i]
    };

    let before_title = i;
    i = skip_whitespace(text, i);
    let mut title = None;
    if i > before_title
        && let Some(close_char) = match text.as_bytes().get(i) {
            Some(b'"') => Some('"'),
            Some(b'\'') => Some('\''),
            Some(b'(') => Some(')'),
            _ => None,
        }
    {
        let close = find_unescaped(text, i + 1, close_char)?;
        title = Some(unescape(&text[i + 1..close]));
        i = skip_whitespace(text, close + 1);
    }

    if !text[i..].starts_with(')') {
        return None;
    }
    Some((
        LinkDef {
            url: unescape(url),
            title,
        },
        i + 1,
    ))
}

/// Resolve `[text][label]`, `[text][]` and `[label]` against link definitions.
fn resolve_reference(
    p: &InlineParser<'_>,
    text: &str,
    label: &str,
    after: usize,
) -> Option<(LinkDef, usize)> {
    let (key, end) = if text[after..].starts_with('[') {
        let close = find_unescaped(text, after + 1, ']')?;
        let reference = &text[after + 1..close];
        if reference.trim().is_empty() {
            (label, close + 1)
        } else {
            (reference, close + 1)
        }
    } else {
        (label, after)
    };

    let key = link_label(key);
    if key.is_empty() {
        return None;
    }
    p.env.links.get(&key).map(|def| (def.clone(), end))
}

fn skip_whitespace(text: &str, from: usize) -> usize {
    from + text[from..].len() - text[from..].trim_start().len()
}

fn find_unescaped(text: &str, from: usize, target: char) -> Option<usize> {
    let mut escaped = false;
    for (offset, c) in text[from..].char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == target {
            return Some(from + offset);
        }
    }
    None
}

fn parse_auto_link(p: &mut InlineParser<'_>, text: &str, pos: usize) -> Option<usize> {
    let caps = AUTO_LINK.captures(&text[pos..])?;
    let url = caps[1].to_owned();
    p.push(Inline::Link {
        children: vec![Inline::Text(url.clone())],
        url,
        title: None,
    });
    Some(pos + caps[0].len())
}

fn parse_auto_email(p: &mut InlineParser<'_>, text: &str, pos: usize) -> Option<usize> {
    let caps = AUTO_EMAIL.captures(&text[pos..])?;
    let address = &caps[1];
    p.push(Inline::Link {
        url: format!("mailto:{address}"),
        title: None,
        children: vec![Inline::Text(address.to_owned())],
    });
    Some(pos + caps[0].len())
}

fn parse_inline_html(p: &mut InlineParser<'_>, text: &str, pos: usize) -> Option<usize> {
    let html = html::match_inline(&text[pos..])?;
    p.push(Inline::InlineHtml(html.to_owned()));
    Some(pos + html.len())
}

fn parse_line_break(p: &mut InlineParser<'_>, text: &str, pos: usize) -> Option<usize> {
    let m = LINE_BREAK.find(&text[pos..])?;
    p.push(Inline::LineBreak);
    Some(pos + m.end())
}

fn parse_soft_break(p: &mut InlineParser<'_>, text: &str, pos: usize) -> Option<usize> {
    if !text[pos..].starts_with('\n') {
        return None;
    }
    p.push(Inline::SoftBreak);
    Some(pos + 1)
}
