//! Markdown parser producing a [`Document`] token tree.
//!
//! Parsing runs in two passes. The block pass splits the source into
//! block tokens whose span content is still raw text, collecting link and
//! footnote definitions along the way. The inline pass then parses every
//! raw span with those definitions available.

mod block;
mod fence;
mod html;
mod inline;
mod plugins;
mod rest_block;
mod rest_inline;

use crate::options::ConvertOptions;
use crate::token::{Document, Footnote, map_blocks};
use crate::util::expand_leading_tabs;

use block::BlockParser;
use inline::InlineParser;

/// Parse Markdown source into a document.
pub(crate) fn parse(text: &str, options: &ConvertOptions) -> Document {
    let lines = split_lines(text);

    let mut block_parser = BlockParser::new(options);
    let raw_blocks = block_parser.parse_lines(&lines);
    let env = block_parser.env;

    let mut inline = InlineParser::new(options, &env);
    let blocks = map_blocks(raw_blocks, &mut |raw: String| inline.parse(&raw));

    // Footnote bodies may reference further footnotes, so the list can grow
    let mut footnotes = Vec::new();
    let mut index = 0;
    while let Some(key) = inline.footnote_refs.get(index).cloned() {
        if let Some(raw) = env.footnotes.get(&key) {
            let blocks = map_blocks(raw.clone(), &mut |raw: String| inline.parse(&raw));
            footnotes.push(Footnote { key, blocks });
        }
        index += 1;
    }

    tracing::trace!(
        blocks = blocks.len(),
        footnotes = footnotes.len(),
        "Parsed document"
    );
    Document { blocks, footnotes }
}

/// Normalize line endings and split into lines with tabs expanded.
fn split_lines(text: &str) -> Vec<String> {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = text.strip_suffix('\n').unwrap_or(&text);
    text.split('\n').map(expand_leading_tabs).collect()
}
