//! Token tree produced by the parser.
//!
//! Block tokens are generic over their span content: the block grammar
//! produces `Block<String>` holding raw inline text, which the inline grammar
//! turns into `Block<Vec<Inline>>`.

/// Column alignment from a table delimiter row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    None,
    Left,
    Center,
    Right,
}

/// How a code block was delimited in the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodeStyle {
    /// Backtick or tilde fence; text keeps its final newline.
    Fenced,
    /// Four-space indentation; text has no final newline.
    Indented,
}

/// Block-level token.
#[derive(Clone, Debug, PartialEq)]
pub enum Block<T = Vec<Inline>> {
    BlankLine,
    Paragraph(T),
    /// Paragraph of a tight list item, rendered without surrounding blank lines.
    Text(T),
    Heading { level: u8, content: T },
    ThematicBreak,
    CodeBlock {
        info: Option<String>,
        text: String,
        style: CodeStyle,
    },
    BlockQuote(Vec<Block<T>>),
    /// `start` is the first number of an ordered list. reST output uses
    /// `#.` auto-numbering, so it is only exposed through [`parse`](crate::parse).
    List {
        ordered: bool,
        start: Option<u64>,
        tight: bool,
        items: Vec<Vec<Block<T>>>,
    },
    BlockHtml(String),
    /// `head` is `None` when every header cell is empty. `align` is kept for
    /// [`parse`](crate::parse) callers; `list-table` has no column alignment.
    Table {
        head: Option<Vec<T>>,
        align: Vec<Align>,
        rows: Vec<Vec<T>>,
    },
    /// reST explicit markup block passed through verbatim.
    Directive(String),
    /// Bare `::` literal block opener.
    RestCodeBlock,
}

impl<T> Block<T> {
    /// Convert span content with `f`, preserving block structure.
    pub(crate) fn map_content<U>(self, f: &mut impl FnMut(T) -> U) -> Block<U> {
        match self {
            Self::BlankLine => Block::BlankLine,
            Self::Paragraph(text) => Block::Paragraph(f(text)),
            Self::Text(text) => Block::Text(f(text)),
            Self::Heading { level, content } => Block::Heading {
                level,
                content: f(content),
            },
            Self::ThematicBreak => Block::ThematicBreak,
            Self::CodeBlock { info, text, style } => Block::CodeBlock { info, text, style },
            Self::BlockQuote(children) => Block::BlockQuote(map_blocks(children, f)),
            Self::List {
                ordered,
                start,
                tight,
                items,
            } => Block::List {
                ordered,
                start,
                tight,
                items: items.into_iter().map(|item| map_blocks(item, f)).collect(),
            },
            Self::BlockHtml(html) => Block::BlockHtml(html),
            Self::Table { head, align, rows } => Block::Table {
                head: head.map(|cells| cells.into_iter().map(&mut *f).collect()),
                align,
                rows: rows
                    .into_iter()
                    .map(|row| row.into_iter().map(&mut *f).collect())
                    .collect(),
            },
            Self::Directive(raw) => Block::Directive(raw),
            Self::RestCodeBlock => Block::RestCodeBlock,
        }
    }
}

/// Convert span content of a block sequence.
pub(crate) fn map_blocks<T, U>(blocks: Vec<Block<T>>, f: &mut impl FnMut(T) -> U) -> Vec<Block<U>> {
    blocks.into_iter().map(|block| block.map_content(f)).collect()
}

/// Span-level token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    /// Backslash-escaped punctuation.
    Escape(char),
    SoftBreak,
    LineBreak,
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    CodeSpan(String),
    Link {
        url: String,
        title: Option<String>,
        children: Vec<Inline>,
    },
    Image {
        src: String,
        alt: String,
        title: Option<String>,
    },
    InlineHtml(String),
    /// Normalized footnote key.
    FootnoteRef(String),
    InlineMath(String),
    /// `` :role:`content` `` or `` `content`:role: ``, verbatim.
    RestRole(String),
    /// `` `text`_ ``, verbatim.
    RestLink(String),
    /// Trailing `::`; `spaced` when whitespace preceded it.
    EolLiteralMarker { spaced: bool },
}

/// Footnote definition that was referenced from the document.
#[derive(Clone, Debug, PartialEq)]
pub struct Footnote {
    /// Normalized key (words joined with `-`, upper-cased).
    pub key: String,
    pub blocks: Vec<Block>,
}

/// Parsed document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub blocks: Vec<Block>,
    /// Referenced footnotes in first-reference order.
    pub footnotes: Vec<Footnote>,
}
