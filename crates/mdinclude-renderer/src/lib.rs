//! Markdown to reStructuredText converter for Sphinx documentation.
//!
//! This crate parses Markdown (`CommonMark`-style blocks and spans plus
//! strikethrough, footnotes and pipe tables) and renders it as reST that
//! Sphinx can consume. reST constructs written directly in the Markdown
//! source pass through untouched:
//!
//! - Explicit markup blocks (`.. note::`, comments, footnote targets)
//! - Bare `::` literal block openers and trailing `::` on paragraphs
//! - Roles (`` :code:`x` ``, `` `x`:code: ``) and hyperlink references
//! - Inline math written as `` `$...$` ``
//!
//! Markdown with no reST counterpart (strikethrough, inline HTML, titled
//! links) is emitted through a `raw-html-md` role whose definition,
//! [`PROLOG`], is prepended to the output when needed.
//!
//! # Example
//!
//! ```
//! use mdinclude_renderer::convert;
//!
//! let rst = convert("# Hello\n\n**Bold** and `code`");
//! assert_eq!(rst, "\nHello\n=====\n\n**Bold** and ``code``\n");
//! ```
//!
//! Including part of a file, as a documentation host would:
//!
//! ```no_run
//! use mdinclude_renderer::{ConvertOptions, IncludeRequest};
//!
//! let lines = IncludeRequest::new("README.md")
//!     .with_start_line(2)
//!     .include_lines(&ConvertOptions::default())?;
//! # Ok::<(), mdinclude_renderer::ConvertError>(())
//! ```

mod error;
mod include;
mod list;
mod options;
mod parser;
mod plugin;
mod renderer;
mod token;
mod util;

pub use error::ConvertError;
pub use include::IncludeRequest;
pub use options::ConvertOptions;
pub use plugin::{Plugin, PluginSet};
pub use renderer::{PROLOG, RstRenderer};
pub use token::{Align, Block, CodeStyle, Document, Footnote, Inline};

/// Parse Markdown into a token tree without rendering it.
#[must_use]
pub fn parse(text: &str, options: &ConvertOptions) -> Document {
    parser::parse(text, options)
}

/// Convert Markdown to reST with default options.
///
/// Conversion never fails: text no rule recognizes is emitted as-is.
#[must_use]
pub fn convert(text: &str) -> String {
    convert_with(text, &ConvertOptions::default())
}

/// Convert Markdown to reST with the given options.
#[must_use]
pub fn convert_with(text: &str, options: &ConvertOptions) -> String {
    let doc = parser::parse(text, options);
    RstRenderer::new(options).render(&doc)
}
