//! reStructuredText renderer.
//!
//! Walks a [`Document`] and emits reST text. Constructs with no reST
//! equivalent are emitted through the `raw-html-md` role; when any such role
//! is used, [`PROLOG`] is prepended so the role is defined.

use std::fmt::Write;
use std::path::Path;

use crate::list::ListBody;
use crate::options::ConvertOptions;
use crate::token::{Block, CodeStyle, Document, Footnote, Inline};
use crate::util::{INDENT, column_width, escape_html, has_scheme, indent_block};

/// Role declaration prepended when raw HTML is emitted.
pub const PROLOG: &str = ".. role:: raw-html-md(raw)\n   :format: html\n\n";

/// Heading underline characters for levels 1 to 6.
const HEADING_MARKS: [char; 6] = ['=', '-', '^', '~', '"', '#'];

/// Renders parsed documents to reStructuredText.
///
/// # Example
///
/// ```
/// use mdinclude_renderer::{ConvertOptions, RstRenderer, parse};
///
/// let options = ConvertOptions::default();
/// let doc = parse("# Title", &options);
/// let rst = RstRenderer::new(&options).render(&doc);
/// assert_eq!(rst, "\nTitle\n=====\n");
/// ```
pub struct RstRenderer<'a> {
    options: &'a ConvertOptions,
    includes_raw_html: bool,
}

impl<'a> RstRenderer<'a> {
    /// Create a renderer for the given options.
    #[must_use]
    pub fn new(options: &'a ConvertOptions) -> Self {
        Self {
            options,
            includes_raw_html: false,
        }
    }

    /// Render a document, including its footnotes and the raw-HTML prolog.
    pub fn render(&mut self, doc: &Document) -> String {
        self.includes_raw_html = false;

        let mut output = self.render_blocks(&doc.blocks);
        output.push_str(&self.render_footnotes(&doc.footnotes));
        self.post_process(output)
    }

    fn post_process(&self, output: String) -> String {
        if self.includes_raw_html {
            format!("{PROLOG}{output}")
        } else {
            output
        }
    }

    /// Wrap HTML in the raw role and remember that the prolog is needed.
    fn raw_html(&mut self, html: &str) -> String {
        tracing::debug!(html, "Emitting raw HTML role");
        self.includes_raw_html = true;
        format!(":raw-html-md:`{html}`")
    }

    fn render_blocks(&mut self, blocks: &[Block]) -> String {
        blocks.iter().map(|block| self.render_block(block)).collect()
    }

    fn render_block(&mut self, block: &Block) -> String {
        match block {
            Block::BlankLine => String::new(),
            Block::Paragraph(content) => format!("\n{}\n", self.render_inlines(content)),
            Block::Text(content) => self.render_inlines(content),
            Block::Heading { level, content } => {
                let text = self.render_inlines(content);
                let mark = HEADING_MARKS[usize::from((*level).clamp(1, 6)) - 1];
                let underline = mark.to_string().repeat(column_width(&text));
                format!("\n{text}\n{underline}\n")
            }
            Block::ThematicBreak => "\n----\n".to_owned(),
            Block::CodeBlock { info, text, style } => code_block(info.as_deref(), text, *style),
            Block::BlockQuote(children) => {
                let inner = self.render_blocks(children);
                let quoted = indent_block(inner.trim_matches('\n'), INDENT);
                format!("\n..\n\n{quoted}\n\n")
            }
            Block::List { ordered, items, .. } => self.render_list(*ordered, items),
            // Block HTML is a directive, so the raw role is not needed
            Block::BlockHtml(html) => {
                format!("\n\n.. raw:: html\n\n{}\n\n", indent_block(html, INDENT))
            }
            Block::Table { head, rows, .. } => self.render_table(head.as_deref(), rows),
            Block::Directive(raw) => format!("\n{raw}"),
            Block::RestCodeBlock => "\n\n".to_owned(),
        }
    }

    fn render_list(&mut self, ordered: bool, items: &[Vec<Block>]) -> String {
        let mark = if ordered { "#. " } else { "* " };
        let rendered: Vec<String> = items.iter().map(|item| self.render_blocks(item)).collect();

        let mut body = ListBody::new();
        for text in &rendered {
            body.push_item(text.trim_start_matches('\n'));
        }
        body.render(mark)
    }

    fn render_table(&mut self, head: Option<&[Vec<Inline>]>, rows: &[Vec<Vec<Inline>>]) -> String {
        let mut body = String::new();
        match head {
            Some(cells) => {
                body.push_str(":header-rows: 1\n\n");
                body.push_str(&self.render_row(cells));
            }
            None => body.push('\n'),
        }
        for row in rows {
            body.push_str(&self.render_row(row));
        }
        format!("\n.. list-table::\n{}\n", indent_block(&body, INDENT))
    }

    fn render_row(&mut self, cells: &[Vec<Inline>]) -> String {
        let mut row = String::new();
        for (i, cell) in cells.iter().enumerate() {
            let prefix = if i == 0 { "* " } else { "  " };
            let _ = writeln!(row, "{prefix}- {}", self.render_inlines(cell));
        }
        row
    }

    fn render_footnotes(&mut self, footnotes: &[Footnote]) -> String {
        if footnotes.is_empty() {
            return String::new();
        }

        let mut output = String::from("\n\n");
        for footnote in footnotes {
            let body = self.render_blocks(&footnote.blocks);
            let (first, rest) = body.trim().split_once('\n').unwrap_or((body.trim(), ""));
            let _ = write!(output, ".. [#fn-{}] {first}", footnote.key);
            if !rest.is_empty() {
                output.push('\n');
                output.push_str(&indent_block(rest, INDENT));
            }
            output.push('\n');
        }
        output
    }

    fn render_inlines(&mut self, inlines: &[Inline]) -> String {
        inlines.iter().map(|inline| self.render_inline(inline)).collect()
    }

    fn render_inline(&mut self, inline: &Inline) -> String {
        match inline {
            Inline::Text(text) => text.clone(),
            // reST treats these characters as markup, so the escape survives
            Inline::Escape(c @ ('\\' | '`' | '*' | '_' | '|')) => format!("\\{c}"),
            Inline::Escape(c) => c.to_string(),
            Inline::SoftBreak => "\n".to_owned(),
            Inline::LineBreak => format!(" {}\n", self.raw_html("<br />")),
            Inline::Emphasis(children) => format!("*{}*", self.render_inlines(children)),
            Inline::Strong(children) => format!("**{}**", self.render_inlines(children)),
            Inline::Strikethrough(children) => {
                let text = self.render_inlines(children);
                self.raw_html(&format!("<del>{text}</del>"))
            }
            Inline::CodeSpan(code) => self.code_span(code),
            Inline::Link {
                url,
                title,
                children,
            } => self.link(url, title.as_deref(), children),
            Inline::Image { src, alt, .. } => {
                let path = self.image_path(src);
                image(&path, &path, alt)
            }
            Inline::InlineHtml(html) => self.raw_html(html),
            Inline::FootnoteRef(key) => format!("[#fn-{key}]_"),
            Inline::InlineMath(math) => format!(":math:`{math}`"),
            Inline::RestRole(raw) | Inline::RestLink(raw) => raw.clone(),
            Inline::EolLiteralMarker { spaced } => if *spaced { "" } else { ":" }.to_owned(),
        }
    }

    /// Inline literal, or raw HTML when reST literal syntax cannot hold `code`.
    fn code_span(&mut self, code: &str) -> String {
        let literal_safe = !code.is_empty() && !code.contains('`') && code.trim() == code;
        if literal_safe {
            return format!("``{code}``");
        }
        let escaped = escape_html(code).replace('`', "&#96;");
        self.raw_html(&format!(
            r#"<code class="docutils literal"><span class="pre">{escaped}</span></code>"#
        ))
    }

    fn link(&mut self, url: &str, title: Option<&str>, children: &[Inline]) -> String {
        // Linked image: the link becomes the image target
        if let [Inline::Image { src, alt, .. }, rest @ ..] = children {
            let path = self.image_path(src);
            return image(&path, url, alt) + &self.render_inlines(rest);
        }

        let text = self.render_inlines(children);
        if let Some(title) = title {
            let title = escape_html(title);
            return self.raw_html(&format!(r#"<a href="{url}" title="{title}">{text}</a>"#));
        }
        if let Some(anchor) = url.strip_prefix('#') {
            return format!(":ref:`{text} <{anchor}>`");
        }
        if self.options.parse_relative_links && !has_scheme(url) {
            let path = url.split_once('#').map_or(url, |(path, _)| path);
            let path = path.strip_suffix(".md").unwrap_or(path);
            return format!(":doc:`{text} <{path}>`");
        }

        let underscore = if self.options.anonymous_references { "__" } else { "_" };
        format!("`{text} <{url}>`{underscore}")
    }

    /// Resolve a relative image source against the Markdown file's directory.
    fn image_path(&self, src: &str) -> String {
        let dir = self
            .options
            .source_path()
            .and_then(Path::parent)
            .filter(|_| !has_scheme(src) && !src.starts_with('/'));
        match dir {
            Some(dir) => dir.join(src).to_string_lossy().replace('\\', "/"),
            None => src.to_owned(),
        }
    }
}

fn code_block(info: Option<&str>, text: &str, style: CodeStyle) -> String {
    let lang = info.and_then(|info| info.split_whitespace().next());
    let mut output = match lang {
        Some("math") => "\n.. math::\n\n".to_owned(),
        Some(lang) => format!("\n.. code-block:: {lang}\n\n"),
        None => "\n.. code-block::\n\n".to_owned(),
    };
    output.push_str(&indent_block(text, INDENT));
    if style == CodeStyle::Indented {
        output.push('\n');
    }
    output
}

fn image(path: &str, href: &str, alt: &str) -> String {
    format!("\n.. image:: {path}\n   :target: {href}\n   :alt: {alt}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{Plugin, PluginSet};
    use crate::{convert, convert_with};
    use pretty_assertions::assert_eq;

    fn prolog(body: &str) -> String {
        format!("{PROLOG}{body}")
    }

    #[test]
    fn test_simple_paragraph() {
        assert_eq!(convert("this is a sentence.\n"), "\nthis is a sentence.\n");
    }

    #[test]
    fn test_multiline_paragraph() {
        assert_eq!(
            convert("first sentence.\nsecond sentence."),
            "\nfirst sentence.\nsecond sentence.\n"
        );
    }

    #[test]
    fn test_multi_paragraph() {
        assert_eq!(
            convert("first paragraph.\n\nsecond paragraph."),
            "\nfirst paragraph.\n\nsecond paragraph.\n"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(convert(""), "");
    }

    #[test]
    fn test_thematic_break() {
        assert_eq!(convert("a\n\n---\n\nb"), "\na\n\n----\n\nb\n");
    }

    #[test]
    fn test_linebreak() {
        assert_eq!(
            convert("abc def  \nghi"),
            prolog("\nabc def :raw-html-md:`<br />`\nghi\n")
        );
    }

    #[test]
    fn test_inline_code() {
        assert_eq!(convert("`a`"), "\n``a``\n");
    }

    #[test]
    fn test_inline_code_with_backticks() {
        assert_eq!(
            convert("```a``a```"),
            prolog(
                "\n:raw-html-md:`<code class=\"docutils literal\"><span class=\"pre\">a&#96;&#96;a</span></code>`\n"
            )
        );
    }

    #[test]
    fn test_inline_code_with_opening_space() {
        assert_eq!(
            convert("`` `a`:role:``"),
            prolog(
                "\n:raw-html-md:`<code class=\"docutils literal\"><span class=\"pre\"> &#96;a&#96;:role:</span></code>`\n"
            )
        );
    }

    #[test]
    fn test_inline_code_with_closing_space() {
        assert_eq!(
            convert("``:role:`a` ``"),
            prolog(
                "\n:raw-html-md:`<code class=\"docutils literal\"><span class=\"pre\">:role:&#96;a&#96; </span></code>`\n"
            )
        );
    }

    #[test]
    fn test_inline_code_with_opening_and_closing_space() {
        assert_eq!(convert("`` a ``"), "\n``a``\n");
    }

    #[test]
    fn test_inline_code_with_spaces_and_backtick() {
        assert_eq!(
            convert("`` `a` ``"),
            prolog(
                "\n:raw-html-md:`<code class=\"docutils literal\"><span class=\"pre\">&#96;a&#96;</span></code>`\n"
            )
        );
    }

    #[test]
    fn test_strikethrough() {
        assert_eq!(convert("~~a~~"), prolog("\n:raw-html-md:`<del>a</del>`\n"));
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(convert("*a*"), "\n*a*\n");
        assert_eq!(convert("_a_"), "\n*a*\n");
        assert_eq!(convert("**a**"), "\n**a**\n");
        assert_eq!(convert("__a__"), "\n**a**\n");
    }

    #[test]
    fn test_escapes() {
        assert_eq!(convert(r"\*not emphasis\* \#"), "\n\\*not emphasis\\* #\n");
    }

    #[test]
    fn test_not_an_autolink() {
        let src = "link to http://example.com/ in sentence.";
        assert_eq!(convert(src), format!("\n{src}\n"));
    }

    #[test]
    fn test_link() {
        assert_eq!(
            convert("this is a [link](http://example.com/)."),
            "\nthis is a `link <http://example.com/>`_.\n"
        );
    }

    #[test]
    fn test_anchor() {
        assert_eq!(
            convert("this is an [anchor link](#anchor)."),
            "\nthis is an :ref:`anchor link <anchor>`.\n"
        );
    }

    #[test]
    fn test_autolink() {
        assert_eq!(
            convert("link <http://example.com>"),
            "\nlink `http://example.com <http://example.com>`_\n"
        );
    }

    #[test]
    fn test_link_title() {
        assert_eq!(
            convert(r#"this is a [link](http://example.com/ "example")."#),
            prolog(
                "\nthis is a :raw-html-md:`<a href=\"http://example.com/\" title=\"example\">link</a>`.\n"
            )
        );
    }

    #[test]
    fn test_image_link() {
        assert_eq!(
            convert("[![Alt Text](image_taget_url)](link_target_url)"),
            "\n\n.. image:: image_taget_url\n   :target: link_target_url\n   :alt: Alt Text\n\n"
        );
    }

    #[test]
    fn test_rest_roles_pass_through() {
        for src in [
            "a :code:`some code` inline.",
            "a `some code`:code: inline.",
            "a `RefLink <http://example.com>`_ here.",
            "a :code:`a` and `RefLink <http://example.com>`_ here.",
            "a `a`:code: and `RefLink <http://example.com>`_ here.",
        ] {
            assert_eq!(convert(src), format!("\n{src}\n"));
        }
    }

    #[test]
    fn test_rest_role_incomplete() {
        assert_eq!(
            convert("a co:`de` and `RefLink <http://example.com>`_ here."),
            "\na co:``de`` and `RefLink <http://example.com>`_ here.\n"
        );
        assert_eq!(
            convert("a `RefLink <http://example.com>`_ and co:`de` here."),
            "\na `RefLink <http://example.com>`_ and co:``de`` here.\n"
        );
    }

    #[test]
    fn test_rest_roles_mixed_with_code() {
        let cases = [
            (
                "a `code` and :code:`rest` here.",
                "\na ``code`` and :code:`rest` here.\n",
            ),
            (
                "a `code` and `rest`:code: here.",
                "\na ``code`` and `rest`:code: here.\n",
            ),
            (
                "a :code:`rest` and `code` here.",
                "\na :code:`rest` and ``code`` here.\n",
            ),
            (
                "a `rest`:code: and `code` here.",
                "\na `rest`:code: and ``code`` here.\n",
            ),
            (
                "a `RefLink <a>`_ and `code` here.",
                "\na `RefLink <a>`_ and ``code`` here.\n",
            ),
            (
                "a `code` and `RefLink <a>`_ here.",
                "\na ``code`` and `RefLink <a>`_ here.\n",
            ),
        ];
        for (src, expected) in cases {
            assert_eq!(convert(src), expected);
        }
    }

    #[test]
    fn test_inline_math() {
        assert_eq!(
            convert("this is `$E = mc^2$` inline math."),
            "\nthis is :math:`E = mc^2` inline math.\n"
        );
    }

    #[test]
    fn test_inline_html() {
        assert_eq!(
            convert("this is <s>html</s>."),
            prolog("\nthis is :raw-html-md:`<s>html</s>`.\n")
        );
    }

    #[test]
    fn test_block_html() {
        assert_eq!(
            convert("<h1>title</h1>"),
            "\n\n.. raw:: html\n\n   <h1>title</h1>\n\n"
        );
    }

    #[test]
    fn test_block_quote() {
        assert_eq!(convert("> q1\n> q2"), "\n..\n\n   q1\n   q2\n\n");
    }

    #[test]
    fn test_block_quote_nested() {
        assert_eq!(
            convert("> q1\n> > q2"),
            "\n..\n\n   q1\n\n   ..\n\n      q2\n\n"
        );
    }

    #[test]
    fn test_plain_code_block() {
        let expected = "\n.. code-block::\n\n   pip install sphinx\n";
        assert_eq!(convert("```\npip install sphinx\n```"), expected);
        assert_eq!(convert("~~~\npip install sphinx\n~~~"), expected);
    }

    #[test]
    fn test_code_block_math() {
        assert_eq!(
            convert("```math\nE = mc^2\n```"),
            "\n.. math::\n\n   E = mc^2\n"
        );
    }

    #[test]
    fn test_code_block_keeps_indentation() {
        assert_eq!(
            convert("```\npip install sphinx\n    new line\n```"),
            "\n.. code-block::\n\n   pip install sphinx\n       new line\n"
        );
        assert_eq!(
            convert("```python\ndef a(i):\n    print(i)\n```"),
            "\n.. code-block:: python\n\n   def a(i):\n       print(i)\n"
        );
    }

    #[test]
    fn test_code_block_language_is_first_word() {
        assert_eq!(
            convert("```python title=\"x\"\nprint(1)\n```"),
            "\n.. code-block:: python\n\n   print(1)\n"
        );
    }

    #[test]
    fn test_image() {
        assert_eq!(
            convert("![alt text](a.png)"),
            "\n\n.. image:: a.png\n   :target: a.png\n   :alt: alt text\n\n"
        );
    }

    #[test]
    fn test_image_title_is_dropped() {
        assert_eq!(
            convert(r#"![alt text](a.png "title")"#),
            "\n\n.. image:: a.png\n   :target: a.png\n   :alt: alt text\n\n"
        );
    }

    #[test]
    fn test_image_resolved_against_source_path() {
        let options = ConvertOptions::default().with_source_path("docs/guide/page.md");
        assert_eq!(
            convert_with("![x](img/a.png) ![y](https://e.com/b.png)", &options),
            "\n\n.. image:: docs/guide/img/a.png\n   :target: docs/guide/img/a.png\n   :alt: x\n \n.. image:: https://e.com/b.png\n   :target: https://e.com/b.png\n   :alt: y\n\n"
        );
    }

    #[test]
    fn test_heading() {
        assert_eq!(convert("# head 1"), "\nhead 1\n======\n");
        assert_eq!(convert("### head 3"), "\nhead 3\n^^^^^^\n");
        assert_eq!(convert("###### h6"), "\nh6\n##\n");
    }

    #[test]
    fn test_heading_every_level() {
        let cases = [
            ("# head", "\nhead\n====\n"),
            ("## head", "\nhead\n----\n"),
            ("### head", "\nhead\n^^^^\n"),
            ("#### head", "\nhead\n~~~~\n"),
            ("##### head", "\nhead\n\"\"\"\"\n"),
            ("###### head", "\nhead\n####\n"),
            ("head\n===", "\nhead\n====\n"),
            ("head\n---", "\nhead\n----\n"),
            ("## 見出し", "\n見出し\n------\n"),
            ("#### 見出し", "\n見出し\n~~~~~~\n"),
        ];
        for (src, expected) in cases {
            assert_eq!(convert(src), expected, "source: {src:?}");
        }
    }

    #[test]
    fn test_heading_multibyte() {
        assert_eq!(
            convert("# マルチバイト文字\n"),
            format!("\nマルチバイト文字\n{}\n", "=".repeat(16))
        );
    }

    #[test]
    fn test_ul() {
        assert_eq!(convert("* list"), "\n\n* list\n");
    }

    #[test]
    fn test_ol() {
        assert_eq!(convert("1. list"), "\n\n#. list\n");
    }

    #[test]
    fn test_nested_ul() {
        assert_eq!(
            convert("* list 1\n* list 2\n  * list 2.1\n  * list 2.2\n* list 3"),
            "\n\n* list 1\n* list 2\n\n  * list 2.1\n  * list 2.2\n\n* list 3\n"
        );
    }

    #[test]
    fn test_nested_ul_2() {
        let src = [
            "* list 1",
            "* list 2",
            "  * list 2.1",
            "  * list 2.2",
            "    * list 2.2.1",
            "    * list 2.2.2",
            "* list 3",
        ]
        .join("\n");
        assert_eq!(
            convert(&src),
            "\n\n* list 1\n* list 2\n\n  * list 2.1\n  * list 2.2\n\n    * list 2.2.1\n    * list 2.2.2\n\n* list 3\n"
        );
    }

    #[test]
    fn test_nested_ol() {
        let src = [
            "1. list 1",
            "1. list 2",
            "    1. list 2.1",
            "    1. list 2.2",
            "1. list 3",
        ]
        .join("\n");
        assert_eq!(
            convert(&src),
            "\n\n#. list 1\n#. list 2\n\n   #. list 2.1\n   #. list 2.2\n\n#. list 3\n"
        );
    }

    #[test]
    fn test_nested_ol_2() {
        let src = [
            "1. list 1",
            "1. list 2",
            "    1. list 2.1",
            "    1. list 2.2",
            "        1. list 2.2.1",
            "        1. list 2.2.2",
            "1. list 3",
        ]
        .join("\n");
        let expected = [
            "\n\n#. list 1",
            "#. list 2",
            "",
            "   #. list 2.1",
            "   #. list 2.2",
            "",
            "      #. list 2.2.1",
            "      #. list 2.2.2",
            "",
            "#. list 3\n",
        ]
        .join("\n");
        assert_eq!(convert(&src), expected);
    }

    #[test]
    fn test_nested_mixed() {
        let src = [
            "1. list 1",
            "2. list 2",
            "   * list 2.1",
            "   * list 2.2",
            "     1. list 2.2.1",
            "     2. list 2.2.2",
            "7. list 3",
        ]
        .join("\n");
        let expected = [
            "\n\n#. list 1",
            "#. list 2",
            "",
            "   * list 2.1",
            "   * list 2.2",
            "",
            "     #. list 2.2.1",
            "     #. list 2.2.2",
            "",
            "#. list 3\n",
        ]
        .join("\n");
        assert_eq!(convert(&src), expected);
    }

    #[test]
    fn test_nested_multiline_ul() {
        let src = [
            "* list 1",
            "  list 1 cont",
            "* list 2",
            "  list 2 cont",
            "  * list 2.1",
            "    list 2.1 cont",
            "  * list 2.2",
            "    list 2.2 cont",
            "    * list 2.2.1",
            "    * list 2.2.2",
            "* list 3",
        ]
        .join("\n");
        let expected = [
            "\n",
            "* list 1",
            "  list 1 cont",
            "* list 2",
            "  list 2 cont",
            "",
            "  * list 2.1",
            "    list 2.1 cont",
            "  * list 2.2",
            "    list 2.2 cont",
            "",
            "    * list 2.2.1",
            "    * list 2.2.2",
            "",
            "* list 3\n",
        ]
        .join("\n");
        assert_eq!(convert(&src), expected);
    }

    #[test]
    fn test_nested_multiline_ol() {
        let src = [
            "1. list 1",
            "   list 1 cont",
            "1. list 2",
            "   list 2 cont",
            "   1. list 2.1",
            "      list 2.1 cont",
            "   1. list 2.2",
            "      list 2.2 cont",
            "      1. list 2.2.1",
            "      1. list 2.2.2",
            "1. list 3",
        ]
        .join("\n");
        let expected = [
            "\n",
            "#. list 1",
            "   list 1 cont",
            "#. list 2",
            "   list 2 cont",
            "",
            "   #. list 2.1",
            "      list 2.1 cont",
            "   #. list 2.2",
            "      list 2.2 cont",
            "",
            "      #. list 2.2.1",
            "      #. list 2.2.2",
            "",
            "#. list 3\n",
        ]
        .join("\n");
        assert_eq!(convert(&src), expected);
    }

    #[test]
    fn test_nested_multiline_mixed() {
        let src = [
            "1. list 1",
            "   list 1 cont",
            "1. list 2",
            "   list 2 cont",
            "   * list 2.1",
            "     list 2.1 cont",
            "   * list 2.2",
            "     list 2.2 cont",
            "     1. list 2.2.1",
            "     1. list 2.2.2",
            "1. list 3",
        ]
        .join("\n");
        let expected = [
            "\n",
            "#. list 1",
            "   list 1 cont",
            "#. list 2",
            "   list 2 cont",
            "",
            "   * list 2.1",
            "     list 2.1 cont",
            "   * list 2.2",
            "     list 2.2 cont",
            "",
            "     #. list 2.2.1",
            "     #. list 2.2.2",
            "",
            "#. list 3\n",
        ]
        .join("\n");
        assert_eq!(convert(&src), expected);
    }

    #[test]
    fn test_loose_list_items_start_on_marker_line() {
        assert_eq!(convert("* a\n\n* b"), "\n\n* a\n\n* b\n");
    }

    #[test]
    fn test_table() {
        let expected = [
            "",
            ".. list-table::",
            "   :header-rows: 1",
            "",
            "   * - h1",
            "     - h2",
            "     - h3",
            "   * - 1",
            "     - 2",
            "     - 3",
            "   * - 4",
            "     - 5",
            "     - 6",
            "",
            "",
        ]
        .join("\n");
        assert_eq!(
            convert("h1 | h2 | h3\n--- | --- | ---\n1 | 2 | 3\n4 | 5 | 6"),
            expected
        );
    }

    #[test]
    fn test_table_without_header() {
        assert_eq!(
            convert("| | |\n|---|---|\n| *a* | b |"),
            "\n.. list-table::\n\n   * - *a*\n     - b\n\n"
        );
    }

    #[test]
    fn test_table_plugin_disabled() {
        let options =
            ConvertOptions::default().with_plugins(PluginSet::none().with(Plugin::Strikethrough));
        assert_eq!(
            convert_with("a | b\n--- | ---", &options),
            "\na | b\n--- | ---\n"
        );
    }

    #[test]
    fn test_footnote() {
        let src = [
            "This is a[^1] footnote[^2] ref[^ref] with rst [#a]_.",
            "",
            "[^1]: note 1",
            "[^2]: note 2",
            "[^ref]: note ref",
            ".. [#a] note rst",
        ]
        .join("\n");
        let expected = [
            "",
            "This is a[#fn-1]_ footnote[#fn-2]_ ref[#fn-REF]_ with rst [#a]_.",
            "",
            ".. [#a] note rst",
            "",
            ".. [#fn-1] note 1",
            ".. [#fn-2] note 2",
            ".. [#fn-REF] note ref",
            "",
        ]
        .join("\n");
        assert_eq!(convert(&src), expected);
    }

    #[test]
    fn test_multiline_footnote_body() {
        assert_eq!(
            convert("a[^n]\n\n[^n]: first\n\n    second"),
            "\na[#fn-N]_\n\n\n.. [#fn-N] first\n\n   second\n"
        );
    }

    #[test]
    fn test_footnote_key_with_spaces() {
        assert_eq!(
            convert("a[^my note]\n\n[^My  Note]: x"),
            "\na[#fn-MY-NOTE]_\n\n\n.. [#fn-MY-NOTE] x\n"
        );
    }

    #[test]
    fn test_undefined_footnote_stays_literal() {
        assert_eq!(convert("a[^missing] b"), "\na[^missing] b\n");
    }

    #[test]
    fn test_sphinx_ref() {
        let src = "This is a sphinx [ref]_ global ref.\n\n.. [ref] ref text";
        assert_eq!(convert(src), format!("\n{src}"));
    }

    #[test]
    fn test_comment_oneline() {
        assert_eq!(convert(".. a"), "\n.. a");
    }

    #[test]
    fn test_comment_newline() {
        assert_eq!(
            convert("..\n\n   comment\n\nnewline"),
            "\n..\n\n   comment\n\nnewline\n"
        );
    }

    #[test]
    fn test_comment_multiline() {
        let comment = ".. this is comment.\n   this is also comment.\n\n\n    comment may include empty line.\n\n\n";
        assert_eq!(
            convert(&format!("{comment}`eoc`")),
            format!("\n{comment}``eoc``\n")
        );
    }

    #[test]
    fn test_rest_code_block_empty() {
        assert_eq!(convert("\n\n::\n\n"), "\n\n");
    }

    #[test]
    fn test_eol_marker() {
        assert_eq!(
            convert("a::\n\n    code\n"),
            "\na:\n\n.. code-block::\n\n   code\n"
        );
    }

    #[test]
    fn test_eol_marker_remove() {
        assert_eq!(
            convert("a ::\n\n    code\n"),
            "\na\n\n.. code-block::\n\n   code\n"
        );
    }

    #[test]
    fn test_anonymous_references() {
        let options = ConvertOptions::default().with_anonymous_references(true);
        assert_eq!(
            convert_with("[a](http://x.org) [b](#c)", &options),
            "\n`a <http://x.org>`__ :ref:`b <c>`\n"
        );
    }

    #[test]
    fn test_parse_relative_links() {
        let options = ConvertOptions::default().with_parse_relative_links(true);
        assert_eq!(
            convert_with(
                "[guide](guide/intro.md#setup) [home](#top) [ext](https://x.org)",
                &options,
            ),
            "\n:doc:`guide <guide/intro>` :ref:`home <top>` `ext <https://x.org>`_\n"
        );
        assert_eq!(
            convert("[guide](guide/intro.md)"),
            "\n`guide <guide/intro.md>`_\n"
        );
    }

    #[test]
    fn test_no_underscore_emphasis() {
        let options = ConvertOptions::default().with_no_underscore_emphasis(true);
        assert_eq!(convert_with("_a_ *b*", &options), "\n_a_ *b*\n");
    }

    #[test]
    fn test_raw_html_flag_resets_between_renders() {
        let options = ConvertOptions::default();
        let mut renderer = RstRenderer::new(&options);
        let with_html = crate::parse("<b>x</b>", &options);
        let plain = crate::parse("x", &options);
        assert!(renderer.render(&with_html).starts_with(PROLOG));
        assert_eq!(renderer.render(&plain), "\nx\n");
    }

    #[test]
    fn test_conversion_is_deterministic() {
        let src = "# T\n\n* a ~~b~~\n\n| x |\n|---|\n| 1 |\n\nc[^1]\n\n[^1]: d";
        assert_eq!(convert(src), convert(src));
    }
}
