//! List body assembly.
//!
//! Rendered item text may itself contain nested lists whose lines start with
//! a bullet. Lines are therefore tagged when pushed, so only the first line of
//! each item receives this list's mark and every other line is padded to the
//! mark's width.

/// Line of a list body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListLine<'a> {
    /// First line of an item.
    Marker(&'a str),
    /// Continuation line, including nested list output.
    Content(&'a str),
}

/// Rendered items of one list.
#[derive(Debug)]
pub(crate) struct ListBody<'a> {
    lines: Vec<ListLine<'a>>,
}

impl<'a> ListBody<'a> {
    pub(crate) fn new() -> Self {
        Self {
            lines: vec![ListLine::Content("")],
        }
    }

    /// Append a rendered item.
    pub(crate) fn push_item(&mut self, text: &'a str) {
        let mut pieces = text.split('\n');
        if let Some(first) = pieces.next() {
            self.lines.push(ListLine::Marker(first));
        }
        self.lines.extend(pieces.map(ListLine::Content));
    }

    /// Join the body, prefixing items with `mark` (`"* "` or `"#. "`).
    pub(crate) fn render(mut self, mark: &str) -> String {
        if self.lines.len() > 1 && self.lines.last() == Some(&ListLine::Content("")) {
            self.lines.pop();
        }

        let padding = " ".repeat(mark.len());
        let lines: Vec<String> = self
            .lines
            .into_iter()
            .map(|line| match line {
                ListLine::Marker(text) => format!("{mark}{text}"),
                ListLine::Content("") => String::new(),
                ListLine::Content(text) => format!("{padding}{text}"),
            })
            .collect();
        format!("\n{}\n", lines.join("\n"))
    }
}
