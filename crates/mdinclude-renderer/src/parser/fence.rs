//! Code fence detection.
//!
//! Fences use backticks or tildes (three or more). The closing fence must use
//! the same character and be at least as long as the opening fence.

use crate::util::leading_spaces;

/// Opening code fence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Fence {
    /// Character used for the fence (backtick or tilde).
    marker: char,
    /// Length of the opening fence (minimum length for closing).
    len: usize,
    /// Indentation of the opening fence, removed from content lines.
    pub(crate) indent: usize,
    /// Info string after the fence, trimmed.
    pub(crate) info: String,
}

impl Fence {
    /// Detect if a line opens a code fence.
    pub(crate) fn open(line: &str) -> Option<Self> {
        let indent = leading_spaces(line);
        if indent > 3 {
            return None;
        }
        let trimmed = &line[indent..];
        let marker = trimmed.chars().next()?;
        if marker != '`' && marker != '~' {
            return None;
        }

        let len = trimmed.chars().take_while(|&c| c == marker).count();
        if len < 3 {
            return None;
        }

        let info = trimmed[len..].trim();
        // Backtick fences cannot carry backticks in the info string
        if marker == '`' && info.contains('`') {
            return None;
        }

        Some(Self {
            marker,
            len,
            indent,
            info: info.to_owned(),
        })
    }

    /// Check if a line is a valid closing fence for this opening.
    ///
    /// The closing fence must:
    /// - Use the same character as opening
    /// - Be at least as long as opening
    /// - Contain only fence characters (optionally followed by whitespace)
    pub(crate) fn is_closed_by(&self, line: &str) -> bool {
        let indent = leading_spaces(line);
        if indent > 3 {
            return false;
        }
        let trimmed = &line[indent..];
        if !trimmed.starts_with(self.marker) {
            return false;
        }

        let count = trimmed.chars().take_while(|&c| c == self.marker).count();
        if count < self.len {
            return false;
        }

        // After fence chars, only whitespace is allowed
        trimmed[count..].chars().all(char::is_whitespace)
    }
}
