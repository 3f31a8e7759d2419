//! File inclusion for documentation hosts.
//!
//! Reads a Markdown file, optionally restricted to a line range, converts it
//! and returns the reST output as lines ready to be spliced into the host
//! document.

use std::path::{Path, PathBuf};

use crate::error::ConvertError;
use crate::options::ConvertOptions;

/// Markdown file (or slice of one) to include.
///
/// Line bounds are 0-based; `start_line` is inclusive and `end_line`
/// exclusive. Bounds past the end of the file are clamped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncludeRequest {
    path: PathBuf,
    start_line: Option<usize>,
    end_line: Option<usize>,
}

impl IncludeRequest {
    /// Include the whole file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            start_line: None,
            end_line: None,
        }
    }

    /// Skip lines before `line`.
    #[must_use]
    pub fn with_start_line(mut self, line: usize) -> Self {
        self.start_line = Some(line);
        self
    }

    /// Stop before `line`.
    #[must_use]
    pub fn with_end_line(mut self, line: usize) -> Self {
        self.end_line = Some(line);
        self
    }

    /// Path of the included file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read, slice and convert the file.
    ///
    /// Image paths in the output are resolved relative to the included file.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::InvalidLineRange`] if `start_line` is after
    /// `end_line`, or [`ConvertError::Io`] if the file cannot be read as UTF-8.
    pub fn include_lines(&self, options: &ConvertOptions) -> Result<Vec<String>, ConvertError> {
        if let (Some(start), Some(end)) = (self.start_line, self.end_line)
            && start > end
        {
            return Err(ConvertError::InvalidLineRange { start, end });
        }

        let content = std::fs::read_to_string(&self.path).map_err(|source| ConvertError::Io {
            path: self.path.clone(),
            source,
        })?;

        let lines: Vec<&str> = content.split_inclusive('\n').collect();
        let end = self.end_line.unwrap_or(lines.len()).min(lines.len());
        let start = self.start_line.unwrap_or(0).min(end);
        let text = lines[start..end].concat();

        tracing::debug!(
            path = %self.path.display(),
            start,
            end,
            "Including Markdown file"
        );

        let options = options.clone().with_source_path(&self.path);
        let rst = crate::convert_with(&text, &options);
        Ok(rst.lines().map(str::to_owned).collect())
    }
}
