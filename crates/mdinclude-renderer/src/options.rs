//! Conversion options.

use std::path::{Path, PathBuf};

use crate::plugin::PluginSet;

/// Options controlling Markdown parsing and reST output.
///
/// All flags default to `false` and every plugin is enabled.
///
/// # Example
///
/// ```
/// use mdinclude_renderer::{ConvertOptions, convert_with};
///
/// let options = ConvertOptions::new().with_anonymous_references(true);
/// let rst = convert_with("[docs](https://example.com)", &options);
/// assert_eq!(rst, "\n`docs <https://example.com>`__\n");
/// ```
// Each flag is an independent converter switch, not a state machine.
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, Default)]
pub struct ConvertOptions {
    pub(crate) no_underscore_emphasis: bool,
    pub(crate) parse_relative_links: bool,
    pub(crate) anonymous_references: bool,
    pub(crate) disable_inline_math: bool,
    pub(crate) plugins: PluginSet,
    pub(crate) source_path: Option<PathBuf>,
}

impl ConvertOptions {
    /// Create options with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop treating `_text_` and `__text__` as emphasis.
    #[must_use]
    pub fn with_no_underscore_emphasis(mut self, enabled: bool) -> Self {
        self.no_underscore_emphasis = enabled;
        self
    }

    /// Render scheme-less link targets as `:doc:` cross-references.
    #[must_use]
    pub fn with_parse_relative_links(mut self, enabled: bool) -> Self {
        self.parse_relative_links = enabled;
        self
    }

    /// Emit anonymous hyperlink references (`` `text <url>`__ ``).
    #[must_use]
    pub fn with_anonymous_references(mut self, enabled: bool) -> Self {
        self.anonymous_references = enabled;
        self
    }

    /// Treat `` `$expr$` `` as a regular code span.
    #[must_use]
    pub fn with_disable_inline_math(mut self, disabled: bool) -> Self {
        self.disable_inline_math = disabled;
        self
    }

    /// Replace the enabled plugin set.
    #[must_use]
    pub fn with_plugins(mut self, plugins: PluginSet) -> Self {
        self.plugins = plugins;
        self
    }

    /// Set the path of the Markdown source.
    ///
    /// Relative image paths are resolved against its parent directory.
    #[must_use]
    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    /// Enabled plugins.
    #[must_use]
    pub fn plugins(&self) -> &PluginSet {
        &self.plugins
    }

    /// Path of the Markdown source, if known.
    #[must_use]
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }
}
