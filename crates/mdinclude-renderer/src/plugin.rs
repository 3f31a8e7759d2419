//! Registry of optional grammar extensions.
//!
//! Plugins layer extra syntax on top of the baseline grammar. They are
//! resolved by name from a fixed registry; there is no dynamic loading.

use std::fmt;
use std::str::FromStr;

use crate::error::ConvertError;

/// Optional grammar extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Plugin {
    /// `~~deleted~~` spans.
    Strikethrough,
    /// `[^key]` references and `[^key]: text` definitions.
    Footnotes,
    /// Pipe tables with a delimiter row.
    Table,
}

impl Plugin {
    /// All registered plugins, in default installation order.
    pub const ALL: [Self; 3] = [Self::Strikethrough, Self::Footnotes, Self::Table];

    /// Registry name of the plugin.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Strikethrough => "strikethrough",
            Self::Footnotes => "footnotes",
            Self::Table => "table",
        }
    }
}

impl fmt::Display for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Plugin {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|plugin| plugin.name() == s)
            .ok_or_else(|| ConvertError::UnknownPlugin(s.to_owned()))
    }
}

/// Ordered set of enabled plugins.
///
/// Defaults to every registered plugin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginSet {
    plugins: Vec<Plugin>,
}

impl PluginSet {
    /// Empty set: baseline grammar only.
    #[must_use]
    pub fn none() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Resolve plugin names against the registry.
    ///
    /// Duplicates are ignored; the first occurrence keeps its position.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::UnknownPlugin`] for the first unrecognized name.
    pub fn from_names<I, S>(names: I) -> Result<Self, ConvertError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::none();
        for name in names {
            set = set.with(name.as_ref().parse()?);
        }
        tracing::debug!(plugins = %set, "Resolved plugin set");
        Ok(set)
    }

    /// Add a plugin to the end of the set.
    #[must_use]
    pub fn with(mut self, plugin: Plugin) -> Self {
        if !self.plugins.contains(&plugin) {
            self.plugins.push(plugin);
        }
        self
    }

    /// Check whether a plugin is enabled.
    #[must_use]
    pub fn contains(&self, plugin: Plugin) -> bool {
        self.plugins.contains(&plugin)
    }

    /// Iterate over enabled plugins in order.
    pub fn iter(&self) -> impl Iterator<Item = Plugin> + '_ {
        self.plugins.iter().copied()
    }
}

impl Default for PluginSet {
    fn default() -> Self {
        Self {
            plugins: Plugin::ALL.to_vec(),
        }
    }
}

impl fmt::Display for PluginSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, plugin) in self.plugins.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(plugin.name())?;
        }
        Ok(())
    }
}
