//! Configuration management for mdinclude.
//!
//! Parses `mdinclude.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`]. The loaded
//! [`Config`] turns into renderer options with [`Config::convert_options`].
//!
//! ```toml
//! [markdown]
//! no_underscore_emphasis = false
//! parse_relative_links = false
//! anonymous_references = false
//! disable_inline_math = false
//! plugins = ["strikethrough", "footnotes", "table"]
//! ```

use std::path::{Path, PathBuf};

use mdinclude_renderer::{ConvertError, ConvertOptions, Plugin, PluginSet};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override underscore emphasis flag.
    pub no_underscore_emphasis: Option<bool>,
    /// Override relative link handling.
    pub parse_relative_links: Option<bool>,
    /// Override anonymous reference flag.
    pub anonymous_references: Option<bool>,
    /// Override inline math flag.
    pub disable_inline_math: Option<bool>,
    /// Override the plugin list.
    pub plugins: Option<Vec<String>>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdinclude.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Markdown conversion configuration.
    pub markdown: MarkdownConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Markdown conversion configuration.
// Mirrors the independent converter switches one-to-one.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Disable `_text_` emphasis.
    pub no_underscore_emphasis: bool,
    /// Render scheme-less links as `:doc:` references.
    pub parse_relative_links: bool,
    /// Render external links as anonymous references.
    pub anonymous_references: bool,
    /// Disable `` `$math$` `` recognition.
    pub disable_inline_math: bool,
    /// Enabled plugin names, in installation order.
    pub plugins: Vec<String>,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            no_underscore_emphasis: false,
            parse_relative_links: false,
            anonymous_references: false,
            disable_inline_math: false,
            plugins: Plugin::ALL.iter().map(|p| p.name().to_owned()).collect(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Renderer rejected the configuration.
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdinclude.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values. The result is validated last.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// a plugin name is unknown.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        if let Err(e) = config.validate() {
            tracing::warn!(error = %e, "Invalid configuration");
            return Err(e);
        }
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        let markdown = &mut self.markdown;
        if let Some(enabled) = settings.no_underscore_emphasis {
            markdown.no_underscore_emphasis = enabled;
        }
        if let Some(enabled) = settings.parse_relative_links {
            markdown.parse_relative_links = enabled;
        }
        if let Some(enabled) = settings.anonymous_references {
            markdown.anonymous_references = enabled;
        }
        if let Some(disabled) = settings.disable_inline_math {
            markdown.disable_inline_math = disabled;
        }
        if let Some(plugins) = &settings.plugins {
            markdown.plugins.clone_from(plugins);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        Self::discover_from(&cwd)
    }

    /// Search for config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "Found configuration file");
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a plugin name is not registered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for name in &self.markdown.plugins {
            if name.parse::<Plugin>().is_err() {
                let known: Vec<_> = Plugin::ALL.iter().map(|p| p.name()).collect();
                return Err(ConfigError::Validation(format!(
                    "markdown.plugins: unknown plugin '{name}' (expected one of: {})",
                    known.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Build renderer options from the markdown section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Convert` if a plugin name cannot be resolved.
    pub fn convert_options(&self) -> Result<ConvertOptions, ConfigError> {
        let markdown = &self.markdown;
        let plugins = PluginSet::from_names(&markdown.plugins)?;
        Ok(ConvertOptions::new()
            .with_no_underscore_emphasis(markdown.no_underscore_emphasis)
            .with_parse_relative_links(markdown.parse_relative_links)
            .with_anonymous_references(markdown.anonymous_references)
            .with_disable_inline_math(markdown.disable_inline_math)
            .with_plugins(plugins))
    }
}
