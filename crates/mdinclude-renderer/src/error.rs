//! Error types for fallible conversion helpers.
//!
//! [`convert`](crate::convert) itself never fails. Errors only arise when
//! resolving plugin names or reading files for inclusion.

use std::path::PathBuf;

/// Error raised by plugin resolution and file inclusion.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// Plugin name not present in the registry.
    #[error("Unknown plugin: {0}")]
    UnknownPlugin(String),
    /// Included file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Path of the file that failed to load.
        path: PathBuf,
        /// Underlying I/O error (also covers invalid UTF-8).
        #[source]
        source: std::io::Error,
    },
    /// Requested line range is inverted.
    #[error("Invalid line range: start-line {start} is after end-line {end}")]
    InvalidLineRange {
        /// First line (0-based, inclusive).
        start: usize,
        /// Last line (0-based, exclusive).
        end: usize,
    },
}
