//! Error types for the plugin resolver.

use std::path::PathBuf;

use cmdtree_error::ErrorExt;
use cmdtree_error::Location;
use cmdtree_error::StatusCode;
use snafu::Snafu;

/// Plugin resolver errors.
///
/// Lookups never fail with an error; absence is reported as `None`. These
/// errors cover configuration and registration only.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module)]
pub enum PluginError {
    /// IO error while reading a config file.
    #[snafu(display("IO error at {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        #[snafu(source)]
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Resolver config is not valid TOML or has the wrong shape.
    #[snafu(display("Failed to parse resolver config {file}: {source}"))]
    ConfigParse {
        file: String,
        #[snafu(source)]
        source: toml::de::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Resolver config parsed but holds unusable values.
    #[snafu(display("Invalid resolver config: {message}"))]
    InvalidConfig {
        message: String,
        #[snafu(implicit)]
        location: Location,
    },

    /// A custom source was registered under the built-in source name.
    #[snafu(display("Source name is reserved for built-in definitions: {name}"))]
    ReservedSourceName {
        name: String,
        #[snafu(implicit)]
        location: Location,
    },
}

impl ErrorExt for PluginError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                StatusCode::FileNotFound
            }
            Self::Io { .. } => StatusCode::IoError,
            Self::ConfigParse { .. } => StatusCode::ConfigFileError,
            Self::InvalidConfig { .. } => StatusCode::InvalidConfig,
            Self::ReservedSourceName { .. } => StatusCode::ReservedSourceName,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Result type for plugin resolver operations.
pub type Result<T> = std::result::Result<T, PluginError>;

#[cfg(test)]
#[path = "error.test.rs"]
mod tests;
