//! Resolver configuration.
//!
//! The config is plain data loadable from TOML:
//!
//! ```toml
//! builtin_source_name = "builtin"
//! channel_types = ["guild_text", "direct_message"]
//! bot_permissions = 3072
//! ```
//!
//! Every field is optional. [`Defaults`] combine these values with the
//! default argument parser and throttler, which are code rather than data.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use snafu::ResultExt;
use tracing::debug;

use crate::definition::ArgParser;
use crate::definition::ChannelTypes;
use crate::definition::Permissions;
use crate::definition::ShellArgParser;
use crate::definition::Throttler;
use crate::error::Result;
use crate::error::plugin_error::ConfigParseSnafu;
use crate::error::plugin_error::InvalidConfigSnafu;
use crate::error::plugin_error::IoSnafu;
use crate::source::DEFAULT_BUILTIN_SOURCE_NAME;

/// Data-only settings of a [`Resolver`](crate::Resolver).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Source name recorded on built-in commands and modules.
    pub builtin_source_name: String,

    /// Channel types for commands that do not declare any.
    pub channel_types: ChannelTypes,

    /// Bot permissions for commands that do not declare any.
    pub bot_permissions: Permissions,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            builtin_source_name: DEFAULT_BUILTIN_SOURCE_NAME.to_string(),
            channel_types: ChannelTypes::all(),
            bot_permissions: Permissions::NONE,
        }
    }
}

impl ResolverConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::parse(content, "<inline>")
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).context(IoSnafu {
            path: path.to_path_buf(),
        })?;
        debug!(path = %path.display(), "Loaded resolver config");
        Self::parse(&content, &path.display().to_string())
    }

    fn parse(content: &str, file: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context(ConfigParseSnafu { file })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let name = &self.builtin_source_name;
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return InvalidConfigSnafu {
                message: format!(
                    "builtin_source_name must be non-empty and contain no whitespace, got {name:?}"
                ),
            }
            .fail();
        }
        if self.channel_types.is_empty() {
            return InvalidConfigSnafu {
                message: "channel_types must name at least one channel type",
            }
            .fail();
        }
        Ok(())
    }
}

/// Values resolved commands fall back to when their raw definition leaves
/// them unset.
pub(crate) struct Defaults<C> {
    pub(crate) channel_types: ChannelTypes,
    pub(crate) bot_permissions: Permissions,
    pub(crate) arg_parser: Arc<dyn ArgParser>,
    pub(crate) throttler: Option<Arc<dyn Throttler<C>>>,
}

impl<C> Defaults<C> {
    pub(crate) fn from_config(config: &ResolverConfig) -> Self {
        Self {
            channel_types: config.channel_types,
            bot_permissions: config.bot_permissions,
            arg_parser: Arc::new(ShellArgParser),
            throttler: None,
        }
    }
}

impl<C> Clone for Defaults<C> {
    fn clone(&self) -> Self {
        Self {
            channel_types: self.channel_types,
            bot_permissions: self.bot_permissions,
            arg_parser: Arc::clone(&self.arg_parser),
            throttler: self.throttler.clone(),
        }
    }
}

#[cfg(test)]
#[path = "config.test.rs"]
mod tests;
