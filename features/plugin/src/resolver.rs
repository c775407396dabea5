//! The long-lived registry of built-in definitions and custom sources.

use std::sync::Arc;

use tracing::debug;
use tracing::info;

use crate::config::Defaults;
use crate::config::ResolverConfig;
use crate::definition::ArgParser;
use crate::definition::Command;
use crate::definition::Module;
use crate::definition::Throttler;
use crate::error::Result;
use crate::error::plugin_error::ReservedSourceNameSnafu;
use crate::merge::merge_command;
use crate::merge::merge_module;
use crate::provider::Provider;
use crate::source::PluginSource;
use crate::source::RegisteredSource;
use crate::tree::ResolvedTree;

/// Registry of plugin definitions and factory for [`Provider`]s.
///
/// Built-in commands and modules are folded into a prototype tree as soon as
/// they are registered, so creating a provider only copies that tree. Custom
/// sources are queried later, once per provider.
///
/// ```ignore
/// let mut resolver = Resolver::new();
/// resolver.register_builtin_module(Arc::new(ModerationModule::new()));
/// resolver.register_source("tags", Arc::new(TagSource::new(pool)))?;
///
/// let provider = resolver.new_provider(event);
/// if let Some((command, args)) = provider.find_command_with_args(text).await {
///     command.invoke(provider.context(), args).await?;
/// }
/// ```
pub struct Resolver<C> {
    config: ResolverConfig,
    prototype: Arc<ResolvedTree<C>>,
    builtin_commands: Vec<Arc<dyn Command<C>>>,
    builtin_modules: Vec<Arc<dyn Module<C>>>,
    sources: Vec<RegisteredSource<C>>,
}

impl<C> Resolver<C> {
    /// Creates a resolver with the default configuration.
    pub fn new() -> Self {
        Self::from_valid_config(ResolverConfig::default())
    }

    /// Creates a resolver from `config` after validating it.
    pub fn with_config(config: ResolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: ResolverConfig) -> Self {
        let defaults = Defaults::from_config(&config);
        Self {
            config,
            prototype: Arc::new(ResolvedTree::new(defaults)),
            builtin_commands: Vec::new(),
            builtin_modules: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Replaces the argument parser used by commands that bring none.
    pub fn with_default_arg_parser(mut self, arg_parser: Arc<dyn ArgParser>) -> Self {
        self.defaults_mut().arg_parser = arg_parser;
        self
    }

    /// Sets the throttler used by commands that bring none.
    pub fn with_default_throttler(mut self, throttler: Arc<dyn Throttler<C>>) -> Self {
        self.defaults_mut().throttler = Some(throttler);
        self
    }

    fn defaults_mut(&mut self) -> &mut Defaults<C> {
        Arc::make_mut(&mut Arc::make_mut(&mut self.prototype).defaults)
    }

    /// Adds a built-in top-level command.
    ///
    /// Returns `false` if its name collides with an earlier built-in, in
    /// which case it is dropped.
    pub fn register_builtin_command(&mut self, command: Arc<dyn Command<C>>) -> bool {
        let tree = Arc::make_mut(&mut self.prototype);
        let kept = merge_command(
            &mut tree.forest,
            &mut tree.used_names,
            &self.config.builtin_source_name,
            &command,
        );
        if kept {
            self.builtin_commands.push(command);
        }
        kept
    }

    /// Adds a built-in top-level module.
    ///
    /// A module sharing the name of an earlier built-in module is merged
    /// into it. Returns `false` if it was dropped entirely.
    pub fn register_builtin_module(&mut self, module: Arc<dyn Module<C>>) -> bool {
        let tree = Arc::make_mut(&mut self.prototype);
        let kept = merge_module(
            &mut tree.forest,
            &mut tree.used_names,
            &self.config.builtin_source_name,
            &module,
        );
        if kept {
            self.builtin_modules.push(module);
        }
        kept
    }

    /// Registers a custom source under `name`.
    ///
    /// Registering the same name again replaces the earlier source but keeps
    /// its place in the query order. The built-in source name is reserved.
    pub fn register_source(
        &mut self,
        name: impl Into<String>,
        source: Arc<dyn PluginSource<C>>,
    ) -> Result<()> {
        let name = name.into();
        if name == self.config.builtin_source_name {
            return ReservedSourceNameSnafu { name }.fail();
        }

        match self.sources.iter_mut().find(|registered| registered.name == name) {
            Some(registered) => {
                info!(source = %name, "Replacing plugin source");
                registered.source = source;
            }
            None => {
                debug!(source = %name, position = self.sources.len(), "Registered plugin source");
                self.sources.push(RegisteredSource { name, source });
            }
        }
        Ok(())
    }

    /// Names of the registered custom sources, in query order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|registered| registered.name.as_str())
    }

    /// Built-in commands that were accepted, in registration order.
    pub fn builtin_commands(&self) -> &[Arc<dyn Command<C>>] {
        &self.builtin_commands
    }

    /// Built-in modules that were accepted, in registration order.
    pub fn builtin_modules(&self) -> &[Arc<dyn Module<C>>] {
        &self.builtin_modules
    }

    /// Creates an unresolved provider for one event. No source is queried
    /// until the provider is first used.
    pub fn new_provider(&self, context: C) -> Provider<C> {
        Provider::new(
            context,
            self.config.builtin_source_name.clone(),
            Arc::clone(&self.prototype),
            self.sources.clone(),
        )
    }
}

impl<C> Default for Resolver<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "resolver.test.rs"]
mod tests;
