//! Plugin sources.
//!
//! A source is a named origin of raw definitions. Built-in definitions are
//! registered directly on the [`Resolver`](crate::Resolver); every other
//! source answers a [`PluginSource::query`] for each inbound event.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use cmdtree_error::BoxedError;

use crate::definition::Command;
use crate::definition::Module;

/// Source name recorded on built-in definitions unless configured otherwise.
pub const DEFAULT_BUILTIN_SOURCE_NAME: &str = "builtin";

/// The definitions one source contributes for one event.
pub struct SourceContribution<C> {
    pub commands: Vec<Arc<dyn Command<C>>>,
    pub modules: Vec<Arc<dyn Module<C>>>,
}

impl<C> SourceContribution<C> {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            modules: Vec::new(),
        }
    }

    pub fn with_command(mut self, command: Arc<dyn Command<C>>) -> Self {
        self.commands.push(command);
        self
    }

    pub fn with_module(mut self, module: Arc<dyn Module<C>>) -> Self {
        self.modules.push(module);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.modules.is_empty()
    }
}

impl<C> Default for SourceContribution<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for SourceContribution<C> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            modules: self.modules.clone(),
        }
    }
}

/// A dynamic origin of plugin definitions.
///
/// Queries may perform I/O. Honoring cancellation or deadlines is up to the
/// implementation; any error it returns marks the source unavailable for
/// the current event only.
#[async_trait]
pub trait PluginSource<C>: Send + Sync {
    async fn query(&self, ctx: &C) -> Result<SourceContribution<C>, BoxedError>;
}

/// A source that always answers with the same contribution.
pub struct StaticSource<C> {
    contribution: SourceContribution<C>,
}

impl<C> StaticSource<C> {
    pub fn new(contribution: SourceContribution<C>) -> Self {
        Self { contribution }
    }
}

#[async_trait]
impl<C: Sync> PluginSource<C> for StaticSource<C> {
    async fn query(&self, _ctx: &C) -> Result<SourceContribution<C>, BoxedError> {
        Ok(self.contribution.clone())
    }
}

/// A custom source together with the name it was registered under.
pub(crate) struct RegisteredSource<C> {
    pub(crate) name: String,
    pub(crate) source: Arc<dyn PluginSource<C>>,
}

impl<C> Clone for RegisteredSource<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            source: Arc::clone(&self.source),
        }
    }
}

/// A source whose query failed while resolving a provider.
#[derive(Clone)]
pub struct UnavailableSource {
    pub name: String,
    pub error: Arc<BoxedError>,
}

impl UnavailableSource {
    pub fn new(name: impl Into<String>, error: BoxedError) -> Self {
        Self {
            name: name.into(),
            error: Arc::new(error),
        }
    }
}

impl fmt::Debug for UnavailableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnavailableSource")
            .field("name", &self.name)
            .field("error", &self.error.to_string())
            .finish()
    }
}

#[cfg(test)]
#[path = "source.test.rs"]
mod tests;
