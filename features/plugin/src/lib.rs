//! Plugin command resolution.
//!
//! This crate merges commands and modules contributed by many named sources
//! into one conflict-free tree and routes typed invocations to exactly one
//! command.
//!
//! # Architecture
//!
//! - A [`Resolver`] lives for the whole process. Built-in definitions are
//!   registered on it at startup and folded into a prototype tree right away.
//!   Custom [`PluginSource`]s are registered by name.
//! - A [`Provider`] is created per inbound event. It copies the prototype,
//!   queries every custom source with the event's context on first use, and
//!   answers lookups from then on.
//! - [`ResolvedCommand`] and [`ResolvedModule`] are read-only views into a
//!   provider's tree.
//!
//! # Conflict rules
//!
//! Sources are folded in registration order, built-ins first. The first
//! contribution to claim an invoke string (`"mod ban"`) keeps it; later
//! commands, aliases or modules at the same path are dropped. Modules with
//! the same name at the same parent are merged instead, and remember every
//! source that contributed to them. A failing source is recorded as
//! unavailable and never stops the others.
//!
//! # Ids and invocations
//!
//! Ids are dot paths from the root (`.mod.ban`); invocations are the same
//! names separated by whitespace (`mod ban spammer`). Neither lookup ever
//! errors: anything that does not match is `None`.

pub mod config;
pub mod definition;
pub mod provider;
pub mod resolved;
pub mod resolver;
pub mod source;

mod error;
mod lookup;
mod merge;
mod tree;

#[cfg(test)]
mod testing;

pub use config::ResolverConfig;
pub use definition::ArgParser;
pub use definition::ChannelType;
pub use definition::ChannelTypes;
pub use definition::Command;
pub use definition::ExampleArgs;
pub use definition::Module;
pub use definition::Permissions;
pub use definition::ShellArgParser;
pub use definition::Throttler;
pub use error::PluginError;
pub use error::Result;
pub use provider::Provider;
pub use provider::ResolutionState;
pub use resolved::ResolvedCommand;
pub use resolved::ResolvedModule;
pub use resolver::Resolver;
pub use source::DEFAULT_BUILTIN_SOURCE_NAME;
pub use source::PluginSource;
pub use source::SourceContribution;
pub use source::StaticSource;
pub use source::UnavailableSource;
pub use tree::ModuleSource;
