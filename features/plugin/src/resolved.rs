//! Read-only views of resolved commands and modules.
//!
//! Views are cheap `Copy` handles into the tree owned by a
//! [`Provider`](crate::Provider) and live as long as the borrow of it. Two
//! views are equal when they point at the same node of the same tree.

use std::fmt;
use std::sync::Arc;

use cmdtree_error::BoxedError;

use crate::definition::ArgParser;
use crate::definition::ChannelTypes;
use crate::definition::Command;
use crate::definition::Module;
use crate::definition::Permissions;
use crate::definition::Throttler;
use crate::tree::CommandKey;
use crate::tree::CommandNode;
use crate::tree::ModuleKey;
use crate::tree::ModuleNode;
use crate::tree::ModuleSource;
use crate::tree::ResolvedTree;

/// Turns a dot-path id (`.mod.sub.cmd`) into its invoke string (`mod sub cmd`).
fn invoke_path(id: &str) -> String {
    id.strip_prefix('.').unwrap_or(id).replace('.', " ")
}

/// A command as it resolved for one provider.
pub struct ResolvedCommand<'p, C> {
    tree: &'p ResolvedTree<C>,
    key: CommandKey,
}

impl<'p, C> ResolvedCommand<'p, C> {
    pub(crate) fn new(tree: &'p ResolvedTree<C>, key: CommandKey) -> Self {
        Self { tree, key }
    }

    fn node(&self) -> &'p CommandNode<C> {
        self.tree.forest.command(self.key)
    }

    /// Unique dot-path id, e.g. `.mod.ban`.
    pub fn id(&self) -> &'p str {
        &self.node().id
    }

    pub fn name(&self) -> &'p str {
        &self.node().name
    }

    /// Aliases that survived deduplication, in declaration order.
    pub fn aliases(&self) -> &'p [String] {
        &self.node().aliases
    }

    /// The full name a user types, e.g. `mod ban`.
    pub fn invoke_path(&self) -> String {
        invoke_path(self.id())
    }

    pub fn parent(&self) -> Option<ResolvedModule<'p, C>> {
        self.node()
            .parent
            .map(|key| ResolvedModule::new(self.tree, key))
    }

    /// Name of the source that contributed this command.
    pub fn source_name(&self) -> &'p str {
        &self.node().source_name
    }

    /// The raw command definition.
    pub fn source(&self) -> &'p Arc<dyn Command<C>> {
        &self.node().source
    }

    /// Raw modules enclosing the command within its own source, outermost
    /// first.
    pub fn source_parents(&self) -> &'p [Arc<dyn Module<C>>] {
        &self.node().source_parents
    }

    pub fn short_description(&self) -> &'p str {
        self.source().short_description()
    }

    /// The long description, or the short one if no long one is set.
    pub fn long_description(&self) -> &'p str {
        let source = self.source();
        match source.long_description() {
            "" => source.short_description(),
            long => long,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.source().is_hidden()
    }

    pub fn channel_types(&self) -> ChannelTypes {
        let own = self.source().channel_types();
        if own.is_empty() {
            self.tree.defaults.channel_types
        } else {
            own
        }
    }

    pub fn bot_permissions(&self) -> Permissions {
        let own = self.source().bot_permissions();
        if own.is_empty() {
            self.tree.defaults.bot_permissions
        } else {
            own
        }
    }

    pub fn arg_parser(&self) -> Arc<dyn ArgParser> {
        self.source()
            .arg_parser()
            .unwrap_or_else(|| Arc::clone(&self.tree.defaults.arg_parser))
    }

    pub fn throttler(&self) -> Option<Arc<dyn Throttler<C>>> {
        self.source()
            .throttler()
            .or_else(|| self.tree.defaults.throttler.clone())
    }

    /// Example invocations: the invoke path followed by each example's
    /// arguments as formatted by [`arg_parser`](Self::arg_parser).
    pub fn examples(&self, locale: &str) -> Vec<String> {
        let invoke = self.invoke_path();
        let parser = self.arg_parser();
        self.source()
            .example_args()
            .iter()
            .map(|example| {
                let args = parser.format_example(locale, example);
                if args.is_empty() {
                    invoke.clone()
                } else {
                    format!("{invoke} {args}")
                }
            })
            .collect()
    }

    /// Runs the raw command.
    pub async fn invoke(&self, ctx: &C, args: &str) -> Result<(), BoxedError> {
        self.source().invoke(ctx, args).await
    }
}

impl<C> Clone for ResolvedCommand<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for ResolvedCommand<'_, C> {}

impl<C> PartialEq for ResolvedCommand<'_, C> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.key == other.key
    }
}

impl<C> Eq for ResolvedCommand<'_, C> {}

impl<C> fmt::Debug for ResolvedCommand<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCommand")
            .field("id", &self.id())
            .field("aliases", &self.aliases())
            .field("source_name", &self.source_name())
            .finish()
    }
}

/// A module as it resolved for one provider, possibly merged from several
/// sources.
pub struct ResolvedModule<'p, C> {
    tree: &'p ResolvedTree<C>,
    key: ModuleKey,
}

impl<'p, C> ResolvedModule<'p, C> {
    pub(crate) fn new(tree: &'p ResolvedTree<C>, key: ModuleKey) -> Self {
        Self { tree, key }
    }

    fn node(&self) -> &'p ModuleNode<C> {
        self.tree.forest.module(self.key)
    }

    pub fn id(&self) -> &'p str {
        &self.node().id
    }

    pub fn name(&self) -> &'p str {
        &self.node().name
    }

    pub fn invoke_path(&self) -> String {
        invoke_path(self.id())
    }

    pub fn parent(&self) -> Option<ResolvedModule<'p, C>> {
        self.node()
            .parent
            .map(|key| ResolvedModule::new(self.tree, key))
    }

    /// Per-source definitions of this module, in source registration order.
    pub fn sources(&self) -> &'p [ModuleSource<C>] {
        &self.node().sources
    }

    /// A module is hidden unless some descendant command is visible.
    pub fn is_hidden(&self) -> bool {
        self.node().hidden
    }

    /// First non-empty short description across the contributing sources.
    pub fn short_description(&self) -> &'p str {
        self.sources()
            .iter()
            .map(|source| source.module().short_description())
            .find(|description| !description.is_empty())
            .unwrap_or_default()
    }

    /// First non-empty long description across the contributing sources.
    pub fn long_description(&self) -> &'p str {
        self.sources()
            .iter()
            .map(|source| source.module().long_description())
            .find(|description| !description.is_empty())
            .unwrap_or_default()
    }

    /// Direct child commands, sorted by name.
    pub fn commands(&self) -> Vec<ResolvedCommand<'p, C>> {
        self.node()
            .commands
            .iter()
            .map(|key| ResolvedCommand::new(self.tree, *key))
            .collect()
    }

    /// Direct submodules, sorted by name.
    pub fn modules(&self) -> Vec<ResolvedModule<'p, C>> {
        self.node()
            .modules
            .iter()
            .map(|key| ResolvedModule::new(self.tree, *key))
            .collect()
    }

    /// Finds a direct child command by name, then by alias.
    pub fn find_command(&self, name: &str) -> Option<ResolvedCommand<'p, C>> {
        let forest = &self.tree.forest;
        let parent = Some(self.key);
        forest
            .child_command(parent, name)
            .or_else(|| forest.child_command_by_alias(parent, name))
            .map(|key| ResolvedCommand::new(self.tree, key))
    }

    /// Finds a direct submodule by name.
    pub fn find_module(&self, name: &str) -> Option<ResolvedModule<'p, C>> {
        self.tree
            .forest
            .child_module(Some(self.key), name)
            .map(|key| ResolvedModule::new(self.tree, key))
    }
}

impl<C> Clone for ResolvedModule<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for ResolvedModule<'_, C> {}

impl<C> PartialEq for ResolvedModule<'_, C> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.key == other.key
    }
}

impl<C> Eq for ResolvedModule<'_, C> {}

impl<C> fmt::Debug for ResolvedModule<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedModule")
            .field("id", &self.id())
            .field("hidden", &self.is_hidden())
            .field(
                "sources",
                &self
                    .sources()
                    .iter()
                    .map(ModuleSource::source_name)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
#[path = "resolved.test.rs"]
mod tests;
