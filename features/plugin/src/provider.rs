//! Per-event resolution sessions.
//!
//! A [`Provider`] starts from a copy of the resolver's built-in tree and, on
//! first use, queries every custom source in registration order and folds
//! the answers in. Resolution runs once; concurrent callers wait for the
//! in-flight run and every later read is served from the finished tree.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;

use strum::AsRefStr;
use tokio::sync::OnceCell;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::merge::merge_contribution;
use crate::resolved::ResolvedCommand;
use crate::resolved::ResolvedModule;
use crate::source::RegisteredSource;
use crate::source::UnavailableSource;
use crate::tree::ResolvedTree;

/// Where a provider is in its one-way resolution lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ResolutionState {
    Unresolved,
    Resolving,
    Resolved,
}

impl ResolutionState {
    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Resolving,
            2 => Self::Resolved,
            _ => Self::Unresolved,
        }
    }
}

/// The finished product of one resolution run.
struct Resolution<C> {
    tree: ResolvedTree<C>,
    sources: Vec<String>,
    unavailable: Vec<UnavailableSource>,
}

/// Puts the state back to `Unresolved` if a run is abandoned midway.
struct StateGuard<'a> {
    state: &'a AtomicU8,
    armed: bool,
}

impl<'a> StateGuard<'a> {
    fn enter(state: &'a AtomicU8) -> Self {
        state.store(ResolutionState::Resolving as u8, Ordering::Release);
        Self { state, armed: true }
    }

    fn finish(mut self) {
        self.armed = false;
        self.state
            .store(ResolutionState::Resolved as u8, Ordering::Release);
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state
                .store(ResolutionState::Unresolved as u8, Ordering::Release);
        }
    }
}

/// A resolution session bound to one inbound event's context.
///
/// Created by [`Resolver::new_provider`](crate::Resolver::new_provider).
/// Every query method resolves on first use, so calling
/// [`resolve`](Self::resolve) up front is optional.
pub struct Provider<C> {
    context: C,
    builtin_source_name: String,
    prototype: Arc<ResolvedTree<C>>,
    /// Copy of the prototype taken at creation, consumed by the first run.
    seed: Mutex<Option<ResolvedTree<C>>>,
    custom_sources: Vec<RegisteredSource<C>>,
    resolution: OnceCell<Resolution<C>>,
    state: AtomicU8,
}

impl<C> Provider<C> {
    pub(crate) fn new(
        context: C,
        builtin_source_name: String,
        prototype: Arc<ResolvedTree<C>>,
        custom_sources: Vec<RegisteredSource<C>>,
    ) -> Self {
        let seed = ResolvedTree::clone(&prototype);
        Self {
            context,
            builtin_source_name,
            prototype,
            seed: Mutex::new(Some(seed)),
            custom_sources,
            resolution: OnceCell::new(),
            state: AtomicU8::new(ResolutionState::Unresolved as u8),
        }
    }

    /// The context this provider was created for.
    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn state(&self) -> ResolutionState {
        ResolutionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Resolves the provider if that has not happened yet.
    pub async fn resolve(&self) {
        self.resolved().await;
    }

    async fn resolved(&self) -> &Resolution<C> {
        self.resolution.get_or_init(|| self.run()).await
    }

    fn take_seed(&self) -> ResolvedTree<C> {
        let seed = match self.seed.lock() {
            Ok(mut seed) => seed.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        // A previous run was dropped after consuming the seed.
        seed.unwrap_or_else(|| ResolvedTree::clone(&self.prototype))
    }

    async fn run(&self) -> Resolution<C> {
        let guard = StateGuard::enter(&self.state);
        let mut tree = self.take_seed();
        let mut sources = vec![self.builtin_source_name.clone()];
        let mut unavailable = Vec::new();

        for registered in &self.custom_sources {
            debug!(source = %registered.name, "Querying plugin source");
            match registered.source.query(&self.context).await {
                Ok(contribution) => {
                    merge_contribution(
                        &mut tree.forest,
                        &mut tree.used_names,
                        &registered.name,
                        &contribution,
                    );
                    sources.push(registered.name.clone());
                }
                Err(error) => {
                    warn!(
                        source = %registered.name,
                        error = %error,
                        "Plugin source unavailable"
                    );
                    unavailable.push(UnavailableSource::new(registered.name.clone(), error));
                }
            }
        }

        guard.finish();
        info!(
            state = self.state().as_ref(),
            sources = sources.len(),
            unavailable = unavailable.len(),
            commands = tree.forest.command_count(),
            modules = tree.forest.module_count(),
            reserved_names = tree.used_names.len(),
            "Resolved plugins"
        );
        Resolution {
            tree,
            sources,
            unavailable,
        }
    }

    /// Top-level commands, sorted by name.
    pub async fn commands(&self) -> Vec<ResolvedCommand<'_, C>> {
        let tree = &self.resolved().await.tree;
        tree.forest
            .child_commands(None)
            .iter()
            .map(|key| ResolvedCommand::new(tree, *key))
            .collect()
    }

    /// Top-level modules, sorted by name.
    pub async fn modules(&self) -> Vec<ResolvedModule<'_, C>> {
        let tree = &self.resolved().await.tree;
        tree.forest
            .child_modules(None)
            .iter()
            .map(|key| ResolvedModule::new(tree, *key))
            .collect()
    }

    /// Every command in the tree, depth first: the commands of each level
    /// before its submodules, siblings in name order.
    pub async fn all_commands(&self) -> Vec<ResolvedCommand<'_, C>> {
        let tree = &self.resolved().await.tree;
        tree.forest
            .walk_commands()
            .into_iter()
            .map(|key| ResolvedCommand::new(tree, key))
            .collect()
    }

    /// Looks up a command by id, e.g. `.mod.ban`.
    pub async fn command(&self, id: &str) -> Option<ResolvedCommand<'_, C>> {
        let tree = &self.resolved().await.tree;
        let key = tree.forest.command_by_id(id)?;
        Some(ResolvedCommand::new(tree, key))
    }

    /// Looks up a module by id, e.g. `.mod`.
    pub async fn module(&self, id: &str) -> Option<ResolvedModule<'_, C>> {
        let tree = &self.resolved().await.tree;
        let key = tree.forest.module_by_id(id)?;
        Some(ResolvedModule::new(tree, key))
    }

    /// Routes an invocation such as `mod ban` to a command. Any token left
    /// after the command makes this return `None`.
    pub async fn find_command(&self, invoke: &str) -> Option<ResolvedCommand<'_, C>> {
        let tree = &self.resolved().await.tree;
        let key = tree.forest.find_command(invoke)?;
        Some(ResolvedCommand::new(tree, key))
    }

    /// Routes an invocation that may carry arguments, returning the command
    /// and the argument part of `invoke`.
    pub async fn find_command_with_args<'i>(
        &self,
        invoke: &'i str,
    ) -> Option<(ResolvedCommand<'_, C>, &'i str)> {
        let tree = &self.resolved().await.tree;
        let (key, args) = tree.forest.find_command_with_args(invoke)?;
        Some((ResolvedCommand::new(tree, key), args))
    }

    pub async fn find_module(&self, invoke: &str) -> Option<ResolvedModule<'_, C>> {
        let tree = &self.resolved().await.tree;
        let key = tree.forest.find_module(invoke)?;
        Some(ResolvedModule::new(tree, key))
    }

    /// Names of the sources whose definitions made it into the tree: the
    /// built-in source first, then every custom source that answered, in
    /// registration order.
    pub async fn sources(&self) -> &[String] {
        &self.resolved().await.sources
    }

    /// Custom sources whose query failed for this provider.
    pub async fn unavailable_sources(&self) -> &[UnavailableSource] {
        &self.resolved().await.unavailable
    }
}

#[cfg(test)]
#[path = "provider.test.rs"]
mod tests;
