//! Arena storage for a resolved tree.
//!
//! Nodes live in two flat vectors owned by one provider. Parents and
//! children refer to each other by index, so copying a tree for a new
//! provider is a plain clone: the copy's back-references point into the copy.
//! Child lists are kept sorted by name and searched with binary search.

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::Defaults;
use crate::definition::Command;
use crate::definition::Module;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CommandKey(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ModuleKey(usize);

/// Returns true if `name` can be typed as a single invoke token and used as
/// one segment of a dot-path id.
pub(crate) fn is_routable_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('.') && !name.chars().any(char::is_whitespace)
}

/// Every invoke string reserved so far in one tree.
///
/// Names and aliases share this set, which is what keeps them unique per
/// parent path.
#[derive(Debug, Clone, Default)]
pub(crate) struct UsedNames {
    reserved: HashSet<String>,
}

impl UsedNames {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reserves `invoke`. Returns `false` if it was already taken.
    pub(crate) fn reserve(&mut self, invoke: &str) -> bool {
        if self.reserved.contains(invoke) {
            return false;
        }
        self.reserved.insert(invoke.to_string())
    }

    pub(crate) fn len(&self) -> usize {
        self.reserved.len()
    }
}

pub(crate) struct CommandNode<C> {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) parent: Option<ModuleKey>,
    pub(crate) source_name: String,
    pub(crate) source: Arc<dyn Command<C>>,
    pub(crate) source_parents: Vec<Arc<dyn Module<C>>>,
}

impl<C> Clone for CommandNode<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            aliases: self.aliases.clone(),
            parent: self.parent,
            source_name: self.source_name.clone(),
            source: Arc::clone(&self.source),
            source_parents: self.source_parents.clone(),
        }
    }
}

/// One source's definition of a resolved module.
pub struct ModuleSource<C> {
    source_name: String,
    module: Arc<dyn Module<C>>,
    parents: Vec<Arc<dyn Module<C>>>,
}

impl<C> ModuleSource<C> {
    pub(crate) fn new(
        source_name: &str,
        module: &Arc<dyn Module<C>>,
        parents: &[Arc<dyn Module<C>>],
    ) -> Self {
        Self {
            source_name: source_name.to_string(),
            module: Arc::clone(module),
            parents: parents.to_vec(),
        }
    }

    /// Name of the source that contributed this definition.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// The raw module as the source defined it.
    pub fn module(&self) -> &Arc<dyn Module<C>> {
        &self.module
    }

    /// Raw ancestors of [`module`](Self::module) within the same source,
    /// outermost first.
    pub fn parents(&self) -> &[Arc<dyn Module<C>>] {
        &self.parents
    }
}

impl<C> Clone for ModuleSource<C> {
    fn clone(&self) -> Self {
        Self {
            source_name: self.source_name.clone(),
            module: Arc::clone(&self.module),
            parents: self.parents.clone(),
        }
    }
}

pub(crate) struct ModuleNode<C> {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) parent: Option<ModuleKey>,
    pub(crate) hidden: bool,
    pub(crate) sources: Vec<ModuleSource<C>>,
    pub(crate) commands: Vec<CommandKey>,
    pub(crate) modules: Vec<ModuleKey>,
}

impl<C> Clone for ModuleNode<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            parent: self.parent,
            hidden: self.hidden,
            sources: self.sources.clone(),
            commands: self.commands.clone(),
            modules: self.modules.clone(),
        }
    }
}

/// Node arena plus the sorted top-level child lists.
pub(crate) struct Forest<C> {
    commands: Vec<CommandNode<C>>,
    modules: Vec<ModuleNode<C>>,
    root_commands: Vec<CommandKey>,
    root_modules: Vec<ModuleKey>,
}

impl<C> Forest<C> {
    pub(crate) fn new() -> Self {
        Self {
            commands: Vec::new(),
            modules: Vec::new(),
            root_commands: Vec::new(),
            root_modules: Vec::new(),
        }
    }

    pub(crate) fn command(&self, key: CommandKey) -> &CommandNode<C> {
        &self.commands[key.0]
    }

    pub(crate) fn module(&self, key: ModuleKey) -> &ModuleNode<C> {
        &self.modules[key.0]
    }

    pub(crate) fn module_mut(&mut self, key: ModuleKey) -> &mut ModuleNode<C> {
        &mut self.modules[key.0]
    }

    pub(crate) fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub(crate) fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Name-sorted commands directly under `parent` (`None` is the root).
    pub(crate) fn child_commands(&self, parent: Option<ModuleKey>) -> &[CommandKey] {
        match parent {
            Some(key) => &self.module(key).commands,
            None => &self.root_commands,
        }
    }

    /// Name-sorted submodules directly under `parent` (`None` is the root).
    pub(crate) fn child_modules(&self, parent: Option<ModuleKey>) -> &[ModuleKey] {
        match parent {
            Some(key) => &self.module(key).modules,
            None => &self.root_modules,
        }
    }

    fn search_commands(&self, parent: Option<ModuleKey>, name: &str) -> Result<usize, usize> {
        self.child_commands(parent)
            .binary_search_by(|key| self.command(*key).name.as_str().cmp(name))
    }

    fn search_modules(&self, parent: Option<ModuleKey>, name: &str) -> Result<usize, usize> {
        self.child_modules(parent)
            .binary_search_by(|key| self.module(*key).name.as_str().cmp(name))
    }

    pub(crate) fn child_command(&self, parent: Option<ModuleKey>, name: &str) -> Option<CommandKey> {
        let index = self.search_commands(parent, name).ok()?;
        Some(self.child_commands(parent)[index])
    }

    /// Linear scan of the alias lists of the commands under `parent`.
    pub(crate) fn child_command_by_alias(
        &self,
        parent: Option<ModuleKey>,
        alias: &str,
    ) -> Option<CommandKey> {
        self.child_commands(parent)
            .iter()
            .copied()
            .find(|key| self.command(*key).aliases.iter().any(|a| a == alias))
    }

    pub(crate) fn child_module(&self, parent: Option<ModuleKey>, name: &str) -> Option<ModuleKey> {
        let index = self.search_modules(parent, name).ok()?;
        Some(self.child_modules(parent)[index])
    }

    /// Adds `node` in name order under its parent.
    ///
    /// Returns `None` if a command with that name already sits there.
    pub(crate) fn insert_command(&mut self, node: CommandNode<C>) -> Option<CommandKey> {
        let parent = node.parent;
        let index = self.search_commands(parent, &node.name).err()?;
        let key = CommandKey(self.commands.len());
        self.commands.push(node);
        match parent {
            Some(parent) => self.module_mut(parent).commands.insert(index, key),
            None => self.root_commands.insert(index, key),
        }
        Some(key)
    }

    /// Adds `node` in name order under its parent.
    ///
    /// Returns `None` if a module with that name already sits there.
    pub(crate) fn insert_module(&mut self, node: ModuleNode<C>) -> Option<ModuleKey> {
        let parent = node.parent;
        let index = self.search_modules(parent, &node.name).err()?;
        let key = ModuleKey(self.modules.len());
        self.modules.push(node);
        match parent {
            Some(parent) => self.module_mut(parent).modules.insert(index, key),
            None => self.root_modules.insert(index, key),
        }
        Some(key)
    }

    /// Every command key in depth-first order: the commands of a level come
    /// before its submodules, and siblings are visited in name order.
    pub(crate) fn walk_commands(&self) -> Vec<CommandKey> {
        let mut keys = Vec::with_capacity(self.commands.len());
        self.collect_commands(None, &mut keys);
        keys
    }

    fn collect_commands(&self, parent: Option<ModuleKey>, keys: &mut Vec<CommandKey>) {
        keys.extend_from_slice(self.child_commands(parent));
        for module in self.child_modules(parent) {
            self.collect_commands(Some(*module), keys);
        }
    }
}

impl<C> Clone for Forest<C> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            modules: self.modules.clone(),
            root_commands: self.root_commands.clone(),
            root_modules: self.root_modules.clone(),
        }
    }
}

/// A complete resolved tree: nodes, the names reserved while building it,
/// and the defaults its commands fall back to.
pub(crate) struct ResolvedTree<C> {
    pub(crate) forest: Forest<C>,
    pub(crate) used_names: UsedNames,
    pub(crate) defaults: Arc<Defaults<C>>,
}

impl<C> ResolvedTree<C> {
    pub(crate) fn new(defaults: Defaults<C>) -> Self {
        Self {
            forest: Forest::new(),
            used_names: UsedNames::new(),
            defaults: Arc::new(defaults),
        }
    }
}

impl<C> Clone for ResolvedTree<C> {
    fn clone(&self) -> Self {
        Self {
            forest: self.forest.clone(),
            used_names: self.used_names.clone(),
            defaults: Arc::clone(&self.defaults),
        }
    }
}

#[cfg(test)]
#[path = "tree.test.rs"]
mod tests;
