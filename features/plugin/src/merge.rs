//! Folding source contributions into a resolved tree.
//!
//! Every command and module is keyed by its invoke string, the
//! space-joined path of names from the root. The first contribution to
//! reserve an invoke string owns it; later ones at the same path are
//! dropped. Modules are the exception: a module whose name already exists
//! as a module at the same parent is merged into it instead, and its
//! children are folded into the existing node one by one.
//!
//! The set of reserved names is passed explicitly so the same code builds
//! the resolver's prototype and each provider's copy.

use std::sync::Arc;

use tracing::debug;

use crate::definition::Command;
use crate::definition::Module;
use crate::source::SourceContribution;
use crate::tree::CommandNode;
use crate::tree::Forest;
use crate::tree::ModuleKey;
use crate::tree::ModuleNode;
use crate::tree::ModuleSource;
use crate::tree::UsedNames;
use crate::tree::is_routable_name;

/// Where a contribution is being inserted.
struct Position {
    key: Option<ModuleKey>,
    id: String,
    invoke: String,
}

impl Position {
    fn root() -> Self {
        Self {
            key: None,
            id: String::new(),
            invoke: String::new(),
        }
    }

    fn child_id(&self, name: &str) -> String {
        format!("{}.{name}", self.id)
    }

    fn child_invoke(&self, name: &str) -> String {
        if self.invoke.is_empty() {
            name.to_string()
        } else {
            format!("{} {name}", self.invoke)
        }
    }
}

/// Folds one source's contribution in at the root: commands first, then
/// modules, each in the order the source listed them.
pub(crate) fn merge_contribution<C>(
    forest: &mut Forest<C>,
    used: &mut UsedNames,
    source_name: &str,
    contribution: &SourceContribution<C>,
) {
    for command in &contribution.commands {
        merge_command(forest, used, source_name, command);
    }
    for module in &contribution.modules {
        merge_module(forest, used, source_name, module);
    }
}

/// Folds a single top-level command. Returns false if it was dropped.
pub(crate) fn merge_command<C>(
    forest: &mut Forest<C>,
    used: &mut UsedNames,
    source_name: &str,
    command: &Arc<dyn Command<C>>,
) -> bool {
    insert_command(forest, used, &Position::root(), source_name, command, &[]).is_some()
}

/// Folds a single top-level module. Returns false if it was dropped.
pub(crate) fn merge_module<C>(
    forest: &mut Forest<C>,
    used: &mut UsedNames,
    source_name: &str,
    module: &Arc<dyn Module<C>>,
) -> bool {
    insert_module(forest, used, &Position::root(), source_name, module, &[]).is_some()
}

/// Returns `Some(visible)` if the command was inserted.
fn insert_command<C>(
    forest: &mut Forest<C>,
    used: &mut UsedNames,
    parent: &Position,
    source_name: &str,
    command: &Arc<dyn Command<C>>,
    source_parents: &[Arc<dyn Module<C>>],
) -> Option<bool> {
    let name = command.name();
    if !is_routable_name(name) {
        debug!(
            name = name,
            parent = %parent.id,
            source = source_name,
            "Dropping command with malformed name"
        );
        return None;
    }

    let invoke = parent.child_invoke(name);
    if !used.reserve(&invoke) {
        debug!(invoke = %invoke, source = source_name, "Dropping command: name already in use");
        return None;
    }

    let mut aliases = Vec::with_capacity(command.aliases().len());
    for alias in command.aliases() {
        if !is_routable_name(alias) {
            debug!(alias = %alias, invoke = %invoke, "Dropping malformed alias");
            continue;
        }
        let alias_invoke = parent.child_invoke(alias);
        if used.reserve(&alias_invoke) {
            aliases.push(alias.clone());
        } else {
            debug!(
                alias = %alias_invoke,
                invoke = %invoke,
                source = source_name,
                "Dropping alias: name already in use"
            );
        }
    }

    forest.insert_command(CommandNode {
        id: parent.child_id(name),
        name: name.to_string(),
        aliases,
        parent: parent.key,
        source_name: source_name.to_string(),
        source: Arc::clone(command),
        source_parents: source_parents.to_vec(),
    })?;

    Some(!command.is_hidden())
}

/// Returns `Some(visible)` if the module was inserted or merged.
fn insert_module<C>(
    forest: &mut Forest<C>,
    used: &mut UsedNames,
    parent: &Position,
    source_name: &str,
    module: &Arc<dyn Module<C>>,
    source_parents: &[Arc<dyn Module<C>>],
) -> Option<bool> {
    let name = module.name();
    if !is_routable_name(name) {
        debug!(
            name = name,
            parent = %parent.id,
            source = source_name,
            "Dropping module with malformed name"
        );
        return None;
    }

    let invoke = parent.child_invoke(name);
    let contribution = ModuleSource::new(source_name, module, source_parents);
    let key = match forest.child_module(parent.key, name) {
        Some(existing) => {
            forest.module_mut(existing).sources.push(contribution);
            existing
        }
        None => {
            if !used.reserve(&invoke) {
                debug!(
                    invoke = %invoke,
                    source = source_name,
                    "Dropping module and its descendants: name already in use"
                );
                return None;
            }
            forest.insert_module(ModuleNode {
                id: parent.child_id(name),
                name: name.to_string(),
                parent: parent.key,
                hidden: true,
                sources: vec![contribution],
                commands: Vec::new(),
                modules: Vec::new(),
            })?
        }
    };

    let position = Position {
        key: Some(key),
        id: forest.module(key).id.clone(),
        invoke,
    };
    let mut chain = Vec::with_capacity(source_parents.len() + 1);
    chain.extend_from_slice(source_parents);
    chain.push(Arc::clone(module));

    let mut visible = false;
    for command in module.commands() {
        if insert_command(forest, used, &position, source_name, command, &chain) == Some(true) {
            visible = true;
        }
    }
    for submodule in module.modules() {
        if insert_module(forest, used, &position, source_name, submodule, &chain) == Some(true) {
            visible = true;
        }
    }

    let node = forest.module_mut(key);
    if visible {
        node.hidden = false;
    }
    Some(!node.hidden)
}

#[cfg(test)]
#[path = "merge.test.rs"]
mod tests;
