//! Id and invoke-string lookups over a [`Forest`].
//!
//! Absence is always `None`. Malformed ids and invocations simply fail to
//! match anything.

use crate::tree::CommandKey;
use crate::tree::Forest;
use crate::tree::ModuleKey;

/// Splits off the first whitespace-delimited token.
///
/// `input` must not start with whitespace. The remainder is returned as is,
/// including its leading whitespace.
fn next_token(input: &str) -> Option<(&str, &str)> {
    if input.is_empty() {
        return None;
    }
    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    Some(input.split_at(end))
}

impl<C> Forest<C> {
    /// Walks a dot-path id such as `.mod.sub` down the module tree.
    pub(crate) fn module_by_id(&self, id: &str) -> Option<ModuleKey> {
        let path = id.strip_prefix('.')?;
        self.walk_modules(path.split('.'))
    }

    /// Resolves a command id such as `.mod.sub.cmd` or `.cmd`.
    pub(crate) fn command_by_id(&self, id: &str) -> Option<CommandKey> {
        let path = id.strip_prefix('.')?;
        let (parent, name) = match path.rsplit_once('.') {
            Some((modules, name)) => (Some(self.walk_modules(modules.split('.'))?), name),
            None => (None, path),
        };
        self.child_command(parent, name)
    }

    fn walk_modules<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Option<ModuleKey> {
        let mut current = None;
        for name in names {
            current = Some(self.child_module(current, name)?);
        }
        current
    }

    /// Routes an invocation to a command, returning it with the unconsumed
    /// remainder of the input.
    ///
    /// Leading tokens are matched against submodules for as long as they
    /// match. The next token must then name a command at that level, by name
    /// first and by alias second. The remainder is the input after the
    /// command token with only its leading whitespace removed.
    pub(crate) fn find_command_with_args<'i>(
        &self,
        invoke: &'i str,
    ) -> Option<(CommandKey, &'i str)> {
        let mut rest = invoke.trim_start();
        let mut parent = None;
        loop {
            let (token, after) = next_token(rest)?;
            if let Some(module) = self.child_module(parent, token) {
                parent = Some(module);
                rest = after.trim_start();
                continue;
            }
            let command = self
                .child_command(parent, token)
                .or_else(|| self.child_command_by_alias(parent, token))?;
            return Some((command, after.trim_start()));
        }
    }

    /// Like [`find_command_with_args`](Self::find_command_with_args), but
    /// the invocation must consist of the command path alone.
    pub(crate) fn find_command(&self, invoke: &str) -> Option<CommandKey> {
        match self.find_command_with_args(invoke)? {
            (key, "") => Some(key),
            _ => None,
        }
    }

    /// Routes an invocation made up entirely of module names.
    pub(crate) fn find_module(&self, invoke: &str) -> Option<ModuleKey> {
        self.walk_modules(invoke.split_whitespace())
    }
}

#[cfg(test)]
#[path = "lookup.test.rs"]
mod tests;
