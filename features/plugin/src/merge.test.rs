use super::*;
use crate::testing::Ctx;
use crate::testing::TestCommand;
use crate::testing::TestModule;
use crate::testing::cmd;
use crate::testing::contribution;
use crate::testing::module;
use pretty_assertions::assert_eq;

struct Fixture {
    forest: Forest<Ctx>,
    used: UsedNames,
}

impl Fixture {
    fn new() -> Self {
        Self {
            forest: Forest::new(),
            used: UsedNames::new(),
        }
    }

    fn merge(&mut self, source: &str, commands: Vec<TestCommand>, modules: Vec<TestModule>) {
        let contribution = contribution(commands, modules);
        merge_contribution(&mut self.forest, &mut self.used, source, &contribution);
    }

    fn module(&self, path: &[&str]) -> &ModuleNode<Ctx> {
        let mut key = None;
        for name in path {
            key = Some(self.forest.child_module(key, name).expect("module"));
        }
        self.forest.module(key.expect("non-empty path"))
    }

    fn command(&self, path: &[&str]) -> &CommandNode<Ctx> {
        let (name, modules) = path.split_last().expect("non-empty path");
        let mut parent = None;
        for module in modules {
            parent = Some(self.forest.child_module(parent, module).expect("module"));
        }
        let key = self.forest.child_command(parent, name).expect("command");
        self.forest.command(key)
    }

    fn command_names(&self, parent: Option<ModuleKey>) -> Vec<String> {
        self.forest
            .child_commands(parent)
            .iter()
            .map(|key| self.forest.command(*key).name.clone())
            .collect()
    }
}

#[test]
fn test_assigns_ids_and_parents() {
    let mut fx = Fixture::new();
    fx.merge(
        "builtin",
        vec![cmd("ping")],
        vec![module("mod").module(module("role").command(cmd("add")))],
    );

    assert_eq!(fx.command(&["ping"]).id, ".ping");
    assert!(fx.command(&["ping"]).parent.is_none());

    let role = fx.module(&["mod", "role"]);
    assert_eq!(role.id, ".mod.role");
    let add = fx.command(&["mod", "role", "add"]);
    assert_eq!(add.id, ".mod.role.add");
    assert_eq!(fx.forest.module(add.parent.expect("parent")).id, ".mod.role");
}

#[test]
fn test_first_source_wins_for_commands() {
    let mut fx = Fixture::new();
    fx.merge("a", vec![cmd("ping").describe("from a", "")], vec![]);
    fx.merge("b", vec![cmd("ping").describe("from b", "")], vec![]);

    let ping = fx.command(&["ping"]);
    assert_eq!(ping.source_name, "a");
    assert_eq!(ping.source.short_description(), "from a");
    assert_eq!(fx.forest.command_count(), 1);
}

#[test]
fn test_module_dropped_when_command_owns_name() {
    let mut fx = Fixture::new();
    fx.merge("a", vec![cmd("tag")], vec![]);
    fx.merge(
        "b",
        vec![],
        vec![module("tag").command(cmd("create")).command(cmd("delete"))],
    );

    assert!(fx.forest.child_module(None, "tag").is_none());
    assert_eq!(fx.forest.command_count(), 1);
    assert_eq!(fx.forest.module_count(), 0);
}

#[test]
fn test_command_dropped_when_module_owns_name() {
    let mut fx = Fixture::new();
    fx.merge("a", vec![], vec![module("tag").command(cmd("create"))]);
    fx.merge("b", vec![cmd("tag")], vec![]);

    assert!(fx.forest.child_command(None, "tag").is_none());
    assert_eq!(fx.command(&["tag", "create"]).source_name, "a");
}

#[test]
fn test_same_named_modules_merge() {
    let mut fx = Fixture::new();
    fx.merge(
        "builtin",
        vec![],
        vec![module("mod").command(cmd("cmd1").alias("c1")).command(cmd("cmd2"))],
    );
    fx.merge("ext", vec![], vec![module("mod").command(cmd("cmd3"))]);

    let node = fx.module(&["mod"]);
    let sources: Vec<&str> = node.sources.iter().map(ModuleSource::source_name).collect();
    assert_eq!(sources, vec!["builtin", "ext"]);
    assert_eq!(fx.command_names(Some(node_key(&fx, "mod"))), vec!["cmd1", "cmd2", "cmd3"]);
    assert_eq!(fx.command(&["mod", "cmd3"]).source_name, "ext");
    assert_eq!(fx.forest.module_count(), 1);
}

fn node_key(fx: &Fixture, name: &str) -> ModuleKey {
    fx.forest.child_module(None, name).expect("module")
}

#[test]
fn test_merged_module_children_keep_first_wins() {
    let mut fx = Fixture::new();
    fx.merge("a", vec![], vec![module("mod").command(cmd("ban"))]);
    fx.merge(
        "b",
        vec![],
        vec![module("mod").command(cmd("ban")).command(cmd("kick"))],
    );

    assert_eq!(fx.command(&["mod", "ban"]).source_name, "a");
    assert_eq!(fx.command(&["mod", "kick"]).source_name, "b");
}

#[test]
fn test_alias_partial_drop() {
    let mut fx = Fixture::new();
    fx.merge("a", vec![], vec![module("mod").command(cmd("a").alias("x"))]);
    fx.merge(
        "b",
        vec![],
        vec![module("mod").command(cmd("y").alias("x").alias("why"))],
    );

    assert_eq!(fx.command(&["mod", "a"]).aliases, vec!["x"]);
    assert_eq!(fx.command(&["mod", "y"]).aliases, vec!["why"]);
}

#[test]
fn test_alias_cannot_shadow_names() {
    let mut fx = Fixture::new();
    fx.merge(
        "builtin",
        vec![cmd("ping"), cmd("help").alias("ping").alias("mod").alias("h")],
        vec![module("mod").command(cmd("ban"))],
    );

    // Commands merge before modules, so `mod` was still free for the alias.
    assert_eq!(fx.command(&["help"]).aliases, vec!["mod", "h"]);
    assert!(fx.forest.child_module(None, "mod").is_none());
}

#[test]
fn test_alias_taken_by_later_name_is_kept() {
    let mut fx = Fixture::new();
    fx.merge("a", vec![cmd("help").alias("h")], vec![]);
    fx.merge("b", vec![cmd("h")], vec![]);

    assert_eq!(fx.command(&["help"]).aliases, vec!["h"]);
    assert!(fx.forest.child_command(None, "h").is_none());
}

#[test]
fn test_hidden_propagation() {
    let mut fx = Fixture::new();
    fx.merge(
        "builtin",
        vec![],
        vec![
            module("secret").command(cmd("a").hidden()).command(cmd("b").hidden()),
            module("empty"),
            module("outer").module(module("inner").module(module("leaf").command(cmd("go")))),
            module("mixed").command(cmd("shown")).command(cmd("quiet").hidden()),
        ],
    );

    assert!(fx.module(&["secret"]).hidden);
    assert!(fx.module(&["empty"]).hidden);
    assert!(!fx.module(&["outer"]).hidden);
    assert!(!fx.module(&["outer", "inner"]).hidden);
    assert!(!fx.module(&["outer", "inner", "leaf"]).hidden);
    assert!(!fx.module(&["mixed"]).hidden);
}

#[test]
fn test_later_source_can_reveal_module() {
    let mut fx = Fixture::new();
    fx.merge(
        "a",
        vec![],
        vec![module("mod").module(module("sub").command(cmd("x").hidden()))],
    );
    assert!(fx.module(&["mod"]).hidden);
    assert!(fx.module(&["mod", "sub"]).hidden);

    fx.merge(
        "b",
        vec![],
        vec![module("mod").module(module("sub").command(cmd("y")))],
    );
    assert!(!fx.module(&["mod"]).hidden);
    assert!(!fx.module(&["mod", "sub"]).hidden);
}

#[test]
fn test_hidden_module_with_only_dropped_children_stays_hidden() {
    let mut fx = Fixture::new();
    fx.merge("a", vec![], vec![module("mod").command(cmd("ban").hidden())]);
    fx.merge("b", vec![], vec![module("mod").command(cmd("ban"))]);

    // b's visible `ban` lost to a's hidden one.
    assert!(fx.module(&["mod"]).hidden);
}

#[test]
fn test_source_parents_chain() {
    let mut fx = Fixture::new();
    fx.merge(
        "builtin",
        vec![cmd("ping")],
        vec![module("mod").module(module("role").command(cmd("add")))],
    );
    fx.merge(
        "ext",
        vec![],
        vec![module("mod").module(module("role").command(cmd("remove")))],
    );

    assert!(fx.command(&["ping"]).source_parents.is_empty());

    let add = fx.command(&["mod", "role", "add"]);
    let chain: Vec<&str> = add.source_parents.iter().map(|m| m.name()).collect();
    assert_eq!(chain, vec!["mod", "role"]);

    let role = fx.module(&["mod", "role"]);
    assert_eq!(role.sources.len(), 2);
    assert_eq!(role.sources[1].source_name(), "ext");
    let parents: Vec<&str> = role.sources[1].parents().iter().map(|m| m.name()).collect();
    assert_eq!(parents, vec!["mod"]);
    assert!(Arc::ptr_eq(
        &fx.command(&["mod", "role", "remove"]).source_parents[1],
        role.sources[1].module()
    ));
}

#[test]
fn test_malformed_names_dropped() {
    let mut fx = Fixture::new();
    fx.merge(
        "builtin",
        vec![
            cmd(""),
            cmd("two words"),
            cmd("dot.ted"),
            cmd("ok").alias("").alias("a b").alias("fine"),
        ],
        vec![module("bad mod").command(cmd("x"))],
    );

    assert_eq!(fx.command_names(None), vec!["ok"]);
    assert_eq!(fx.command(&["ok"]).aliases, vec!["fine"]);
    assert_eq!(fx.forest.module_count(), 0);
}

#[test]
fn test_merge_reports_whether_kept() {
    let mut forest = Forest::new();
    let mut used = UsedNames::new();
    let ping = cmd("ping").arc();
    assert!(merge_command(&mut forest, &mut used, "builtin", &ping));
    assert!(!merge_command(&mut forest, &mut used, "builtin", &ping));

    let first = module("mod").command(cmd("a")).arc();
    let second = module("mod").command(cmd("b")).arc();
    assert!(merge_module(&mut forest, &mut used, "builtin", &first));
    assert!(merge_module(&mut forest, &mut used, "builtin", &second));
    assert!(!merge_module(&mut forest, &mut used, "builtin", &module("ping").arc()));
}
