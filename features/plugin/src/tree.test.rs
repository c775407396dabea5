use super::*;
use crate::testing::Ctx;
use crate::testing::cmd;
use crate::testing::module;
use pretty_assertions::assert_eq;

fn command_node(name: &str, parent: Option<ModuleKey>) -> CommandNode<Ctx> {
    CommandNode {
        id: format!(".{name}"),
        name: name.to_string(),
        aliases: Vec::new(),
        parent,
        source_name: "builtin".to_string(),
        source: cmd(name).arc(),
        source_parents: Vec::new(),
    }
}

fn module_node(name: &str, parent: Option<ModuleKey>) -> ModuleNode<Ctx> {
    ModuleNode {
        id: format!(".{name}"),
        name: name.to_string(),
        parent,
        hidden: true,
        sources: vec![ModuleSource::new("builtin", &module(name).arc(), &[])],
        commands: Vec::new(),
        modules: Vec::new(),
    }
}

fn names(forest: &Forest<Ctx>, keys: &[CommandKey]) -> Vec<String> {
    keys.iter()
        .map(|key| forest.command(*key).name.clone())
        .collect()
}

#[test]
fn test_routable_names() {
    assert!(is_routable_name("ban"));
    assert!(is_routable_name("über"));
    assert!(!is_routable_name(""));
    assert!(!is_routable_name("two words"));
    assert!(!is_routable_name("tab\there"));
    assert!(!is_routable_name("a.b"));
}

#[test]
fn test_used_names_first_reservation_wins() {
    let mut used = UsedNames::new();
    assert!(used.reserve("mod"));
    assert!(used.reserve("mod ban"));
    assert!(!used.reserve("mod"));
    assert_eq!(used.len(), 2);
}

#[test]
fn test_children_stay_sorted() {
    let mut forest = Forest::new();
    for name in ["kick", "ban", "warn", "mute"] {
        forest.insert_command(command_node(name, None)).expect("insert");
    }
    assert_eq!(
        names(&forest, forest.child_commands(None)),
        vec!["ban", "kick", "mute", "warn"]
    );
    assert_eq!(forest.command_count(), 4);

    let key = forest.child_command(None, "mute").expect("mute");
    assert_eq!(forest.command(key).name, "mute");
    assert!(forest.child_command(None, "unban").is_none());
}

#[test]
fn test_insert_rejects_duplicate_name_at_same_parent() {
    let mut forest = Forest::new();
    let parent = forest.insert_module(module_node("mod", None)).expect("module");
    assert!(forest.insert_module(module_node("mod", None)).is_none());
    assert_eq!(forest.module_count(), 1);

    forest
        .insert_command(command_node("ban", Some(parent)))
        .expect("ban under mod");
    assert!(forest.insert_command(command_node("ban", Some(parent))).is_none());
    // Same name at a different parent is a different node.
    forest.insert_command(command_node("ban", None)).expect("top-level ban");
    assert_eq!(forest.command_count(), 2);
}

#[test]
fn test_alias_lookup_scans_one_level() {
    let mut forest = Forest::new();
    let parent = forest.insert_module(module_node("mod", None)).expect("module");
    let mut ban = command_node("ban", Some(parent));
    ban.aliases = vec!["b".to_string(), "hammer".to_string()];
    let ban = forest.insert_command(ban).expect("ban");

    assert_eq!(forest.child_command_by_alias(Some(parent), "hammer"), Some(ban));
    assert!(forest.child_command_by_alias(None, "hammer").is_none());
    assert!(forest.child_command_by_alias(Some(parent), "ban").is_none());
}

#[test]
fn test_walk_commands_depth_first() {
    let mut forest = Forest::new();
    let zeta = forest.insert_module(module_node("zeta", None)).expect("zeta");
    let alpha = forest.insert_module(module_node("alpha", None)).expect("alpha");
    let inner = forest
        .insert_module(module_node("inner", Some(alpha)))
        .expect("inner");
    forest.insert_command(command_node("z1", Some(zeta))).expect("z1");
    forest.insert_command(command_node("i1", Some(inner))).expect("i1");
    forest.insert_command(command_node("a2", Some(alpha))).expect("a2");
    forest.insert_command(command_node("a1", Some(alpha))).expect("a1");
    forest.insert_command(command_node("top", None)).expect("top");

    assert_eq!(
        names(&forest, &forest.walk_commands()),
        vec!["top", "a1", "a2", "i1", "z1"]
    );
}

#[test]
fn test_clone_is_independent() {
    let mut original = ResolvedTree::new(Defaults::from_config(
        &crate::config::ResolverConfig::default(),
    ));
    original
        .forest
        .insert_command(command_node("ping", None))
        .expect("ping");
    original.used_names.reserve("ping");

    let mut copy = original.clone();
    copy.forest
        .insert_command(command_node("pong", None))
        .expect("pong");
    copy.used_names.reserve("pong");

    assert_eq!(original.forest.command_count(), 1);
    assert_eq!(original.used_names.len(), 1);
    assert_eq!(copy.forest.command_count(), 2);
    assert_eq!(copy.used_names.len(), 2);
    assert!(Arc::ptr_eq(&original.defaults, &copy.defaults));

    let original_ping = original.forest.child_command(None, "ping").expect("ping");
    let copied_ping = copy.forest.child_command(None, "ping").expect("ping");
    assert!(Arc::ptr_eq(
        &original.forest.command(original_ping).source,
        &copy.forest.command(copied_ping).source
    ));
}
