use super::*;
use crate::config::Defaults;
use crate::config::ResolverConfig;
use crate::definition::ChannelType;
use crate::definition::ExampleArgs;
use crate::merge::merge_contribution;
use crate::testing::Ctx;
use crate::testing::TestCommand;
use crate::testing::TestModule;
use crate::testing::call_log;
use crate::testing::calls;
use crate::testing::cmd;
use crate::testing::contribution;
use crate::testing::module;
use async_trait::async_trait;
use cmdtree_error::ErrorExt;
use cmdtree_error::PlainError;
use cmdtree_error::StatusCode;
use pretty_assertions::assert_eq;

/// Formats examples as `key=value` pairs, prefixed by the locale.
struct LocaleParser;

impl ArgParser for LocaleParser {
    fn format_example(&self, locale: &str, example: &ExampleArgs) -> String {
        let flags: Vec<String> = example
            .flags
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        format!("[{locale}] {}", flags.join(" "))
    }
}

struct DenyAll;

#[async_trait]
impl Throttler<Ctx> for DenyAll {
    async fn check(&self, ctx: &Ctx) -> Result<(), BoxedError> {
        let message = format!("slow down in {}", ctx.guild);
        Err(PlainError::new(message, StatusCode::Throttled).into())
    }
}

fn tree_with(
    defaults: Defaults<Ctx>,
    sources: Vec<(&str, Vec<TestCommand>, Vec<TestModule>)>,
) -> ResolvedTree<Ctx> {
    let mut tree = ResolvedTree::new(defaults);
    for (name, commands, modules) in sources {
        merge_contribution(
            &mut tree.forest,
            &mut tree.used_names,
            name,
            &contribution(commands, modules),
        );
    }
    tree
}

fn default_tree(sources: Vec<(&str, Vec<TestCommand>, Vec<TestModule>)>) -> ResolvedTree<Ctx> {
    tree_with(Defaults::from_config(&ResolverConfig::default()), sources)
}

fn command<'t>(tree: &'t ResolvedTree<Ctx>, id: &str) -> ResolvedCommand<'t, Ctx> {
    let key = tree.forest.command_by_id(id).expect("command");
    ResolvedCommand::new(tree, key)
}

fn module_view<'t>(tree: &'t ResolvedTree<Ctx>, id: &str) -> ResolvedModule<'t, Ctx> {
    let key = tree.forest.module_by_id(id).expect("module");
    ResolvedModule::new(tree, key)
}

#[test]
fn test_command_identity_accessors() {
    let tree = default_tree(vec![(
        "builtin",
        vec![],
        vec![module("mod").module(module("role").command(cmd("add").alias("a").alias("plus")))],
    )]);

    let add = command(&tree, ".mod.role.add");
    assert_eq!(add.id(), ".mod.role.add");
    assert_eq!(add.name(), "add");
    assert_eq!(add.aliases(), ["a".to_string(), "plus".to_string()]);
    assert_eq!(add.invoke_path(), "mod role add");
    assert_eq!(add.source_name(), "builtin");
    assert_eq!(add.source().name(), "add");

    let chain: Vec<&str> = add.source_parents().iter().map(|m| m.name()).collect();
    assert_eq!(chain, vec!["mod", "role"]);

    let parent = add.parent().expect("parent");
    assert_eq!(parent.id(), ".mod.role");
    assert_eq!(parent.invoke_path(), "mod role");
    assert_eq!(parent.parent().expect("grandparent").id(), ".mod");
    assert!(parent.parent().expect("grandparent").parent().is_none());
}

#[test]
fn test_top_level_command_has_no_parent() {
    let tree = default_tree(vec![("builtin", vec![cmd("ping")], vec![])]);
    let ping = command(&tree, ".ping");
    assert!(ping.parent().is_none());
    assert_eq!(ping.invoke_path(), "ping");
    assert!(ping.source_parents().is_empty());
}

#[test]
fn test_command_descriptions() {
    let tree = default_tree(vec![(
        "builtin",
        vec![
            cmd("both").describe("short", "long"),
            cmd("short_only").describe("short", ""),
            cmd("bare"),
        ],
        vec![],
    )]);

    assert_eq!(command(&tree, ".both").long_description(), "long");
    assert_eq!(command(&tree, ".both").short_description(), "short");
    assert_eq!(command(&tree, ".short_only").long_description(), "short");
    assert_eq!(command(&tree, ".bare").long_description(), "");
}

#[test]
fn test_command_hidden_flag_is_its_own() {
    let tree = default_tree(vec![(
        "builtin",
        vec![],
        vec![module("mod").command(cmd("shown")).command(cmd("secret").hidden())],
    )]);
    assert!(command(&tree, ".mod.secret").is_hidden());
    assert!(!command(&tree, ".mod.shown").is_hidden());
    assert!(!module_view(&tree, ".mod").is_hidden());
}

#[test]
fn test_channel_types_and_permissions_fall_back() {
    let config = ResolverConfig {
        channel_types: ChannelType::GuildText.into(),
        bot_permissions: Permissions::from_bits(0b10),
        ..Default::default()
    };
    let tree = tree_with(
        Defaults::from_config(&config),
        vec![(
            "builtin",
            vec![
                cmd("plain"),
                cmd("dm")
                    .channel_types(ChannelType::DirectMessage.into())
                    .bot_permissions(Permissions::from_bits(0b100)),
            ],
            vec![],
        )],
    );

    let plain = command(&tree, ".plain");
    assert_eq!(plain.channel_types(), ChannelTypes::from(ChannelType::GuildText));
    assert_eq!(plain.bot_permissions(), Permissions::from_bits(0b10));

    let dm = command(&tree, ".dm");
    assert_eq!(dm.channel_types(), ChannelTypes::from(ChannelType::DirectMessage));
    assert_eq!(dm.bot_permissions(), Permissions::from_bits(0b100));
}

#[test]
fn test_examples_use_resolved_arg_parser() {
    let tree = default_tree(vec![(
        "builtin",
        vec![],
        vec![
            module("mod")
                .command(
                    cmd("ban")
                        .example(ExampleArgs::new().arg("alice").flag("reason", "spam bot"))
                        .example(ExampleArgs::new()),
                )
                .command(
                    cmd("warn")
                        .arg_parser(Arc::new(LocaleParser))
                        .example(ExampleArgs::new().flag("user", "bob")),
                ),
        ],
    )]);

    assert_eq!(
        command(&tree, ".mod.ban").examples("en"),
        vec![
            "mod ban alice -reason 'spam bot'".to_string(),
            "mod ban".to_string()
        ]
    );
    assert_eq!(
        command(&tree, ".mod.warn").examples("de"),
        vec!["mod warn [de] user=bob".to_string()]
    );
}

#[test]
fn test_default_arg_parser_is_shared() {
    let defaults: Defaults<Ctx> = Defaults {
        arg_parser: Arc::new(LocaleParser),
        ..Defaults::from_config(&ResolverConfig::default())
    };
    let tree = tree_with(
        defaults,
        vec![("builtin", vec![cmd("ping").example(ExampleArgs::new())], vec![])],
    );
    let ping = command(&tree, ".ping");
    assert!(Arc::ptr_eq(&ping.arg_parser(), &tree.defaults.arg_parser));
    assert_eq!(ping.examples("fr"), vec!["ping [fr] ".to_string()]);
}

#[tokio::test]
async fn test_throttler_fallback() {
    let tree = default_tree(vec![("builtin", vec![cmd("ping")], vec![])]);
    assert!(command(&tree, ".ping").throttler().is_none());

    let deny: Arc<dyn Throttler<Ctx>> = Arc::new(DenyAll);
    let defaults = Defaults {
        throttler: Some(Arc::clone(&deny)),
        ..Defaults::from_config(&ResolverConfig::default())
    };
    let tree = tree_with(
        defaults,
        vec![(
            "builtin",
            vec![cmd("ping"), cmd("own").throttler(Arc::new(DenyAll))],
            vec![],
        )],
    );

    let ping = command(&tree, ".ping");
    let throttler = ping.throttler().expect("default throttler");
    assert!(Arc::ptr_eq(&throttler, &deny));
    let err = throttler
        .check(&Ctx::new("guild-1"))
        .await
        .expect_err("throttled");
    assert_eq!(err.status_code(), StatusCode::Throttled);
    assert!(err.to_string().contains("guild-1"));

    let own = command(&tree, ".own").throttler().expect("own throttler");
    assert!(!Arc::ptr_eq(&own, &deny));
}

#[tokio::test]
async fn test_invoke_forwards_to_raw_command() {
    let log = call_log();
    let tree = default_tree(vec![(
        "builtin",
        vec![],
        vec![module("mod").command(cmd("ban").record_into(&log))],
    )]);

    let ban = command(&tree, ".mod.ban");
    ban.invoke(&Ctx::new("g"), "@alice spam").await.expect("invoke");
    assert_eq!(calls(&log), vec![("ban".to_string(), "@alice spam".to_string())]);

    let err = ban.invoke(&Ctx::new("g"), "fail").await.expect_err("fails");
    assert_eq!(err.status_code(), StatusCode::CommandFailed);
    assert_eq!(err.to_string(), "ban failed in g");
}

#[test]
fn test_module_descriptions_first_non_empty() {
    let tree = default_tree(vec![
        ("a", vec![], vec![module("mod").command(cmd("x"))]),
        ("b", vec![], vec![module("mod").describe("", "long from b")]),
        ("c", vec![], vec![module("mod").describe("short from c", "long from c")]),
        ("d", vec![], vec![module("mod").describe("short from d", "")]),
    ]);

    let node = module_view(&tree, ".mod");
    assert_eq!(node.short_description(), "short from c");
    assert_eq!(node.long_description(), "long from b");
    let sources: Vec<&str> = node.sources().iter().map(ModuleSource::source_name).collect();
    assert_eq!(sources, vec!["a", "b", "c", "d"]);

    let bare = default_tree(vec![("a", vec![], vec![module("mod").command(cmd("x"))])]);
    assert_eq!(module_view(&bare, ".mod").short_description(), "");
    assert_eq!(module_view(&bare, ".mod").long_description(), "");
}

#[test]
fn test_module_children_and_lookups() {
    let tree = default_tree(vec![(
        "builtin",
        vec![],
        vec![
            module("mod")
                .command(cmd("warn"))
                .command(cmd("ban").alias("b"))
                .module(module("role"))
                .module(module("channel")),
        ],
    )]);

    let node = module_view(&tree, ".mod");
    let commands: Vec<&str> = node.commands().iter().map(|c| c.name()).collect();
    assert_eq!(commands, vec!["ban", "warn"]);
    let modules: Vec<&str> = node.modules().iter().map(|m| m.name()).collect();
    assert_eq!(modules, vec!["channel", "role"]);

    assert_eq!(node.find_command("ban"), Some(command(&tree, ".mod.ban")));
    assert_eq!(node.find_command("b"), Some(command(&tree, ".mod.ban")));
    assert!(node.find_command("role").is_none());
    assert_eq!(node.find_module("role"), Some(module_view(&tree, ".mod.role")));
    assert!(node.find_module("ban").is_none());
    assert_eq!(node.commands()[0].parent(), Some(node));
}

#[test]
fn test_views_compare_by_identity() {
    let first = default_tree(vec![("builtin", vec![cmd("ping"), cmd("pong")], vec![])]);
    let second = first.clone();

    let ping = command(&first, ".ping");
    let copied = ping;
    assert_eq!(ping, copied);
    assert_eq!(ping, command(&first, ".ping"));
    assert_ne!(ping, command(&first, ".pong"));
    assert_ne!(ping, command(&second, ".ping"));

    let debug = format!("{ping:?}");
    assert!(debug.contains(".ping"));
    assert!(debug.contains("builtin"));
}
