use super::*;
use crate::definition::ExampleArgs;
use crate::error::PluginError;
use crate::source::DEFAULT_BUILTIN_SOURCE_NAME;
use crate::source::StaticSource;
use crate::testing::CountingSource;
use crate::testing::Ctx;
use crate::testing::cmd;
use crate::testing::contribution;
use crate::testing::module;
use async_trait::async_trait;
use cmdtree_error::BoxedError;
use cmdtree_error::ErrorExt;
use cmdtree_error::StatusCode;
use pretty_assertions::assert_eq;

struct Upper;

impl ArgParser for Upper {
    fn format_example(&self, _locale: &str, example: &ExampleArgs) -> String {
        example.args.join(" ").to_uppercase()
    }
}

struct AllowAll;

#[async_trait]
impl Throttler<Ctx> for AllowAll {
    async fn check(&self, _ctx: &Ctx) -> std::result::Result<(), BoxedError> {
        Ok(())
    }
}

fn static_source(name: &str) -> Arc<dyn PluginSource<Ctx>> {
    Arc::new(StaticSource::new(contribution(vec![cmd(name)], vec![])))
}

#[test]
fn test_builtin_commands_first_registration_wins() {
    let mut resolver: Resolver<Ctx> = Resolver::new();
    assert!(resolver.register_builtin_command(cmd("ping").describe("first", "").arc()));
    assert!(!resolver.register_builtin_command(cmd("ping").describe("second", "").arc()));
    assert!(resolver.register_builtin_command(cmd("help").alias("h").arc()));
    assert!(!resolver.register_builtin_command(cmd("h").arc()));

    let names: Vec<&str> = resolver
        .builtin_commands()
        .iter()
        .map(|command| command.name())
        .collect();
    assert_eq!(names, vec!["ping", "help"]);
    assert_eq!(resolver.builtin_commands()[0].short_description(), "first");
}

#[test]
fn test_builtin_modules_merge() {
    let mut resolver: Resolver<Ctx> = Resolver::new();
    assert!(resolver.register_builtin_module(module("mod").command(cmd("ban")).arc()));
    assert!(resolver.register_builtin_module(module("mod").command(cmd("kick")).arc()));
    assert!(resolver.register_builtin_command(cmd("ping").arc()));
    assert!(!resolver.register_builtin_module(module("ping").command(cmd("x")).arc()));
    assert_eq!(resolver.builtin_modules().len(), 2);
}

#[tokio::test]
async fn test_builtins_resolved_once_into_prototype() {
    let mut resolver: Resolver<Ctx> = Resolver::new();
    resolver.register_builtin_module(module("mod").command(cmd("ban")).arc());

    let prototype = &resolver.prototype;
    assert_eq!(prototype.forest.command_count(), 1);
    assert_eq!(prototype.forest.module_count(), 1);

    let provider = resolver.new_provider(Ctx::default());
    let node = provider.module(".mod").await.expect("mod");
    assert_eq!(node.sources()[0].source_name(), DEFAULT_BUILTIN_SOURCE_NAME);
}

#[tokio::test]
async fn test_later_builtins_do_not_touch_existing_providers() {
    let mut resolver: Resolver<Ctx> = Resolver::new();
    resolver.register_builtin_command(cmd("ping").arc());
    let before = resolver.new_provider(Ctx::default());

    resolver.register_builtin_command(cmd("pong").arc());
    let after = resolver.new_provider(Ctx::default());

    assert_eq!(before.commands().await.len(), 1);
    assert_eq!(after.commands().await.len(), 2);
}

#[test]
fn test_register_source_rejects_builtin_name() {
    let mut resolver: Resolver<Ctx> = Resolver::new();
    let err = resolver
        .register_source("builtin", static_source("x"))
        .expect_err("reserved");
    assert!(matches!(err, PluginError::ReservedSourceName { .. }));
    assert_eq!(err.status_code(), StatusCode::ReservedSourceName);
    assert_eq!(resolver.sources().count(), 0);
}

#[tokio::test]
async fn test_register_source_replaces_in_place() {
    let mut resolver: Resolver<Ctx> = Resolver::new();
    resolver.register_source("a", static_source("from_a")).expect("a");
    resolver.register_source("b", static_source("from_b")).expect("b");
    resolver.register_source("c", static_source("from_c")).expect("c");

    let replacement = Arc::new(CountingSource::new(contribution(
        vec![cmd("from_b"), cmd("replaced")],
        vec![],
    )));
    resolver
        .register_source("b", Arc::clone(&replacement) as Arc<dyn PluginSource<Ctx>>)
        .expect("replace b");

    assert_eq!(resolver.sources().collect::<Vec<_>>(), vec!["a", "b", "c"]);

    let provider = resolver.new_provider(Ctx::default());
    assert!(provider.find_command("replaced").await.is_some());
    assert_eq!(replacement.queries(), 1);
    assert_eq!(provider.sources().await, ["builtin", "a", "b", "c"]);
}

#[tokio::test]
async fn test_custom_builtin_source_name() {
    let config = ResolverConfig::from_toml_str(r#"builtin_source_name = "core""#).expect("config");
    let mut resolver: Resolver<Ctx> = Resolver::with_config(config).expect("resolver");
    resolver.register_builtin_command(cmd("ping").arc());

    let err = resolver
        .register_source("core", static_source("x"))
        .expect_err("reserved");
    assert!(err.to_string().contains("core"));
    resolver
        .register_source("builtin", static_source("tag"))
        .expect("plain name once the built-in source is renamed");

    let provider = resolver.new_provider(Ctx::default());
    assert_eq!(provider.sources().await, ["core", "builtin"]);
    let ping = provider.command(".ping").await.expect("ping");
    assert_eq!(ping.source_name(), "core");
    let tag = provider.command(".tag").await.expect("tag");
    assert_eq!(tag.source_name(), "builtin");
}

#[test]
fn test_with_config_validates() {
    let config = ResolverConfig {
        builtin_source_name: String::new(),
        ..Default::default()
    };
    let result: Result<Resolver<Ctx>> = Resolver::with_config(config);
    let err = result.err().expect("invalid config");
    assert_eq!(err.status_code(), StatusCode::InvalidConfig);
}

#[tokio::test]
async fn test_default_arg_parser_and_throttler() {
    let throttler: Arc<dyn Throttler<Ctx>> = Arc::new(AllowAll);
    let mut resolver: Resolver<Ctx> = Resolver::new()
        .with_default_arg_parser(Arc::new(Upper))
        .with_default_throttler(Arc::clone(&throttler));
    resolver.register_builtin_command(
        cmd("say")
            .example(ExampleArgs::new().arg("hello").arg("world"))
            .arc(),
    );

    let provider = resolver.new_provider(Ctx::default());
    let say = provider.command(".say").await.expect("say");
    assert_eq!(say.examples("en"), vec!["say HELLO WORLD".to_string()]);
    let resolved = say.throttler().expect("default throttler");
    assert!(Arc::ptr_eq(&resolved, &throttler));
    resolved.check(provider.context()).await.expect("allowed");
}

#[tokio::test]
async fn test_defaults_set_after_provider_creation_stay_out_of_it() {
    let mut resolver: Resolver<Ctx> = Resolver::new();
    resolver.register_builtin_command(cmd("ping").arc());
    let before = resolver.new_provider(Ctx::default());

    let resolver = resolver.with_default_throttler(Arc::new(AllowAll));
    let after = resolver.new_provider(Ctx::default());

    let ping = before.command(".ping").await.expect("ping");
    assert!(ping.throttler().is_none());
    let ping = after.command(".ping").await.expect("ping");
    assert!(ping.throttler().is_some());
}

#[test]
fn test_default_resolver_config() {
    let resolver: Resolver<Ctx> = Resolver::default();
    assert_eq!(resolver.config(), &ResolverConfig::default());
    assert!(resolver.builtin_commands().is_empty());
    assert!(resolver.builtin_modules().is_empty());
}
