use super::*;
use crate::resolver::Resolver;
use crate::source::PluginSource;
use crate::source::SourceContribution;
use crate::source::StaticSource;
use crate::testing::CountingSource;
use crate::testing::Ctx;
use crate::testing::FailingSource;
use crate::testing::GuildSource;
use crate::testing::TestCommand;
use crate::testing::TestModule;
use crate::testing::call_log;
use crate::testing::calls;
use crate::testing::cmd;
use crate::testing::contribution;
use crate::testing::module;
use crate::tree::ModuleSource;
use async_trait::async_trait;
use cmdtree_error::BoxedError;
use cmdtree_error::ErrorExt;
use cmdtree_error::StatusCode;
use pretty_assertions::assert_eq;
use std::sync::atomic::AtomicUsize;
use std::time::Duration;
use tokio::sync::Notify;

fn static_source(
    commands: Vec<TestCommand>,
    modules: Vec<TestModule>,
) -> Arc<dyn PluginSource<Ctx>> {
    Arc::new(StaticSource::new(contribution(commands, modules)))
}

fn ids(commands: &[ResolvedCommand<'_, Ctx>]) -> Vec<String> {
    commands.iter().map(|c| c.id().to_string()).collect()
}

/// Signals when its query starts, then waits to be released.
struct GatedSource {
    started: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl PluginSource<Ctx> for GatedSource {
    async fn query(&self, _ctx: &Ctx) -> Result<SourceContribution<Ctx>, BoxedError> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(contribution(vec![cmd("late")], vec![]))
    }
}

/// Never answers its first query; answers every later one.
struct HangsOnce {
    queries: AtomicUsize,
}

#[async_trait]
impl PluginSource<Ctx> for HangsOnce {
    async fn query(&self, _ctx: &Ctx) -> Result<SourceContribution<Ctx>, BoxedError> {
        if self.queries.fetch_add(1, Ordering::SeqCst) == 0 {
            std::future::pending::<()>().await;
        }
        Ok(contribution(vec![cmd("retry")], vec![]))
    }
}

#[tokio::test]
async fn test_resolution_is_lazy() {
    let counting = Arc::new(CountingSource::new(contribution(vec![cmd("ext")], vec![])));
    let mut resolver: Resolver<Ctx> = Resolver::new();
    resolver
        .register_source("ext", Arc::clone(&counting) as Arc<dyn PluginSource<Ctx>>)
        .expect("register");

    let provider = resolver.new_provider(Ctx::new("guild"));
    assert_eq!(provider.state(), ResolutionState::Unresolved);
    assert_eq!(counting.queries(), 0);
    assert_eq!(provider.context(), &Ctx::new("guild"));

    assert!(provider.find_command("ext").await.is_some());
    assert_eq!(provider.state(), ResolutionState::Resolved);

    provider.resolve().await;
    provider.commands().await;
    provider.sources().await;
    assert_eq!(counting.queries(), 1);
}

#[tokio::test]
async fn test_resolution_state_names() {
    assert_eq!(ResolutionState::Unresolved.as_ref(), "unresolved");
    assert_eq!(ResolutionState::Resolving.as_ref(), "resolving");

    let resolver: Resolver<Ctx> = Resolver::new();
    let provider = resolver.new_provider(Ctx::default());
    assert_eq!(provider.state().as_ref(), "unresolved");
    provider.resolve().await;
    assert_eq!(provider.state().as_ref(), "resolved");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_one_resolution() {
    let counting = Arc::new(
        CountingSource::new(contribution(vec![cmd("ext")], vec![]))
            .with_delay(Duration::from_millis(50)),
    );
    let mut resolver: Resolver<Ctx> = Resolver::new();
    resolver.register_builtin_command(cmd("ping").arc());
    resolver
        .register_source("ext", Arc::clone(&counting) as Arc<dyn PluginSource<Ctx>>)
        .expect("register");
    let provider = Arc::new(resolver.new_provider(Ctx::default()));

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let provider = Arc::clone(&provider);
            tokio::spawn(async move {
                let invoke = if i % 2 == 0 { "ping" } else { "ext" };
                provider
                    .find_command(invoke)
                    .await
                    .map(|command| command.id().to_string())
            })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        let id = task.await.expect("join");
        let expected = if i % 2 == 0 { ".ping" } else { ".ext" };
        assert_eq!(id.as_deref(), Some(expected));
    }
    assert_eq!(counting.queries(), 1);
    assert_eq!(provider.commands().await.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_state_while_resolving() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let mut resolver: Resolver<Ctx> = Resolver::new();
    resolver
        .register_source(
            "gated",
            Arc::new(GatedSource {
                started: Arc::clone(&started),
                release: Arc::clone(&release),
            }),
        )
        .expect("register");
    let provider = Arc::new(resolver.new_provider(Ctx::default()));

    let task = tokio::spawn({
        let provider = Arc::clone(&provider);
        async move { provider.resolve().await }
    });
    started.notified().await;
    assert_eq!(provider.state(), ResolutionState::Resolving);

    release.notify_one();
    task.await.expect("join");
    assert_eq!(provider.state(), ResolutionState::Resolved);
    assert!(provider.find_command("late").await.is_some());
}

#[tokio::test]
async fn test_abandoned_resolution_starts_over() {
    let hangs = Arc::new(HangsOnce {
        queries: AtomicUsize::new(0),
    });
    let mut resolver: Resolver<Ctx> = Resolver::new();
    resolver.register_builtin_command(cmd("ping").arc());
    resolver
        .register_source("flaky", Arc::clone(&hangs) as Arc<dyn PluginSource<Ctx>>)
        .expect("register");
    let provider = resolver.new_provider(Ctx::default());

    let timed_out = tokio::time::timeout(Duration::from_millis(20), provider.resolve()).await;
    assert!(timed_out.is_err());
    assert_eq!(provider.state(), ResolutionState::Unresolved);

    assert_eq!(ids(&provider.commands().await), vec![".ping", ".retry"]);
    assert_eq!(provider.state(), ResolutionState::Resolved);
    assert_eq!(hangs.queries.load(Ordering::SeqCst), 2);
    assert_eq!(provider.sources().await, ["builtin", "flaky"]);
}

#[tokio::test]
async fn test_failing_source_is_recorded_and_skipped() {
    let mut resolver: Resolver<Ctx> = Resolver::new();
    resolver.register_builtin_command(cmd("ping").arc());
    resolver
        .register_source("before", static_source(vec![cmd("one")], vec![]))
        .expect("register");
    resolver
        .register_source("x", Arc::new(FailingSource::new("connection refused")))
        .expect("register");
    resolver
        .register_source("after", static_source(vec![cmd("two")], vec![]))
        .expect("register");
    let provider = resolver.new_provider(Ctx::default());

    let unavailable = provider.unavailable_sources().await;
    assert_eq!(unavailable.len(), 1);
    assert_eq!(unavailable[0].name, "x");
    assert_eq!(unavailable[0].error.to_string(), "connection refused");
    assert_eq!(unavailable[0].error.status_code(), StatusCode::SourceUnavailable);

    assert_eq!(provider.sources().await, ["builtin", "before", "after"]);
    assert_eq!(ids(&provider.commands().await), vec![".one", ".ping", ".two"]);
}

#[tokio::test]
async fn test_no_unavailable_sources_when_all_answer() {
    let mut resolver: Resolver<Ctx> = Resolver::new();
    resolver
        .register_source("ext", static_source(vec![cmd("a")], vec![]))
        .expect("register");
    let provider = resolver.new_provider(Ctx::default());
    assert!(provider.unavailable_sources().await.is_empty());
}

#[tokio::test]
async fn test_earlier_sources_win() {
    let mut resolver: Resolver<Ctx> = Resolver::new();
    resolver.register_builtin_command(cmd("ping").describe("builtin ping", "").arc());
    resolver
        .register_source(
            "s1",
            static_source(
                vec![cmd("ping").describe("s1 ping", ""), cmd("tag").describe("s1 tag", "")],
                vec![],
            ),
        )
        .expect("register");
    resolver
        .register_source(
            "s2",
            static_source(
                vec![],
                vec![module("tag").command(cmd("create")).module(module("sub").command(cmd("x")))],
            ),
        )
        .expect("register");
    let provider = resolver.new_provider(Ctx::default());

    let ping = provider.command(".ping").await.expect("ping");
    assert_eq!(ping.source_name(), "builtin");
    assert_eq!(ping.short_description(), "builtin ping");

    let tag = provider.command(".tag").await.expect("tag");
    assert_eq!(tag.source_name(), "s1");
    assert!(provider.module(".tag").await.is_none());
    assert!(provider.command(".tag.create").await.is_none());
    assert!(provider.module(".tag.sub").await.is_none());
    assert!(provider.modules().await.is_empty());
}

#[tokio::test]
async fn test_module_merge_scenario() {
    let mut resolver: Resolver<Ctx> = Resolver::new();
    resolver.register_builtin_module(
        module("mod")
            .command(cmd("cmd1").alias("c1"))
            .command(cmd("cmd2"))
            .arc(),
    );
    resolver
        .register_source("ext", static_source(vec![], vec![module("mod").command(cmd("cmd3"))]))
        .expect("register");
    let provider = resolver.new_provider(Ctx::default());

    let node = provider.module(".mod").await.expect("mod");
    let sources: Vec<&str> = node.sources().iter().map(ModuleSource::source_name).collect();
    assert_eq!(sources, vec!["builtin", "ext"]);
    assert_eq!(
        ids(&node.commands()),
        vec![".mod.cmd1", ".mod.cmd2", ".mod.cmd3"]
    );
    let cmd1 = provider.command(".mod.cmd1").await.expect("cmd1");
    assert_eq!(cmd1.aliases(), ["c1".to_string()]);
    assert_eq!(provider.find_command("mod c1").await, Some(cmd1));
    assert!(!node.is_hidden());
}

#[tokio::test]
async fn test_alias_partial_drop_across_sources() {
    let mut resolver: Resolver<Ctx> = Resolver::new();
    resolver
        .register_source("a", static_source(vec![], vec![module("mod").command(cmd("a").alias("x"))]))
        .expect("register");
    resolver
        .register_source("b", static_source(vec![], vec![module("mod").command(cmd("y").alias("x"))]))
        .expect("register");
    let provider = resolver.new_provider(Ctx::default());

    let y = provider.command(".mod.y").await.expect("y");
    assert!(y.aliases().is_empty());
    let found = provider.find_command("mod x").await.expect("mod x");
    assert_eq!(found.id(), ".mod.a");
}

#[tokio::test]
async fn test_every_command_round_trips_by_id() {
    let mut resolver: Resolver<Ctx> = Resolver::new();
    resolver.register_builtin_command(cmd("help").arc());
    resolver.register_builtin_module(
        module("mod")
            .command(cmd("ban"))
            .module(module("role").command(cmd("add")).command(cmd("remove")))
            .arc(),
    );
    resolver
        .register_source(
            "ext",
            static_source(vec![cmd("tag")], vec![module("mod").command(cmd("warn"))]),
        )
        .expect("register");
    let provider = resolver.new_provider(Ctx::default());

    let all = provider.all_commands().await;
    assert_eq!(
        ids(&all),
        vec![
            ".help",
            ".tag",
            ".mod.ban",
            ".mod.warn",
            ".mod.role.add",
            ".mod.role.remove"
        ]
    );
    for command in all {
        assert_eq!(provider.command(command.id()).await, Some(command));
        assert_eq!(provider.find_command(&command.invoke_path()).await, Some(command));
    }
}

#[tokio::test]
async fn test_hidden_modules_through_provider() {
    let mut resolver: Resolver<Ctx> = Resolver::new();
    resolver.register_builtin_module(module("admin").command(cmd("reload").hidden()).arc());
    resolver
        .register_source("ext", static_source(vec![], vec![module("fun").command(cmd("roll"))]))
        .expect("register");
    let provider = resolver.new_provider(Ctx::default());

    for node in provider.modules().await {
        let any_visible = provider
            .all_commands()
            .await
            .iter()
            .filter(|command| command.id().starts_with(&format!("{}.", node.id())))
            .any(|command| !command.is_hidden());
        assert_eq!(node.is_hidden(), !any_visible, "module {}", node.id());
    }
    // Hidden commands still route.
    assert!(provider.find_command("admin reload").await.is_some());
}

#[tokio::test]
async fn test_find_command_and_module() {
    let log = call_log();
    let mut resolver: Resolver<Ctx> = Resolver::new();
    resolver.register_builtin_module(
        module("ghi")
            .command(cmd("mno").record_into(&log))
            .module(module("sub"))
            .arc(),
    );
    let provider = resolver.new_provider(Ctx::new("g"));

    assert_eq!(
        provider.find_command(" ghi  mno").await,
        provider.find_command("ghi mno").await
    );
    assert!(provider.find_command("ghi mno now").await.is_none());

    let (command, args) = provider
        .find_command_with_args("ghi mno  first  second")
        .await
        .expect("with args");
    assert_eq!(command.id(), ".ghi.mno");
    assert_eq!(args, "first  second");
    command.invoke(provider.context(), args).await.expect("invoke");
    assert_eq!(calls(&log), vec![("mno".to_string(), "first  second".to_string())]);

    // `sub` has no commands, so it stays hidden but is still addressable.
    let sub = provider.find_module("ghi sub").await.expect("sub");
    assert!(sub.is_hidden());
    assert!(provider.find_module("ghi mno").await.is_none());
}

#[tokio::test]
async fn test_providers_are_isolated() {
    let mut resolver: Resolver<Ctx> = Resolver::new();
    resolver.register_builtin_command(cmd("ping").arc());
    resolver
        .register_source("guild", Arc::new(GuildSource))
        .expect("register");

    let first = resolver.new_provider(Ctx::new("alpha"));
    let second = resolver.new_provider(Ctx::new("beta"));

    assert_eq!(ids(&first.commands().await), vec![".alpha", ".ping"]);
    assert_eq!(ids(&second.commands().await), vec![".beta", ".ping"]);
    assert!(first.find_command("beta").await.is_none());

    // Both trees wrap the same raw built-in.
    let first_ping = first.command(".ping").await.expect("ping");
    let second_ping = second.command(".ping").await.expect("ping");
    assert_ne!(first_ping, second_ping);
    assert!(Arc::ptr_eq(first_ping.source(), second_ping.source()));

    // A fresh provider starts again from the built-ins only.
    let third = resolver.new_provider(Ctx::new("gamma"));
    assert_eq!(ids(&third.commands().await), vec![".gamma", ".ping"]);
}
