//! Fixtures shared by the unit tests.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use cmdtree_error::BoxedError;
use cmdtree_error::PlainError;
use cmdtree_error::StatusCode;

use crate::definition::ArgParser;
use crate::definition::ChannelTypes;
use crate::definition::Command;
use crate::definition::ExampleArgs;
use crate::definition::Module;
use crate::definition::Permissions;
use crate::definition::Throttler;
use crate::source::PluginSource;
use crate::source::SourceContribution;

/// Event context used throughout the tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Ctx {
    pub(crate) guild: String,
}

impl Ctx {
    pub(crate) fn new(guild: &str) -> Self {
        Self {
            guild: guild.to_string(),
        }
    }
}

/// Shared log of `(command name, args)` pairs recorded by invocations.
pub(crate) type CallLog = Arc<Mutex<Vec<(String, String)>>>;

pub(crate) fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub(crate) fn calls(log: &CallLog) -> Vec<(String, String)> {
    log.lock().expect("call log").clone()
}

#[derive(Default)]
pub(crate) struct TestCommand {
    name: String,
    aliases: Vec<String>,
    short_description: String,
    long_description: String,
    hidden: bool,
    channel_types: ChannelTypes,
    bot_permissions: Permissions,
    arg_parser: Option<Arc<dyn ArgParser>>,
    throttler: Option<Arc<dyn Throttler<Ctx>>>,
    examples: Vec<ExampleArgs>,
    log: Option<CallLog>,
}

pub(crate) fn cmd(name: &str) -> TestCommand {
    TestCommand {
        name: name.to_string(),
        ..Default::default()
    }
}

impl TestCommand {
    pub(crate) fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub(crate) fn describe(mut self, short: &str, long: &str) -> Self {
        self.short_description = short.to_string();
        self.long_description = long.to_string();
        self
    }

    pub(crate) fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub(crate) fn channel_types(mut self, channel_types: ChannelTypes) -> Self {
        self.channel_types = channel_types;
        self
    }

    pub(crate) fn bot_permissions(mut self, bot_permissions: Permissions) -> Self {
        self.bot_permissions = bot_permissions;
        self
    }

    pub(crate) fn arg_parser(mut self, arg_parser: Arc<dyn ArgParser>) -> Self {
        self.arg_parser = Some(arg_parser);
        self
    }

    pub(crate) fn throttler(mut self, throttler: Arc<dyn Throttler<Ctx>>) -> Self {
        self.throttler = Some(throttler);
        self
    }

    pub(crate) fn example(mut self, example: ExampleArgs) -> Self {
        self.examples.push(example);
        self
    }

    pub(crate) fn record_into(mut self, log: &CallLog) -> Self {
        self.log = Some(Arc::clone(log));
        self
    }

    pub(crate) fn arc(self) -> Arc<dyn Command<Ctx>> {
        Arc::new(self)
    }
}

#[async_trait]
impl Command<Ctx> for TestCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> &[String] {
        &self.aliases
    }

    fn short_description(&self) -> &str {
        &self.short_description
    }

    fn long_description(&self) -> &str {
        &self.long_description
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }

    fn channel_types(&self) -> ChannelTypes {
        self.channel_types
    }

    fn bot_permissions(&self) -> Permissions {
        self.bot_permissions
    }

    fn arg_parser(&self) -> Option<Arc<dyn ArgParser>> {
        self.arg_parser.clone()
    }

    fn throttler(&self) -> Option<Arc<dyn Throttler<Ctx>>> {
        self.throttler.clone()
    }

    fn example_args(&self) -> Vec<ExampleArgs> {
        self.examples.clone()
    }

    async fn invoke(&self, ctx: &Ctx, args: &str) -> Result<(), BoxedError> {
        if args == "fail" {
            let message = format!("{} failed in {}", self.name, ctx.guild);
            return Err(PlainError::new(message, StatusCode::CommandFailed).into());
        }
        if let Some(log) = &self.log {
            log.lock()
                .expect("call log")
                .push((self.name.clone(), args.to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct TestModule {
    name: String,
    short_description: String,
    long_description: String,
    commands: Vec<Arc<dyn Command<Ctx>>>,
    modules: Vec<Arc<dyn Module<Ctx>>>,
}

pub(crate) fn module(name: &str) -> TestModule {
    TestModule {
        name: name.to_string(),
        ..Default::default()
    }
}

impl TestModule {
    pub(crate) fn describe(mut self, short: &str, long: &str) -> Self {
        self.short_description = short.to_string();
        self.long_description = long.to_string();
        self
    }

    pub(crate) fn command(mut self, command: TestCommand) -> Self {
        self.commands.push(Arc::new(command));
        self
    }

    pub(crate) fn module(mut self, module: TestModule) -> Self {
        self.modules.push(Arc::new(module));
        self
    }

    pub(crate) fn arc(self) -> Arc<dyn Module<Ctx>> {
        Arc::new(self)
    }
}

impl Module<Ctx> for TestModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn short_description(&self) -> &str {
        &self.short_description
    }

    fn long_description(&self) -> &str {
        &self.long_description
    }

    fn commands(&self) -> &[Arc<dyn Command<Ctx>>] {
        &self.commands
    }

    fn modules(&self) -> &[Arc<dyn Module<Ctx>>] {
        &self.modules
    }
}

/// A contribution holding the given commands and modules.
pub(crate) fn contribution(
    commands: Vec<TestCommand>,
    modules: Vec<TestModule>,
) -> SourceContribution<Ctx> {
    let mut contribution = SourceContribution::new();
    for command in commands {
        contribution = contribution.with_command(command.arc());
    }
    for module in modules {
        contribution = contribution.with_module(module.arc());
    }
    contribution
}

/// A source whose query always fails with `message`.
pub(crate) struct FailingSource {
    message: String,
}

impl FailingSource {
    pub(crate) fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl PluginSource<Ctx> for FailingSource {
    async fn query(&self, _ctx: &Ctx) -> Result<SourceContribution<Ctx>, BoxedError> {
        Err(PlainError::new(self.message.clone(), StatusCode::SourceUnavailable).into())
    }
}

/// A source that counts its queries and can be slowed down.
pub(crate) struct CountingSource {
    contribution: SourceContribution<Ctx>,
    delay: Option<Duration>,
    queries: AtomicUsize,
}

impl CountingSource {
    pub(crate) fn new(contribution: SourceContribution<Ctx>) -> Self {
        Self {
            contribution,
            delay: None,
            queries: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginSource<Ctx> for CountingSource {
    async fn query(&self, _ctx: &Ctx) -> Result<SourceContribution<Ctx>, BoxedError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.contribution.clone())
    }
}

/// A source that contributes one top-level command named after the guild in
/// the context.
pub(crate) struct GuildSource;

#[async_trait]
impl PluginSource<Ctx> for GuildSource {
    async fn query(&self, ctx: &Ctx) -> Result<SourceContribution<Ctx>, BoxedError> {
        Ok(SourceContribution::new().with_command(cmd(&ctx.guild).arc()))
    }
}
