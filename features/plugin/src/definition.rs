//! Capability surface of raw plugin definitions.
//!
//! Plugin authors implement [`Command`] and [`Module`] for their own types.
//! The resolver only ever talks to these traits, so a definition can be a
//! static struct, something generated from a database row, or anything else.
//!
//! All traits are generic over `C`, the context of the inbound event that
//! triggered resolution. The same value is handed to sources, throttlers and
//! commands.

use std::borrow::Cow;
use std::ops::BitOr;
use std::sync::Arc;

use async_trait::async_trait;
use cmdtree_error::BoxedError;
use serde::Deserialize;
use serde::Serialize;
use strum::AsRefStr;
use strum::EnumIter;
use strum::IntoEnumIterator;

/// A kind of channel a command can be used in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChannelType {
    GuildText,
    GuildNews,
    GuildThread,
    DirectMessage,
    GroupDirectMessage,
}

impl ChannelType {
    const fn bit(self) -> u32 {
        1 << self as u32
    }
}

/// Set of [`ChannelType`]s.
///
/// The empty set means "not specified"; resolved commands then fall back to
/// the resolver default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ChannelType>", into = "Vec<ChannelType>")]
pub struct ChannelTypes(u32);

impl ChannelTypes {
    pub const NONE: Self = Self(0);

    /// Every channel type.
    pub fn all() -> Self {
        ChannelType::iter().collect()
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, channel_type: ChannelType) -> bool {
        self.0 & channel_type.bit() != 0
    }

    pub const fn with(self, channel_type: ChannelType) -> Self {
        Self(self.0 | channel_type.bit())
    }

    pub fn iter(self) -> impl Iterator<Item = ChannelType> {
        ChannelType::iter().filter(move |channel_type| self.contains(*channel_type))
    }
}

impl From<ChannelType> for ChannelTypes {
    fn from(channel_type: ChannelType) -> Self {
        Self(channel_type.bit())
    }
}

impl FromIterator<ChannelType> for ChannelTypes {
    fn from_iter<I: IntoIterator<Item = ChannelType>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}

impl From<Vec<ChannelType>> for ChannelTypes {
    fn from(channel_types: Vec<ChannelType>) -> Self {
        channel_types.into_iter().collect()
    }
}

impl From<ChannelTypes> for Vec<ChannelType> {
    fn from(channel_types: ChannelTypes) -> Self {
        channel_types.iter().collect()
    }
}

impl BitOr for ChannelTypes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<ChannelType> for ChannelTypes {
    type Output = Self;

    fn bitor(self, rhs: ChannelType) -> Self {
        self.with(rhs)
    }
}

/// Permission bits the bot needs to run a command. Zero means "not specified".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(u64);

impl Permissions {
    pub const NONE: Self = Self(0);

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// One example invocation of a command, before formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExampleArgs {
    /// Positional arguments.
    pub args: Vec<String>,
    /// Flags as `(name, value)`; an empty value is a switch.
    pub flags: Vec<(String, String)>,
}

impl ExampleArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn flag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.flags.push((name.into(), value.into()));
        self
    }
}

/// Formats example arguments the way the command's argument parser expects
/// them to be typed.
pub trait ArgParser: Send + Sync {
    fn format_example(&self, locale: &str, example: &ExampleArgs) -> String;
}

/// Shell-style formatting: positional args first, then `-name value` flags,
/// each word quoted when needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellArgParser;

impl ArgParser for ShellArgParser {
    fn format_example(&self, _locale: &str, example: &ExampleArgs) -> String {
        let mut words = Vec::with_capacity(example.args.len() + example.flags.len() * 2);
        words.extend(example.args.iter().map(|arg| quote(arg)));
        for (name, value) in &example.flags {
            words.push(Cow::Owned(format!("-{name}")));
            if !value.is_empty() {
                words.push(quote(value));
            }
        }
        words.join(" ")
    }
}

fn quote(word: &str) -> Cow<'_, str> {
    // Words holding a nul byte cannot be quoted; they are shown verbatim.
    shlex::try_quote(word).unwrap_or(Cow::Borrowed(word))
}

/// Decides whether an invocation may proceed right now.
#[async_trait]
pub trait Throttler<C>: Send + Sync {
    /// Returns an error if the invocation must be rejected.
    async fn check(&self, ctx: &C) -> Result<(), BoxedError>;
}

/// A raw command definition.
///
/// Only [`name`](Command::name) and [`invoke`](Command::invoke) are
/// required. The remaining methods default to "not specified", which the
/// resolved form replaces with resolver defaults.
#[async_trait]
pub trait Command<C>: Send + Sync {
    fn name(&self) -> &str;

    fn aliases(&self) -> &[String] {
        &[]
    }

    fn short_description(&self) -> &str {
        ""
    }

    fn long_description(&self) -> &str {
        ""
    }

    /// Hidden commands are routable but left out of help listings.
    fn is_hidden(&self) -> bool {
        false
    }

    fn channel_types(&self) -> ChannelTypes {
        ChannelTypes::NONE
    }

    fn bot_permissions(&self) -> Permissions {
        Permissions::NONE
    }

    fn arg_parser(&self) -> Option<Arc<dyn ArgParser>> {
        None
    }

    fn throttler(&self) -> Option<Arc<dyn Throttler<C>>> {
        None
    }

    fn example_args(&self) -> Vec<ExampleArgs> {
        Vec::new()
    }

    /// Executes the command with the unparsed argument string.
    async fn invoke(&self, ctx: &C, args: &str) -> Result<(), BoxedError>;
}

/// A raw module definition: a named group of commands and submodules.
pub trait Module<C>: Send + Sync {
    fn name(&self) -> &str;

    fn short_description(&self) -> &str {
        ""
    }

    fn long_description(&self) -> &str {
        ""
    }

    fn commands(&self) -> &[Arc<dyn Command<C>>];

    fn modules(&self) -> &[Arc<dyn Module<C>>];
}

#[cfg(test)]
#[path = "definition.test.rs"]
mod tests;
