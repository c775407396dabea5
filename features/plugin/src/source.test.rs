use super::*;
use crate::testing::Ctx;
use crate::testing::cmd;
use crate::testing::module;
use cmdtree_error::ErrorExt;
use cmdtree_error::PlainError;
use cmdtree_error::StatusCode;
use pretty_assertions::assert_eq;

#[test]
fn test_contribution_builder() {
    let empty: SourceContribution<Ctx> = SourceContribution::default();
    assert!(empty.is_empty());

    let contribution = SourceContribution::new()
        .with_command(cmd("ping").arc())
        .with_module(module("mod").command(cmd("ban")).arc());
    assert!(!contribution.is_empty());
    assert_eq!(contribution.commands.len(), 1);
    assert_eq!(contribution.modules.len(), 1);
    assert_eq!(contribution.commands[0].name(), "ping");
    assert_eq!(contribution.modules[0].name(), "mod");
}

#[tokio::test]
async fn test_static_source_answers_same_definitions() {
    let ping = cmd("ping").arc();
    let source = StaticSource::new(SourceContribution::new().with_command(Arc::clone(&ping)));

    let first = source.query(&Ctx::new("a")).await.expect("query");
    let second = source.query(&Ctx::new("b")).await.expect("query");
    assert!(Arc::ptr_eq(&first.commands[0], &ping));
    assert!(Arc::ptr_eq(&second.commands[0], &ping));
}

#[test]
fn test_unavailable_source_keeps_error() {
    let unavailable = UnavailableSource::new(
        "tags",
        PlainError::new("database down", StatusCode::SourceUnavailable).into(),
    );
    assert_eq!(unavailable.name, "tags");
    assert_eq!(unavailable.error.to_string(), "database down");
    assert_eq!(unavailable.error.status_code(), StatusCode::SourceUnavailable);
    assert!(unavailable.error.is_retryable());

    let debug = format!("{unavailable:?}");
    assert!(debug.contains("tags"));
    assert!(debug.contains("database down"));
}

#[test]
fn test_default_builtin_source_name() {
    assert_eq!(DEFAULT_BUILTIN_SOURCE_NAME, "builtin");
}
