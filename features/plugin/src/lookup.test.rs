use super::*;
use crate::merge::merge_contribution;
use crate::testing::Ctx;
use crate::testing::cmd;
use crate::testing::contribution;
use crate::testing::module;
use crate::tree::UsedNames;
use pretty_assertions::assert_eq;

fn forest() -> Forest<Ctx> {
    let mut forest = Forest::new();
    let mut used = UsedNames::new();
    merge_contribution(
        &mut forest,
        &mut used,
        "builtin",
        &contribution(
            vec![cmd("abc"), cmd("help").alias("h")],
            vec![
                module("ghi")
                    .command(cmd("mno").alias("m"))
                    .command(cmd("pqr"))
                    .module(module("sub").command(cmd("deep").alias("d"))),
            ],
        ),
    );
    forest
}

fn id_of(forest: &Forest<Ctx>, key: Option<CommandKey>) -> Option<&str> {
    key.map(|key| forest.command(key).id.as_str())
}

#[test]
fn test_command_by_id_round_trip() {
    let forest = forest();
    for key in forest.walk_commands() {
        let id = &forest.command(key).id;
        assert_eq!(forest.command_by_id(id), Some(key), "id {id}");
    }
}

#[test]
fn test_module_by_id() {
    let forest = forest();
    let sub = forest.module_by_id(".ghi.sub").expect("sub");
    assert_eq!(forest.module(sub).name, "sub");
    assert!(forest.module_by_id(".ghi").is_some());
    assert!(forest.module_by_id(".ghi.nope").is_none());
    assert!(forest.module_by_id(".abc").is_none());
}

#[test]
fn test_malformed_ids_are_not_found() {
    let forest = forest();
    for id in ["", ".", "abc", "ghi.mno", ".ghi.", "..abc", ".ghi..mno", ".ghi mno"] {
        assert!(forest.command_by_id(id).is_none(), "command id {id:?}");
    }
    for id in ["", ".", "ghi", ".ghi.", ". ghi"] {
        assert!(forest.module_by_id(id).is_none(), "module id {id:?}");
    }
    // A module id never resolves as a command and vice versa.
    assert!(forest.command_by_id(".ghi").is_none());
    assert!(forest.module_by_id(".ghi.mno").is_none());
}

#[test]
fn test_find_command_whitespace_insensitive() {
    let forest = forest();
    let expected = Some(".ghi.mno");
    assert_eq!(id_of(&forest, forest.find_command("ghi mno")), expected);
    assert_eq!(id_of(&forest, forest.find_command(" ghi  mno")), expected);
    assert_eq!(id_of(&forest, forest.find_command("\tghi\n mno \u{3000}")), expected);
}

#[test]
fn test_find_command_by_alias() {
    let forest = forest();
    assert_eq!(id_of(&forest, forest.find_command("h")), Some(".help"));
    assert_eq!(id_of(&forest, forest.find_command("ghi m")), Some(".ghi.mno"));
    assert_eq!(id_of(&forest, forest.find_command("ghi sub d")), Some(".ghi.sub.deep"));
    // Aliases are scoped to their parent.
    assert!(forest.find_command("m").is_none());
    assert!(forest.find_command("ghi d").is_none());
}

#[test]
fn test_find_command_not_found() {
    let forest = forest();
    for invoke in ["", "   ", "ghi", "ghi sub", "nope", "ghi nope", "abc extra", "ghi mno extra"] {
        assert!(forest.find_command(invoke).is_none(), "invoke {invoke:?}");
    }
}

#[test]
fn test_find_command_with_args() {
    let forest = forest();

    let (key, args) = forest.find_command_with_args("abc").expect("abc");
    assert_eq!(forest.command(key).id, ".abc");
    assert_eq!(args, "");

    let (key, args) = forest
        .find_command_with_args("  ghi   m  @someone   for  spam ")
        .expect("ghi m");
    assert_eq!(forest.command(key).id, ".ghi.mno");
    assert_eq!(args, "@someone   for  spam ");

    let (key, args) = forest
        .find_command_with_args("ghi sub deep\n\"quoted arg\"")
        .expect("deep");
    assert_eq!(forest.command(key).id, ".ghi.sub.deep");
    assert_eq!(args, "\"quoted arg\"");

    assert!(forest.find_command_with_args("ghi sub").is_none());
    assert!(forest.find_command_with_args("nope abc").is_none());
}

#[test]
fn test_find_module() {
    let forest = forest();
    let sub = forest.find_module("  ghi \t sub ").expect("sub");
    assert_eq!(forest.module(sub).id, ".ghi.sub");
    assert!(forest.find_module("ghi").is_some());
    assert!(forest.find_module("").is_none());
    assert!(forest.find_module("ghi mno").is_none());
    assert!(forest.find_module("abc").is_none());
}

#[test]
fn test_next_token() {
    assert_eq!(next_token("ghi  mno"), Some(("ghi", "  mno")));
    assert_eq!(next_token("ghi"), Some(("ghi", "")));
    assert_eq!(next_token(""), None);
}
