use super::*;
use crate::definition::ChannelType;
use crate::error::PluginError;
use cmdtree_error::ErrorExt;
use cmdtree_error::StatusCode;
use pretty_assertions::assert_eq;
use std::io::Write;

#[test]
fn test_default_config() {
    let config = ResolverConfig::default();
    assert_eq!(config.builtin_source_name, "builtin");
    assert_eq!(config.channel_types, ChannelTypes::all());
    assert_eq!(config.bot_permissions, Permissions::NONE);
    config.validate().expect("default config is valid");
}

#[test]
fn test_empty_document_uses_defaults() {
    let config = ResolverConfig::from_toml_str("").expect("parse");
    assert_eq!(config, ResolverConfig::default());
}

#[test]
fn test_parse_full_document() {
    let config = ResolverConfig::from_toml_str(
        r#"
builtin_source_name = "core"
channel_types = ["guild_text", "direct_message"]
bot_permissions = 3072
"#,
    )
    .expect("parse");

    assert_eq!(config.builtin_source_name, "core");
    assert_eq!(
        config.channel_types,
        ChannelTypes::from(ChannelType::GuildText) | ChannelType::DirectMessage
    );
    assert_eq!(config.bot_permissions, Permissions::from_bits(3072));
}

#[test]
fn test_parse_rejects_unknown_channel_type() {
    let err = ResolverConfig::from_toml_str(r#"channel_types = ["voice"]"#)
        .expect_err("unknown channel type");
    assert!(matches!(err, PluginError::ConfigParse { .. }));
    assert_eq!(err.status_code(), StatusCode::ConfigFileError);
}

#[test]
fn test_validate_builtin_source_name() {
    for name in ["", "built in", "\tbuiltin"] {
        let config = ResolverConfig {
            builtin_source_name: name.to_string(),
            ..Default::default()
        };
        let err = config.validate().expect_err("invalid name");
        assert_eq!(err.status_code(), StatusCode::InvalidConfig);
    }
}

#[test]
fn test_validate_rejects_empty_channel_types() {
    let err = ResolverConfig::from_toml_str("channel_types = []").expect_err("empty set");
    assert!(matches!(err, PluginError::InvalidConfig { .. }));
    assert!(err.to_string().contains("channel_types"));
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "builtin_source_name = \"core\"").expect("write");
    writeln!(file, "bot_permissions = 8").expect("write");

    let config = ResolverConfig::load(file.path()).expect("load");
    assert_eq!(config.builtin_source_name, "core");
    assert_eq!(config.bot_permissions, Permissions::from_bits(8));
    assert_eq!(config.channel_types, ChannelTypes::all());
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = ResolverConfig::load(dir.path().join("resolver.toml")).expect_err("missing");
    assert!(matches!(err, PluginError::Io { .. }));
    assert_eq!(err.status_code(), StatusCode::FileNotFound);
}

#[test]
fn test_load_reports_file_name_on_parse_error() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "bot_permissions = \"all\"").expect("write");

    let err = ResolverConfig::load(file.path()).expect_err("wrong type");
    let message = err.to_string();
    assert!(message.contains(&file.path().display().to_string()));
}

#[test]
fn test_defaults_from_config() {
    let config = ResolverConfig {
        channel_types: ChannelType::GuildThread.into(),
        bot_permissions: Permissions::from_bits(4),
        ..Default::default()
    };
    let defaults: Defaults<()> = Defaults::from_config(&config);
    assert_eq!(defaults.channel_types, config.channel_types);
    assert_eq!(defaults.bot_permissions, config.bot_permissions);
    assert!(defaults.throttler.is_none());

    let example = crate::definition::ExampleArgs::new().arg("x");
    assert_eq!(defaults.arg_parser.format_example("en", &example), "x");
}
