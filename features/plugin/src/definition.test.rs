use super::*;
use pretty_assertions::assert_eq;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Wrapper {
    channel_types: ChannelTypes,
    bot_permissions: Permissions,
}

#[test]
fn test_channel_types_set_operations() {
    let types = ChannelTypes::from(ChannelType::GuildText) | ChannelType::DirectMessage;
    assert!(types.contains(ChannelType::GuildText));
    assert!(types.contains(ChannelType::DirectMessage));
    assert!(!types.contains(ChannelType::GuildThread));
    assert!(!types.is_empty());
    assert!(ChannelTypes::NONE.is_empty());

    let collected: Vec<ChannelType> = types.iter().collect();
    assert_eq!(
        collected,
        vec![ChannelType::GuildText, ChannelType::DirectMessage]
    );
}

#[test]
fn test_channel_types_all() {
    let all = ChannelTypes::all();
    for channel_type in ChannelType::iter() {
        assert!(all.contains(channel_type));
    }
    assert_eq!(all, ChannelTypes::all() | ChannelTypes::NONE);
}

#[test]
fn test_channel_type_names() {
    assert_eq!(ChannelType::GuildText.as_ref(), "guild_text");
    assert_eq!(ChannelType::GroupDirectMessage.as_ref(), "group_direct_message");
}

#[test]
fn test_serde_shapes() {
    let wrapper: Wrapper = toml::from_str(
        r#"
channel_types = ["guild_text", "guild_thread"]
bot_permissions = 3072
"#,
    )
    .expect("parse");

    assert_eq!(
        wrapper.channel_types,
        ChannelTypes::from(ChannelType::GuildText) | ChannelType::GuildThread
    );
    assert_eq!(wrapper.bot_permissions, Permissions::from_bits(3072));

    let encoded = toml::to_string(&wrapper).expect("serialize");
    assert!(encoded.contains("\"guild_text\""));
    let decoded: Wrapper = toml::from_str(&encoded).expect("reparse");
    assert_eq!(decoded, wrapper);
}

#[test]
fn test_permissions_contains() {
    let required = Permissions::from_bits(0b0110);
    assert!(required.contains(Permissions::from_bits(0b0100)));
    assert!(!required.contains(Permissions::from_bits(0b1000)));
    assert!(required.contains(Permissions::NONE));
    assert_eq!((required | Permissions::from_bits(1)).bits(), 0b0111);
}

#[test]
fn test_shell_arg_parser_formats_args_and_flags() {
    let example = ExampleArgs::new()
        .arg("alice")
        .arg("hello world")
        .flag("silent", "")
        .flag("reason", "spam");

    let formatted = ShellArgParser.format_example("en-US", &example);
    assert_eq!(formatted, "alice 'hello world' -silent -reason spam");
}

#[test]
fn test_shell_arg_parser_empty_example() {
    assert_eq!(ShellArgParser.format_example("en-US", &ExampleArgs::new()), "");
}
