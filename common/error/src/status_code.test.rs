use super::*;
use pretty_assertions::assert_eq;
use strum::IntoEnumIterator;

#[test]
fn test_plugin_codes() {
    assert_eq!(StatusCode::SourceUnavailable as i32, 20_000);
    assert_eq!(StatusCode::ReservedSourceName as i32, 20_001);
    assert_eq!(StatusCode::CommandFailed as i32, 20_002);
    assert_eq!(StatusCode::Throttled as i32, 20_003);

    for code in [
        StatusCode::SourceUnavailable,
        StatusCode::ReservedSourceName,
        StatusCode::CommandFailed,
        StatusCode::Throttled,
    ] {
        assert_eq!(code.category(), StatusCategory::Plugin, "{code}");
    }
}

#[test]
fn test_from_i32_round_trips_every_code() {
    for code in StatusCode::iter() {
        assert_eq!(StatusCode::from_i32(code as i32), Some(code));
    }
    assert_eq!(StatusCode::from_i32(0), None);
    assert_eq!(StatusCode::from_i32(20_999), None);
}

#[test]
fn test_names_match_display() {
    for code in StatusCode::iter() {
        assert_eq!(code.name(), code.to_string());
        assert_eq!(code.name(), code.as_ref());
    }
    assert_eq!(StatusCode::ReservedSourceName.name(), "ReservedSourceName");
}

#[test]
fn test_codes_sit_in_their_category_range() {
    for code in StatusCode::iter() {
        let prefix = code as i32 / 1000;
        assert_eq!(prefix, code.category().prefix(), "{code}");
    }
}

#[test]
fn test_source_failures_are_retryable() {
    // An unavailable or throttled source may answer on the next event.
    assert!(StatusCode::SourceUnavailable.is_retryable());
    assert!(StatusCode::Throttled.is_retryable());
    assert!(StatusCode::Timeout.is_retryable());

    assert!(!StatusCode::ReservedSourceName.is_retryable());
    assert!(!StatusCode::CommandFailed.is_retryable());
    assert!(!StatusCode::InvalidConfig.is_retryable());
    assert!(!StatusCode::Cancelled.is_retryable());
}

#[test]
fn test_only_unexpected_failures_are_logged() {
    let logged: Vec<StatusCode> = StatusCode::iter()
        .filter(StatusCode::should_log_error)
        .collect();
    assert_eq!(logged, vec![StatusCode::Unknown, StatusCode::CommandFailed]);
}
