use super::*;
use std::error::Error as _;

#[test]
fn test_plain_error() {
    let err = PlainError::new("source offline", StatusCode::SourceUnavailable);
    assert_eq!(err.status_code(), StatusCode::SourceUnavailable);
    assert_eq!(err.to_string(), "source offline");
    assert!(err.is_retryable());
}

#[test]
fn test_plain_error_not_retryable() {
    let err = PlainError::new("bad config", StatusCode::InvalidConfig);
    assert!(!err.is_retryable());
}

#[test]
fn test_output_msg_hides_internal() {
    let err = PlainError::new("handler panicked: sensitive details", StatusCode::CommandFailed);
    assert_eq!(err.output_msg(), "Internal error: 20002");
}

#[test]
fn test_output_msg_shows_user_errors() {
    let err = PlainError::new("Invalid parameter: foo", StatusCode::InvalidArguments);
    assert_eq!(err.output_msg(), "Invalid parameter: foo");
}

#[test]
fn test_boxed_error() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let boxed = boxed(io_err, StatusCode::FileNotFound);

    assert_eq!(boxed.status_code(), StatusCode::FileNotFound);
    assert_eq!(boxed.to_string(), "file not found");
    assert!(boxed.source().is_some());
    assert!(boxed.as_any().downcast_ref::<BoxedError>().is_some());
}

#[test]
fn test_boxed_from_plain_keeps_code() {
    let boxed: BoxedError = PlainError::new("timed out", StatusCode::Timeout).into();
    assert_eq!(boxed.status_code(), StatusCode::Timeout);
    assert_eq!(boxed.to_string(), "timed out");
}
