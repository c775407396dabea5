use super::*;
use snafu::ResultExt;

#[test]
fn test_error_display() {
    let err = plugin_error::InvalidConfigSnafu {
        message: "builtin_source_name must not be empty".to_string(),
    }
    .build();
    assert!(err.to_string().contains("builtin_source_name"));

    let err = plugin_error::ReservedSourceNameSnafu {
        name: "builtin".to_string(),
    }
    .build();
    assert!(err.to_string().contains("builtin"));
}

#[test]
fn test_error_status_codes() {
    let err = plugin_error::ReservedSourceNameSnafu {
        name: "builtin".to_string(),
    }
    .build();
    assert_eq!(err.status_code(), StatusCode::ReservedSourceName);

    let err = plugin_error::InvalidConfigSnafu {
        message: "bad".to_string(),
    }
    .build();
    assert_eq!(err.status_code(), StatusCode::InvalidConfig);
    assert!(!err.is_retryable());
}

#[test]
fn test_io_error_status_codes() {
    let missing: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        "no such file",
    ));
    let err = missing
        .context(plugin_error::IoSnafu {
            path: PathBuf::from("/etc/cmdtree.toml"),
        })
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FileNotFound);
    assert!(err.to_string().contains("/etc/cmdtree.toml"));

    let denied: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
        std::io::ErrorKind::PermissionDenied,
        "denied",
    ));
    let err = denied
        .context(plugin_error::IoSnafu {
            path: PathBuf::from("/root/cmdtree.toml"),
        })
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::IoError);
}
