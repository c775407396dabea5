//! Status codes carried by every error in the workspace.
//!
//! A code is a 5-digit `XX_YYY` value: `XX` names the category and `YYY`
//! the code inside it. Codes are stable once published; new ones are
//! appended to their category.

use strum::AsRefStr;
use strum::EnumIter;
use strum::FromRepr;

/// Per-code flags consulted by callers deciding how to react to an error.
#[derive(Debug, Clone, Copy)]
pub struct StatusMeta {
    /// The same request may succeed later.
    pub retryable: bool,
    /// Details are for logs, not for users.
    pub log_error: bool,
    pub category: StatusCategory,
}

/// The `XX` part of a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    /// 01_xxx
    Common,
    /// 02_xxx: bad input from a user or caller.
    Input,
    /// 03_xxx
    IO,
    /// 10_xxx
    Config,
    /// 12_xxx: deadlines and limits.
    Resource,
    /// 20_xxx: plugin sources, commands and throttling.
    Plugin,
}

impl StatusCategory {
    /// The `XX` prefix shared by every code of this category.
    pub const fn prefix(self) -> i32 {
        match self {
            Self::Common => 1,
            Self::Input => 2,
            Self::IO => 3,
            Self::Config => 10,
            Self::Resource => 12,
            Self::Plugin => 20,
        }
    }
}

macro_rules! define_status_codes {
    ($(
        $(#[$attr:meta])*
        $name:ident = $value:expr => {
            retryable: $retry:expr,
            log_error: $log:expr,
            category: $cat:ident $(,)?
        }
    ),* $(,)?) => {
        /// Error classification shared by every crate of the workspace.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumIter, FromRepr)]
        #[repr(i32)]
        pub enum StatusCode {
            $($(#[$attr])* $name = $value,)*
        }

        impl StatusCode {
            pub const fn meta(&self) -> StatusMeta {
                match self {
                    $(Self::$name => StatusMeta {
                        retryable: $retry,
                        log_error: $log,
                        category: StatusCategory::$cat,
                    },)*
                }
            }

            pub const fn name(&self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)*
                }
            }
        }

        // Two variants sharing a value fail the build.
        const _: () = {
            const CODES: &[i32] = &[$($value),*];
            const fn check_unique() {
                let mut i = 0;
                while i < CODES.len() {
                    let mut j = i + 1;
                    while j < CODES.len() {
                        if CODES[i] == CODES[j] {
                            panic!("Duplicate status code value detected");
                        }
                        j += 1;
                    }
                    i += 1;
                }
            }
            check_unique();
        };
    };
}

define_status_codes! {
    /// Fallback for errors that never chose a code.
    Unknown = 01_000 => { retryable: false, log_error: true, category: Common },
    /// The caller gave up, e.g. a source query was cancelled.
    Cancelled = 01_001 => { retryable: false, log_error: false, category: Common },

    /// A command was invoked with arguments it cannot use.
    InvalidArguments = 02_000 => { retryable: false, log_error: false, category: Input },

    IoError = 03_000 => { retryable: false, log_error: false, category: IO },
    FileNotFound = 03_001 => { retryable: false, log_error: false, category: IO },

    /// Config parsed but holds unusable values.
    InvalidConfig = 10_000 => { retryable: false, log_error: false, category: Config },
    /// Config file could not be parsed.
    ConfigFileError = 10_001 => { retryable: false, log_error: false, category: Config },

    /// A source or command ran past its deadline.
    Timeout = 12_000 => { retryable: true, log_error: false, category: Resource },

    /// A plugin source could not be queried.
    SourceUnavailable = 20_000 => { retryable: true, log_error: false, category: Plugin },
    /// A custom source tried to use the built-in source name.
    ReservedSourceName = 20_001 => { retryable: false, log_error: false, category: Plugin },
    /// A command failed while executing.
    CommandFailed = 20_002 => { retryable: false, log_error: true, category: Plugin },
    /// A throttler rejected the invocation.
    Throttled = 20_003 => { retryable: true, log_error: false, category: Plugin },
}

impl StatusCode {
    pub const fn is_retryable(&self) -> bool {
        self.meta().retryable
    }

    pub const fn should_log_error(&self) -> bool {
        self.meta().log_error
    }

    pub const fn category(&self) -> StatusCategory {
        self.meta().category
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        Self::from_repr(value)
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
#[path = "status_code.test.rs"]
mod tests;
