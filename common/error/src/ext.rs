//! Extension trait and generic error carriers.

use std::any::Any;
use std::fmt;

use crate::status_code::StatusCode;

/// Extension trait implemented by every error type in the workspace.
pub trait ErrorExt: std::error::Error {
    /// Returns the status code classifying this error.
    fn status_code(&self) -> StatusCode {
        StatusCode::Unknown
    }

    /// Returns the error as [`Any`] so callers can downcast.
    fn as_any(&self) -> &dyn Any;

    /// Returns true if retrying the failed operation may succeed.
    fn is_retryable(&self) -> bool {
        self.status_code().is_retryable()
    }

    /// Returns a message safe to show to end users.
    ///
    /// Errors whose status code is flagged for logging are unexpected; their
    /// details stay in the logs and only the numeric code is shown.
    fn output_msg(&self) -> String {
        let code = self.status_code();
        if code.should_log_error() {
            format!("Internal error: {}", code as i32)
        } else {
            self.to_string()
        }
    }
}

/// An error consisting only of a message and a status code.
#[derive(Debug, Clone)]
pub struct PlainError {
    msg: String,
    status_code: StatusCode,
}

impl PlainError {
    pub fn new(msg: impl Into<String>, status_code: StatusCode) -> Self {
        Self {
            msg: msg.into(),
            status_code,
        }
    }
}

impl fmt::Display for PlainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl std::error::Error for PlainError {}

impl ErrorExt for PlainError {
    fn status_code(&self) -> StatusCode {
        self.status_code
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Type-erased error crossing a collaborator boundary.
///
/// The wrapped error is reachable through [`std::error::Error::source`].
pub struct BoxedError {
    inner: Box<dyn std::error::Error + Send + Sync>,
    status_code: StatusCode,
}

impl BoxedError {
    pub fn new(
        inner: impl std::error::Error + Send + Sync + 'static,
        status_code: StatusCode,
    ) -> Self {
        Self {
            inner: Box::new(inner),
            status_code,
        }
    }

    /// Returns the wrapped error.
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.inner.as_ref()
    }
}

impl fmt::Debug for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedError")
            .field("status_code", &self.status_code)
            .field("inner", &self.inner)
            .finish()
    }
}

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl std::error::Error for BoxedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl ErrorExt for BoxedError {
    fn status_code(&self) -> StatusCode {
        self.status_code
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl From<PlainError> for BoxedError {
    fn from(err: PlainError) -> Self {
        let status_code = err.status_code;
        Self::new(err, status_code)
    }
}

/// Wraps any error into a [`BoxedError`] with the given status code.
pub fn boxed(
    err: impl std::error::Error + Send + Sync + 'static,
    status_code: StatusCode,
) -> BoxedError {
    BoxedError::new(err, status_code)
}

#[cfg(test)]
#[path = "ext.test.rs"]
mod tests;
