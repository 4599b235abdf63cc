//! The one recoverable failure in the paging core.
//!
//! Everything else (bad indices, negative counts, malformed drops) is a
//! programmer contract violation and fails fast with a panic. A load
//! failure, by contrast, is recorded as
//! [`LoadState::Error`](crate::LoadState::Error) for its direction and the
//! already-loaded pages keep being served.

use std::error::Error;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

/// A page load attempt failed.
#[derive(Clone, Debug, Error)]
#[error("page load failed: {cause}")]
pub struct LoadError {
    /// Whether an explicit [`retry`](crate::LoadCoordinator::retry) may
    /// succeed. Retry is always caller-initiated; the core never retries on
    /// its own.
    pub retryable: bool,
    /// The underlying failure reported by the data source.
    #[source]
    pub cause: Rc<dyn Error>,
}

impl LoadError {
    /// Wraps a source failure that a retry may resolve.
    pub fn retryable(cause: impl Into<Box<dyn Error>>) -> Self {
        Self {
            retryable: true,
            cause: Rc::from(cause.into()),
        }
    }

    /// Wraps a source failure that retrying will not fix.
    pub fn terminal(cause: impl Into<Box<dyn Error>>) -> Self {
        Self {
            retryable: false,
            cause: Rc::from(cause.into()),
        }
    }

    /// Convenience constructor for message-only failures.
    pub fn message(retryable: bool, message: impl Into<String>) -> Self {
        Self {
            retryable,
            cause: Rc::new(MessageError(message.into())),
        }
    }
}

#[derive(Debug)]
struct MessageError(String);

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for MessageError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_cause() {
        let err = LoadError::message(true, "connection reset");
        assert_eq!(err.to_string(), "page load failed: connection reset");
        assert!(err.retryable);
    }

    #[test]
    fn test_constructors_set_retryability() {
        let err = LoadError::retryable("timed out");
        assert!(err.retryable);
        assert_eq!(err.to_string(), "page load failed: timed out");
        let err = LoadError::terminal("row deleted");
        assert!(!err.retryable);
    }
}
