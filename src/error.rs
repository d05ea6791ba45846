//! Error taxonomy for the compression façade.
//!
//! Every public operation returns [`Result`]. The four variants of
//! [`CompressError`] are the only outcomes a caller has to branch on:
//!
//! | Variant                | Raised when                                              |
//! |------------------------|----------------------------------------------------------|
//! | `InvalidArgument`      | bad selector, missing handle, non-positive length        |
//! | `ResourceError`        | an OS mapping/unmapping (or file) operation failed       |
//! | `OperationFailure`     | the codec engine reported `success = false`              |
//! | `ResourceExhaustion`   | the engine reported success with an unusable byte count  |
//!
//! None of them are retried internally. A caller may retry
//! `ResourceExhaustion` with a larger output view.

use std::io;

use nix::errno::Errno;
use thiserror::Error;

/// Payload-free discriminant of [`CompressError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    ResourceError,
    OperationFailure,
    ResourceExhaustion,
}

/// Classified failure of a compression call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CompressError {
    /// Rejected before the engine was invoked; nothing was written.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// OS-level failure. `message` is already formatted as
    /// `"<description> (<code>)."`.
    #[error("{operation}: {message}")]
    ResourceError {
        operation: &'static str,
        message: String,
    },

    /// The engine reported failure; the message is the engine's, verbatim.
    #[error("{0}")]
    OperationFailure(String),

    /// The engine reported success but `code` is outside `[1, SENTINEL)`.
    #[error("insufficient output space (code: {code})")]
    ResourceExhaustion { code: u64 },
}

impl CompressError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        CompressError::InvalidArgument(msg.into())
    }

    /// Build a `ResourceError` from an errno value returned by a `nix` call.
    pub fn os(operation: &'static str, errno: Errno) -> Self {
        CompressError::ResourceError {
            operation,
            message: format!("{} ({}).", errno.desc(), errno as i32),
        }
    }

    /// Build a `ResourceError` from a `std::io::Error`.
    pub fn io(operation: &'static str, err: io::Error) -> Self {
        let message = match err.raw_os_error() {
            Some(code) => format!("{} ({}).", Errno::from_raw(code).desc(), code),
            None => format!("{}.", err),
        };
        CompressError::ResourceError { operation, message }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CompressError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            CompressError::ResourceError { .. } => ErrorKind::ResourceError,
            CompressError::OperationFailure(_) => ErrorKind::OperationFailure,
            CompressError::ResourceExhaustion { .. } => ErrorKind::ResourceExhaustion,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompressError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_error_message_layout() {
        let err = CompressError::os("Failed to Map Input View", Errno::EBADF);
        assert_eq!(err.kind(), ErrorKind::ResourceError);
        let text = err.to_string();
        assert!(text.starts_with("Failed to Map Input View: "), "{text}");
        assert!(text.ends_with(&format!("({}).", Errno::EBADF as i32)), "{text}");
    }

    #[test]
    fn io_error_with_os_code_uses_errno_text() {
        let err = CompressError::io("Failed to Open Input", io::Error::from_raw_os_error(2));
        match err {
            CompressError::ResourceError { operation, message } => {
                assert_eq!(operation, "Failed to Open Input");
                assert!(message.ends_with("(2)."), "{message}");
            }
            other => panic!("expected ResourceError, got {other:?}"),
        }
    }

    #[test]
    fn operation_failure_is_verbatim() {
        let err = CompressError::OperationFailure("Unsupported file type".into());
        assert_eq!(err.to_string(), "Unsupported file type");
        assert_eq!(err.kind(), ErrorKind::OperationFailure);
    }

    #[test]
    fn exhaustion_reports_code() {
        let err = CompressError::ResourceExhaustion { code: 0 };
        assert_eq!(err.kind(), ErrorKind::ResourceExhaustion);
        assert!(err.to_string().contains("code: 0"));
    }
}
