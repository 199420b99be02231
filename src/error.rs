//! Sticky status type returned by fallible operations.

use std::fmt::{self, Display, Formatter};

/// Broad classification of a failure, mirroring the status codes used throughout the
/// on-disk format's originating design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum StatusCode {
    NotFound,
    Corruption,
    NotSupported,
    InvalidArgument,
    IoError,
}

impl Display for StatusCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::NotFound => "not found",
            Self::Corruption => "corruption",
            Self::NotSupported => "not supported",
            Self::InvalidArgument => "invalid argument",
            Self::IoError => "IO error",
        };
        f.write_str(msg)
    }
}

/// A tagged error value: a [`StatusCode`] plus an optional human-readable message.
///
/// `Status` is the error half of every `Result` this crate returns. It implements
/// [`std::error::Error`] so it composes with `?` and with other error types via `From`/`Box`.
#[derive(Debug, Clone)]
pub struct Status {
    code: StatusCode,
    message: Option<String>,
}

impl Status {
    #[must_use]
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self { code, message: Some(message.into()) }
    }

    #[must_use]
    pub fn from_code(code: StatusCode) -> Self {
        Self { code, message: None }
    }

    /// Build a [`Status`] from anything [`Display`]-able, the way this crate's compression
    /// errors are built from whatever underlying codec error occurred.
    pub fn from_display(code: StatusCode, err: impl Display) -> Self {
        Self { code, message: Some(err.to_string()) }
    }

    #[must_use]
    pub fn code(&self) -> StatusCode {
        self.code
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NotFound, message)
    }

    pub fn corruption(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Corruption, message)
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NotSupported, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(StatusCode::InvalidArgument, message)
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::IoError, message)
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{}: {msg}", self.code),
            None => write!(f, "{}", self.code),
        }
    }
}

impl std::error::Error for Status {}

impl From<std::io::Error> for Status {
    fn from(err: std::io::Error) -> Self {
        Self::from_display(StatusCode::IoError, err)
    }
}

/// Shorthand for a [`Result`] whose error type is [`Status`].
pub type StatusResult<T> = Result<T, Status>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_message() {
        let status = Status::invalid_argument("comparator mismatch");
        assert_eq!(status.to_string(), "invalid argument: comparator mismatch");
    }

    #[test]
    fn display_without_message() {
        let status = Status::from_code(StatusCode::Corruption);
        assert_eq!(status.to_string(), "corruption");
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::other("disk full");
        let status: Status = io_err.into();
        assert_eq!(status.code(), StatusCode::IoError);
    }
}
