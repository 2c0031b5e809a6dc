//! Service layer error types.
//!
//! [`Error`] is returned by everything under [`service`] and by startup code
//! such as key loading and database connection. Handlers convert it into an
//! HTTP error through `From`.
//!
//! [`service`]: crate::service

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use juju_postgres::PgError;

/// Boxed error used as the source of an [`Error`].
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for service layer operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Category of a service layer [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid or missing configuration.
    Config,
    /// A dependency such as the database is unavailable.
    External,
    /// Reading a file failed.
    FileSystem,
    /// Internal service logic errors.
    Internal,
}

impl ErrorKind {
    /// Returns the error kind as a string for categorization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::External => "external_service",
            Self::FileSystem => "file_system",
            Self::Internal => "internal_service",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service layer error with a kind, a message and an optional source.
#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    #[inline]
    fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches a source error.
    #[inline]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Creates a new configuration error.
    #[inline]
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Creates a new external service error, prefixed with the service name.
    #[inline]
    pub fn external(
        service: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let full_message = format!("{}: {}", service.into(), message.into());
        Self::new(ErrorKind::External, full_message)
    }

    /// Creates a new file system error.
    #[inline]
    pub fn file_system(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::FileSystem, message)
    }

    /// Creates a new internal service error, prefixed with the service name.
    #[inline]
    pub fn internal(
        service: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let full_message = format!("{}: {}", service.into(), message.into());
        Self::new(ErrorKind::Internal, full_message)
    }
}

impl From<PgError> for Error {
    fn from(err: PgError) -> Self {
        if err.is_transient() {
            Error::external("postgres", err.to_string()).with_source(err)
        } else {
            Error::internal("postgres", err.to_string()).with_source(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use juju_postgres::error::TimeoutType;

    use super::*;

    #[test]
    fn error_creation() {
        let error = Error::config("missing signing key");
        assert_eq!(error.kind(), ErrorKind::Config);
        assert_eq!(error.message(), "missing signing key");
        assert_eq!(error.to_string(), "config error: missing signing key");
    }

    #[test]
    fn error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::file_system("cannot read secret file").with_source(source);

        assert!(StdError::source(&error).is_some());
        assert_eq!(error.kind(), ErrorKind::FileSystem);
    }

    #[test]
    fn external_service_error() {
        let error = Error::external("postgres", "Connection refused");

        assert_eq!(error.kind(), ErrorKind::External);
        assert_eq!(error.message(), "postgres: Connection refused");
    }

    #[test]
    fn pg_timeouts_are_external() {
        let error = Error::from(PgError::Timeout(TimeoutType::Wait));
        assert_eq!(error.kind(), ErrorKind::External);

        let error = Error::from(PgError::Config("empty url".into()));
        assert_eq!(error.kind(), ErrorKind::Internal);
        assert!(StdError::source(&error).is_some());
    }

    #[test]
    fn error_kind_as_str() {
        assert_eq!(ErrorKind::Config.as_str(), "config");
        assert_eq!(ErrorKind::External.as_str(), "external_service");
        assert_eq!(ErrorKind::FileSystem.as_str(), "file_system");
        assert_eq!(ErrorKind::Internal.as_str(), "internal_service");
    }
}
