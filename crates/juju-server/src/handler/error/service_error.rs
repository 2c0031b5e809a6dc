//! Service error to HTTP error conversion.

use super::http_error::{Error as HttpError, ErrorKind};
use crate::{Error as ServiceError, ErrorKind as ServiceErrorKind};

/// Tracing target for service error conversions.
const TRACING_TARGET: &str = "juju_server::handler::service";

impl From<ServiceError> for HttpError<'static> {
    fn from(error: ServiceError) -> Self {
        match error.kind() {
            ServiceErrorKind::External => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Dependency unavailable"
                );
                ErrorKind::ServiceUnavailable.with_context(error.message().to_owned())
            }
            ServiceErrorKind::Config | ServiceErrorKind::FileSystem | ServiceErrorKind::Internal => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    error_kind = %error.kind(),
                    "Service operation failed"
                );
                ErrorKind::InternalServerError.with_context(error.message().to_owned())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_status() {
        let error = HttpError::from(ServiceError::external("postgres", "pool timed out"));
        assert_eq!(error.kind(), ErrorKind::ServiceUnavailable);
        assert_eq!(error.context(), Some("postgres: pool timed out"));

        let error = HttpError::from(ServiceError::config("signing secret is too short"));
        assert_eq!(error.kind(), ErrorKind::InternalServerError);

        let error = HttpError::from(ServiceError::internal("jwt", "encoding failed"));
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
    }
}
