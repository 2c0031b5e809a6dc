//! Database error to HTTP error conversion.
//!
//! Named constraint violations are routed to the per-table conversions in
//! [`pg_tables`]. Pool timeouts become `503`, everything else `500`.
//!
//! [`pg_tables`]: super::pg_tables

use juju_postgres::PgError;
use juju_postgres::types::ConstraintViolation;

use crate::handler::{Error, ErrorKind};

/// Tracing target for database error conversions.
const TRACING_TARGET: &str = "juju_server::postgres_constraints";

impl From<ConstraintViolation> for Error<'static> {
    fn from(constraint: ConstraintViolation) -> Self {
        match constraint {
            ConstraintViolation::Tokens(c) => c.into(),
        }
    }
}

impl From<PgError> for Error<'static> {
    fn from(error: PgError) -> Self {
        match error {
            PgError::Config(config_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %config_error,
                    "database configuration error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Timeout(timeout) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    timeout = ?timeout,
                    "database timeout",
                );
                ErrorKind::ServiceUnavailable.with_resource("database")
            }
            PgError::Connection(connection_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %connection_error,
                    "database connection error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Migration(migration_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %migration_error,
                    "database migration error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Query(ref query_error) => {
                if let Some(constraint_name) = error.constraint()
                    && let Some(constraint) = ConstraintViolation::new(constraint_name)
                {
                    tracing::error!(
                        target: TRACING_TARGET,
                        constraint = constraint_name,
                        error = %query_error,
                        "query error (constraint violation)"
                    );
                    return constraint.into();
                }

                tracing::error!(
                    target: TRACING_TARGET,
                    error = %query_error,
                    "query error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Unexpected(unexpected_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %unexpected_error,
                    "unexpected database error"
                );
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use juju_postgres::error::{DieselError, TimeoutType};
    use juju_postgres::types::TokenConstraints;

    use super::*;

    #[test]
    fn pool_timeout_is_service_unavailable() {
        let error = Error::from(PgError::Timeout(TimeoutType::Wait));
        assert_eq!(error.kind(), ErrorKind::ServiceUnavailable);
    }

    #[test]
    fn missing_row_is_internal() {
        let error = Error::from(PgError::Query(DieselError::NotFound));
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
    }

    #[test]
    fn constraint_violations_route_by_table() {
        let error = Error::from(ConstraintViolation::Tokens(
            TokenConstraints::UserActiveUnique,
        ));
        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(error.resource(), Some("token"));

        let error = Error::from(ConstraintViolation::Tokens(
            TokenConstraints::ExpiresAfterIssued,
        ));
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
    }
}
