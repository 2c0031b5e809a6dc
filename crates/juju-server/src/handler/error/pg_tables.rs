//! Per-table constraint violation conversions.

use juju_postgres::types::TokenConstraints;

use crate::handler::{Error, ErrorKind};

impl From<TokenConstraints> for Error<'static> {
    fn from(c: TokenConstraints) -> Self {
        let error = match c {
            TokenConstraints::UserActiveUnique => {
                ErrorKind::Conflict.with_message("Another login is issuing a token")
            }
            TokenConstraints::ValueNotEmpty
            | TokenConstraints::ExpiresAfterIssued
            | TokenConstraints::UserReference => ErrorKind::InternalServerError.into_error(),
        };

        error.with_resource("token")
    }
}
