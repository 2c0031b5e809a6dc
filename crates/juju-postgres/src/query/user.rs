//! User repository for credential lookups.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::model::User;
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Read access to provisioned users.
pub trait UserRepository {
    /// Finds the user whose email and password both match exactly.
    ///
    /// Returns `None` both for an unknown email and for a wrong password.
    fn find_user_by_credentials(
        &mut self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;
}

impl UserRepository for PgConnection {
    async fn find_user_by_credentials(
        &mut self,
        email: &str,
        password: &str,
    ) -> PgResult<Option<User>> {
        use schema::users::{self, dsl};

        let user = users::table
            .filter(dsl::email.eq(email))
            .filter(dsl::password.eq(password))
            .select(User::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            matched = user.is_some(),
            "Checked user credentials"
        );

        Ok(user)
    }
}
