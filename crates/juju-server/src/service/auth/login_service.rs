//! Credential check followed by token issuance.

use juju_postgres::query::{TokenRepository, UserRepository};

use super::TokenIssuer;
use crate::Result;

/// Tracing target for login attempts.
const TRACING_TARGET: &str = "juju_server::service::login";

/// Verifies credentials and hands out the user's bearer token.
#[derive(Debug, Clone)]
pub struct LoginService {
    issuer: TokenIssuer,
}

impl LoginService {
    /// Creates a login service issuing tokens through `issuer`.
    pub fn new(issuer: TokenIssuer) -> Self {
        Self { issuer }
    }

    /// Returns the token issuer.
    #[inline]
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Returns the bearer token of the user matching `username` and
    /// `password`, or `None` when no user matches.
    ///
    /// An unknown email and a wrong password are indistinguishable, and no
    /// token is touched on failure.
    ///
    /// # Errors
    ///
    /// Fails only when the store or token signing fails.
    #[tracing::instrument(skip_all, target = TRACING_TARGET)]
    pub async fn login<C>(
        &self,
        conn: &mut C,
        username: &str,
        password: &str,
    ) -> Result<Option<String>>
    where
        C: UserRepository + TokenRepository + Send,
    {
        let Some(user) = conn.find_user_by_credentials(username, password).await? else {
            tracing::warn!(target: TRACING_TARGET, "Login rejected");
            return Ok(None);
        };

        let token = self.issuer.issue(conn, &user).await?;

        tracing::info!(
            target: TRACING_TARGET,
            user_id = %user.id,
            role = %user.role,
            "Login succeeded"
        );

        Ok(Some(token.token_value))
    }
}
