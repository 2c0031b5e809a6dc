//! Bearer token issuance and reuse.

use jiff::{SignedDuration, Timestamp};
use juju_postgres::model::{NewToken, Token, User};
use juju_postgres::query::TokenRepository;
use juju_postgres::types::{ConstraintViolation, TokenConstraints};
use uuid::Uuid;

use super::TokenClaims;
use crate::service::JwtKeys;
use crate::{Error, Result};

/// Tracing target for token issuance.
const TRACING_TARGET: &str = "juju_server::service::token_issuer";

/// Fixed validity window of every issued token.
pub const TOKEN_LIFETIME: SignedDuration = SignedDuration::from_mins(60);

/// Returns a user's current token, or mints and records a new one.
///
/// A user has at most one active token. A still valid active token is
/// returned unchanged, with no sliding expiration. An expired active token is
/// flipped inactive and replaced. When a concurrent login wins the race to
/// replace or create the token, the winner's token is returned.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    keys: JwtKeys,
}

impl TokenIssuer {
    /// Creates an issuer signing with `keys`.
    pub fn new(keys: JwtKeys) -> Self {
        Self { keys }
    }

    /// Returns the signing keys.
    #[inline]
    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    /// Returns the active token of `user`, minting one if needed.
    pub async fn issue<C>(&self, conn: &mut C, user: &User) -> Result<Token>
    where
        C: TokenRepository + Send,
    {
        self.issue_at(conn, user, Timestamp::now()).await
    }

    /// Same as [`issue`], evaluating expiry against `now`.
    ///
    /// [`issue`]: Self::issue
    #[tracing::instrument(skip_all, target = TRACING_TARGET, fields(user_id = %user.id))]
    pub async fn issue_at<C>(&self, conn: &mut C, user: &User, now: Timestamp) -> Result<Token>
    where
        C: TokenRepository + Send,
    {
        if let Some(active) = conn.find_active_token(user.id).await? {
            if !active.is_expired_at(now) {
                tracing::debug!(
                    target: TRACING_TARGET,
                    token_id = %active.id,
                    "Reusing active token"
                );
                return Ok(active);
            }

            let deactivated = conn.deactivate_token(active.id).await?;
            tracing::debug!(
                target: TRACING_TARGET,
                token_id = %active.id,
                deactivated,
                "Expired token superseded"
            );

            if !deactivated
                && let Some(winner) = self.find_usable_token(conn, user, now).await?
            {
                return Ok(winner);
            }
        }

        let new_token = self.mint(user, now)?;
        let token_id = new_token.id;

        match conn.create_token(new_token).await {
            Ok(token) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    token_id = %token.id,
                    expires_at = %Timestamp::from(token.expires_at),
                    "Issued new token"
                );
                Ok(token)
            }
            Err(error)
                if error.constraint_violation()
                    == Some(ConstraintViolation::Tokens(
                        TokenConstraints::UserActiveUnique,
                    )) =>
            {
                tracing::debug!(
                    target: TRACING_TARGET,
                    token_id = %token_id,
                    "Concurrent login recorded a token first"
                );

                self.find_usable_token(conn, user, now)
                    .await?
                    .ok_or_else(|| Error::from(error))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn find_usable_token<C>(
        &self,
        conn: &mut C,
        user: &User,
        now: Timestamp,
    ) -> Result<Option<Token>>
    where
        C: TokenRepository + Send,
    {
        let token = conn.find_active_token(user.id).await?;
        Ok(token.filter(|t| !t.is_expired_at(now)))
    }

    /// Signs a new token for `user`, valid for [`TOKEN_LIFETIME`] from `now`.
    fn mint(&self, user: &User, now: Timestamp) -> Result<NewToken> {
        let token_id = Uuid::now_v7();
        let expires_at = now.checked_add(TOKEN_LIFETIME).map_err(|e| {
            Error::internal("token_issuer", "token expiry is out of range").with_source(e)
        })?;

        let claims = TokenClaims::new(user, token_id, now, expires_at)
            .with_issuer(self.keys.issuer())
            .with_audience(self.keys.audience());
        let token_value = self.keys.encode(&claims)?;

        Ok(NewToken {
            id: token_id,
            user_id: user.id,
            token_value,
            issued_at: now.into(),
            expires_at: expires_at.into(),
        })
    }
}
