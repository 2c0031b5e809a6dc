//! Bearer token verification against the token store.
//!
//! A token with a valid signature is only accepted when the row it names is
//! still the user's active, unexpired token. Tokens superseded by a later
//! login therefore stop working even though their signature is intact.

use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use derive_more::Deref;
use jiff::Timestamp;
use juju_postgres::PgClient;
use juju_postgres::query::TokenRepository;

use super::AuthHeader;
use crate::extract::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{JwtKeys, TokenClaims};

/// Claims of a bearer token that is verified and still active in the store.
#[derive(Debug, Clone, Deref, PartialEq, Eq)]
pub struct AuthState(pub TokenClaims);

impl AuthState {
    /// Wraps claims that were already checked against the store.
    #[inline]
    #[must_use]
    pub const fn from_verified_claims(claims: TokenClaims) -> Self {
        Self(claims)
    }

    /// Checks `claims` against the stored token at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Unauthorized`] when the row is missing, belongs to
    /// another user, was superseded or has expired.
    pub async fn verify<C>(conn: &mut C, claims: TokenClaims, now: Timestamp) -> Result<Self>
    where
        C: TokenRepository + Send,
    {
        let Some(token) = conn.find_token_by_id(claims.token_id).await? else {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                token_id = %claims.token_id,
                user_id = %claims.user_id,
                "Session rejected: token not found"
            );
            return Err(Self::invalid_session());
        };

        if token.user_id != claims.user_id {
            tracing::error!(
                target: TRACING_TARGET_AUTHENTICATION,
                token_id = %claims.token_id,
                claimed_user_id = %claims.user_id,
                stored_user_id = %token.user_id,
                "Session rejected: subject does not own the token"
            );
            return Err(Self::invalid_session());
        }

        if !token.is_usable_at(now) {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                token_id = %claims.token_id,
                user_id = %claims.user_id,
                is_active = token.is_active,
                "Session rejected: token superseded or expired"
            );
            return Err(Self::invalid_session()
                .with_message("Your session has expired, sign in again to continue"));
        }

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            token_id = %claims.token_id,
            user_id = %claims.user_id,
            "Session verified"
        );

        Ok(Self::from_verified_claims(claims))
    }

    fn invalid_session() -> Error<'static> {
        ErrorKind::Unauthorized
            .with_context("Session is no longer valid")
            .with_resource("authentication")
    }
}

impl<S> FromRequestParts<S> for AuthState
where
    S: Sync + Send,
    PgClient: FromRef<S>,
    JwtKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_state) = parts.extensions.get::<Self>() {
            return Ok(auth_state.clone());
        }

        let auth_header = AuthHeader::from_request_parts(parts, state).await?;
        let pg_client = PgClient::from_ref(state);
        let mut conn = pg_client.get_connection().await?;

        let auth_state =
            Self::verify(&mut **conn, auth_header.into_claims(), Timestamp::now()).await?;

        parts.extensions.insert(auth_state.clone());
        Ok(auth_state)
    }
}

impl<S> OptionalFromRequestParts<S> for AuthState
where
    S: Sync + Send,
    PgClient: FromRef<S>,
    JwtKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        match <Self as FromRequestParts<S>>::from_request_parts(parts, state).await {
            Ok(auth_state) => Ok(Some(auth_state)),
            Err(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use juju_postgres::model::User;
    use juju_postgres::types::UserRole;

    use super::*;
    use crate::service::TokenIssuer;
    use crate::service::auth::in_memory::{InMemoryStore, test_user};

    const SECRET: &str = "an-hs256-secret-that-is-long-enough";

    async fn issued_claims(
        store: &mut InMemoryStore,
        user: &User,
        now: Timestamp,
    ) -> anyhow::Result<TokenClaims> {
        let issuer = TokenIssuer::new(JwtKeys::new(SECRET, None, None)?);
        let token = issuer.issue_at(store, user, now).await?;
        Ok(issuer.keys().decode::<TokenClaims>(&token.token_value)?)
    }

    #[tokio::test]
    async fn active_token_is_accepted() -> anyhow::Result<()> {
        let user = test_user("anafrank@gmail.com", "456", UserRole::User);
        let mut store = InMemoryStore::with_users([user.clone()]);
        let now = Timestamp::now();

        let claims = issued_claims(&mut store, &user, now).await?;
        let state = AuthState::verify(&mut store, claims.clone(), now).await?;

        assert_eq!(state.user_id, user.id);
        assert_eq!(state.0, claims);
        Ok(())
    }

    #[tokio::test]
    async fn superseded_token_is_rejected() -> anyhow::Result<()> {
        let user = test_user("anafrank@gmail.com", "456", UserRole::User);
        let mut store = InMemoryStore::with_users([user.clone()]);
        let now = Timestamp::now();

        let claims = issued_claims(&mut store, &user, now).await?;
        assert!(store.deactivate_token(claims.token_id).await?);

        let Err(error) = AuthState::verify(&mut store, claims, now).await else {
            anyhow::bail!("superseded token was accepted");
        };
        assert_eq!(error.kind(), ErrorKind::Unauthorized);
        Ok(())
    }

    #[tokio::test]
    async fn expired_row_is_rejected() -> anyhow::Result<()> {
        let user = test_user("anafrank@gmail.com", "456", UserRole::User);
        let mut store = InMemoryStore::with_users([user.clone()]);
        let now = Timestamp::now();

        let claims = issued_claims(&mut store, &user, now).await?;
        let later = now + SignedDuration::from_mins(61);

        assert!(AuthState::verify(&mut store, claims, later).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn foreign_subject_is_rejected() -> anyhow::Result<()> {
        let owner = test_user("anafrank@gmail.com", "456", UserRole::User);
        let other = test_user("alejopertuz@gmail.com", "123", UserRole::Admin);
        let mut store = InMemoryStore::with_users([owner.clone(), other.clone()]);
        let now = Timestamp::now();

        let mut claims = issued_claims(&mut store, &owner, now).await?;
        claims.user_id = other.id;

        assert!(AuthState::verify(&mut store, claims, now).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_token_is_rejected() -> anyhow::Result<()> {
        let user = test_user("anafrank@gmail.com", "456", UserRole::User);
        let mut store = InMemoryStore::with_users([user.clone()]);
        let now = Timestamp::now();

        let mut claims = issued_claims(&mut store, &user, now).await?;
        claims.token_id = uuid::Uuid::now_v7();

        assert!(AuthState::verify(&mut store, claims, now).await.is_err());
        Ok(())
    }
}
