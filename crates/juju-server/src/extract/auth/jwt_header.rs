//! `Authorization: Bearer` extraction.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use axum_extra::typed_header::TypedHeaderRejectionReason;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};

use crate::extract::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{JwtKeys, TokenClaims};

/// Claims of a bearer token whose signature, expiry, issuer and audience
/// were verified.
///
/// The token store is not consulted. Use [`AuthState`] for that.
///
/// [`AuthState`]: crate::extract::AuthState
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeader {
    claims: TokenClaims,
}

impl AuthHeader {
    /// Decodes and verifies a compact JWT.
    pub fn from_token(token: &str, jwt_keys: &JwtKeys) -> Result<Self> {
        let claims = jwt_keys
            .decode::<TokenClaims>(token)
            .map_err(Self::map_jwt_error)?;

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            token_id = %claims.token_id,
            user_id = %claims.user_id,
            "Bearer token verified"
        );

        Ok(Self { claims })
    }

    /// Returns a reference to the verified claims.
    #[inline]
    pub const fn as_claims(&self) -> &TokenClaims {
        &self.claims
    }

    /// Consumes the header and returns the verified claims.
    #[inline]
    pub fn into_claims(self) -> TokenClaims {
        self.claims
    }

    fn map_jwt_error(error: JwtError) -> Error<'static> {
        tracing::warn!(
            target: TRACING_TARGET_AUTHENTICATION,
            error = %error,
            "Bearer token rejected"
        );

        match error.kind() {
            JwtErrorKind::ExpiredSignature => ErrorKind::Unauthorized
                .with_message("Token has expired")
                .with_resource("authentication"),
            JwtErrorKind::InvalidToken
            | JwtErrorKind::Base64(_)
            | JwtErrorKind::Json(_)
            | JwtErrorKind::Utf8(_) => ErrorKind::MalformedAuthToken
                .with_context(error.to_string())
                .with_resource("authentication"),
            _ => ErrorKind::Unauthorized
                .with_context(error.to_string())
                .with_resource("authentication"),
        }
    }
}

impl<S> FromRequestParts<S> for AuthHeader
where
    S: Sync + Send,
    JwtKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_header) = parts.extensions.get::<Self>() {
            return Ok(auth_header.clone());
        }

        type AuthBearerHeader = TypedHeader<Authorization<Bearer>>;
        let bearer = AuthBearerHeader::from_request_parts(parts, state)
            .await
            .map_err(|rejection| match rejection.reason() {
                TypedHeaderRejectionReason::Missing => ErrorKind::MissingAuthToken
                    .with_context("Missing Authorization header with Bearer token")
                    .with_resource("authentication"),
                _ => ErrorKind::MalformedAuthToken
                    .with_context("Authorization header must contain a Bearer token")
                    .with_resource("authentication"),
            })?;

        let jwt_keys = JwtKeys::from_ref(state);
        let auth_header = Self::from_token(bearer.token(), &jwt_keys)?;

        parts.extensions.insert(auth_header.clone());
        Ok(auth_header)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use jiff::{SignedDuration, Timestamp};
    use juju_postgres::types::UserRole;
    use uuid::Uuid;

    use super::*;
    use crate::service::auth::in_memory::test_user;

    fn keys() -> anyhow::Result<JwtKeys> {
        Ok(JwtKeys::new(
            "an-hs256-secret-that-is-long-enough",
            Some("juju".to_owned()),
            None,
        )?)
    }

    fn claims(issued_at: Timestamp) -> TokenClaims {
        let user = test_user("anafrank@gmail.com", "456", UserRole::User);
        TokenClaims::new(
            &user,
            Uuid::now_v7(),
            issued_at,
            issued_at + SignedDuration::from_mins(60),
        )
        .with_issuer(Some("juju"))
    }

    #[test]
    fn valid_token_yields_claims() -> anyhow::Result<()> {
        let keys = keys()?;
        let claims = claims(Timestamp::now());
        let token = keys.encode(&claims)?;

        let header = AuthHeader::from_token(&token, &keys)?;
        assert_eq!(header.as_claims(), &claims);
        assert_eq!(header.into_claims().email, "anafrank@gmail.com");
        Ok(())
    }

    #[test]
    fn expired_token_is_unauthorized() -> anyhow::Result<()> {
        let keys = keys()?;
        let issued_at = Timestamp::now() - SignedDuration::from_hours(3);
        let token = keys.encode(&claims(issued_at))?;

        let Err(error) = AuthHeader::from_token(&token, &keys) else {
            anyhow::bail!("expired token was accepted");
        };
        assert_eq!(error.kind().status_code(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[test]
    fn garbage_is_malformed() -> anyhow::Result<()> {
        let Err(error) = AuthHeader::from_token("not-a-jwt", &keys()?) else {
            anyhow::bail!("garbage token was accepted");
        };
        assert_eq!(error.kind(), ErrorKind::MalformedAuthToken);
        Ok(())
    }

    #[test]
    fn foreign_issuer_is_unauthorized() -> anyhow::Result<()> {
        let keys = keys()?;
        let foreign = claims(Timestamp::now()).with_issuer(Some("someone-else"));
        let token = keys.encode(&foreign)?;

        let Err(error) = AuthHeader::from_token(&token, &keys) else {
            anyhow::bail!("token with a foreign issuer was accepted");
        };
        assert_eq!(error.kind(), ErrorKind::Unauthorized);
        Ok(())
    }
}
