use jiff::Timestamp;
use juju_postgres::types::UserRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::service::TokenClaims;

/// Identity and validity window of the presented bearer token.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// ID of the stored token.
    pub token_id: Uuid,
    /// ID of the authenticated user.
    pub user_id: Uuid,

    pub email: String,
    pub given_name: String,
    pub family_name: String,
    pub role: UserRole,

    /// Timestamp when the token was issued.
    pub issued_at: Timestamp,
    /// Timestamp when the token expires.
    pub expires_at: Timestamp,
}

impl From<TokenClaims> for SessionResponse {
    fn from(claims: TokenClaims) -> Self {
        let to_timestamp = |secs: i64| Timestamp::from_second(secs).unwrap_or(Timestamp::UNIX_EPOCH);

        Self {
            token_id: claims.token_id,
            user_id: claims.user_id,
            issued_at: to_timestamp(claims.issued_at),
            expires_at: to_timestamp(claims.expires_at),
            email: claims.email,
            given_name: claims.given_name,
            family_name: claims.family_name,
            role: claims.role,
        }
    }
}
