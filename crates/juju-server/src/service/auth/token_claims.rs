use jiff::Timestamp;
use juju_postgres::model::User;
use juju_postgres::types::UserRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims embedded into every bearer token.
///
/// Registered claims (`jti`, `sub`, `iat`, `exp`, `iss`, `aud`) are renamed to
/// their RFC 7519 names. Timestamps are whole seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Identifier of the stored token row.
    #[serde(rename = "jti")]
    pub token_id: Uuid,
    /// Identifier of the user the token was issued to.
    #[serde(rename = "sub")]
    pub user_id: Uuid,

    /// Email address of the user.
    pub email: String,
    /// Given name of the user.
    pub given_name: String,
    /// Surname of the user.
    pub family_name: String,
    /// Role of the user at issuance.
    pub role: UserRole,

    /// Issuance time in seconds.
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Expiry time in seconds, always 60 minutes after issuance.
    #[serde(rename = "exp")]
    pub expires_at: i64,

    /// Issuer, when one is configured.
    #[serde(rename = "iss", default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    /// Intended audience, when one is configured.
    #[serde(rename = "aud", default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
}

impl TokenClaims {
    /// Creates claims for `user` valid from `issued_at` until `expires_at`.
    pub fn new(user: &User, token_id: Uuid, issued_at: Timestamp, expires_at: Timestamp) -> Self {
        Self {
            token_id,
            user_id: user.id,
            email: user.email.clone(),
            given_name: user.name.clone(),
            family_name: user.last_name.clone(),
            role: user.role,
            issued_at: issued_at.as_second(),
            expires_at: expires_at.as_second(),
            issuer: None,
            audience: None,
        }
    }

    /// Sets the `iss` claim.
    pub fn with_issuer(mut self, issuer: Option<&str>) -> Self {
        self.issuer = issuer.map(str::to_owned);
        self
    }

    /// Sets the `aud` claim.
    pub fn with_audience(mut self, audience: Option<&str>) -> Self {
        self.audience = audience.map(str::to_owned);
        self
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;

    use super::*;
    use crate::service::auth::in_memory::test_user;

    #[test]
    fn claims_carry_user_identity() -> anyhow::Result<()> {
        let user = test_user("alejopertuz@gmail.com", "123", UserRole::Admin);
        let issued_at = Timestamp::now();
        let expires_at = issued_at + SignedDuration::from_mins(60);
        let token_id = Uuid::now_v7();

        let claims = TokenClaims::new(&user, token_id, issued_at, expires_at)
            .with_issuer(Some("juju"))
            .with_audience(None);

        let json = serde_json::to_value(&claims)?;
        assert_eq!(json["jti"], token_id.to_string());
        assert_eq!(json["sub"], user.id.to_string());
        assert_eq!(json["email"], "alejopertuz@gmail.com");
        assert_eq!(json["given_name"], user.name);
        assert_eq!(json["family_name"], user.last_name);
        assert_eq!(json["role"], "admin");
        assert_eq!(json["iss"], "juju");
        assert!(json.get("aud").is_none());
        assert_eq!(json["exp"].as_i64(), Some(json["iat"].as_i64().unwrap_or_default() + 3600));
        assert_eq!(claims.expires_at, expires_at.as_second());
        Ok(())
    }
}
