//! Bearer token model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::tokens;

/// A signed bearer token issued to a user.
///
/// A token is created active and later flipped inactive when it expires and
/// is replaced. Rows are never deleted.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Token {
    /// Unique token identifier, also the `jti` claim of the signed value.
    pub id: Uuid,
    /// Owner of the token.
    pub user_id: Uuid,
    /// Signed token value handed to the client.
    pub token_value: String,
    /// Whether this is the user's current token.
    pub is_active: bool,
    /// Timestamp of issuance.
    pub issued_at: Timestamp,
    /// Timestamp after which the token is no longer accepted.
    pub expires_at: Timestamp,
}

/// Data for recording a newly minted token.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewToken {
    /// Token identifier, chosen before signing so it can be embedded as `jti`.
    pub id: Uuid,
    /// Owner of the token.
    pub user_id: Uuid,
    /// Signed token value.
    pub token_value: String,
    /// Timestamp of issuance.
    pub issued_at: Timestamp,
    /// Timestamp of expiry.
    pub expires_at: Timestamp,
}

impl Token {
    /// Returns whether the expiry lies strictly before `now`.
    ///
    /// A token is still valid at the exact instant of its expiry.
    #[inline]
    pub fn is_expired_at(&self, now: jiff::Timestamp) -> bool {
        now > jiff::Timestamp::from(self.expires_at)
    }

    /// Returns whether the token is active and not expired at `now`.
    #[inline]
    pub fn is_usable_at(&self, now: jiff::Timestamp) -> bool {
        self.is_active && !self.is_expired_at(now)
    }

    /// Returns the lifetime the token was issued with.
    pub fn lifetime(&self) -> jiff::SignedDuration {
        jiff::Timestamp::from(self.issued_at).duration_until(self.expires_at.into())
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;

    use super::*;

    fn token(issued_at: jiff::Timestamp, lifetime: SignedDuration) -> Token {
        Token {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token_value: "header.payload.signature".to_string(),
            is_active: true,
            issued_at: issued_at.into(),
            expires_at: (issued_at + lifetime).into(),
        }
    }

    #[test]
    fn fresh_token_is_usable() {
        let now = jiff::Timestamp::now();
        let token = token(now, SignedDuration::from_mins(60));
        assert!(!token.is_expired_at(now));
        assert!(token.is_usable_at(now));
        assert_eq!(token.lifetime(), SignedDuration::from_mins(60));
    }

    #[test]
    fn token_expires_right_after_expiry() {
        let issued_at = jiff::Timestamp::now() - SignedDuration::from_mins(90);
        let token = token(issued_at, SignedDuration::from_mins(60));
        let expires_at = jiff::Timestamp::from(token.expires_at);

        assert!(token.is_expired_at(jiff::Timestamp::now()));
        assert!(token.is_expired_at(expires_at + SignedDuration::from_nanos(1)));
        assert!(!token.is_expired_at(expires_at));
        assert!(token.is_usable_at(expires_at));
    }

    #[test]
    fn inactive_token_is_not_usable() {
        let mut token = token(jiff::Timestamp::now(), SignedDuration::from_mins(60));
        token.is_active = false;
        assert!(!token.is_usable_at(jiff::Timestamp::now()));
    }
}
