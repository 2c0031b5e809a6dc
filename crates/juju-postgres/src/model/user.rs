//! User model.

use std::fmt;

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::users;
use crate::types::UserRole;

/// A provisioned user that can log in.
#[derive(Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Given name.
    pub name: String,
    /// Surname.
    pub last_name: String,
    /// Unique login identifier.
    pub email: String,
    /// Plaintext password, compared by equality.
    pub password: String,
    /// Role embedded into issued tokens.
    pub role: UserRole,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Timestamp of provisioning.
    pub created_at: Timestamp,
}

impl User {
    /// Returns the user's full name.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.last_name)
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}
