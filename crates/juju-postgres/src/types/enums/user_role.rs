//! User role enumeration.

use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Role of a user, embedded into every token issued to them.
///
/// Corresponds to the `USER_ROLE` PostgreSQL enum.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::UserRole"]
pub enum UserRole {
    /// Full administrative access.
    #[db_rename = "admin"]
    #[serde(rename = "admin")]
    #[strum(serialize = "admin")]
    Admin,

    /// Regular user.
    #[db_rename = "user"]
    #[serde(rename = "user")]
    #[strum(serialize = "user")]
    #[default]
    User,
}
