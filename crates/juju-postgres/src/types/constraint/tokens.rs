//! Tokens table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Tokens table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum TokenConstraints {
    #[strum(serialize = "tokens_value_not_empty")]
    ValueNotEmpty,

    #[strum(serialize = "tokens_expires_after_issued")]
    ExpiresAfterIssued,

    #[strum(serialize = "tokens_user_id_fkey")]
    UserReference,

    /// Another token of the same user is already active.
    #[strum(serialize = "tokens_user_active_unique_idx")]
    UserActiveUnique,
}

impl TokenConstraints {
    /// Creates a new [`TokenConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            TokenConstraints::ValueNotEmpty => ConstraintCategory::Validation,
            TokenConstraints::ExpiresAfterIssued => ConstraintCategory::Chronological,
            TokenConstraints::UserReference => ConstraintCategory::BusinessLogic,
            TokenConstraints::UserActiveUnique => ConstraintCategory::Uniqueness,
        }
    }
}

impl From<TokenConstraints> for String {
    #[inline]
    fn from(val: TokenConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for TokenConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
