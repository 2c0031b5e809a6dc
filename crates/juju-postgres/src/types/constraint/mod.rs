//! Named database constraints, grouped per table.
//!
//! Constraint names follow the `<table>_<rule>` convention, which lets a
//! violation reported by PostgreSQL be routed back to its table enum.

mod tokens;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::tokens::TokenConstraints;

/// Any known constraint violation.
///
/// Only tables this crate writes to are listed. The `users` table is seeded
/// by migration and never written at runtime.
///
/// ```
/// use juju_postgres::types::{ConstraintViolation, TokenConstraints};
///
/// let violation = ConstraintViolation::new("tokens_user_active_unique_idx");
/// assert_eq!(violation, Some(ConstraintViolation::Tokens(TokenConstraints::UserActiveUnique)));
/// assert!(ConstraintViolation::new("unknown_constraint").is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConstraintViolation {
    Tokens(TokenConstraints),
}

/// Categories of database constraint violations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintCategory {
    /// Format, length and range checks.
    Validation,
    /// Ordering between timestamps.
    Chronological,
    /// Domain rules such as foreign keys.
    BusinessLogic,
    /// Primary keys and unique indexes.
    Uniqueness,
}

impl ConstraintViolation {
    /// Parses a constraint name reported by PostgreSQL.
    ///
    /// Returns `None` for constraints this crate does not declare.
    pub fn new(constraint: &str) -> Option<Self> {
        let prefix = constraint.split('_').next()?;
        match prefix {
            "tokens" => TokenConstraints::new(constraint).map(Self::Tokens),
            _ => None,
        }
    }

    /// Returns the table the constraint is declared on.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConstraintViolation::Tokens(_) => "tokens",
        }
    }

    /// Returns the category of this constraint violation.
    pub fn constraint_category(&self) -> ConstraintCategory {
        match self {
            ConstraintViolation::Tokens(c) => c.categorize(),
        }
    }

    /// Returns the constraint name as used in the database.
    #[inline]
    pub fn constraint_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintViolation::Tokens(c) => write!(f, "{c}"),
        }
    }
}

impl From<ConstraintViolation> for String {
    #[inline]
    fn from(val: ConstraintViolation) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for ConstraintViolation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or_else(|| format!("Unknown constraint: {value}"))
    }
}
