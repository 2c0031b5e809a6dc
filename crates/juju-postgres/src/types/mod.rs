//! Constraints, enumerations and other custom types.

mod constraint;
mod enums;

pub use constraint::{ConstraintCategory, ConstraintViolation, TokenConstraints};
pub use enums::UserRole;
