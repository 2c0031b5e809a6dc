//! Enumerations mirroring PostgreSQL enum types.

mod user_role;

pub use user_role::UserRole;
